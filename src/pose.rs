//! Rigid pose value type.
//!
//! Conventions: right-handed, `+Y` up. A pose's forward axis is its local
//! `+Z`; the lateral (pitch) axis is its local `+X`. Positive pitch raises
//! the forward axis toward `+Y`.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

/// Position plus orientation, decoupled from any scene graph.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Point3<f32>,
    pub rotation: UnitQuaternion<f32>,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub fn new(position: Point3<f32>, rotation: UnitQuaternion<f32>) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
        }
    }

    pub fn at(position: Point3<f32>) -> Self {
        Self {
            position,
            rotation: UnitQuaternion::identity(),
        }
    }

    /// Local `+Z` in world space.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    /// Local `+Y` in world space.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    /// Point `length` units along the forward axis.
    pub fn tip(&self, length: f32) -> Point3<f32> {
        self.position + self.forward() * length
    }

    pub fn to_isometry(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.rotation)
    }
}

/// Rotation about world `+Y` such that local `+Z` points at heading `yaw`.
///
/// `yaw = 0` faces `+Z`, `yaw = π/2` faces `+X`.
pub fn yaw_rotation(yaw: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw)
}

/// Yaw-only rotation facing a horizontal direction (its `y` is ignored).
pub fn look_horizontal(direction: &Vector3<f32>) -> UnitQuaternion<f32> {
    yaw_rotation(direction.x.atan2(direction.z))
}

/// Rotation about the local lateral axis, positive raising the forward axis.
pub fn pitch_rotation(pitch: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -pitch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn test_identity_axes() {
        let pose = Pose::identity();
        assert!(close(pose.forward(), Vector3::z()));
        assert!(close(pose.up(), Vector3::y()));
    }

    #[test]
    fn test_yaw_faces_x() {
        let rot = yaw_rotation(FRAC_PI_2);
        assert!(close(rot * Vector3::z(), Vector3::x()));
    }

    #[test]
    fn test_look_horizontal_ignores_height() {
        let rot = look_horizontal(&Vector3::new(-3.0, 10.0, 0.0));
        assert!(close(rot * Vector3::z(), -Vector3::x()));
        assert!(close(rot * Vector3::y(), Vector3::y()));
    }

    #[test]
    fn test_pitch_raises_forward() {
        let rot = pitch_rotation(FRAC_PI_2);
        assert!(close(rot * Vector3::z(), Vector3::y()));

        let rotation = yaw_rotation(FRAC_PI_2) * pitch_rotation(0.5);
        let pose = Pose::new(Point3::new(1.0, 0.0, 0.0), rotation);
        let tip = pose.tip(2.0);
        assert!((tip.y - 2.0 * 0.5f32.sin()).abs() < 1e-5);
        assert!((tip.x - (1.0 + 2.0 * 0.5f32.cos())).abs() < 1e-5);
        assert!(tip.z.abs() < 1e-5);
    }

    #[test]
    fn test_to_isometry() {
        let pose = Pose::new(Point3::new(1.0, 2.0, 3.0), yaw_rotation(0.3));
        let iso = pose.to_isometry();
        assert!((iso * Point3::origin() - pose.position).norm() < 1e-6);
    }
}
