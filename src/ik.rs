//! Two-link analytical inverse kinematics.
//!
//! The arm is a floor pivot (yaw only) carrying an upper arm and a forearm
//! that both bend in the vertical plane picked by the yaw. Each tick the
//! solver:
//!
//! 1. pins the base to the floor (`y = 0`),
//! 2. gates on reach: a target further than `max_reach` freezes the arm,
//! 3. yaws the base toward the target's horizontal direction,
//! 4. clamps the solve distance into `[|L1 - L2|, L1 + L2]`,
//! 5. solves the triangle with the law of cosines,
//! 6. composes the segment poses down the chain.
//!
//! Degenerate geometry (zero-length segments, target on the base) holds the
//! previous pose, the same as an out-of-reach target.

use crate::config::ArmConfig;
use crate::error::ConfigError;
use crate::pose::{look_horizontal, pitch_rotation, Pose};
use nalgebra::{Point3, Vector3};
use std::f32::consts::PI;

/// Horizontal offsets at or below this keep the previous yaw.
pub const YAW_EPSILON: f32 = 0.01;

/// Products and distances below this count as zero.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Interior angles of the arm triangle, in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointAngles {
    /// Angle at the shoulder between the upper arm and the base-to-target line.
    pub shoulder: f32,
    /// Angle at the elbow between the two segments.
    pub elbow_interior: f32,
    /// Bend of the forearm relative to the upper arm (`π - elbow_interior`).
    pub elbow_bend: f32,
}

/// Solve the arm triangle for a target `distance` from the shoulder.
///
/// `distance` is clamped into `[|l1 - l2|, l1 + l2]` and the arccos inputs
/// into `[-1, 1]`. Returns `None` when a segment or the clamped distance is
/// zero.
pub fn solve_angles(distance: f32, l1: f32, l2: f32) -> Option<JointAngles> {
    let (a, b) = (l1, l2);
    if !(a > 0.0 && b > 0.0) || a * b <= DEGENERATE_EPSILON {
        return None;
    }

    let c = distance.clamp((a - b).abs(), a + b);
    if a * c <= DEGENERATE_EPSILON {
        return None;
    }

    let cos_b = (a * a + c * c - b * b) / (2.0 * a * c);
    let cos_c = (a * a + b * b - c * c) / (2.0 * a * b);
    let angle_b = cos_b.clamp(-1.0, 1.0).acos();
    let angle_c = cos_c.clamp(-1.0, 1.0).acos();

    Some(JointAngles {
        shoulder: angle_b,
        elbow_interior: angle_c,
        elbow_bend: PI - angle_c,
    })
}

/// Poses of every link for one solved configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainPoses {
    pub upper_arm: Pose,
    pub forearm: Pose,
    /// End-effector.
    pub wrist: Point3<f32>,
}

/// Compose segment poses from the base pose and an upper-arm pitch.
///
/// `pitch` is measured from the base's horizontal forward axis; the forearm
/// folds down from the upper arm by `elbow_bend`.
pub fn forward_kinematics(
    base: &Pose,
    pitch: f32,
    elbow_bend: f32,
    l1: f32,
    l2: f32,
) -> ChainPoses {
    let upper_arm = Pose::new(base.position, base.rotation * pitch_rotation(pitch));
    let elbow = upper_arm.tip(l1);

    let forearm = Pose::new(elbow, upper_arm.rotation * pitch_rotation(-elbow_bend));
    let wrist = forearm.tip(l2);

    ChainPoses {
        upper_arm,
        forearm,
        wrist,
    }
}

/// What happened on the last update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SolveOutcome {
    /// Pose updated. `clamped` is set when the target lay outside
    /// `[|L1 - L2|, L1 + L2]` and the arm stopped short of it.
    Solved { clamped: bool },
    /// Target beyond `max_reach`; pose held.
    OutOfReach { distance: f32 },
    /// Geometry undefined this tick; pose held.
    Degenerate,
}

/// Per-tick output of the solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmState {
    pub base: Pose,
    pub upper_arm: Pose,
    pub forearm: Pose,
    /// End-effector position.
    pub wrist: Point3<f32>,
    /// Raw target of the last update.
    pub target: Point3<f32>,
    pub in_range: bool,
    pub outcome: SolveOutcome,
}

impl ArmState {
    /// Tip of the upper arm.
    pub fn elbow(&self) -> Point3<f32> {
        self.forearm.position
    }
}

/// Stateful two-link solver.
///
/// Owns the last valid pose and last valid yaw; nothing else carries over
/// between ticks.
#[derive(Clone, Debug)]
pub struct TwoLinkSolver {
    config: ArmConfig,
    base: Pose,
    chain: ChainPoses,
    target: Point3<f32>,
    in_range: bool,
    outcome: SolveOutcome,
}

impl TwoLinkSolver {
    /// Create a solver with the arm pointing straight up, facing `+Z`.
    pub fn new(config: ArmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let base = Pose::at(Point3::new(config.base_x, 0.0, config.base_z));
        let chain = forward_kinematics(
            &base,
            PI / 2.0,
            0.0,
            config.upper_arm_length,
            config.forearm_length,
        );

        Ok(Self {
            config,
            base,
            chain,
            target: chain.wrist,
            in_range: true,
            outcome: SolveOutcome::Solved { clamped: false },
        })
    }

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    /// Move the floor pivot horizontally. Height is always forced to zero.
    pub fn set_base_position(&mut self, x: f32, z: f32) {
        self.base.position = Point3::new(x, 0.0, z);
    }

    /// The state produced by the last update.
    pub fn state(&self) -> ArmState {
        ArmState {
            base: self.base,
            upper_arm: self.chain.upper_arm,
            forearm: self.chain.forearm,
            wrist: self.chain.wrist,
            target: self.target,
            in_range: self.in_range,
            outcome: self.outcome,
        }
    }

    /// Run one tick toward `target`.
    pub fn update(&mut self, target: Point3<f32>) -> ArmState {
        self.target = target;
        self.base.position.y = 0.0;

        let to_target = target - self.base.position;
        let distance = to_target.norm();

        self.in_range = distance <= self.config.max_reach;
        if !self.in_range {
            self.outcome = SolveOutcome::OutOfReach { distance };
            return self.state();
        }

        self.outcome = match self.solve(&to_target, distance) {
            Some((base, chain, clamped)) => {
                self.base = base;
                self.chain = chain;
                SolveOutcome::Solved { clamped }
            }
            None => SolveOutcome::Degenerate,
        };
        self.state()
    }

    fn solve(&self, to_target: &Vector3<f32>, distance: f32) -> Option<(Pose, ChainPoses, bool)> {
        let (l1, l2) = (self.config.upper_arm_length, self.config.forearm_length);

        if distance <= DEGENERATE_EPSILON {
            return None;
        }
        let angles = solve_angles(distance, l1, l2)?;

        let mut base = self.base;
        let horizontal = Vector3::new(to_target.x, 0.0, to_target.z);
        if horizontal.norm() > YAW_EPSILON {
            base.rotation = look_horizontal(&horizontal);
        }

        // Elevation of the target line inside the plane the yaw selects.
        let along = base.forward().dot(to_target);
        let elevation = to_target.y.atan2(along);

        let pitch = elevation + angles.shoulder;
        let chain = forward_kinematics(&base, pitch, angles.elbow_bend, l1, l2);
        let clamped = distance < self.config.min_span() || distance > self.config.max_span();

        Some((base, chain, clamped))
    }
}
