//! Consumers of solver output.
//!
//! Observers only read [`ArmState`] (and optionally the hand frame); the
//! solver never depends on them.

use crate::config::ArmConfig;
use crate::ik::{ArmState, SolveOutcome};
use crate::landmarks::{LandmarkFrame, HAND_SKELETON};
use nalgebra::Point3;

/// Receives the rig output once per tick.
pub trait ArmObserver {
    fn observe(&mut self, tick: u64, state: &ArmState, hand: Option<&LandmarkFrame>);
}

/// RGB color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Color = Color::rgb(0.0, 0.0, 1.0);
    pub const MAGENTA: Color = Color::rgb(1.0, 0.0, 1.0);
    pub const YELLOW: Color = Color::rgb(1.0, 0.92, 0.016);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// A debug drawing primitive in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gizmo {
    WireSphere {
        center: Point3<f32>,
        radius: f32,
        color: Color,
    },
    Sphere {
        center: Point3<f32>,
        radius: f32,
        color: Color,
    },
    Line {
        from: Point3<f32>,
        to: Point3<f32>,
        color: Color,
    },
}

/// Radius of pivot and target markers.
pub const MARKER_RADIUS: f32 = 0.1;

/// Builds wireframe primitives for the reach sphere, arm and target.
#[derive(Clone, Debug)]
pub struct DebugDraw {
    max_reach: f32,
    draw_hand: bool,
    gizmos: Vec<Gizmo>,
}

impl DebugDraw {
    pub fn new(config: &ArmConfig) -> Self {
        Self {
            max_reach: config.max_reach,
            draw_hand: false,
            gizmos: Vec::new(),
        }
    }

    /// Also draw the hand skeleton.
    pub fn with_hand(mut self, draw_hand: bool) -> Self {
        self.draw_hand = draw_hand;
        self
    }

    /// Primitives produced by the last observation.
    pub fn gizmos(&self) -> &[Gizmo] {
        &self.gizmos
    }

    /// Rebuild the primitive list for `state`.
    pub fn draw(&mut self, state: &ArmState, hand: Option<&LandmarkFrame>) -> &[Gizmo] {
        self.gizmos.clear();
        let base = state.base.position;

        // Reach range and line of sight
        let reach_color = if state.in_range {
            Color::GREEN
        } else {
            Color::RED
        };
        self.gizmos.push(Gizmo::WireSphere {
            center: base,
            radius: self.max_reach,
            color: reach_color,
        });
        self.gizmos.push(Gizmo::Line {
            from: base,
            to: state.target,
            color: reach_color,
        });

        // Segments
        self.gizmos.push(Gizmo::Line {
            from: base,
            to: state.elbow(),
            color: Color::BLUE,
        });
        self.gizmos.push(Gizmo::Line {
            from: state.elbow(),
            to: state.wrist,
            color: Color::BLUE,
        });

        // Pivots
        for center in [base, state.elbow()] {
            self.gizmos.push(Gizmo::Sphere {
                center,
                radius: MARKER_RADIUS,
                color: Color::MAGENTA,
            });
        }

        self.gizmos.push(Gizmo::Sphere {
            center: state.target,
            radius: MARKER_RADIUS,
            color: Color::YELLOW,
        });

        if let (true, Some(hand)) = (self.draw_hand, hand) {
            for (a, b) in HAND_SKELETON {
                let points = hand.points();
                self.gizmos.push(Gizmo::Line {
                    from: points[a],
                    to: points[b],
                    color: Color::WHITE,
                });
            }
        }

        &self.gizmos
    }
}

impl ArmObserver for DebugDraw {
    fn observe(&mut self, _tick: u64, state: &ArmState, hand: Option<&LandmarkFrame>) {
        self.draw(state, hand);
    }
}

/// Logs reach transitions at info and per-tick detail at debug.
#[derive(Debug, Default)]
pub struct LogObserver {
    last_in_range: Option<bool>,
    degenerate_ticks: u64,
}

impl LogObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArmObserver for LogObserver {
    fn observe(&mut self, tick: u64, state: &ArmState, _hand: Option<&LandmarkFrame>) {
        if self.last_in_range != Some(state.in_range) {
            if state.in_range {
                tracing::info!("Hand in range (tick {})", tick);
            } else if let SolveOutcome::OutOfReach { distance } = state.outcome {
                tracing::info!(
                    "Hand out of range at {:.2} (tick {}), holding pose",
                    distance,
                    tick
                );
            }
            self.last_in_range = Some(state.in_range);
        }

        match state.outcome {
            SolveOutcome::Degenerate => {
                self.degenerate_ticks += 1;
                tracing::debug!(
                    "Degenerate target {:?} (tick {}, {} total), holding pose",
                    state.target,
                    tick,
                    self.degenerate_ticks
                );
            }
            SolveOutcome::Solved { clamped } => {
                tracing::debug!(
                    "tick {} target=({:.3}, {:.3}, {:.3}) wrist=({:.3}, {:.3}, {:.3}){}",
                    tick,
                    state.target.x,
                    state.target.y,
                    state.target.z,
                    state.wrist.x,
                    state.wrist.y,
                    state.wrist.z,
                    if clamped { " clamped" } else { "" }
                );
            }
            SolveOutcome::OutOfReach { .. } => {}
        }
    }
}

#[cfg(feature = "json")]
pub use json::{state_to_json, JsonObserver};

#[cfg(feature = "json")]
mod json {
    use super::{ArmObserver, DebugDraw, Gizmo};
    use crate::ik::{ArmState, SolveOutcome};
    use crate::landmarks::LandmarkFrame;
    use crate::pose::Pose;
    use nalgebra::Point3;
    use serde_json::{json, Value};
    use std::io::Write;

    fn point(p: &Point3<f32>) -> Value {
        json!([p.x, p.y, p.z])
    }

    fn pose(p: &Pose) -> Value {
        let q = p.rotation.quaternion();
        json!({
            "position": point(&p.position),
            "rotation": [q.i, q.j, q.k, q.w],
        })
    }

    fn gizmo(g: &Gizmo) -> Value {
        match g {
            Gizmo::WireSphere {
                center,
                radius,
                color,
            } => json!({
                "type": "wire_sphere",
                "center": point(center),
                "radius": radius,
                "color": [color.r, color.g, color.b],
            }),
            Gizmo::Sphere {
                center,
                radius,
                color,
            } => json!({
                "type": "sphere",
                "center": point(center),
                "radius": radius,
                "color": [color.r, color.g, color.b],
            }),
            Gizmo::Line { from, to, color } => json!({
                "type": "line",
                "from": point(from),
                "to": point(to),
                "color": [color.r, color.g, color.b],
            }),
        }
    }

    /// Serialize one tick of rig output.
    pub fn state_to_json(tick: u64, state: &ArmState, gizmos: Option<&[Gizmo]>) -> Value {
        let outcome = match state.outcome {
            SolveOutcome::Solved { clamped } => json!({ "solved": { "clamped": clamped } }),
            SolveOutcome::OutOfReach { distance } => {
                json!({ "out_of_reach": { "distance": distance } })
            }
            SolveOutcome::Degenerate => json!("degenerate"),
        };

        let mut value = json!({
            "tick": tick,
            "in_range": state.in_range,
            "outcome": outcome,
            "target": point(&state.target),
            "base": pose(&state.base),
            "upper_arm": pose(&state.upper_arm),
            "forearm": pose(&state.forearm),
            "wrist": point(&state.wrist),
        });
        if let Some(gizmos) = gizmos {
            value["gizmos"] = Value::Array(gizmos.iter().map(gizmo).collect());
        }
        value
    }

    /// Writes one JSON object per tick, newline-delimited.
    pub struct JsonObserver<W: Write> {
        out: W,
        draw: Option<DebugDraw>,
    }

    impl<W: Write> JsonObserver<W> {
        pub fn new(out: W) -> Self {
            Self { out, draw: None }
        }

        /// Include debug draw primitives in every line.
        pub fn with_gizmos(mut self, draw: DebugDraw) -> Self {
            self.draw = Some(draw);
            self
        }

        pub fn into_inner(self) -> W {
            self.out
        }
    }

    impl<W: Write> ArmObserver for JsonObserver<W> {
        fn observe(&mut self, tick: u64, state: &ArmState, hand: Option<&LandmarkFrame>) {
            let gizmos = self.draw.as_mut().map(|d| d.draw(state, hand));
            let line = state_to_json(tick, state, gizmos);
            if let Err(e) = writeln!(self.out, "{}", line) {
                tracing::warn!("Failed to write pose line: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::TwoLinkSolver;

    fn solved_state() -> ArmState {
        let mut solver = TwoLinkSolver::new(ArmConfig::default()).unwrap();
        solver.update(Point3::new(2.0, 0.0, 0.0))
    }

    #[test]
    fn test_debug_draw_in_range() {
        let state = solved_state();
        let mut draw = DebugDraw::new(&ArmConfig::default());
        let gizmos = draw.draw(&state, None).to_vec();

        assert_eq!(gizmos.len(), 7);
        assert_eq!(
            gizmos[0],
            Gizmo::WireSphere {
                center: Point3::origin(),
                radius: 3.5,
                color: Color::GREEN
            }
        );
        assert!(matches!(
            gizmos[6],
            Gizmo::Sphere { color, radius, .. } if color == Color::YELLOW && radius == MARKER_RADIUS
        ));
        let blue = gizmos
            .iter()
            .filter(|g| matches!(g, Gizmo::Line { color, .. } if *color == Color::BLUE))
            .count();
        assert_eq!(blue, 2);
    }

    #[test]
    fn test_debug_draw_out_of_range_is_red() {
        let mut solver = TwoLinkSolver::new(ArmConfig::default()).unwrap();
        let state = solver.update(Point3::new(10.0, 0.0, 0.0));
        let mut draw = DebugDraw::new(&ArmConfig::default());
        draw.observe(1, &state, None);
        assert!(matches!(
            draw.gizmos()[0],
            Gizmo::WireSphere { color, .. } if color == Color::RED
        ));
    }

    #[test]
    fn test_debug_draw_hand_skeleton() {
        let state = solved_state();
        let hand = LandmarkFrame::new([Point3::new(1.0, 1.0, 1.0); 21]);
        let mut draw = DebugDraw::new(&ArmConfig::default()).with_hand(true);
        assert_eq!(draw.draw(&state, Some(&hand)).len(), 7 + HAND_SKELETON.len());
        assert_eq!(draw.draw(&state, None).len(), 7);
    }

    #[test]
    fn test_log_observer_tracks_transitions() {
        let mut log = LogObserver::new();
        let state = solved_state();
        log.observe(0, &state, None);
        assert_eq!(log.last_in_range, Some(true));

        let mut solver = TwoLinkSolver::new(ArmConfig::default()).unwrap();
        let held = solver.update(Point3::new(0.0, 9.0, 0.0));
        log.observe(1, &held, None);
        assert_eq!(log.last_in_range, Some(false));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_observer_writes_lines() {
        let state = solved_state();
        let mut observer =
            JsonObserver::new(Vec::new()).with_gizmos(DebugDraw::new(&ArmConfig::default()));
        observer.observe(3, &state, None);
        observer.observe(4, &state, None);

        let out = String::from_utf8(observer.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["tick"], 3);
        assert_eq!(value["in_range"], true);
        assert_eq!(value["outcome"]["solved"]["clamped"], false);
        assert_eq!(value["gizmos"].as_array().unwrap().len(), 7);
        let wrist_x = value["wrist"][0].as_f64().unwrap();
        assert!((wrist_x - 2.0).abs() < 1e-3);
    }
}
