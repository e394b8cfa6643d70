//! handarm - drive a two-link robotic arm from a streamed hand-landmark feed.
//!
//! A hand tracker sends 21 3D landmarks per frame as text over UDP. The wrist
//! landmark becomes the target of an analytical two-link IK solver that yaws
//! a floor-mounted base and pitches an upper arm and forearm so the arm's tip
//! follows the hand.
//!
//! # Example
//!
//! ```
//! use handarm::{ArmConfig, DecoderConfig, HandArmRig};
//!
//! let mut rig = HandArmRig::new(ArmConfig::default(), DecoderConfig::default())?;
//!
//! // Before any frame has decoded there is nothing to follow.
//! assert!(rig.tick("[1,2,3]").is_none());
//! # Ok::<(), handarm::ConfigError>(())
//! ```
//!
//! # Pieces
//!
//! - [`landmarks`]: text frame codec and the last-good-frame decoder
//! - [`ik`]: the two-link solver
//! - [`rig`]: decoder + solver + observers, one call per tick
//! - [`observer`]: debug drawing, logging and JSON output
//! - [`receiver`]: UDP transport into a latest-wins frame slot

pub mod config;
pub mod error;
pub mod ik;
pub mod landmarks;
pub mod observer;
pub mod pose;
pub mod receiver;
pub mod rig;

pub use config::{ArmConfig, DecoderConfig, ReceiverConfig};
pub use error::{ConfigError, DecodeError};
pub use ik::{solve_angles, ArmState, JointAngles, SolveOutcome, TwoLinkSolver};
pub use landmarks::{LandmarkDecoder, LandmarkFrame};
pub use observer::{ArmObserver, DebugDraw, Gizmo, LogObserver};
pub use pose::Pose;
pub use receiver::{FrameSlot, LandmarkReceiver};
pub use rig::HandArmRig;

#[cfg(feature = "json")]
pub use observer::JsonObserver;
