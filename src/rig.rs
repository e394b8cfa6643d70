//! Decoder and solver wired together, one call per tick.

use crate::config::{ArmConfig, DecoderConfig};
use crate::error::ConfigError;
use crate::ik::{ArmState, TwoLinkSolver};
use crate::landmarks::{LandmarkDecoder, LandmarkFrame};
use crate::observer::ArmObserver;

/// A hand-driven arm: decode the latest frame, track its wrist.
pub struct HandArmRig {
    decoder: LandmarkDecoder,
    solver: TwoLinkSolver,
    observers: Vec<Box<dyn ArmObserver + Send>>,
    tick: u64,
}

impl HandArmRig {
    pub fn new(arm: ArmConfig, decoder: DecoderConfig) -> Result<Self, ConfigError> {
        decoder.validate()?;
        Ok(Self {
            decoder: LandmarkDecoder::new(decoder),
            solver: TwoLinkSolver::new(arm)?,
            observers: Vec::new(),
            tick: 0,
        })
    }

    /// Register an observer called after every solved tick.
    pub fn add_observer(&mut self, observer: impl ArmObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Run one tick from a raw text frame.
    ///
    /// A malformed frame leaves the previous hand in effect. Returns `None`
    /// until the first frame has decoded.
    pub fn tick(&mut self, raw: &str) -> Option<ArmState> {
        let frame = *self.decoder.apply(raw)?;
        Some(self.tick_frame(&frame))
    }

    /// Run one tick from an already decoded frame.
    pub fn tick_frame(&mut self, frame: &LandmarkFrame) -> ArmState {
        let state = self.solver.update(frame.wrist());
        for observer in &mut self.observers {
            observer.observe(self.tick, &state, Some(frame));
        }
        self.tick += 1;
        state
    }

    /// Number of ticks solved so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn solver(&self) -> &TwoLinkSolver {
        &self.solver
    }

    pub fn decoder(&self) -> &LandmarkDecoder {
        &self.decoder
    }

    pub fn latest_frame(&self) -> Option<&LandmarkFrame> {
        self.decoder.latest_frame()
    }
}
