//! Static per-session configuration.
//!
//! All values are fixed for the lifetime of a rig; nothing here is mutated
//! mid-tick.

use crate::error::ConfigError;
use std::net::SocketAddr;

/// Default upper arm (segment 1) length in scene units.
pub const DEFAULT_UPPER_ARM_LENGTH: f32 = 2.0;
/// Default forearm (segment 2) length in scene units.
pub const DEFAULT_FOREARM_LENGTH: f32 = 1.5;
/// Default reach gate radius in scene units.
pub const DEFAULT_MAX_REACH: f32 = 3.5;
/// Default horizontal offset applied to decoded x coordinates.
pub const DEFAULT_OFFSET_X: f32 = 8.5;
/// Default divisor mapping tracker units to scene units.
pub const DEFAULT_SCALE: f32 = 100.0;
/// Default UDP port the hand tracker sends to.
pub const DEFAULT_PORT: u16 = 5052;

/// Arm geometry and reach gate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArmConfig {
    /// Segment 1 ("upper arm") length.
    pub upper_arm_length: f32,
    /// Segment 2 ("forearm") length.
    pub forearm_length: f32,
    /// Targets further than this from the base freeze the arm.
    pub max_reach: f32,
    /// Horizontal (x, z) placement of the floor pivot.
    pub base_x: f32,
    pub base_z: f32,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            upper_arm_length: DEFAULT_UPPER_ARM_LENGTH,
            forearm_length: DEFAULT_FOREARM_LENGTH,
            max_reach: DEFAULT_MAX_REACH,
            base_x: 0.0,
            base_z: 0.0,
        }
    }
}

impl ArmConfig {
    /// Create a config with the given segment lengths and reach, base at origin.
    pub fn new(upper_arm_length: f32, forearm_length: f32, max_reach: f32) -> Self {
        Self {
            upper_arm_length,
            forearm_length,
            max_reach,
            ..Default::default()
        }
    }

    /// Place the floor pivot.
    pub fn with_base(mut self, x: f32, z: f32) -> Self {
        self.base_x = x;
        self.base_z = z;
        self
    }

    /// Shortest reach the chain can physically construct, `|L1 - L2|`.
    pub fn min_span(&self) -> f32 {
        (self.upper_arm_length - self.forearm_length).abs()
    }

    /// Longest reach the chain can physically construct, `L1 + L2`.
    pub fn max_span(&self) -> f32 {
        self.upper_arm_length + self.forearm_length
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.upper_arm_length.is_finite() && self.upper_arm_length > 0.0) {
            return Err(ConfigError::InvalidLength {
                name: "upper_arm_length",
                value: self.upper_arm_length,
            });
        }
        if !(self.forearm_length.is_finite() && self.forearm_length > 0.0) {
            return Err(ConfigError::InvalidLength {
                name: "forearm_length",
                value: self.forearm_length,
            });
        }
        if !(self.max_reach.is_finite() && self.max_reach > 0.0) {
            return Err(ConfigError::InvalidReach(self.max_reach));
        }
        if !(self.base_x.is_finite() && self.base_z.is_finite()) {
            return Err(ConfigError::invalid_param("base placement must be finite"));
        }
        Ok(())
    }
}

/// Mapping from tracker units to scene units.
///
/// `x = offset_x - raw_x / scale`, `y = raw_y / scale`, `z = raw_z / scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecoderConfig {
    pub offset_x: f32,
    pub scale: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            offset_x: DEFAULT_OFFSET_X,
            scale: DEFAULT_SCALE,
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::InvalidScale(self.scale));
        }
        if !self.offset_x.is_finite() {
            return Err(ConfigError::invalid_param("offset_x must be finite"));
        }
        Ok(())
    }
}

/// UDP transport settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceiverConfig {
    /// Local address to bind.
    pub bind: SocketAddr,
    /// Largest datagram accepted. A full frame is well under 2 KiB.
    pub max_datagram: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            max_datagram: 8192,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let arm = ArmConfig::default();
        assert_eq!(arm.upper_arm_length, 2.0);
        assert_eq!(arm.forearm_length, 1.5);
        assert_eq!(arm.max_reach, 3.5);
        assert!(arm.validate().is_ok());

        let dec = DecoderConfig::default();
        assert_eq!(dec.offset_x, 8.5);
        assert_eq!(dec.scale, 100.0);
        assert!(dec.validate().is_ok());

        assert_eq!(ReceiverConfig::default().bind.port(), 5052);
    }

    #[test]
    fn test_spans() {
        let arm = ArmConfig::new(2.0, 1.5, 3.5);
        assert!((arm.min_span() - 0.5).abs() < 1e-6);
        assert!((arm.max_span() - 3.5).abs() < 1e-6);

        let swapped = ArmConfig::new(1.5, 2.0, 3.5);
        assert_eq!(arm.min_span(), swapped.min_span());
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(matches!(
            ArmConfig::new(0.0, 1.5, 3.5).validate(),
            Err(ConfigError::InvalidLength { name: "upper_arm_length", .. })
        ));
        assert!(matches!(
            ArmConfig::new(2.0, -1.0, 3.5).validate(),
            Err(ConfigError::InvalidLength { name: "forearm_length", .. })
        ));
        assert!(matches!(
            ArmConfig::new(2.0, 1.5, f32::NAN).validate(),
            Err(ConfigError::InvalidReach(_))
        ));
        assert!(ArmConfig::default()
            .with_base(f32::INFINITY, 0.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_rejects_bad_scale() {
        let dec = DecoderConfig {
            offset_x: 8.5,
            scale: 0.0,
        };
        assert_eq!(dec.validate(), Err(ConfigError::InvalidScale(0.0)));
    }
}
