//! Hand landmark frames and the upstream text codec.
//!
//! The hand tracker sends one text frame per message:
//!
//! ```text
//! [x0,y0,z0,x1,y1,z1,...,x20,y20,z20]
//! ```
//!
//! 21 points × 3 coordinates in the tracker's native units. Decoding maps them
//! into scene units with `x = offset_x - raw_x / scale`, `y = raw_y / scale`,
//! `z = raw_z / scale`.

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use nalgebra::Point3;

/// Number of points in one hand frame.
pub const LANDMARK_COUNT: usize = 21;
/// Number of numeric values in one encoded frame.
pub const VALUE_COUNT: usize = LANDMARK_COUNT * 3;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// Bone connections (pairs of landmark indices) for drawing the hand.
pub const HAND_SKELETON: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC), (THUMB_CMC, THUMB_MCP), (THUMB_MCP, THUMB_IP), (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_MCP), (INDEX_MCP, INDEX_PIP), (INDEX_PIP, INDEX_DIP), (INDEX_DIP, INDEX_TIP),
    (WRIST, MIDDLE_MCP), (MIDDLE_MCP, MIDDLE_PIP), (MIDDLE_PIP, MIDDLE_DIP), (MIDDLE_DIP, MIDDLE_TIP),
    (WRIST, RING_MCP), (RING_MCP, RING_PIP), (RING_PIP, RING_DIP), (RING_DIP, RING_TIP),
    (WRIST, PINKY_MCP), (PINKY_MCP, PINKY_PIP), (PINKY_PIP, PINKY_DIP), (PINKY_DIP, PINKY_TIP),
    (INDEX_MCP, MIDDLE_MCP),
];

/// One decoded hand: exactly 21 points in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkFrame {
    points: [Point3<f32>; LANDMARK_COUNT],
}

impl LandmarkFrame {
    pub fn new(points: [Point3<f32>; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Get a landmark by index, `None` past index 20.
    pub fn get(&self, index: usize) -> Option<Point3<f32>> {
        self.points.get(index).copied()
    }

    /// Landmark 0, the IK target.
    pub fn wrist(&self) -> Point3<f32> {
        self.points[WRIST]
    }

    pub fn points(&self) -> &[Point3<f32>; LANDMARK_COUNT] {
        &self.points
    }
}

/// Parse a text frame into scene-unit landmarks.
///
/// Requires at least [`VALUE_COUNT`] values; anything past that is ignored.
pub fn decode(raw: &str, config: &DecoderConfig) -> Result<LandmarkFrame, DecodeError> {
    let raw = raw.trim();
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(DecodeError::MissingBrackets)?;

    let tokens: Vec<&str> = inner.split(',').collect();
    if tokens.len() < VALUE_COUNT {
        return Err(DecodeError::TooFewValues {
            expected: VALUE_COUNT,
            found: tokens.len(),
        });
    }

    let mut values = [0.0f32; VALUE_COUNT];
    for (index, token) in tokens.iter().take(VALUE_COUNT).enumerate() {
        let value: f32 = token
            .trim()
            .parse()
            .map_err(|_| DecodeError::InvalidNumber {
                index,
                token: token.to_string(),
            })?;
        if !value.is_finite() {
            return Err(DecodeError::NonFinite { index });
        }
        values[index] = value;
    }

    let mut points = [Point3::origin(); LANDMARK_COUNT];
    for (i, point) in points.iter_mut().enumerate() {
        *point = Point3::new(
            config.offset_x - values[i * 3] / config.scale,
            values[i * 3 + 1] / config.scale,
            values[i * 3 + 2] / config.scale,
        );
    }

    Ok(LandmarkFrame::new(points))
}

/// Encode scene-unit landmarks back into the tracker's text format.
pub fn encode(frame: &LandmarkFrame, config: &DecoderConfig) -> String {
    let values: Vec<String> = frame
        .points()
        .iter()
        .flat_map(|p| {
            [
                (config.offset_x - p.x) * config.scale,
                p.y * config.scale,
                p.z * config.scale,
            ]
        })
        .map(|v| v.to_string())
        .collect();
    format!("[{}]", values.join(","))
}

/// Stateful decoder that keeps the last good frame.
///
/// Bad frames are dropped silently: the previous frame stays in effect and
/// the solver never sees a decode error.
#[derive(Debug, Default)]
pub struct LandmarkDecoder {
    config: DecoderConfig,
    latest: Option<LandmarkFrame>,
    accepted: u64,
    rejected: u64,
}

impl LandmarkDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            config,
            latest: None,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Decode `raw` and, if valid, make it the latest frame.
    ///
    /// Returns the frame in effect afterwards, which is the previous one when
    /// `raw` is rejected.
    pub fn apply(&mut self, raw: &str) -> Option<&LandmarkFrame> {
        match decode(raw, &self.config) {
            Ok(frame) => {
                self.latest = Some(frame);
                self.accepted += 1;
            }
            Err(e) => {
                self.rejected += 1;
                tracing::debug!("Dropping landmark frame: {}", e);
            }
        }
        self.latest.as_ref()
    }

    /// The last frame that decoded successfully.
    pub fn latest_frame(&self) -> Option<&LandmarkFrame> {
        self.latest.as_ref()
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Number of frames accepted so far.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Number of frames dropped so far.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> String {
        // Point i = (100 + i, 200 + i, 300 + i)
        let values: Vec<String> = (0..LANDMARK_COUNT)
            .flat_map(|i| {
                let i = i as f32;
                [100.0 + i, 200.0 + i, 300.0 + i]
            })
            .map(|v| v.to_string())
            .collect();
        format!("[{}]", values.join(","))
    }

    #[test]
    fn test_decode_applies_offset_and_scale() {
        let frame = decode(&sample_raw(), &DecoderConfig::default()).unwrap();

        let wrist = frame.wrist();
        assert!((wrist.x - (8.5 - 1.0)).abs() < 1e-5);
        assert!((wrist.y - 2.0).abs() < 1e-5);
        assert!((wrist.z - 3.0).abs() < 1e-5);

        let tip = frame.get(PINKY_TIP).unwrap();
        assert!((tip.x - (8.5 - 1.2)).abs() < 1e-5);
        assert!((tip.y - 2.2).abs() < 1e-5);
        assert!((tip.z - 3.2).abs() < 1e-5);

        assert!(frame.get(LANDMARK_COUNT).is_none());
    }

    #[test]
    fn test_decode_accepts_spaces_after_commas() {
        let spaced = sample_raw().replace(',', ", ");
        let a = decode(&spaced, &DecoderConfig::default()).unwrap();
        let b = decode(&sample_raw(), &DecoderConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_decode_ignores_extra_values() {
        let raw = sample_raw();
        let extended = format!("{},1,2,3]", &raw[..raw.len() - 1]);
        let frame = decode(&extended, &DecoderConfig::default()).unwrap();
        assert_eq!(frame, decode(&raw, &DecoderConfig::default()).unwrap());
    }

    #[test]
    fn test_decode_too_few_values() {
        let err = decode("[1,2,3]", &DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TooFewValues {
                expected: 63,
                found: 3
            }
        );
    }

    #[test]
    fn test_decode_missing_brackets() {
        let raw = sample_raw();
        assert_eq!(
            decode(&raw[1..], &DecoderConfig::default()),
            Err(DecodeError::MissingBrackets)
        );
        assert_eq!(
            decode(&raw[..raw.len() - 1], &DecoderConfig::default()),
            Err(DecodeError::MissingBrackets)
        );
        assert_eq!(
            decode("", &DecoderConfig::default()),
            Err(DecodeError::MissingBrackets)
        );
    }

    #[test]
    fn test_decode_invalid_and_non_finite() {
        let raw = sample_raw().replacen("105", "abc", 1);
        assert!(matches!(
            decode(&raw, &DecoderConfig::default()),
            Err(DecodeError::InvalidNumber { index: 15, .. })
        ));

        let raw = sample_raw().replacen("200", "NaN", 1);
        assert_eq!(
            decode(&raw, &DecoderConfig::default()),
            Err(DecodeError::NonFinite { index: 1 })
        );
    }

    #[test]
    fn test_encode_matches_tracker_units() {
        let config = DecoderConfig::default();
        let frame = decode(&sample_raw(), &config).unwrap();
        let decoded = decode(&encode(&frame, &config), &config).unwrap();
        for (a, b) in frame.points().iter().zip(decoded.points()) {
            assert!((a - b).norm() < 1e-4);
        }
    }

    #[test]
    fn test_decoder_keeps_previous_frame() {
        let mut decoder = LandmarkDecoder::new(DecoderConfig::default());
        assert!(decoder.apply("[1,2,3]").is_none());
        assert!(decoder.latest_frame().is_none());

        let good = *decoder.apply(&sample_raw()).unwrap();

        assert_eq!(decoder.apply("[1,2,3]"), Some(&good));
        assert_eq!(decoder.apply("garbage"), Some(&good));
        assert_eq!(decoder.latest_frame(), Some(&good));
        assert_eq!(decoder.accepted(), 1);
        assert_eq!(decoder.rejected(), 3);
    }
}
