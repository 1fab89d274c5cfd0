use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ClipgridError, ClipgridResult};

pub use kurbo::{Affine, Vec2};

/// Absolute 0-based frame index in composition timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)` in timeline space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    pub start: FrameIndex,
    pub end: FrameIndex,
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> ClipgridResult<Self> {
        if start.0 > end.0 {
            return Err(ClipgridError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> ClipgridResult<Self> {
        if den == 0 {
            return Err(ClipgridError::configuration("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(ClipgridError::configuration("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Timestamp in milliseconds of the start of frame `frame`.
    pub fn frame_to_ms(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * 1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of frames needed to cover `ms` milliseconds (ceil semantics).
    pub fn frames_for_ms(self, ms: u64) -> u64 {
        let num = u128::from(self.num);
        let den = u128::from(self.den);
        let total = u128::from(ms) * num;
        let per = 1000 * den;
        total.div_ceil(per) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Local 2D transform of a scene node.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform2D {
    pub translate: Vec2,
    pub scale: Vec2,
    pub anchor: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            anchor: Vec2::ZERO,
        }
    }
}

impl Transform2D {
    /// Convert to an affine matrix: `T(translate) * T(anchor) * S(scale) * T(-anchor)`.
    pub fn to_affine(self) -> Affine {
        let t_translate = Affine::translate(self.translate);
        let t_anchor = Affine::translate(self.anchor);
        let t_unanchor = Affine::translate(-self.anchor);
        let t_scale = Affine::scale_non_uniform(self.scale.x, self.scale.y);
        t_translate * t_anchor * t_scale * t_unanchor
    }
}

/// Closed numeric range `[min, max]` read from configuration.
///
/// Deserializes from `"a,b"` or `[a, b]`; serializes as `[a, b]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ValueRangeRepr", into = "[f64; 2]")]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ValueRangeRepr {
    Text(String),
    Pair([f64; 2]),
}

impl TryFrom<ValueRangeRepr> for ValueRange {
    type Error = ClipgridError;

    fn try_from(repr: ValueRangeRepr) -> Result<Self, Self::Error> {
        match repr {
            ValueRangeRepr::Text(s) => s.parse(),
            ValueRangeRepr::Pair([min, max]) => Self::new(min, max),
        }
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(r: ValueRange) -> Self {
        [r.min, r.max]
    }
}

impl ValueRange {
    /// Create a range with finite bounds and `min <= max`.
    pub fn new(min: f64, max: f64) -> ClipgridResult<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ClipgridError::configuration(format!(
                "range bounds must be finite, got [{min}, {max}]"
            )));
        }
        if min > max {
            return Err(ClipgridError::configuration(format!(
                "range min must be <= max, got [{min}, {max}]"
            )));
        }
        Ok(Self { min, max })
    }

    /// Interpolate from `min` to `max`.
    pub fn lerp(self, t: f64) -> f64 {
        crate::foundation::math::lerp(self.min, self.max, t)
    }

    pub fn span(self) -> f64 {
        self.max - self.min
    }
}

impl FromStr for ValueRange {
    type Err = ClipgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || ClipgridError::configuration(format!("range must look like 'a,b', got '{s}'"));
        let (a, b) = s.trim().split_once(',').ok_or_else(malformed)?;
        let a = a.trim().parse::<f64>().map_err(|_| malformed())?;
        let b = b.trim().parse::<f64>().map_err(|_| malformed())?;
        Self::new(a, b)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.min, self.max)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
