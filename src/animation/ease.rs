use std::f64::consts::PI;
use std::str::FromStr;

use crate::foundation::error::ClipgridError;

/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[serde(rename = "linear")]
    Linear,
    #[serde(rename = "sinIn")]
    InSin,
    #[serde(rename = "sinOut")]
    OutSin,
    #[serde(rename = "sin")]
    InOutSin,
    /// Sinusoidal in/out up to the midpoint, mirrored after it.
    #[serde(rename = "sinBell")]
    SinBell,
    #[serde(rename = "quadIn")]
    InQuad,
    #[serde(rename = "quadOut")]
    OutQuad,
    /// Quadratic ease-in/out.
    #[serde(rename = "quadInOut")]
    InOutQuad,
    /// Quadratic in/out up to the midpoint, mirrored after it.
    #[serde(rename = "quadBell")]
    QuadBell,
    #[serde(rename = "cubicIn")]
    InCubic,
    #[serde(rename = "cubicOut")]
    OutCubic,
    #[serde(rename = "cubicInOut")]
    InOutCubic,
}

impl Ease {
    /// Every easing variant, in declaration order.
    pub const ALL: [Ease; 12] = [
        Ease::Linear,
        Ease::InSin,
        Ease::OutSin,
        Ease::InOutSin,
        Ease::SinBell,
        Ease::InQuad,
        Ease::OutQuad,
        Ease::InOutQuad,
        Ease::QuadBell,
        Ease::InCubic,
        Ease::OutCubic,
        Ease::InOutCubic,
    ];

    /// Return `true` for the symmetric bell variants.
    pub fn is_bell(self) -> bool {
        matches!(self, Self::SinBell | Self::QuadBell)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InSin => "sinIn",
            Self::OutSin => "sinOut",
            Self::InOutSin => "sin",
            Self::SinBell => "sinBell",
            Self::InQuad => "quadIn",
            Self::OutQuad => "quadOut",
            Self::InOutQuad => "quadInOut",
            Self::QuadBell => "quadBell",
            Self::InCubic => "cubicIn",
            Self::OutCubic => "cubicOut",
            Self::InOutCubic => "cubicInOut",
        }
    }

    /// Apply this easing function to normalized progress `t`, clamped into `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InSin => 1.0 - ((t * PI) / 2.0).cos(),
            Self::OutSin => ((t * PI) / 2.0).sin(),
            Self::InOutSin => (1.0 - (PI * t).cos()) / 2.0,
            Self::SinBell => bell(Self::InOutSin, t),
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::QuadBell => bell(Self::InOutQuad, t),
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

fn bell(inner: Ease, t: f64) -> f64 {
    if t < 0.5 {
        inner.apply(t * 2.0)
    } else {
        inner.apply((1.0 - t) * 2.0)
    }
}

impl FromStr for Ease {
    type Err = ClipgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| ClipgridError::scheduling(format!("unknown easing '{s}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
