use std::collections::BTreeMap;
use std::fmt;

use crate::animation::ease::Ease;
use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::foundation::math::lerp;

/// Animated property name.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Property {
    Alpha,
    Brightness,
    Scale,
    ScaleX,
    ScaleY,
    TranslateX,
    TranslateY,
    /// Ad hoc property.
    Custom(String),
}

impl Property {
    /// Declared base value used when no tween is active.
    pub fn default_value(&self) -> f64 {
        match self {
            Self::Alpha | Self::Brightness | Self::Scale | Self::ScaleX | Self::ScaleY => 1.0,
            Self::TranslateX | Self::TranslateY | Self::Custom(_) => 0.0,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Alpha => "alpha",
            Self::Brightness => "brightness",
            Self::Scale => "scale",
            Self::ScaleX => "scaleX",
            Self::ScaleY => "scaleY",
            Self::TranslateX => "translateX",
            Self::TranslateY => "translateY",
            Self::Custom(name) => name,
        }
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        match s {
            "alpha" => Self::Alpha,
            "brightness" => Self::Brightness,
            "scale" => Self::Scale,
            "scaleX" => Self::ScaleX,
            "scaleY" => Self::ScaleY,
            "translateX" => Self::TranslateX,
            "translateY" => Self::TranslateY,
            other => Self::Custom(other.to_owned()),
        }
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Property> for String {
    fn from(p: Property) -> Self {
        p.name().to_owned()
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One requested interpolation inside a `queue_tween` call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TweenSpec {
    pub property: Property,
    pub from: f64,
    pub to: f64,
    pub ease: Ease,
    /// Explicit start overriding the chained start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ms: Option<u64>,
}

impl TweenSpec {
    /// Build a spec that starts wherever its position in the sequence puts it.
    pub fn new(property: impl Into<Property>, from: f64, to: f64, ease: Ease) -> Self {
        Self {
            property: property.into(),
            from,
            to,
            ease,
            start_ms: None,
        }
    }

    /// Pin this spec to an explicit start time.
    pub fn starting_at(mut self, start_ms: u64) -> Self {
        self.start_ms = Some(start_ms);
        self
    }
}

/// A time-bounded property interpolation over `[start_ms, start_ms + dur_ms)`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TweenEvent {
    pub start_ms: u64,
    pub dur_ms: u64,
    pub property: Property,
    pub from: f64,
    pub to: f64,
    pub ease: Ease,
    pub seq: u64,
}

impl TweenEvent {
    /// Exclusive end time.
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.dur_ms)
    }

    /// Interpolated value at `t_ms`, with progress clamped into `[0, 1]`.
    pub fn value_at(&self, t_ms: f64) -> f64 {
        let progress = (t_ms - self.start_ms as f64) / self.dur_ms as f64;
        lerp(self.from, self.to, self.ease.apply(progress))
    }

    fn overlaps(&self, start_ms: u64, end_ms: u64) -> bool {
        self.start_ms < end_ms && start_ms < self.end_ms()
    }
}

/// Per-property tween schedule with the no-overlap invariant enforced on insert.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct TweenTrack {
    tweens: BTreeMap<Property, Vec<TweenEvent>>, // each vec sorted by start_ms
    bases: BTreeMap<Property, f64>,
    next_seq: u64,
}

impl TweenTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the base value of `property` for this track.
    pub fn set_base(&mut self, property: impl Into<Property>, value: f64) {
        self.bases.insert(property.into(), value);
    }

    /// Base value returned when no tween is active.
    pub fn base(&self, property: &Property) -> f64 {
        self.bases
            .get(property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    /// Append tweens starting at `start_ms`, each lasting `dur_ms`.
    ///
    /// Specs without an explicit start are chained: each one starts where the previous spec
    /// in this call ended. The whole call is rejected, leaving the track untouched, if any new
    /// tween would overlap an existing or sibling tween of the same property.
    pub fn queue<I>(&mut self, start_ms: u64, dur_ms: u64, specs: I) -> ClipgridResult<()>
    where
        I: IntoIterator<Item = TweenSpec>,
    {
        if dur_ms == 0 {
            return Err(ClipgridError::scheduling("tween duration must be > 0"));
        }

        let mut pending = Vec::<TweenEvent>::new();
        let mut next_start = start_ms;
        for spec in specs {
            let start = spec.start_ms.unwrap_or(next_start);
            let end = start.checked_add(dur_ms).ok_or_else(|| {
                ClipgridError::scheduling("tween end time overflows the timeline")
            })?;

            let clash = self
                .events_for(&spec.property)
                .iter()
                .chain(pending.iter().filter(|p| p.property == spec.property))
                .find(|e| e.overlaps(start, end));
            if let Some(existing) = clash {
                return Err(ClipgridError::scheduling(format!(
                    "tween for '{}' at [{start}, {end}) overlaps existing tween at [{}, {})",
                    spec.property,
                    existing.start_ms,
                    existing.end_ms()
                )));
            }

            pending.push(TweenEvent {
                start_ms: start,
                dur_ms,
                property: spec.property,
                from: spec.from,
                to: spec.to,
                ease: spec.ease,
                seq: self.next_seq + pending.len() as u64,
            });
            next_start = end;
        }

        self.next_seq += pending.len() as u64;
        for event in pending {
            let list = self.tweens.entry(event.property.clone()).or_default();
            let at = list.partition_point(|e| e.start_ms <= event.start_ms);
            list.insert(at, event);
        }
        Ok(())
    }

    /// Value of `property` at `t_ms`.
    ///
    /// Uses the tween whose interval contains `t_ms`. At the exact end instant of a tween
    /// with no successor the tween's target is returned; everywhere else outside every
    /// interval the base value is returned.
    pub fn evaluate(&self, property: &Property, t_ms: f64) -> f64 {
        let base = self.base(property);
        if !t_ms.is_finite() {
            return base;
        }
        let list = self.events_for(property);
        let idx = list.partition_point(|e| (e.start_ms as f64) <= t_ms);
        let Some(candidate) = idx.checked_sub(1).map(|i| &list[i]) else {
            return base;
        };
        let end = candidate.end_ms() as f64;
        if t_ms < end {
            candidate.value_at(t_ms)
        } else if t_ms == end {
            candidate.to
        } else {
            base
        }
    }

    /// Tweens for `property`, sorted by start.
    pub fn events_for(&self, property: &Property) -> &[TweenEvent] {
        self.tweens.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn events(&self) -> impl Iterator<Item = &TweenEvent> {
        self.tweens.values().flatten()
    }

    pub fn end_ms(&self) -> Option<u64> {
        self.events().map(TweenEvent::end_ms).max()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/tween.rs"]
mod tests;
