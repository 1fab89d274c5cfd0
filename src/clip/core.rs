use std::collections::BTreeMap;

use crate::animation::tween::{Property, TweenSpec, TweenTrack};
use crate::foundation::core::{Affine, Transform2D, Vec2};
use crate::foundation::error::ClipgridResult;
use crate::foundation::math::{lerp, round_ms};
use crate::model::grid::GridLayout;
use crate::model::sample::Sample;
use crate::model::scene::{NodeId, SceneTree, animated_transform};

/// Static clip defaults that are not carried by the sample itself.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClipDefaults {
    pub min_render_ms: u64,
    pub fade_in_pct: f64,
    pub fade_out_pct: f64,
    pub reverb: f64,
    pub match_db: bool,
}

impl Default for ClipDefaults {
    fn default() -> Self {
        Self {
            min_render_ms: 100,
            fade_in_pct: 0.1,
            fade_out_pct: 0.1,
            reverb: 0.0,
            match_db: true,
        }
    }
}

/// Property bag fixed when the clip is created.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClipProps {
    pub col: u32,
    pub row: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub audio_start_ms: u64,
    pub audio_dur_ms: u64,
    pub render_dur_ms: u64,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    pub pan: f64,
    pub reverb: f64,
    pub match_db: bool,
}

impl ClipProps {
    /// Derive clip properties from a sample's grid placement and audio descriptors.
    pub fn from_sample(sample: &Sample, layout: &GridLayout, defaults: &ClipDefaults) -> Self {
        let (cell_w, cell_h) = layout.cell_size();
        let (cx, cy) = layout.cell_center(sample.col, sample.row);
        let (width, height) = match sample.derived.size {
            Some(size) => (size, size),
            None => (cell_w, cell_h),
        };

        let pan = if layout.grid.cols > 1 {
            let n = f64::from(sample.col) / f64::from(layout.grid.cols - 1);
            lerp(-1.0, 1.0, n)
        } else {
            0.0
        };

        let dur = sample.audio_dur as f64;
        let mut fade_in_ms = round_ms(dur * defaults.fade_in_pct);
        let mut fade_out_ms = round_ms(dur * defaults.fade_out_pct);
        if fade_in_ms + fade_out_ms > sample.audio_dur {
            fade_in_ms = sample.audio_dur / 2;
            fade_out_ms = sample.audio_dur - fade_in_ms;
        }

        Self {
            col: sample.col,
            row: sample.row,
            x: sample.derived.x.unwrap_or(cx),
            y: sample.derived.y.unwrap_or(cy),
            width,
            height,
            audio_start_ms: sample.audio_start,
            audio_dur_ms: sample.audio_dur,
            render_dur_ms: sample.audio_dur.max(defaults.min_render_ms),
            fade_in_ms,
            fade_out_ms,
            pan,
            reverb: defaults.reverb,
            match_db: defaults.match_db,
        }
    }
}

/// Parameters of one `queue_play` call.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayParams {
    /// Offset into the source audio.
    pub source_start_ms: u64,
    /// Length of source audio to play.
    pub dur_ms: u64,
    /// Gain in `[0, 1]`.
    pub volume: f64,
    /// Fade-in length.
    pub fade_in_ms: u64,
    /// Fade-out length.
    pub fade_out_ms: u64,
    /// Stereo pan in `[-1, 1]`.
    pub pan: f64,
    /// Reverb send in `[0, 1]`.
    pub reverb: f64,
    /// Loudness-match flag.
    pub match_db: bool,
    /// Optional time-stretch factor (> 0), resampled by the mixer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch: Option<f64>,
}

impl PlayParams {
    /// Play the whole sample at `volume` using the clip's static mix settings.
    pub fn full(props: &ClipProps, volume: f64) -> Self {
        Self {
            source_start_ms: props.audio_start_ms,
            dur_ms: props.audio_dur_ms,
            volume,
            fade_in_ms: props.fade_in_ms,
            fade_out_ms: props.fade_out_ms,
            pan: props.pan,
            reverb: props.reverb,
            match_db: props.match_db,
            stretch: None,
        }
    }
}

/// A scheduled audio trigger.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlayEvent {
    /// Start time in composition milliseconds.
    pub start_ms: u64,
    /// Play parameters as queued.
    #[serde(flatten)]
    pub params: PlayParams,
    /// Insertion order within the owning clip.
    pub seq: u64,
}

impl PlayEvent {
    /// Time the event occupies on the timeline, accounting for time-stretch.
    pub fn timeline_dur_ms(&self) -> u64 {
        match self.params.stretch {
            Some(s) if s.is_finite() && s > 0.0 => round_ms(self.params.dur_ms as f64 * s),
            _ => self.params.dur_ms,
        }
    }

    /// Exclusive end time on the timeline.
    pub fn end_ms(&self) -> u64 {
        self.start_ms.saturating_add(self.timeline_dur_ms())
    }
}

/// Scratch-state value.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// One schedulable unit built from exactly one [`Sample`].
#[derive(Clone, Debug)]
pub struct Clip {
    id: usize,
    sample_index: usize,
    sample: Sample,
    props: ClipProps,
    parent: Option<NodeId>,
    state: BTreeMap<String, StateValue>,
    plays: Vec<PlayEvent>,
    tweens: TweenTrack,
}

impl Clip {
    /// Create a clip. `id` is the creation order and `sample_index` the sample's position in
    /// the row-major sample list.
    pub fn new(id: usize, sample_index: usize, sample: Sample, props: ClipProps) -> Self {
        let mut tweens = TweenTrack::new();
        if let Some(b) = sample.derived.brightness {
            tweens.set_base(Property::Brightness, b);
        }
        if let Some(a) = sample.derived.alpha {
            tweens.set_base(Property::Alpha, a);
        }
        Self {
            id,
            sample_index,
            sample,
            props,
            parent: None,
            state: BTreeMap::new(),
            plays: Vec::new(),
            tweens,
        }
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn sample_index(&self) -> usize {
        self.sample_index
    }

    pub fn sample(&self) -> &Sample {
        &self.sample
    }

    pub fn props(&self) -> &ClipProps {
        &self.props
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Append a play event. No cross-event validation happens here; the mixer manifest checks
    /// ranges when the schedule is handed over.
    pub fn queue_play(&mut self, start_ms: u64, params: PlayParams) {
        let seq = self.plays.len() as u64;
        self.plays.push(PlayEvent {
            start_ms,
            params,
            seq,
        });
    }

    /// Append one tween or a chained sequence of tweens; see [`TweenTrack::queue`].
    pub fn queue_tween<I>(&mut self, start_ms: u64, dur_ms: u64, specs: I) -> ClipgridResult<()>
    where
        I: IntoIterator<Item = TweenSpec>,
    {
        self.tweens.queue(start_ms, dur_ms, specs)
    }

    pub fn get_state(&self, key: &str) -> Option<&StateValue> {
        self.state.get(key)
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: StateValue) {
        self.state.insert(key.into(), value);
    }

    /// Return `true` when `key` holds `Bool(true)`.
    pub fn state_flag(&self, key: &str) -> bool {
        matches!(self.state.get(key), Some(StateValue::Bool(true)))
    }

    /// Value of `property` at `t_ms`.
    pub fn evaluate_property(&self, property: impl Into<Property>, t_ms: f64) -> f64 {
        self.tweens.evaluate(&property.into(), t_ms)
    }

    /// Sort play events by start time, ties kept in insertion order.
    pub fn sort_frames(&mut self) {
        self.plays.sort_by_key(|p| (p.start_ms, p.seq));
    }

    pub fn plays(&self) -> &[PlayEvent] {
        &self.plays
    }

    pub fn tweens(&self) -> &TweenTrack {
        &self.tweens
    }

    /// Latest end of any event on this clip.
    pub fn end_ms(&self) -> Option<u64> {
        let plays = self.plays.iter().map(PlayEvent::end_ms).max();
        plays.max(self.tweens.end_ms())
    }

    /// Local transform at `t_ms`: cell placement plus this clip's transform tweens, anchored
    /// at the cell center.
    pub fn local_transform(&self, t_ms: f64) -> Transform2D {
        let base = Transform2D {
            translate: Vec2::new(self.props.x, self.props.y),
            ..Transform2D::default()
        };
        animated_transform(base, &self.tweens, t_ms)
    }

    /// World transform at `t_ms`, including every ancestor scene node.
    pub fn world_affine(&self, scene: &SceneTree, t_ms: f64) -> ClipgridResult<Affine> {
        let local = self.local_transform(t_ms).to_affine();
        match self.parent {
            Some(parent) => Ok(scene.world_affine(parent, t_ms)? * local),
            None => Ok(local),
        }
    }
}

/// Build one clip per sample, in sample order.
pub fn clips_from_samples(
    samples: &[Sample],
    layout: &GridLayout,
    defaults: &ClipDefaults,
    parent: Option<NodeId>,
) -> Vec<Clip> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let clip = Clip::new(i, i, s.clone(), ClipProps::from_sample(s, layout, defaults));
            match parent {
                Some(p) => clip.with_parent(p),
                None => clip,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/clip/core.rs"]
mod tests;
