use crate::clip::core::{Clip, PlayEvent};
use crate::foundation::error::{ClipgridError, ClipgridResult};

/// One validated play instruction for the audio mixer.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MixEntry {
    pub clip_id: usize,
    pub sample_index: usize,
    pub start_ms: u64,
    /// Offset into the source audio.
    pub source_start_ms: u64,
    pub dur_ms: u64,
    pub volume: f64,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,
    pub pan: f64,
    pub reverb: f64,
    pub match_db: bool,
    /// Time-stretch factor, resampled by the mixer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch: Option<f64>,
    #[serde(skip)]
    seq: u64,
}

impl MixEntry {
    /// Exclusive end on the timeline, accounting for time-stretch.
    pub fn end_ms(&self) -> u64 {
        match self.stretch {
            Some(s) => self
                .start_ms
                .saturating_add((self.dur_ms as f64 * s).round() as u64),
            None => self.start_ms.saturating_add(self.dur_ms),
        }
    }
}

/// Every play of a composition, in timeline order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MixManifest {
    /// Composition duration the mixer should render.
    pub duration_ms: u64,
    /// Play instructions ordered by start, then clip, then queue order.
    pub entries: Vec<MixEntry>,
}

impl MixManifest {
    /// Collect and validate the play events of `clips`.
    pub fn build(clips: &[Clip], duration_ms: u64) -> ClipgridResult<Self> {
        let mut entries = Vec::new();
        for clip in clips {
            for play in clip.plays() {
                validate_play(clip.id(), play)?;
                let p = &play.params;
                entries.push(MixEntry {
                    clip_id: clip.id(),
                    sample_index: clip.sample_index(),
                    start_ms: play.start_ms,
                    source_start_ms: p.source_start_ms,
                    dur_ms: p.dur_ms,
                    volume: p.volume,
                    fade_in_ms: p.fade_in_ms,
                    fade_out_ms: p.fade_out_ms,
                    pan: p.pan,
                    reverb: p.reverb,
                    match_db: p.match_db,
                    stretch: p.stretch,
                    seq: play.seq,
                });
            }
        }
        entries.sort_by_key(|e| (e.start_ms, e.clip_id, e.seq));
        Ok(Self {
            duration_ms,
            entries,
        })
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> ClipgridResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| anyhow::Error::new(e).into())
    }

    /// Latest end of any entry.
    pub fn end_ms(&self) -> u64 {
        self.entries.iter().map(MixEntry::end_ms).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_play(clip_id: usize, play: &PlayEvent) -> ClipgridResult<()> {
    let p = &play.params;
    let fail = |what: String| -> ClipgridResult<()> {
        Err(ClipgridError::validation(format!(
            "clip {clip_id} play at {} ms: {what}",
            play.start_ms
        )))
    };
    if p.dur_ms == 0 {
        return fail("duration must be > 0".to_owned());
    }
    if !(0.0..=1.0).contains(&p.volume) {
        return fail(format!("volume {} outside [0, 1]", p.volume));
    }
    if !(-1.0..=1.0).contains(&p.pan) {
        return fail(format!("pan {} outside [-1, 1]", p.pan));
    }
    if !(0.0..=1.0).contains(&p.reverb) {
        return fail(format!("reverb {} outside [0, 1]", p.reverb));
    }
    if p.fade_in_ms.saturating_add(p.fade_out_ms) > p.dur_ms {
        return fail(format!(
            "fades {} + {} exceed duration {}",
            p.fade_in_ms, p.fade_out_ms, p.dur_ms
        ));
    }
    if let Some(s) = p.stretch
        && !(s.is_finite() && s > 0.0)
    {
        return fail(format!("stretch {s} must be finite and > 0"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/manifest.rs"]
mod tests;
