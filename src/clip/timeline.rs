use crate::clip::core::Clip;
use crate::foundation::core::{FrameIndex, FrameRange, Fps};

/// Kind of a scheduled event, ordered play-before-tween for tie breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Play,
    Tween,
}

/// Reference to one event of one clip, in resolved timeline order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TimelineEvent {
    pub start_ms: u64,
    pub end_ms: u64,
    pub clip_id: usize,
    pub kind: EventKind,
    pub seq: u64,
}

impl TimelineEvent {
    fn sort_key(&self) -> (u64, usize, EventKind, u64) {
        (self.start_ms, self.clip_id, self.kind, self.seq)
    }
}

/// Total duration and frame iteration order of a composition.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Timeline {
    pub duration_ms: u64,
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    /// Resolve the timeline of `clips`.
    pub fn resolve(clips: &[Clip], min_duration_ms: u64) -> Self {
        let events = Self::sort_frames(clips);
        let latest = events.iter().map(|e| e.end_ms).max().unwrap_or(0);
        Self {
            duration_ms: latest.max(min_duration_ms),
            events,
        }
    }

    /// Every event of every clip ordered by start time, then clip creation order, then play
    /// before tween, then insertion order.
    pub fn sort_frames(clips: &[Clip]) -> Vec<TimelineEvent> {
        let mut out = Vec::new();
        for clip in clips {
            out.extend(clip.plays().iter().map(|p| TimelineEvent {
                start_ms: p.start_ms,
                end_ms: p.end_ms(),
                clip_id: clip.id(),
                kind: EventKind::Play,
                seq: p.seq,
            }));
            out.extend(clip.tweens().events().map(|t| TimelineEvent {
                start_ms: t.start_ms,
                end_ms: t.end_ms(),
                clip_id: clip.id(),
                kind: EventKind::Tween,
                seq: t.seq,
            }));
        }
        out.sort_by_key(TimelineEvent::sort_key);
        out
    }

    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.frames_for_ms(self.duration_ms)
    }

    /// Full frame range of the composition.
    pub fn frame_range(&self, fps: Fps) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.frame_count(fps)),
        }
    }

    /// Frames in increasing index order, each paired with its timestamp in milliseconds.
    pub fn frames(&self, fps: Fps) -> impl Iterator<Item = (FrameIndex, f64)> {
        (0..self.frame_count(fps)).map(move |i| (FrameIndex(i), fps.frame_to_ms(FrameIndex(i))))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/clip/timeline.rs"]
mod tests;
