use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::animation::tween::{Property, TweenSpec};
use crate::clip::core::{Clip, PlayParams, StateValue, clips_from_samples};
use crate::compose::build::{Composition, Draft};
use crate::compose::config::{CompositionConfig, StretchConfig};
use crate::foundation::core::ValueRange;
use crate::foundation::error::ClipgridResult;
use crate::foundation::math::{lerp, round_ms};
use crate::model::sample::Sample;
use crate::observe::Observer;

const PLAYABLE: &str = "isPlayable";

/// Shared inputs of every per-clip stretch.
struct Plan<'a> {
    cfg: &'a StretchConfig,
    brightness: ValueRange,
    stretch_height: f64,
}

/// Schedule the stretch composition.
///
/// Middle-row clips, starting at the center column pair and stepping outward, stretch to the
/// full canvas height while replaying with a growing time-stretch. Every other clip slides
/// up or down out of the way and everything settles back in the second half.
#[tracing::instrument(skip_all, fields(samples = samples.len()))]
pub fn build_stretch(
    cfg: &CompositionConfig,
    samples: Vec<Sample>,
    observer: &mut dyn Observer,
) -> ClipgridResult<Composition> {
    let mut draft = Draft::begin(cfg, samples, observer)?;
    let st = &cfg.stretch;
    let layout = draft.layout;
    let canvas_h = f64::from(layout.canvas.height);
    let cell_h = round_ms(canvas_h / f64::from(layout.grid.rows)) as f64;
    let plan = Plan {
        cfg: st,
        brightness: cfg.brightness_range.0,
        stretch_height: canvas_h + cell_h,
    };

    for s in &mut draft.samples {
        s.derived.brightness = Some(plan.brightness.min);
    }
    let mut clips = clips_from_samples(&draft.samples, &layout, &cfg.clip, Some(draft.container));
    let by_cell: BTreeMap<(i64, i64), usize> = clips
        .iter()
        .map(|c| ((i64::from(c.props().col), i64::from(c.props().row)), c.id()))
        .collect();

    let steps = round_ms(f64::from(layout.end.rows) * 0.5).max(1);
    let start_ms = cfg.canvas.pad_start_ms;
    let stretch_ms = (steps - 1) * st.step_ms + st.stretch_duration_ms * 2;
    let duration_ms = start_ms + stretch_ms;
    draft.queue_zoom(start_ms, round_ms(stretch_ms as f64 * 0.5), duration_ms)?;

    let back_at = round_ms(stretch_ms as f64 * st.transition_back_at);
    let revert_duration = stretch_ms - back_at;
    let revert_step = ((revert_duration as f64 - st.stretch_duration_ms as f64) / steps as f64)
        .round() as i64;
    let revert_start_ms = (start_ms + back_at) as i64;

    let mid_col = f64::from(layout.grid.cols - 1) * 0.5;
    let mid_row = f64::from(layout.grid.rows - 1) * 0.5;
    let row = mid_row.floor() as i64;
    for i in 0..steps {
        let clip_ms = start_ms + i * st.step_ms;
        let offset = i as i64;
        let left = mid_col.floor() as i64 - offset;
        let right = mid_col.ceil() as i64 + offset;
        let clip_revert_ms = revert_start_ms + offset * revert_step;
        let nstep = if steps > 1 {
            i as f64 / (steps - 1) as f64
        } else {
            0.0
        };
        // the center column of an odd-width grid is its own pair
        let pair = if left == right { 1 } else { 2 };
        for col in [left, right].into_iter().take(pair) {
            let Some(&id) = by_cell.get(&(col, row)) else {
                continue;
            };
            stretch_and_play(&plan, &mut clips[id], clip_ms, clip_revert_ms, nstep)?;
        }
    }

    for clip in clips.iter_mut().filter(|c| !c.state_flag(PLAYABLE)) {
        let col = f64::from(clip.props().col);
        let step = (if col < mid_col {
            mid_col.floor() - col
        } else {
            col - mid_col.ceil()
        }) as u64;
        let clip_ms = start_ms + step * st.step_ms;
        let delta_y = (plan.stretch_height - clip.props().height) * 0.5;
        let to = if f64::from(clip.props().row) > mid_row {
            delta_y
        } else {
            -delta_y
        };
        clip.queue_tween(
            clip_ms,
            st.stretch_duration_ms,
            [TweenSpec::new(Property::TranslateY, 0.0, to, Ease::InOutQuad)],
        )?;
        let planned = revert_start_ms + step as i64 * revert_step;
        settle(clip, st, Property::TranslateY, to, clip_ms, planned)?;
    }

    Ok(draft.finish(clips, duration_ms, None, None, observer))
}

/// Start of the tween that takes a clip back to rest.
///
/// A clip never starts reverting before it has fully stretched.
fn revert_start(cfg: &StretchConfig, ms: u64, planned_ms: i64) -> u64 {
    let earliest = ms + cfg.stretch_duration_ms;
    if planned_ms < earliest as i64 {
        earliest
    } else {
        planned_ms as u64
    }
}

/// Hold `property` at `value` once the move that started at `ms` is done, then ease it back to
/// its base value.
fn settle(
    clip: &mut Clip,
    cfg: &StretchConfig,
    property: Property,
    value: f64,
    ms: u64,
    planned_ms: i64,
) -> ClipgridResult<()> {
    let held_from = ms + cfg.stretch_duration_ms;
    let revert_at = revert_start(cfg, ms, planned_ms);
    if revert_at > held_from {
        clip.queue_tween(
            held_from,
            revert_at - held_from,
            [TweenSpec::new(property.clone(), value, value, Ease::Linear)],
        )?;
    }
    let rest = property.default_value();
    clip.queue_tween(
        revert_at,
        cfg.stretch_duration_ms,
        [TweenSpec::new(property, value, rest, Ease::InOutQuad)],
    )
}

fn stretch_and_play(
    plan: &Plan<'_>,
    clip: &mut Clip,
    ms: u64,
    revert_ms: i64,
    nstep: f64,
) -> ClipgridResult<()> {
    let cfg = plan.cfg;
    let b = plan.brightness;
    clip.set_state(PLAYABLE, StateValue::Bool(true));

    let audio_dur = clip.props().audio_dur_ms;
    if audio_dur > 0 {
        let target = cfg.stretch_to_ms as f64 / audio_dur as f64;
        let mut progress = 0.0;
        let mut elapsed = 0u64;
        while progress <= 1.0 {
            let nvolume = (1.0 - progress) * (1.0 - nstep);
            let stretch = lerp(1.0, target, progress);
            let play_ms = ms + elapsed;
            let params = PlayParams {
                stretch: Some(stretch),
                ..PlayParams::full(clip.props(), cfg.volume_range.lerp(nvolume))
            };
            clip.queue_play(play_ms, params);

            let dur = round_ms(audio_dur as f64 * stretch).max(1);
            let left = round_ms(dur as f64 * 0.2);
            let right = dur - left;
            if left > 0 {
                clip.queue_tween(
                    play_ms,
                    left,
                    [TweenSpec::new(Property::Brightness, b.min, b.max, Ease::InOutSin)],
                )?;
            }
            if right > 0 {
                clip.queue_tween(
                    play_ms + left,
                    right,
                    [TweenSpec::new(Property::Brightness, b.max, b.min, Ease::InOutSin)],
                )?;
            }
            elapsed += dur;
            progress = elapsed as f64 / cfg.stretch_duration_ms as f64;
        }
    }

    let scale_to = plan.stretch_height / clip.props().height;
    clip.queue_tween(
        ms,
        cfg.stretch_duration_ms,
        [TweenSpec::new(Property::ScaleY, 1.0, scale_to, Ease::InOutQuad)],
    )?;
    settle(clip, cfg, Property::ScaleY, scale_to, ms, revert_ms)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/stretch.rs"]
mod tests;
