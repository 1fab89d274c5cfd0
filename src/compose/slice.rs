use crate::animation::ease::Ease;
use crate::animation::tween::{Property, TweenSpec};
use crate::clip::core::{Clip, PlayParams, clips_from_samples};
use crate::compose::build::{Composition, Draft};
use crate::compose::config::CompositionConfig;
use crate::foundation::error::ClipgridResult;
use crate::foundation::math::{Rng64, cumulative_weights, norm_clamped, round_ms};
use crate::model::sample::Sample;
use crate::observe::Observer;
use crate::render::warp::WarpParams;

/// Schedule the slice composition.
///
/// Edge-column clips play on a beat grid that is densest in the middle of the longest row
/// cycle; plays get shorter and quieter toward that middle and each one is echoed. The
/// resulting [`WarpParams`] tear the rendered grid apart over the same cycle.
#[tracing::instrument(skip_all, fields(samples = samples.len()))]
pub fn build_slice(
    cfg: &CompositionConfig,
    samples: Vec<Sample>,
    observer: &mut dyn Observer,
) -> ClipgridResult<Composition> {
    let mut draft = Draft::begin(cfg, samples, observer)?;
    let sc = &cfg.slice;
    let brightness = cfg.brightness_range.0;
    let last_col = draft.layout.grid.cols - 1;

    for s in &mut draft.samples {
        s.derived.brightness = Some(brightness.min);
    }
    let mut clips = clips_from_samples(
        &draft.samples,
        &draft.layout,
        &cfg.clip,
        Some(draft.container),
    );
    let playable: Vec<usize> = clips
        .iter()
        .filter(|c| c.props().col == 0 || c.props().col == last_col)
        .map(Clip::id)
        .collect();

    let start_ms = cfg.canvas.pad_start_ms;
    let warp = slice_warp_params(cfg)?;
    let cycle_max_ms = warp.cycle_max_ms as u64;
    let end_ms = start_ms + cycle_max_ms;

    let mut rng = Rng64::new(cfg.canvas.seed);
    let beats = beat_times(cycle_max_ms, sc.min_beat_ms, sc.clips_to_play, &mut rng);
    if playable.is_empty() {
        tracing::warn!("no clip sits on an edge column; slice plays nothing");
    } else {
        for beat in beats {
            let ms = start_ms + beat;
            let clip = &mut clips[playable[rng.next_index(playable.len())]];
            let nprogress = norm_clamped(ms as f64, start_ms as f64, end_ms as f64);
            let ncut = 1.0 - Ease::InOutQuad.apply((nprogress / 0.5).clamp(0.0, 1.0));
            let dur = round_ms(sc.play_dur_range.lerp(ncut));
            let volume = sc.volume_range.lerp(ncut);

            let params = short_play(clip, dur, volume);
            let delay = dur + round_ms(sc.delay_dur_range.lerp(1.0 - ncut));
            // the echo keeps reading the source recording where the first play would be by then
            let echo = PlayParams {
                source_start_ms: params.source_start_ms + delay,
                ..params.clone()
            };
            clip.queue_play(ms, params);
            clip.queue_play(ms + delay, echo);
        }
    }

    for &id in &playable {
        let clip = &mut clips[id];
        let dur = clip.props().render_dur_ms * 4;
        if dur > 0 {
            clip.queue_tween(
                start_ms,
                dur,
                [TweenSpec::new(
                    Property::Brightness,
                    brightness.min,
                    brightness.max,
                    Ease::InOutSin,
                )],
            )?;
        }
    }

    Ok(draft.finish(clips, end_ms, Some(warp), None, observer))
}

/// Warp parameters of the slice composition: rows start tearing at the pad start, cycle
/// over the configured range times the cycle count and travel one canvas width per cycle.
pub fn slice_warp_params(cfg: &CompositionConfig) -> ClipgridResult<WarpParams> {
    let sc = &cfg.slice;
    let cycles = f64::from(sc.cycles);
    let warp = WarpParams {
        start_ms: cfg.canvas.pad_start_ms as f64,
        cycle_min_ms: round_ms(sc.cycle_range_ms.min * cycles) as f64,
        cycle_max_ms: round_ms(sc.cycle_range_ms.max * cycles) as f64,
        distance: round_ms(f64::from(cfg.canvas.width) * cycles) as f64,
    };
    warp.validate()?;
    Ok(warp)
}

/// Offsets of `count` beats drawn with replacement from a grid of `min_beat_ms` steps over
/// `span_ms`, weighted by a sine bell so the middle of the span plays most.
pub fn beat_times(span_ms: u64, min_beat_ms: u64, count: usize, rng: &mut Rng64) -> Vec<u64> {
    let beat_count = round_ms(span_ms as f64 / min_beat_ms as f64) as usize;
    if beat_count == 0 {
        return Vec::new();
    }
    let weights: Vec<f64> = (0..beat_count)
        .map(|i| {
            let n = if beat_count > 1 {
                i as f64 / (beat_count - 1) as f64
            } else {
                0.0
            };
            Ease::SinBell.apply(n)
        })
        .collect();
    let cumulative = cumulative_weights(&weights);
    (0..count)
        .map(|_| rng.weighted_index(&cumulative) as u64 * min_beat_ms)
        .collect()
}

fn short_play(clip: &Clip, dur: u64, volume: f64) -> PlayParams {
    let fade_out_ms = round_ms(dur as f64 * 0.8);
    PlayParams {
        dur_ms: dur,
        fade_in_ms: dur - fade_out_ms,
        fade_out_ms,
        ..PlayParams::full(clip.props(), volume)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/slice.rs"]
mod tests;
