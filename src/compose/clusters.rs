use crate::animation::ease::Ease;
use crate::animation::tween::{Property, TweenSpec};
use crate::clip::core::{Clip, ClipProps, PlayParams};
use crate::cluster::sequencer::sequence;
use crate::compose::build::{Composition, Draft};
use crate::compose::config::CompositionConfig;
use crate::foundation::error::ClipgridResult;
use crate::foundation::math::{bounds, lerp, norm_clamped, round_ms};
use crate::model::sample::Sample;
use crate::observe::Observer;

/// Schedule the cluster composition.
///
/// Samples are laid out as dots at their embedding position. Every member of a selected
/// cluster plays once, centered, and flashes in and out around its play.
#[tracing::instrument(skip_all, fields(samples = samples.len(), k = cfg.cluster.clusters))]
pub fn build_clusters(
    cfg: &CompositionConfig,
    samples: Vec<Sample>,
    observer: &mut dyn Observer,
) -> ClipgridResult<Composition> {
    let mut draft = Draft::begin(cfg, samples, observer)?;
    let seq = sequence(&draft.samples, &cfg.cluster, cfg.canvas.seed)?;

    let dot = cfg.cluster_dot_size.0;
    let (w, h) = (
        f64::from(draft.layout.canvas.width),
        f64::from(draft.layout.canvas.height),
    );
    let (xmin, xmax) = bounds(draft.samples.iter().map(|s| s.embedding_x));
    let (ymin, ymax) = bounds(draft.samples.iter().map(|s| s.embedding_y));
    for (s, &label) in draft.samples.iter_mut().zip(&seq.labels) {
        let nx = norm_clamped(s.embedding_x, xmin, xmax);
        let ny = norm_clamped(s.embedding_y, ymin, ymax);
        s.derived.cluster = Some(label);
        s.derived.x = Some(lerp(dot * 0.5, w - dot * 0.5, nx));
        s.derived.y = Some(lerp(dot * 0.5, h - dot * 0.5, ny));
        s.derived.size = Some(dot);
        s.derived.alpha = Some(0.0);
    }

    let start_ms = cfg.canvas.pad_start_ms;
    let mut clips = Vec::new();
    for cluster in &seq.clusters {
        for member in &cluster.members {
            let sample = &draft.samples[member.sample_index];
            let props = ClipProps::from_sample(sample, &draft.layout, &cfg.clip);
            let mut clip = Clip::new(clips.len(), member.sample_index, sample.clone(), props)
                .with_parent(draft.container);

            let play_ms = start_ms + cluster.start_ms + member.offset_ms;
            clip.queue_play(
                play_ms,
                PlayParams {
                    pan: 0.0,
                    ..PlayParams::full(clip.props(), member.volume)
                },
            );

            let render = clip.props().render_dur_ms;
            let rise = round_ms(render as f64 * 0.2);
            if rise > 0 {
                clip.queue_tween(
                    play_ms,
                    rise,
                    [TweenSpec::new(Property::Alpha, 0.0, 1.0, Ease::InOutSin)],
                )?;
            }
            if render > rise {
                clip.queue_tween(
                    play_ms + rise,
                    render - rise,
                    [TweenSpec::new(Property::Alpha, 1.0, 0.0, Ease::InOutSin)],
                )?;
            }
            clips.push(clip);
        }
    }

    let duration_ms = start_ms + seq.duration_ms;
    Ok(draft.finish(clips, duration_ms, None, Some(seq), observer))
}

#[cfg(test)]
#[path = "../../tests/unit/compose/clusters.rs"]
mod tests;
