use crate::animation::ease::Ease;
use crate::animation::tween::{Property, TweenSpec};
use crate::audio::manifest::MixManifest;
use crate::clip::core::Clip;
use crate::clip::timeline::Timeline;
use crate::cluster::sequencer::Sequence;
use crate::compose::config::CompositionConfig;
use crate::foundation::core::{Transform2D, Vec2};
use crate::foundation::error::ClipgridResult;
use crate::model::grid::GridLayout;
use crate::model::sample::Sample;
use crate::model::scene::{NodeId, SceneTree};
use crate::observe::{Observer, Stopwatch};
use crate::render::warp::WarpParams;

/// A fully scheduled composition, ready for mixing and rendering.
#[derive(Clone, Debug)]
pub struct Composition {
    pub layout: GridLayout,
    pub scene: SceneTree,
    pub container: NodeId,
    pub clips: Vec<Clip>,
    pub timeline: Timeline,
    pub warp: Option<WarpParams>,
    pub sequence: Option<Sequence>,
}

impl Composition {
    /// Validated mixer instructions for every play event.
    pub fn manifest(&self) -> ClipgridResult<MixManifest> {
        MixManifest::build(&self.clips, self.timeline.duration_ms)
    }

    pub fn clip(&self, id: usize) -> Option<&Clip> {
        self.clips.get(id).filter(|c| c.id() == id)
    }
}

/// State shared by every builder between sample arrangement and timeline resolution.
#[derive(Debug)]
pub(crate) struct Draft {
    pub(crate) layout: GridLayout,
    pub(crate) samples: Vec<Sample>,
    pub(crate) scene: SceneTree,
    pub(crate) container: NodeId,
    pub(crate) stopwatch: Stopwatch,
}

impl Draft {
    pub(crate) fn begin(
        cfg: &CompositionConfig,
        samples: Vec<Sample>,
        observer: &mut dyn Observer,
    ) -> ClipgridResult<Self> {
        let mut stopwatch = Stopwatch::start();
        stopwatch.report(observer, "render start");
        cfg.validate()?;

        let layout = cfg.layout();
        let samples = layout.arrange(samples)?;
        let mut scene = SceneTree::new();
        let container = scene.add_root(Transform2D {
            anchor: Vec2::new(
                f64::from(layout.canvas.width) * 0.5,
                f64::from(layout.canvas.height) * 0.5,
            ),
            ..Transform2D::default()
        });
        tracing::debug!(samples = samples.len(), grid = %layout.grid, "arranged samples");
        Ok(Self {
            layout,
            samples,
            scene,
            container,
            stopwatch,
        })
    }

    /// Zoom the container from the start grid to the end grid over `[start_ms, start_ms + dur_ms)`.
    pub(crate) fn queue_zoom(
        &mut self,
        start_ms: u64,
        dur_ms: u64,
        total_ms: u64,
    ) -> ClipgridResult<()> {
        let (from, to) = self.layout.zoom_scales();
        if from == to || dur_ms == 0 {
            return Ok(());
        }
        if start_ms > 0 {
            self.scene.queue_tween(
                self.container,
                0,
                start_ms,
                [TweenSpec::new(Property::Scale, from, from, Ease::Linear)],
            )?;
        }
        self.scene.queue_tween(
            self.container,
            start_ms,
            dur_ms,
            [TweenSpec::new(Property::Scale, from, to, Ease::InOutCubic)],
        )?;
        let zoom_end = start_ms + dur_ms;
        if total_ms > zoom_end {
            self.scene.queue_tween(
                self.container,
                zoom_end,
                total_ms - zoom_end,
                [TweenSpec::new(Property::Scale, to, to, Ease::Linear)],
            )?;
        }
        Ok(())
    }

    pub(crate) fn finish(
        mut self,
        mut clips: Vec<Clip>,
        duration_ms: u64,
        warp: Option<WarpParams>,
        sequence: Option<Sequence>,
        observer: &mut dyn Observer,
    ) -> Composition {
        for clip in &mut clips {
            clip.sort_frames();
        }
        let timeline = Timeline::resolve(&clips, duration_ms);
        self.stopwatch.report(observer, "scheduled");
        tracing::info!(
            clips = clips.len(),
            events = timeline.events.len(),
            duration_ms = timeline.duration_ms,
            "composition scheduled"
        );
        Composition {
            layout: self.layout,
            scene: self.scene,
            container: self.container,
            clips,
            timeline,
            warp,
            sequence,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/build.rs"]
mod tests;
