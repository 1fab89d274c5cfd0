//! Clipgrid schedules audio-visual grid compositions.
//!
//! Every grid cell holds one audio sample. The crate turns a sample grid into time-ordered
//! play and tween events, sequences samples by k-means cluster, and post-processes rendered
//! frames with a slice/tear warp:
//!
//! - Build a [`CompositionConfig`] and call [`build_slice`], [`build_stretch`] or
//!   [`build_clusters`]
//! - Hand [`Composition::manifest`] to the audio mixer
//! - Stream warped frames through [`WarpRender::render_range`] into a [`FrameSink`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod audio;
pub(crate) mod clip;
pub(crate) mod cluster;
pub(crate) mod compose;
pub(crate) mod model;
/// Checkpoint observers.
pub mod observe;
pub(crate) mod render;

pub use crate::foundation::core::{
    Affine, Canvas, Fps, FrameIndex, FrameRange, Transform2D, ValueRange, Vec2,
};
pub use crate::foundation::error::{ClipgridError, ClipgridResult};
pub use crate::foundation::math::{Rng64, cumulative_weights, lerp, median, norm_clamped};

pub use crate::animation::ease::Ease;
pub use crate::animation::tween::{Property, TweenEvent, TweenSpec, TweenTrack};

pub use crate::model::grid::{GridLayout, GridSize};
pub use crate::model::sample::{Sample, SampleDerived};
pub use crate::model::scene::{NodeId, SceneTree};

pub use crate::clip::core::{
    Clip, ClipDefaults, ClipProps, PlayEvent, PlayParams, StateValue, clips_from_samples,
};
pub use crate::clip::timeline::{EventKind, Timeline, TimelineEvent};

pub use crate::render::backend::{
    RayonWarp, SerialWarp, WarpBackend, WarpBackendKind, create_warp_backend,
};
pub use crate::render::frame::Frame;
pub use crate::render::pipeline::{
    FrameSink, FrameSource, InMemorySink, RenderStats, RenderThreading, SinkConfig,
    StillSource, WarpRender,
};
pub use crate::render::warp::{RowMotion, WarpParams, row_motion, source_column, warp_frame};

pub use crate::cluster::kmeans::{KMeansConfig, KMeansResult, kmeans};
pub use crate::cluster::sequencer::{
    ClusterConfig, ClusterMember, ClusterStats, RankWeights, SequencedCluster, Sequence,
    sequence,
};

pub use crate::audio::manifest::{MixEntry, MixManifest};

pub use crate::compose::build::Composition;
pub use crate::compose::clusters::build_clusters;
pub use crate::compose::config::{
    BrightnessRange, CanvasConfig, ClusterDotSize, CompositionConfig, GridConfig, SliceConfig,
    StretchConfig,
};
pub use crate::compose::slice::{beat_times, build_slice, slice_warp_params};
pub use crate::compose::stretch::build_stretch;
pub use crate::observe::{Checkpoint, Observer, RecordingObserver, Stopwatch, TracingObserver};
