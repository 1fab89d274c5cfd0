use rayon::prelude::*;

use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::render::backend::WarpBackend;
use crate::render::frame::Frame;
use crate::render::warp::WarpParams;

/// Produces the fully composited frame for a timestamp.
pub trait FrameSource: Send + Sync {
    /// Composited frame `idx`, whose timestamp is `ms`.
    fn frame(&self, idx: FrameIndex, ms: f64) -> ClipgridResult<Frame>;
}

/// Source returning the same frame for every timestamp.
#[derive(Clone, Debug)]
pub struct StillSource {
    frame: Frame,
}

impl StillSource {
    /// Wrap a still frame.
    pub fn new(frame: Frame) -> Self {
        Self { frame }
    }
}

impl FrameSource for StillSource {
    fn frame(&self, _idx: FrameIndex, _ms: f64) -> ClipgridResult<Frame> {
        Ok(self.frame.clone())
    }
}

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
}

/// Sink contract for consuming warped frames in timeline order.
///
/// `push_frame` is called in strictly increasing `FrameIndex` order within the requested range.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> ClipgridResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ClipgridResult<()>;
    fn end(&mut self) -> ClipgridResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
    ended: bool,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }

    pub fn is_finished(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> ClipgridResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> ClipgridResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> ClipgridResult<()> {
        self.ended = true;
        Ok(())
    }
}

/// Threading and chunking controls for multi-frame rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderThreading {
    pub parallel: bool,
    /// Frames per chunk.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

/// Aggregated rendering counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
}

/// Everything fixed for one warp render.
#[derive(Clone, Debug)]
pub struct WarpRender {
    pub canvas: Canvas,
    pub fps: Fps,
    pub params: WarpParams,
    pub threading: RenderThreading,
}

impl WarpRender {
    /// Warp one frame.
    pub fn render_frame(
        &self,
        source: &dyn FrameSource,
        backend: &dyn WarpBackend,
        idx: FrameIndex,
    ) -> ClipgridResult<Frame> {
        let ms = self.fps.frame_to_ms(idx);
        let frame = source.frame(idx, ms)?;
        if frame.width != self.canvas.width || frame.height != self.canvas.height {
            return Err(ClipgridError::kernel(format!(
                "frame {} is {}x{}, expected {}x{}",
                idx.0, frame.width, frame.height, self.canvas.width, self.canvas.height
            )));
        }
        backend.warp(&frame, &self.params, ms)
    }

    /// Warp `range` and push every frame to `sink` in increasing index order.
    ///
    /// The first failing frame halts the render; frames after it are never pushed.
    #[tracing::instrument(
        skip(self, source, backend, sink),
        fields(start = range.start.0, end = range.end.0, backend = backend.name())
    )]
    pub fn render_range(
        &self,
        source: &dyn FrameSource,
        backend: &dyn WarpBackend,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> ClipgridResult<RenderStats> {
        if range.is_empty() {
            return Err(ClipgridError::validation("render range must be non-empty"));
        }
        self.params.validate()?;

        sink.begin(SinkConfig {
            width: self.canvas.width,
            height: self.canvas.height,
            fps: self.fps,
        })?;

        let mut stats = RenderStats {
            frames_total: range.len_frames(),
            frames_rendered: 0,
        };
        let chunk_size = normalized_chunk_size(self.threading.chunk_size);
        let pool = if self.threading.parallel {
            Some(build_thread_pool(self.threading.threads)?)
        } else {
            None
        };

        let mut chunk_start = range.start.0;
        while chunk_start < range.end.0 {
            let chunk_end = (chunk_start + chunk_size).min(range.end.0);
            let frames = match &pool {
                Some(pool) => pool.install(|| {
                    (chunk_start..chunk_end)
                        .into_par_iter()
                        .map(|f| self.render_frame(source, backend, FrameIndex(f)))
                        .collect::<Vec<_>>()
                }),
                None => (chunk_start..chunk_end)
                    .map(|f| self.render_frame(source, backend, FrameIndex(f)))
                    .collect(),
            };

            for (f, frame) in (chunk_start..chunk_end).zip(frames) {
                sink.push_frame(FrameIndex(f), &frame?)?;
                stats.frames_rendered += 1;
            }
            tracing::debug!(chunk_start, chunk_end, "warped chunk");
            chunk_start = chunk_end;
        }

        sink.end()?;
        Ok(stats)
    }

    /// Warp `range` into memory.
    pub fn render_frames(
        &self,
        source: &dyn FrameSource,
        backend: &dyn WarpBackend,
        range: FrameRange,
    ) -> ClipgridResult<Vec<Frame>> {
        let mut sink = InMemorySink::new();
        self.render_range(source, backend, range, &mut sink)?;
        Ok(sink.frames.into_iter().map(|(_, f)| f).collect())
    }
}

fn build_thread_pool(threads: Option<usize>) -> ClipgridResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ClipgridError::configuration(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ClipgridError::kernel(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
