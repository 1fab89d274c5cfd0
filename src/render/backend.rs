use rayon::prelude::*;

use crate::foundation::error::ClipgridResult;
use crate::render::frame::Frame;
use crate::render::warp::{WarpParams, prepare_output, warp_frame, warp_row};

/// A dispatch strategy for the slice/tear warp.
///
/// Every implementation must produce byte-identical output for identical inputs; only the way
/// rows are scheduled differs.
pub trait WarpBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Warp `frame` at timestamp `ms`.
    fn warp(&self, frame: &Frame, params: &WarpParams, ms: f64) -> ClipgridResult<Frame>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarpBackendKind {
    Serial,
    #[default]
    Rayon,
}

/// Create a warp backend.
pub fn create_warp_backend(kind: WarpBackendKind) -> Box<dyn WarpBackend> {
    match kind {
        WarpBackendKind::Serial => Box::new(SerialWarp),
        WarpBackendKind::Rayon => Box::new(RayonWarp),
    }
}

/// Warps every row on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SerialWarp;

impl WarpBackend for SerialWarp {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn warp(&self, frame: &Frame, params: &WarpParams, ms: f64) -> ClipgridResult<Frame> {
        warp_frame(frame, params, ms)
    }
}

/// Warps rows in parallel on the current rayon pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct RayonWarp;

impl WarpBackend for RayonWarp {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn warp(&self, frame: &Frame, params: &WarpParams, ms: f64) -> ClipgridResult<Frame> {
        let mut out = prepare_output(frame, params, ms)?;
        let stride = out.stride();
        out.data
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(y, row)| warp_row(frame, params, ms, y as u32, row));
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
