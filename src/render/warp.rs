use crate::animation::ease::Ease;
use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::foundation::math::lerp;
use crate::render::frame::Frame;

/// Fixed parameters of the slice/tear warp for one composition.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WarpParams {
    /// Timestamp at which every row starts moving.
    pub start_ms: f64,
    /// Cycle duration of the rows nearest the vertical center.
    pub cycle_min_ms: f64,
    /// Cycle duration of the top and bottom rows.
    pub cycle_max_ms: f64,
    /// Horizontal travel at the end of a row's cycle, in pixels.
    pub distance: f64,
}

impl WarpParams {
    /// Check that every parameter is finite and the cycle range is positive and ordered.
    pub fn validate(&self) -> ClipgridResult<()> {
        let all_finite = [
            self.start_ms,
            self.cycle_min_ms,
            self.cycle_max_ms,
            self.distance,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(ClipgridError::configuration("warp parameters must be finite"));
        }
        if self.cycle_min_ms <= 0.0 || self.cycle_min_ms > self.cycle_max_ms {
            return Err(ClipgridError::configuration(format!(
                "warp cycle range must satisfy 0 < min <= max, got [{}, {}]",
                self.cycle_min_ms, self.cycle_max_ms
            )));
        }
        Ok(())
    }

    /// Time at which every row has finished its cycle and faded to black.
    pub fn end_ms(&self) -> f64 {
        self.start_ms + self.cycle_max_ms
    }
}

/// Per-row state of the warp at one timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowMotion {
    pub progress: f64,
    pub offset: f64,
    pub alpha: f64,
}

/// Motion of row `y` in a frame of `height` rows at `ms`.
///
/// Rows near the vertical center get the shortest cycle and odd rows move the other way.
pub fn row_motion(params: &WarpParams, y: u32, height: u32, ms: f64) -> RowMotion {
    let ny = if height > 1 {
        f64::from(y) / f64::from(height - 1)
    } else {
        0.0
    };
    let ny = 1.0 - Ease::QuadBell.apply(ny);
    let dur = lerp(params.cycle_min_ms, params.cycle_max_ms, ny);
    let raw = ((ms - params.start_ms) / dur).clamp(0.0, 1.0);
    let progress = Ease::InOutQuad.apply(raw);

    let mut offset = progress * params.distance;
    if y % 2 == 1 {
        offset = -offset;
    }
    let alpha = if progress > 0.5 {
        1.0 - (progress - 0.5) / 0.5
    } else {
        1.0
    };
    RowMotion {
        progress,
        offset,
        alpha,
    }
}

/// Source column for output column `x`, wrapped into `[0, width)`.
pub fn source_column(x: u32, offset: f64, width: u32) -> f64 {
    let w = f64::from(width);
    let mut xf = (f64::from(x) + offset) % w;
    if xf < 0.0 {
        xf += w;
    }
    // adding w to a tiny negative remainder can round up to w
    if xf >= w || !xf.is_finite() { 0.0 } else { xf }
}

type Rgba = [i32; 4];

fn fetch(src: &Frame, x: i64, y: i64) -> Rgba {
    let w = i64::from(src.width);
    let h = i64::from(src.height);
    let visible = (0..w).contains(&x) && (0..h).contains(&y);
    let px = src.pixel(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32);
    let a = if !visible {
        0
    } else if src.channels > 3 {
        i32::from(px[3])
    } else {
        255
    };
    [i32::from(px[0]), i32::from(px[1]), i32::from(px[2]), a]
}

fn blend(c1: Rgba, c2: Rgba, amount: f64) -> Rgba {
    let inv = 1.0 - amount;
    std::array::from_fn(|i| (f64::from(c1[i]) * amount + f64::from(c2[i]) * inv).round() as i32)
}

/// Bilinear sample of `src` at a fractional position.
///
/// Neighbors outside the frame take the nearest edge pixel's color with alpha `0`.
pub fn sample_bilinear(src: &Frame, xf: f64, yf: f64) -> [i32; 4] {
    let xf = xf.clamp(-1.0, f64::from(src.width) + 1.0);
    let yf = yf.clamp(-1.0, f64::from(src.height) + 1.0);
    let x0 = xf.floor();
    let y0 = yf.floor();
    let xw = 1.0 - (xf - x0);
    let yw = 1.0 - (yf - y0);
    let (x0, x1) = (x0 as i64, xf.ceil() as i64);
    let (y0, y1) = (y0 as i64, yf.ceil() as i64);

    let top = blend(fetch(src, x0, y0), fetch(src, x1, y0), xw);
    let bottom = blend(fetch(src, x0, y1), fetch(src, x1, y1), xw);
    blend(top, bottom, yw)
}

const OPAQUE_BLACK: Rgba = [0, 0, 0, 255];

/// Warp row `y` of `src` into `out`, which must be exactly one row of the output frame.
pub(crate) fn warp_row(src: &Frame, params: &WarpParams, ms: f64, y: u32, out: &mut [u8]) {
    let motion = row_motion(params, y, src.height, ms);
    let c = src.channels as usize;
    for (x, dst) in out.chunks_exact_mut(c).enumerate() {
        let xf = source_column(x as u32, motion.offset, src.width);
        let color = blend(sample_bilinear(src, xf, f64::from(y)), OPAQUE_BLACK, motion.alpha);
        for (d, v) in dst.iter_mut().zip(color) {
            *d = v.clamp(0, 255) as u8;
        }
    }
}

/// Check inputs shared by every backend and allocate the output frame.
pub(crate) fn prepare_output(src: &Frame, params: &WarpParams, ms: f64) -> ClipgridResult<Frame> {
    params.validate()?;
    if !ms.is_finite() {
        return Err(ClipgridError::kernel(format!("warp timestamp must be finite, got {ms}")));
    }
    let expected = src.stride() * src.height as usize;
    if src.data.len() != expected {
        return Err(ClipgridError::kernel(format!(
            "frame buffer has {} bytes, expected {expected}",
            src.data.len()
        )));
    }
    Frame::new(src.width, src.height, src.channels, vec![0u8; expected])
}

/// Warp one frame on the calling thread.
pub fn warp_frame(src: &Frame, params: &WarpParams, ms: f64) -> ClipgridResult<Frame> {
    let mut out = prepare_output(src, params, ms)?;
    let stride = out.stride();
    for (y, row) in out.data.chunks_exact_mut(stride).enumerate() {
        warp_row(src, params, ms, y as u32, row);
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/warp.rs"]
mod tests;
