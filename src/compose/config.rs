use std::path::Path;

use crate::clip::core::ClipDefaults;
use crate::cluster::sequencer::ClusterConfig;
use crate::foundation::core::{Canvas, Fps, ValueRange};
use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::model::grid::{GridLayout, GridSize};
use crate::render::backend::WarpBackendKind;
use crate::render::pipeline::RenderThreading;

/// Output canvas and run-wide settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub fps: Fps,
    pub pad_start_ms: u64,
    pub seed: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: Fps { num: 30, den: 1 },
            pad_start_ms: 2000,
            seed: 3,
        }
    }
}

/// Grid sizes; `start`/`end` default to `grid`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub grid: GridSize,
    pub start_grid: Option<GridSize>,
    pub end_grid: Option<GridSize>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid: GridSize {
                cols: 128,
                rows: 128,
            },
            start_grid: None,
            end_grid: None,
        }
    }
}

/// Settings of the slice composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SliceConfig {
    /// Play volume range; quieter toward the middle of the cycle.
    pub volume_range: ValueRange,
    /// Row cycle duration range for one cycle.
    pub cycle_range_ms: ValueRange,
    /// Number of cycles the warp runs through.
    pub cycles: u32,
    /// Play duration range; shorter toward the middle of the cycle.
    pub play_dur_range: ValueRange,
    /// Extra echo delay range.
    pub delay_dur_range: ValueRange,
    /// Total number of plays to schedule.
    pub clips_to_play: usize,
    /// Spacing of the beat grid plays snap to.
    pub min_beat_ms: u64,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            volume_range: ValueRange { min: 0.8, max: 1.0 },
            cycle_range_ms: ValueRange {
                min: 32000.0,
                max: 48000.0,
            },
            cycles: 2,
            play_dur_range: ValueRange {
                min: 64.0,
                max: 128.0,
            },
            delay_dur_range: ValueRange {
                min: 64.0,
                max: 512.0,
            },
            clips_to_play: 2048,
            min_beat_ms: 64,
        }
    }
}

/// Settings of the stretch composition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StretchConfig {
    /// Play volume range; quieter as clips stretch and the grid zooms out.
    pub volume_range: ValueRange,
    /// Time a clip takes to stretch to full height.
    pub stretch_duration_ms: u64,
    /// Target stretched length of one play.
    pub stretch_to_ms: u64,
    /// Delay between successive column pairs.
    pub step_ms: u64,
    /// Point of the composition, as a fraction, where clips start shrinking back.
    pub transition_back_at: f64,
}

impl Default for StretchConfig {
    fn default() -> Self {
        Self {
            volume_range: ValueRange {
                min: 0.25,
                max: 0.6,
            },
            stretch_duration_ms: 16384,
            stretch_to_ms: 8192,
            step_ms: 2048,
            transition_back_at: 0.5,
        }
    }
}

/// The immutable per-render configuration record.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompositionConfig {
    pub canvas: CanvasConfig,
    pub grid: GridConfig,
    pub clip: ClipDefaults,
    pub brightness_range: BrightnessRange,
    pub slice: SliceConfig,
    pub stretch: StretchConfig,
    pub cluster: ClusterConfig,
    pub cluster_dot_size: ClusterDotSize,
    pub render: RenderThreading,
    pub backend: WarpBackendKind,
}

/// Brightness range wrapper with its own default.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BrightnessRange(pub ValueRange);

impl Default for BrightnessRange {
    fn default() -> Self {
        Self(ValueRange { min: 0.2, max: 1.0 })
    }
}

/// Cluster dot size wrapper with its own default.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClusterDotSize(pub f64);

impl Default for ClusterDotSize {
    fn default() -> Self {
        Self(8.0)
    }
}

impl CompositionConfig {
    /// Parse from JSON text. Missing fields take their defaults.
    pub fn from_json(text: &str) -> ClipgridResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ClipgridError::configuration(format!("parse config JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ClipgridResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ClipgridError::configuration(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.canvas.width,
            height: self.canvas.height,
        }
    }

    /// Grid layout contract derived from the canvas and grid sizes.
    pub fn layout(&self) -> GridLayout {
        let grid = self.grid.grid;
        GridLayout {
            canvas: self.canvas(),
            grid,
            start: self.grid.start_grid.unwrap_or(grid),
            end: self.grid.end_grid.unwrap_or(grid),
        }
    }

    /// Check every value; called by every composition builder before scheduling.
    pub fn validate(&self) -> ClipgridResult<()> {
        let c = &self.canvas;
        if c.width == 0 || c.height == 0 {
            return Err(ClipgridError::configuration(format!(
                "canvas must be non-empty, got {}x{}",
                c.width, c.height
            )));
        }
        Fps::new(c.fps.num, c.fps.den)?;
        for g in [
            Some(self.grid.grid),
            self.grid.start_grid,
            self.grid.end_grid,
        ]
        .into_iter()
        .flatten()
        {
            GridSize::new(g.cols, g.rows)?;
        }

        if !(0.0..=1.0).contains(&self.clip.fade_in_pct)
            || !(0.0..=1.0).contains(&self.clip.fade_out_pct)
        {
            return Err(ClipgridError::configuration(
                "clip fade percentages must be within [0, 1]",
            ));
        }
        unit_range("clip reverb", ValueRange::new(self.clip.reverb, self.clip.reverb)?)?;
        if !(self.cluster_dot_size.0.is_finite() && self.cluster_dot_size.0 > 0.0) {
            return Err(ClipgridError::configuration("cluster_dot_size must be > 0"));
        }
        if self.brightness_range.0.min < 0.0 {
            return Err(ClipgridError::configuration("brightness_range must be >= 0"));
        }

        let s = &self.slice;
        unit_range("slice.volume_range", s.volume_range)?;
        if s.cycle_range_ms.min <= 0.0 {
            return Err(ClipgridError::configuration("slice.cycle_range_ms must be > 0"));
        }
        if s.cycles == 0 {
            return Err(ClipgridError::configuration("slice.cycles must be >= 1"));
        }
        if s.play_dur_range.min < 1.0 {
            return Err(ClipgridError::configuration("slice.play_dur_range must be >= 1"));
        }
        if s.delay_dur_range.min < 0.0 {
            return Err(ClipgridError::configuration("slice.delay_dur_range must be >= 0"));
        }
        if s.min_beat_ms == 0 {
            return Err(ClipgridError::configuration("slice.min_beat_ms must be >= 1"));
        }

        let st = &self.stretch;
        unit_range("stretch.volume_range", st.volume_range)?;
        if st.stretch_duration_ms == 0 || st.stretch_to_ms == 0 {
            return Err(ClipgridError::configuration(
                "stretch durations must be >= 1 ms",
            ));
        }
        if !(0.0..=1.0).contains(&st.transition_back_at) {
            return Err(ClipgridError::configuration(
                "stretch.transition_back_at must be within [0, 1]",
            ));
        }

        unit_range("cluster.volume_range", self.cluster.volume_range)?;
        self.cluster.validate()?;

        if self.render.threads == Some(0) {
            return Err(ClipgridError::configuration(
                "render.threads must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

fn unit_range(name: &str, r: ValueRange) -> ClipgridResult<()> {
    if r.min < 0.0 || r.max > 1.0 {
        return Err(ClipgridError::configuration(format!(
            "{name} must lie within [0, 1], got [{}, {}]",
            r.min, r.max
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/config.rs"]
mod tests;
