use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ClipgridError, ClipgridResult};
use crate::model::sample::Sample;

/// Grid dimensions in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "GridSizeRepr")]
pub struct GridSize {
    pub cols: u32,
    pub rows: u32,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum GridSizeRepr {
    Text(String),
    Fields { cols: u32, rows: u32 },
}

impl TryFrom<GridSizeRepr> for GridSize {
    type Error = ClipgridError;

    fn try_from(repr: GridSizeRepr) -> Result<Self, Self::Error> {
        match repr {
            GridSizeRepr::Text(s) => s.parse(),
            GridSizeRepr::Fields { cols, rows } => Self::new(cols, rows),
        }
    }
}

impl GridSize {
    /// Create a grid size with both dimensions > 0.
    pub fn new(cols: u32, rows: u32) -> ClipgridResult<Self> {
        if cols == 0 || rows == 0 {
            return Err(ClipgridError::configuration(format!(
                "grid size must be at least 1x1, got {cols}x{rows}"
            )));
        }
        Ok(Self { cols, rows })
    }

    pub fn cells(self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

impl FromStr for GridSize {
    type Err = ClipgridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed =
            || ClipgridError::configuration(format!("grid size must look like '32x32', got '{s}'"));
        let (cols, rows) = s.trim().split_once(['x', 'X']).ok_or_else(malformed)?;
        let cols = cols.trim().parse::<u32>().map_err(|_| malformed())?;
        let rows = rows.trim().parse::<u32>().map_err(|_| malformed())?;
        Self::new(cols, rows)
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.cols, self.rows)
    }
}

/// Grid placement contract handed over by the feature builder.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub canvas: Canvas,
    pub grid: GridSize,
    pub start: GridSize,
    pub end: GridSize,
}

impl GridLayout {
    /// Size of one cell in canvas pixels.
    pub fn cell_size(&self) -> (f64, f64) {
        (
            f64::from(self.canvas.width) / f64::from(self.grid.cols),
            f64::from(self.canvas.height) / f64::from(self.grid.rows),
        )
    }

    /// Canvas position of the center of cell `(col, row)`.
    pub fn cell_center(&self, col: u32, row: u32) -> (f64, f64) {
        let (w, h) = self.cell_size();
        ((f64::from(col) + 0.5) * w, (f64::from(row) + 0.5) * h)
    }

    pub fn index_of(&self, col: u32, row: u32) -> usize {
        row as usize * self.grid.cols as usize + col as usize
    }

    /// Container scale at the start and the end of the zoom.
    pub fn zoom_scales(&self) -> (f64, f64) {
        let cols = f64::from(self.grid.cols);
        (
            cols / f64::from(self.start.cols),
            cols / f64::from(self.end.cols),
        )
    }

    /// Validate grid positions and return the samples in row-major order.
    ///
    /// Positions must lie inside the grid and be unique.
    pub fn arrange(&self, mut samples: Vec<Sample>) -> ClipgridResult<Vec<Sample>> {
        let mut seen = BTreeSet::<(u32, u32)>::new();
        for s in &samples {
            if s.col >= self.grid.cols || s.row >= self.grid.rows {
                return Err(ClipgridError::validation(format!(
                    "sample at ({}, {}) lies outside the {} grid",
                    s.col, s.row, self.grid
                )));
            }
            if !seen.insert((s.row, s.col)) {
                return Err(ClipgridError::validation(format!(
                    "duplicate sample at grid position ({}, {})",
                    s.col, s.row
                )));
            }
        }
        samples.sort_by_key(|s| (s.row, s.col));
        Ok(samples)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/grid.rs"]
mod tests;
