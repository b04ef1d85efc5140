//! Character-presence masks and their pooling onto the 64-pixel block grid.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Presence at or below this probability counts as absent.
pub const PRESENCE_THRESHOLD: f32 = 0.95;

/// Side length of one ROI block in pixels.
pub const BLOCK_SIZE: usize = 64;

/// Per-pixel character presence probabilities, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceMask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl PresenceMask {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> CoreResult<Self> {
        let mask = Self { width, height, data };
        mask.validate()?;
        Ok(mask)
    }

    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.width == 0 || self.height == 0 || self.data.len() != self.width * self.height {
            return Err(CoreError::External(format!(
                "presence mask of {}x{} carries {} values",
                self.width,
                self.height,
                self.data.len()
            )));
        }
        Ok(())
    }

    /// Thresholds every pixel and averages each 64x64 block. Edge blocks
    /// average over the pixels they actually cover.
    pub fn block_grid(&self) -> BlockGrid {
        let cols = self.width.div_ceil(BLOCK_SIZE);
        let rows = self.height.div_ceil(BLOCK_SIZE);
        let mut sums = vec![0.0f64; cols * rows];
        let mut counts = vec![0usize; cols * rows];

        for (y, row) in self.data.chunks(self.width).enumerate() {
            let block_row = (y / BLOCK_SIZE) * cols;
            for (x, &p) in row.iter().enumerate() {
                let block = block_row + x / BLOCK_SIZE;
                if p > PRESENCE_THRESHOLD {
                    sums[block] += p as f64;
                }
                counts[block] += 1;
            }
        }

        let values = sums
            .iter()
            .zip(&counts)
            .map(|(&s, &c)| if c == 0 { 0.0 } else { s / c as f64 })
            .collect();
        BlockGrid { cols, rows, values }
    }
}

/// Row-major per-block values.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockGrid {
    pub cols: usize,
    pub rows: usize,
    pub values: Vec<f64>,
}

impl BlockGrid {
    pub fn filled(cols: usize, rows: usize, value: f64) -> Self {
        Self {
            cols,
            rows,
            values: vec![value; cols * rows],
        }
    }

    /// Value at `(col, row)` with out-of-range coordinates clamped to the edge.
    pub fn at_clamped(&self, col: isize, row: isize) -> f64 {
        let c = col.clamp(0, self.cols as isize - 1) as usize;
        let r = row.clamp(0, self.rows as isize - 1) as usize;
        self.values[r * self.cols + c]
    }
}
