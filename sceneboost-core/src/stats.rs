// ============================================================================
// sceneboost-core/src/stats.rs
// ============================================================================
//
// DIFF SERIES: Per-Frame Luma Statistics
//
// The DiffSeries is measured once per file and shared read-only by scene
// detection (scores and blackout detection) and frame sampling (diff ranking).
// It is persisted as four plain-text files, one value per line, so a resumed
// run skips the measurement pass.
//
// AI-ASSISTANT-INFO: Per-frame diff and luma statistics with checkpoint I/O

// ---- External crate imports ----
use log::{debug, info};
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

// ---- Internal crate imports ----
use crate::checkpoint::write_atomic;
use crate::error::{CoreError, CoreResult};
use crate::external::FrameSource;

const DIFF_FILE: &str = "luma-diff.txt";
const AVERAGE_FILE: &str = "luma-average.txt";
const MIN_FILE: &str = "luma-min.txt";
const MAX_FILE: &str = "luma-max.txt";

// ============================================================================
// SOURCE FORMAT
// ============================================================================

/// Quantisation range of the luma plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorRange {
    #[default]
    Limited,
    Full,
}

/// Bit depth and range of the measured plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumaFormat {
    pub bits: u32,
    pub range: ColorRange,
}

impl Default for LumaFormat {
    fn default() -> Self {
        Self {
            bits: 8,
            range: ColorRange::Limited,
        }
    }
}

impl LumaFormat {
    /// Scale from 8-bit code values to this bit depth.
    pub fn scale(&self) -> f64 {
        2f64.powi(self.bits as i32 - 8)
    }
}

// ============================================================================
// DIFF SERIES
// ============================================================================

/// Statistics of one frame's luma plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    /// Difference from the previous frame. Frame 0 is compared against itself.
    pub diff: f32,
    pub average: f32,
    pub min: f32,
    pub max: f32,
}

/// Per-frame statistics for a whole file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiffSeries {
    diff: Vec<f32>,
    average: Vec<f32>,
    min: Vec<f32>,
    max: Vec<f32>,
}

impl DiffSeries {
    /// Builds a series from parallel arrays, which must share one length.
    pub fn new(diff: Vec<f32>, average: Vec<f32>, min: Vec<f32>, max: Vec<f32>) -> CoreResult<Self> {
        let n = diff.len();
        if average.len() != n || min.len() != n || max.len() != n {
            return Err(CoreError::Checkpoint(format!(
                "luma statistics have mismatched lengths: diff {}, average {}, min {}, max {}",
                n,
                average.len(),
                min.len(),
                max.len()
            )));
        }
        Ok(Self {
            diff,
            average,
            min,
            max,
        })
    }

    /// Series with only diff values; luma stays mid-grey so no frame is a blackout.
    pub fn from_diffs(diff: Vec<f32>) -> Self {
        let n = diff.len();
        Self {
            diff,
            average: vec![128.0; n],
            min: vec![64.0; n],
            max: vec![192.0; n],
        }
    }

    pub fn from_frames(frames: impl IntoIterator<Item = FrameStats>) -> Self {
        let mut series = Self::default();
        for f in frames {
            series.diff.push(f.diff);
            series.average.push(f.average);
            series.min.push(f.min);
            series.max.push(f.max);
        }
        series
    }

    /// Measures every frame of `source`.
    pub fn measure(source: &dyn FrameSource) -> CoreResult<Self> {
        let frame_count = source.frame_count();
        info!("Measuring luma statistics for {frame_count} frames...");
        let mut frames = Vec::with_capacity(frame_count);
        for frame in 0..frame_count {
            frames.push(source.frame_stats(frame)?);
        }
        Ok(Self::from_frames(frames))
    }

    pub fn len(&self) -> usize {
        self.diff.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }

    pub fn diff(&self) -> &[f32] {
        &self.diff
    }

    pub fn average(&self) -> &[f32] {
        &self.average
    }

    pub fn min(&self) -> &[f32] {
        &self.min
    }

    pub fn max(&self) -> &[f32] {
        &self.max
    }

    pub fn frame(&self, index: usize) -> Option<FrameStats> {
        Some(FrameStats {
            diff: *self.diff.get(index)?,
            average: self.average[index],
            min: self.min[index],
            max: self.max[index],
        })
    }

    // ========================================================================
    // CHECKPOINT I/O
    // ========================================================================

    /// True when all four statistics files exist in `dir`.
    pub fn checkpoint_exists(dir: &Path) -> bool {
        [DIFF_FILE, AVERAGE_FILE, MIN_FILE, MAX_FILE]
            .iter()
            .all(|f| dir.join(f).is_file())
    }

    /// Writes the four statistics files into `dir`.
    pub fn save(&self, dir: &Path) -> CoreResult<()> {
        for (name, values) in [
            (DIFF_FILE, &self.diff),
            (AVERAGE_FILE, &self.average),
            (MIN_FILE, &self.min),
            (MAX_FILE, &self.max),
        ] {
            let mut body = String::with_capacity(values.len() * 14);
            for v in values {
                let _ = writeln!(body, "{v:.9}");
            }
            write_atomic(&dir.join(name), body.as_bytes())?;
        }
        debug!("Saved luma statistics for {} frames to {}", self.len(), dir.display());
        Ok(())
    }

    /// Loads the four statistics files from `dir`.
    pub fn load(dir: &Path) -> CoreResult<Self> {
        let series = Self::new(
            read_values(&dir.join(DIFF_FILE))?,
            read_values(&dir.join(AVERAGE_FILE))?,
            read_values(&dir.join(MIN_FILE))?,
            read_values(&dir.join(MAX_FILE))?,
        )?;
        debug!("Loaded luma statistics for {} frames from {}", series.len(), dir.display());
        Ok(series)
    }

    /// Loads the checkpoint if it exists and matches `frame_count`, otherwise
    /// measures `source` and saves the result.
    pub fn load_or_measure(dir: &Path, source: &dyn FrameSource) -> CoreResult<Self> {
        if Self::checkpoint_exists(dir) {
            let series = Self::load(dir)?;
            if series.len() == source.frame_count() {
                info!("Reusing luma statistics from {}", dir.display());
                return Ok(series);
            }
            info!(
                "Luma statistics checkpoint has {} frames but the source has {}. Remeasuring...",
                series.len(),
                source.frame_count()
            );
        }
        let series = Self::measure(source)?;
        series.save(dir)?;
        Ok(series)
    }
}

fn read_values(path: &Path) -> CoreResult<Vec<f32>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CoreError::Checkpoint(format!("failed to read '{}': {e}", path.display())))?;
    contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .enumerate()
        .map(|(i, l)| {
            l.parse::<f32>().map_err(|e| {
                CoreError::Checkpoint(format!("'{}' line {}: {e}", path.display(), i + 1))
            })
        })
        .collect()
}
