// sceneboost-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use std::sync::Mutex;

use crate::config::ProbeConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{
    FrameSource, MetricEvaluator, ProbeEncoder, ProbeHandle, SceneCutDetector, SegmentationModel,
};
use crate::roi::PresenceMask;
use crate::scenes::ScenesFile;
use crate::stats::{FrameStats, LumaFormat};

/// Frame source replaying fixed statistics.
#[derive(Debug, Clone)]
pub struct MockFrameSource {
    pub frames: Vec<FrameStats>,
    pub format: LumaFormat,
}

impl MockFrameSource {
    /// Mid-grey frames with the given diffs.
    pub fn from_diffs(diffs: Vec<f32>) -> Self {
        let frames = diffs
            .into_iter()
            .map(|diff| FrameStats {
                diff,
                average: 128.0,
                min: 64.0,
                max: 192.0,
            })
            .collect();
        Self {
            frames,
            format: LumaFormat::default(),
        }
    }
}

impl FrameSource for MockFrameSource {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn format(&self) -> LumaFormat {
        self.format
    }

    fn frame_stats(&self, frame: usize) -> CoreResult<FrameStats> {
        self.frames
            .get(frame)
            .copied()
            .ok_or_else(|| CoreError::External(format!("mock source has no frame {frame}")))
    }
}

/// Scene-cut flags for the whole file, sliced per zone.
#[derive(Debug, Clone)]
pub struct MockSceneCuts {
    flags: Vec<f32>,
}

impl MockSceneCuts {
    pub fn new(flags: Vec<f32>) -> Self {
        Self { flags }
    }
}

impl SceneCutDetector for MockSceneCuts {
    fn scene_cuts(&self, start: usize, end: usize) -> CoreResult<Vec<f32>> {
        Ok(self.flags[start..end].to_vec())
    }
}

/// Records every crf it is asked to encode.
#[derive(Debug, Default)]
pub struct MockProbeEncoder {
    pub encoded: Mutex<Vec<f64>>,
    pub fail: bool,
}

impl MockProbeEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn encoded_crfs(&self) -> Vec<f64> {
        self.encoded.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl ProbeEncoder for MockProbeEncoder {
    fn encode(&self, crf: f64, _probe: &ProbeConfig, _scenes: &ScenesFile) -> CoreResult<ProbeHandle> {
        if self.fail {
            return Err(CoreError::External(format!("mock encode at crf {crf} failed")));
        }
        if let Ok(mut encoded) = self.encoded.lock() {
            encoded.push(crf);
        }
        Ok(ProbeHandle { crf, path: None })
    }
}

/// Metric whose score is `slope * crf + intercept + per-frame offset`.
#[derive(Debug, Clone)]
pub struct LinearMockMetric {
    pub slope: f64,
    pub intercept: f64,
    /// Added to the score of a frame, indexed by absolute frame.
    pub frame_offsets: Vec<f64>,
}

impl LinearMockMetric {
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self {
            slope,
            intercept,
            frame_offsets: Vec::new(),
        }
    }
}

impl MetricEvaluator for LinearMockMetric {
    fn score_frames(&self, probe: &ProbeHandle, frames: &[usize]) -> CoreResult<Vec<f64>> {
        Ok(frames
            .iter()
            .map(|&f| {
                let offset = self.frame_offsets.get(f).copied().unwrap_or(0.0);
                self.slope * probe.crf + self.intercept + offset
            })
            .collect())
    }
}

/// Segmentation returning the same presence for every frame.
#[derive(Debug, Clone)]
pub struct MockSegmentation {
    pub mask: PresenceMask,
}

impl MockSegmentation {
    pub fn uniform(width: usize, height: usize, presence: f32) -> Self {
        Self {
            mask: PresenceMask::filled(width, height, presence),
        }
    }
}

impl SegmentationModel for MockSegmentation {
    fn presence(&self, _frame: usize) -> CoreResult<PresenceMask> {
        Ok(self.mask.clone())
    }
}
