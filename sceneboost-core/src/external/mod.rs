// ============================================================================
// sceneboost-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL COLLABORATORS: Decoding, Encoding, Metrics and Segmentation
//
// The core never decodes video, runs an encoder, computes a perceptual metric
// or evaluates a segmentation network itself. Each of these is a trait here,
// so the pipeline can be driven by real tools, by recorded results on disk, or
// by mocks in tests.
//
// KEY COMPONENTS:
// - FrameSource: per-frame luma statistics of the source
// - SceneCutDetector: optional scene-cut flags for a frame range
// - ProbeEncoder: whole-file probe encodes at a given crf
// - MetricEvaluator: per-frame scores of a probe against the source
// - SegmentationModel: character-presence masks
// - files: JSON-backed implementations used by the command-line tool
//
// DESIGN PHILOSOPHY:
// All traits are `Sync` because scenes are processed in parallel and share one
// instance of each collaborator.
//
// AI-ASSISTANT-INFO: Traits for external tools plus recorded and mock implementations

// ============================================================================
// SUBMODULES
// ============================================================================

/// Collaborators backed by recorded JSON files
pub mod files;

#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use crate::config::{MetricMethod, ProbeConfig};
use crate::error::{CoreError, CoreResult};
use crate::roi::PresenceMask;
use crate::scenes::ScenesFile;
use crate::stats::{FrameStats, LumaFormat};

pub use files::{PresenceMaskFile, ProbeScoreFile, SceneCutFile};

// ============================================================================
// TRAITS
// ============================================================================

/// Source video as seen by the diff measurement.
pub trait FrameSource: Sync {
    fn frame_count(&self) -> usize;

    fn format(&self) -> LumaFormat;

    /// Statistics of frame `frame`. The diff of frame 0 is measured against a
    /// duplicate of itself.
    fn frame_stats(&self, frame: usize) -> CoreResult<FrameStats>;
}

/// Secondary scene-cut detector run over one zone.
pub trait SceneCutDetector: Sync {
    /// One flag per frame of `[start, end)`: 0, 0.5, 1 or 1.5.
    fn scene_cuts(&self, start: usize, end: usize) -> CoreResult<Vec<f32>>;
}

/// Reference to a finished probe encode.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeHandle {
    pub crf: f64,
    /// Encoded file, when the encoder produced one.
    pub path: Option<PathBuf>,
}

/// Encodes the whole file once per probe crf.
pub trait ProbeEncoder: Sync {
    fn encode(&self, crf: f64, probe: &ProbeConfig, scenes: &ScenesFile) -> CoreResult<ProbeHandle>;
}

/// Scores frames of a probe encode against the source.
pub trait MetricEvaluator: Sync {
    /// One score per entry of `frames` (absolute indices), in the same order.
    fn score_frames(&self, probe: &ProbeHandle, frames: &[usize]) -> CoreResult<Vec<f64>>;
}

/// Character-presence segmentation.
pub trait SegmentationModel: Sync {
    fn presence(&self, frame: usize) -> CoreResult<PresenceMask>;
}

// ============================================================================
// METRIC SELECTION
// ============================================================================

/// Evaluators available to a run, selected per zone by `MetricMethod`.
#[derive(Clone, Copy, Default)]
pub struct MetricEvaluators<'a> {
    pub ffvship: Option<&'a dyn MetricEvaluator>,
    pub vapoursynth: Option<&'a dyn MetricEvaluator>,
}

impl<'a> MetricEvaluators<'a> {
    /// The same evaluator for every method.
    pub fn single(evaluator: &'a dyn MetricEvaluator) -> Self {
        Self {
            ffvship: Some(evaluator),
            vapoursynth: Some(evaluator),
        }
    }

    pub fn get(&self, method: MetricMethod) -> CoreResult<&'a dyn MetricEvaluator> {
        let evaluator = match method {
            MetricMethod::Ffvship => self.ffvship,
            MetricMethod::Vapoursynth => self.vapoursynth,
        };
        evaluator.ok_or_else(|| CoreError::Config(format!("no metric evaluator available for {method:?}")))
    }
}

/// Checks that an evaluator returned one score per requested frame.
pub(crate) fn check_score_count(scores: &[f64], frames: &[usize]) -> CoreResult<()> {
    if scores.len() != frames.len() {
        return Err(CoreError::External(format!(
            "metric returned {} scores for {} frames",
            scores.len(),
            frames.len()
        )));
    }
    Ok(())
}
