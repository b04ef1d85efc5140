// ============================================================================
// sceneboost-core/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Pipeline Progress Callbacks and Events
//
// The pipeline reports its progress through a callback so the core stays free
// of presentation concerns. The command-line tool turns these events into
// progress bars; tests and library users can ignore them.
//
// KEY COMPONENTS:
// - ProgressEvent: stage starts, per-scene completion, stage completion
// - ProgressCallback: trait for receiving events from worker threads
// - NullProgressCallback: no-op implementation
//
// AI-ASSISTANT-INFO: Progress reporting abstractions and callback system

// ---- Standard library imports ----
use std::fmt;

// ============================================================================
// PROGRESS EVENTS
// ============================================================================

/// Pipeline stages that report progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Measure,
    ProbeEncode,
    Boost,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Measure => write!(f, "Measuring"),
            Stage::ProbeEncode => write!(f, "Probe encoding"),
            Stage::Boost => write!(f, "Calculating boost"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A stage with `total` units of work has started.
    StageStart { stage: Stage, total: usize },

    /// One probe encode finished.
    ProbeDone { crf: f64 },

    /// One scene finished; events may arrive out of scene order.
    SceneDone { index: usize, final_crf: f64 },

    StageComplete { stage: Stage },
}

// ============================================================================
// PROGRESS CALLBACK
// ============================================================================

/// Receives progress events, possibly from several threads at once.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// No-op implementation of ProgressCallback.
#[derive(Debug, Clone, Default)]
pub struct NullProgressCallback;

impl ProgressCallback for NullProgressCallback {
    fn on_progress(&self, _event: ProgressEvent) {}
}
