// ============================================================================
// sceneboost-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Fatal Error Types for SceneBoost
//
// Every condition that aborts a run is a variant of `CoreError`. Conditions
// that still produce a usable value (unreliable summarisation, unreliable
// model, unreachable target) are not errors; see `crate::assessed`.
//
// AI-ASSISTANT-INFO: Error types and result alias for sceneboost-core

use thiserror::Error;

/// Fatal errors raised by sceneboost-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zone file parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Zones overlap: zone starting at frame {start} begins before the previous zone ends at frame {previous_end}")]
    ZoneOverlap { start: usize, previous_end: usize },

    #[error("Invalid zone: {0}")]
    InvalidZone(String),

    #[error("Unknown zone key '{0}'")]
    UnknownZoneKey(String),

    #[error("Invalid external scenes: {0}")]
    ExternalScenes(String),

    #[error("Scene [{start}:{end}] is shorter than min_scene_len {min_scene_len}")]
    SceneLength {
        start: usize,
        end: usize,
        min_scene_len: usize,
    },

    #[error("Invalid scene partition: {0}")]
    Partition(String),

    #[error("Checkpoint error: {0}")]
    Checkpoint(String),

    #[error("External collaborator failed: {0}")]
    External(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for sceneboost-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
