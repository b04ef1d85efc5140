// ============================================================================
// sceneboost-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Naming the file behind a failure
//
// Every command reads or writes checkpoint, zone and JSON files. Core errors
// say what went wrong but not which of those files was involved, so the CLI
// wraps them as "Failed to <action> '<path>': <cause>".
//
// AI-ASSISTANT-INFO: CLI error handling utilities

// ---- Internal crate imports ----
use sceneboost_core::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::fmt;
use std::path::Path;

/// Type alias for CLI results using CoreError.
pub type CliResult<T> = CoreResult<T>;

/// Adds the file and the attempted action to a failed file operation.
pub trait FileContext<T> {
    /// `action` reads as a verb phrase, e.g. "load scene cuts from".
    fn file_context(self, action: impl fmt::Display, path: &Path) -> CliResult<T>;
}

impl<T, E> FileContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn file_context(self, action: impl fmt::Display, path: &Path) -> CliResult<T> {
        self.map_err(|e| {
            let cause: CoreError = e.into();
            CoreError::OperationFailed(format!("Failed to {action} '{}': {cause}", path.display()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_action_and_file() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result
            .file_context("load scenes from", Path::new("work/scenes.json"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation failed: Failed to load scenes from 'work/scenes.json': IO error: gone"
        );
    }

    #[test]
    fn core_errors_keep_their_message() {
        let result: CoreResult<()> = Err(CoreError::InvalidZone("0 60".into()));
        let err = result.file_context("load zones file", Path::new("zones.txt")).unwrap_err();
        assert!(matches!(err, CoreError::OperationFailed(ref m)
            if m == "Failed to load zones file 'zones.txt': Invalid zone: 0 60"));
    }
}
