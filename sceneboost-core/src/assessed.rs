//! Values that carry an optional diagnostic.
//!
//! Some stages can always produce a usable value but may have had to fall
//! back to a degraded method to do so. `Assessed<T>` pairs the value with the
//! reason, so callers never need error-based control flow to get a result.

use std::fmt;

/// Why a value was produced by a fallback path.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Frame scores fell under the sanity floor; the floored aggregate was used.
    UnreliableSummarisation { floor: f64, low_frames: usize },
    /// The fitted slope contradicted the quality direction; a step function was used.
    UnreliableModel { reason: String },
    /// Even the best crf bound misses the target.
    TargetUnreachable { crf: f64, predicted: f64, target: f64 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnreliableSummarisation { floor, low_frames } => write!(
                f,
                "Unreliable summarisation / {low_frames} frame(s) scored below {floor:.0}, which may result in overboosting"
            ),
            Diagnostic::UnreliableModel { reason } => write!(f, "Unreliable model / {reason}"),
            Diagnostic::TargetUnreachable {
                crf,
                predicted,
                target,
            } => write!(
                f,
                "Potential low quality scene / The predicted quality at crf {crf:.2} is {predicted:.3}, which misses the target {target:.3}"
            ),
        }
    }
}

/// A usable value plus an optional diagnostic describing how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessed<T> {
    pub value: T,
    pub diagnostic: Option<Diagnostic>,
}

impl<T> Assessed<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            diagnostic: None,
        }
    }

    pub fn with_diagnostic(value: T, diagnostic: Diagnostic) -> Self {
        Self {
            value,
            diagnostic: Some(diagnostic),
        }
    }

    pub fn is_reliable(&self) -> bool {
        self.diagnostic.is_none()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Assessed<U> {
        Assessed {
            value: f(self.value),
            diagnostic: self.diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_keeps_diagnostic() {
        let a = Assessed::with_diagnostic(
            2,
            Diagnostic::UnreliableModel {
                reason: "flat".into(),
            },
        );
        let b = a.map(|v| v * 10);
        assert_eq!(b.value, 20);
        assert!(!b.is_reliable());
    }

    #[test]
    fn display_mentions_target() {
        let d = Diagnostic::TargetUnreachable {
            crf: 8.0,
            predicted: 0.9,
            target: 0.62,
        };
        assert!(d.to_string().contains("0.620"));
    }
}
