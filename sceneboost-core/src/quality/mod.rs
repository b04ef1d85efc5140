// ============================================================================
// sceneboost-core/src/quality/mod.rs
// ============================================================================
//
// QUALITY: From Probe Scores to a Target-Meeting Crf
//
// Per scene, frame scores of each probe encode are summarised into one number,
// a constrained linear model is fitted over (crf, score) pairs, and the model is
// inverted to find the crf that still meets the metric target. A final
// adjustment then compensates for the slower preset of the real encode.
//
// KEY COMPONENTS:
// - Comparator / CrfResponse: which direction is "better" and how the metric
//   is expected to move with crf
// - Summariser: frame scores -> one score per probe
// - QualityModel: fitted curve or step-function fallback
// - solve: inversion of the model into [min_crf, max_crf]
// - adjust: final crf compensation and rounding
//
// AI-ASSISTANT-INFO: Quality modelling and crf solving per scene

pub mod adjust;
pub mod model;
pub mod solver;
pub mod summarise;

// ---- External crate imports ----
use serde::{Deserialize, Serialize};

pub use adjust::{adjust_final_crf, round_to_quarter};
pub use model::{ProbeResult, QualityModel};
pub use solver::solve;
pub use summarise::Summariser;

/// Tolerance used when checking whether a score meets the target.
pub const MEETS_TOLERANCE: f64 = 1e-9;

/// Which direction of the metric is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    /// Distance metrics such as Butteraugli.
    LowerIsBetter,
    /// Similarity metrics such as SSIMULACRA2.
    HigherIsBetter,
}

impl Comparator {
    /// Whether `a` is strictly better than `b`.
    pub fn better(self, a: f64, b: f64) -> bool {
        match self {
            Comparator::LowerIsBetter => a < b,
            Comparator::HigherIsBetter => a > b,
        }
    }

    /// Whether `score` is equal to or better than `target`.
    pub fn meets(self, score: f64, target: f64) -> bool {
        match self {
            Comparator::LowerIsBetter => score <= target + MEETS_TOLERANCE,
            Comparator::HigherIsBetter => score >= target - MEETS_TOLERANCE,
        }
    }

    /// The better of two scores.
    pub fn best(self, a: f64, b: f64) -> f64 {
        if self.better(b, a) { b } else { a }
    }
}

/// How the metric responds as crf rises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrfResponse {
    /// The metric gets better as crf rises.
    #[default]
    Improves,
    /// The metric gets worse as crf rises.
    Degrades,
}

impl CrfResponse {
    /// Sign the fitted slope must have: -1.0 or 1.0.
    pub fn expected_slope_sign(self, comparator: Comparator) -> f64 {
        let improving = match comparator {
            Comparator::LowerIsBetter => -1.0,
            Comparator::HigherIsBetter => 1.0,
        };
        match self {
            CrfResponse::Improves => improving,
            CrfResponse::Degrades => -improving,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meets_is_inclusive() {
        assert!(Comparator::LowerIsBetter.meets(15.0, 15.0));
        assert!(Comparator::LowerIsBetter.meets(14.0, 15.0));
        assert!(!Comparator::LowerIsBetter.meets(15.1, 15.0));
        assert!(Comparator::HigherIsBetter.meets(80.0, 80.0));
        assert!(!Comparator::HigherIsBetter.meets(79.9, 80.0));
    }

    #[test]
    fn slope_sign_follows_response() {
        assert_eq!(CrfResponse::Improves.expected_slope_sign(Comparator::LowerIsBetter), -1.0);
        assert_eq!(CrfResponse::Degrades.expected_slope_sign(Comparator::LowerIsBetter), 1.0);
        assert_eq!(CrfResponse::Degrades.expected_slope_sign(Comparator::HigherIsBetter), -1.0);
    }

    #[test]
    fn names_are_snake_case() {
        let c: Comparator = serde_json::from_str("\"higher_is_better\"").unwrap();
        assert_eq!(c, Comparator::HigherIsBetter);
        let r: CrfResponse = serde_json::from_str("\"degrades\"").unwrap();
        assert_eq!(r, CrfResponse::Degrades);
    }
}
