//! Reduction of per-frame metric scores to one score per probe encode.

use serde::{Deserialize, Serialize};

use crate::assessed::{Assessed, Diagnostic};
use crate::error::{CoreError, CoreResult};
use crate::utils::{PercentileMethod, percentile};

/// Scores below this are floored by the harmonic mean.
pub const HARMONIC_MEAN_FLOOR: f64 = 15.0;

/// How frame scores of one scene are summarised.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Summariser {
    /// Worst frame of a lower-is-better metric.
    #[default]
    Max,
    /// Worst frame of a higher-is-better metric.
    Min,
    /// Median-unbiased percentile, `percentile` in [0, 100].
    Percentile { percentile: f64 },
    /// Harmonic mean with scores floored at 15.
    HarmonicMean,
    /// `mean(s^3)^(1/3)`.
    RootMeanCube,
}

impl Summariser {
    pub fn validate(&self) -> CoreResult<()> {
        if let Summariser::Percentile { percentile } = *self {
            if !(0.0..=100.0).contains(&percentile) {
                return Err(CoreError::Config(format!(
                    "summariser percentile must be within [0, 100], got {percentile}"
                )));
            }
        }
        Ok(())
    }

    /// Summarises `scores`. An empty slice yields NaN.
    pub fn summarise(&self, scores: &[f64]) -> Assessed<f64> {
        if scores.is_empty() {
            return Assessed::ok(f64::NAN);
        }
        let n = scores.len() as f64;

        match *self {
            Summariser::Max => Assessed::ok(scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            Summariser::Min => Assessed::ok(scores.iter().copied().fold(f64::INFINITY, f64::min)),
            Summariser::Percentile { percentile: p } => Assessed::ok(
                percentile(scores, p, PercentileMethod::MedianUnbiased).unwrap_or(f64::NAN),
            ),
            Summariser::RootMeanCube => {
                Assessed::ok((scores.iter().map(|s| s.powi(3)).sum::<f64>() / n).cbrt())
            }
            Summariser::HarmonicMean => {
                let low_frames = scores.iter().filter(|&&s| s < HARMONIC_MEAN_FLOOR).count();
                let mean = n / scores
                    .iter()
                    .map(|&s| 1.0 / s.max(HARMONIC_MEAN_FLOOR))
                    .sum::<f64>();
                if low_frames > 0 {
                    Assessed::with_diagnostic(
                        mean,
                        Diagnostic::UnreliableSummarisation {
                            floor: HARMONIC_MEAN_FLOOR,
                            low_frames,
                        },
                    )
                } else {
                    Assessed::ok(mean)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes() {
        let scores = [0.4, 0.9, 0.6];
        assert_eq!(Summariser::Max.summarise(&scores).value, 0.9);
        assert_eq!(Summariser::Min.summarise(&scores).value, 0.4);
    }

    #[test]
    fn root_mean_cube() {
        let v = Summariser::RootMeanCube.summarise(&[1.0, 2.0]).value;
        assert!((v - 4.5f64.cbrt()).abs() < 1e-12);
    }

    #[test]
    fn harmonic_mean_floors_low_scores() {
        let clean = Summariser::HarmonicMean.summarise(&[60.0, 80.0]);
        assert!(clean.is_reliable());
        assert!((clean.value - 2.0 / (1.0 / 60.0 + 1.0 / 80.0)).abs() < 1e-9);

        let floored = Summariser::HarmonicMean.summarise(&[5.0, 60.0]);
        assert!((floored.value - 2.0 / (1.0 / 15.0 + 1.0 / 60.0)).abs() < 1e-9);
        assert_eq!(
            floored.diagnostic,
            Some(Diagnostic::UnreliableSummarisation {
                floor: 15.0,
                low_frames: 1
            })
        );
    }

    #[test]
    fn percentile_uses_median_unbiased() {
        let s = Summariser::Percentile { percentile: 50.0 };
        assert!((s.summarise(&[1.0, 2.0, 3.0, 4.0]).value - 2.5).abs() < 1e-12);
    }

    #[test]
    fn percentile_out_of_range_is_rejected() {
        assert!(Summariser::Percentile { percentile: 101.0 }.validate().is_err());
        assert!(Summariser::Max.validate().is_ok());
    }

    #[test]
    fn tagged_json() {
        let s: Summariser = serde_json::from_str(r#"{"method":"harmonic_mean"}"#).unwrap();
        assert_eq!(s, Summariser::HarmonicMean);
    }
}
