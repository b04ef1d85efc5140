// ============================================================================
// sceneboost-core/src/quality/model.rs
// ============================================================================
//
// QUALITY MODEL: Constrained Linear Fit of Score against Crf
//
// The model is `score = a * crf + b`, fitted by minimising a weighted mean
// squared error in which residuals on the worse side of the comparator count
// double. The slope is constrained to the sign expected from `CrfResponse`.
//
// The fit starts from ordinary least squares and is refined with iteratively
// re-weighted least squares: weights are recomputed from the residuals, the
// weighted line is solved in closed form, and a wrong-signed slope is projected
// to zero (the weighted mean). The loop stops when the weights stop changing.
//
// Below crf 11 the prediction bends: `a * (12 - (12 - crf)^1.12) + b`, which
// assumes quality climbs faster than linearly at very low crfs.
//
// When no usable slope exists the model falls back to a step function over the
// probes and carries an `UnreliableModel` diagnostic.
//
// AI-ASSISTANT-INFO: Asymmetric weighted linear regression with sign constraint

// ---- Internal crate imports ----
use crate::assessed::{Assessed, Diagnostic};
use crate::error::{CoreError, CoreResult};
use crate::quality::{Comparator, CrfResponse};

/// Slopes with magnitude at or below this are treated as flat.
pub const FLAT_SLOPE: f64 = 1e-7;

/// Weight of a residual on the worse side of the comparator.
const WORSE_SIDE_WEIGHT: f64 = 2.0;

const MAX_ITERATIONS: usize = 64;

/// Crf below which the prediction curves away from the line.
const BEND_CRF: f64 = 11.0;
const BEND_PIVOT: f64 = 12.0;
const BEND_EXPONENT: f64 = 1.12;

/// Summarised scores of one scene, one per probe crf.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub crfs: Vec<f64>,
    pub scores: Vec<f64>,
}

impl ProbeResult {
    pub fn new(crfs: Vec<f64>, scores: Vec<f64>) -> CoreResult<Self> {
        if crfs.len() != scores.len() {
            return Err(CoreError::OperationFailed(format!(
                "{} probe crfs but {} scores",
                crfs.len(),
                scores.len()
            )));
        }
        Ok(Self { crfs, scores })
    }

    pub fn len(&self) -> usize {
        self.crfs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crfs.is_empty()
    }

    fn sorted_by_crf(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self.crfs.iter().copied().zip(self.scores.iter().copied()).collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
    }

    fn distinct_crfs(&self) -> usize {
        let mut crfs = self.crfs.clone();
        crfs.sort_by(f64::total_cmp);
        crfs.dedup();
        crfs.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Curve {
    Linear { slope: f64, intercept: f64 },
    /// Probe points sorted by crf.
    Step { points: Vec<(f64, f64)> },
}

/// Predicts the summarised score of a scene at any crf.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityModel {
    curve: Curve,
    probe_crfs: Vec<f64>,
}

impl QualityModel {
    /// Fits the model. Never fails: an unusable fit yields the step fallback
    /// with an `UnreliableModel` diagnostic.
    pub fn fit(probes: &ProbeResult, comparator: Comparator, response: CrfResponse) -> Assessed<QualityModel> {
        let probe_crfs = probes.crfs.clone();
        let fallback = |reason: String| {
            Assessed::with_diagnostic(
                QualityModel {
                    curve: Curve::Step {
                        points: probes.sorted_by_crf(),
                    },
                    probe_crfs: probe_crfs.clone(),
                },
                Diagnostic::UnreliableModel { reason },
            )
        };

        if probes.distinct_crfs() < 2 {
            return fallback("Fewer than two distinct probe crfs".to_string());
        }
        if probes.scores.iter().any(|s| !s.is_finite()) {
            return fallback("Probe scores are not finite".to_string());
        }

        let sign = response.expected_slope_sign(comparator);
        let (slope, intercept) = constrained_fit(&probes.crfs, &probes.scores, comparator, sign);

        if !slope.is_finite() || !intercept.is_finite() {
            return fallback("The fit did not converge to a finite line".to_string());
        }
        if slope.abs() <= FLAT_SLOPE {
            let direction = if sign < 0.0 { "rises" } else { "falls" };
            return fallback(format!(
                "The probe score {direction} with crf against the expected direction, which may result in overboosting"
            ));
        }

        Assessed::ok(QualityModel {
            curve: Curve::Linear { slope, intercept },
            probe_crfs,
        })
    }

    pub fn predict(&self, crf: f64) -> f64 {
        match &self.curve {
            Curve::Linear { slope, intercept } => {
                let x = if crf >= BEND_CRF {
                    crf
                } else {
                    BEND_PIVOT - (BEND_PIVOT - crf).powf(BEND_EXPONENT)
                };
                slope * x + intercept
            }
            Curve::Step { points } => points
                .iter()
                .find(|(probe_crf, _)| crf <= *probe_crf)
                .or(points.last())
                .map_or(f64::NAN, |&(_, score)| score),
        }
    }

    pub fn probe_crfs(&self) -> &[f64] {
        &self.probe_crfs
    }

    /// `(slope, intercept)` of a fitted line, `None` for the step fallback.
    pub fn line(&self) -> Option<(f64, f64)> {
        match self.curve {
            Curve::Linear { slope, intercept } => Some((slope, intercept)),
            Curve::Step { .. } => None,
        }
    }

    pub fn is_step(&self) -> bool {
        matches!(self.curve, Curve::Step { .. })
    }
}

fn constrained_fit(xs: &[f64], ys: &[f64], comparator: Comparator, sign: f64) -> (f64, f64) {
    let project = |(a, b): (f64, f64), ws: &[f64]| {
        if a * sign < 0.0 {
            (0.0, weighted_mean(ys, ws))
        } else {
            (a, b)
        }
    };

    let mut weights = vec![1.0; xs.len()];
    let mut line = project(weighted_line(xs, ys, &weights), &weights);

    for _ in 0..MAX_ITERATIONS {
        let next: Vec<f64> = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| {
                let residual = y - (line.0 * x + line.1);
                if comparator.better(0.0, residual) {
                    WORSE_SIDE_WEIGHT
                } else {
                    1.0
                }
            })
            .collect();
        if next == weights {
            break;
        }
        weights = next;
        line = project(weighted_line(xs, ys, &weights), &weights);
    }
    line
}

fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
}

/// Closed-form weighted least squares line.
fn weighted_line(xs: &[f64], ys: &[f64], ws: &[f64]) -> (f64, f64) {
    let x_mean = weighted_mean(xs, ws);
    let y_mean = weighted_mean(ys, ws);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for ((&x, &y), &w) in xs.iter().zip(ys).zip(ws) {
        sxy += w * (x - x_mean) * (y - y_mean);
        sxx += w * (x - x_mean) * (x - x_mean);
    }
    let slope = sxy / sxx;
    (slope, y_mean - slope * x_mean)
}
