//! Inversion of a `QualityModel` into the crf that just meets the target.
//!
//! Candidates (probe crfs plus both bounds) are walked from the end with the
//! worse prediction toward the better end. The first candidate that meets the
//! target brackets the answer together with its failing neighbour; the bracket
//! is narrowed in 0.05 steps and the result snapped to the 0.25 crf grid.

use crate::assessed::{Assessed, Diagnostic};
use crate::quality::{Comparator, QualityModel};

/// Step used to narrow the bracket.
pub const REFINE_STEP: f64 = 0.05;

/// Crf grid of the encoder.
pub const CRF_GRID: f64 = 0.25;

const GRID_TOLERANCE: f64 = 1e-6;

/// Finds the crf in `[min_crf, max_crf]` whose predicted score just meets
/// `target`. When even the best bound misses, that bound is returned with a
/// `TargetUnreachable` diagnostic.
pub fn solve(model: &QualityModel, comparator: Comparator, target: f64, min_crf: f64, max_crf: f64) -> Assessed<f64> {
    let mut walk: Vec<f64> = model
        .probe_crfs()
        .iter()
        .copied()
        .filter(|c| c.is_finite())
        .chain([min_crf, max_crf])
        .map(|c| c.clamp(min_crf, max_crf))
        .collect();
    walk.sort_by(f64::total_cmp);
    walk.dedup();

    // Walk from the worse end; on a tie the high-crf end counts as worse
    let (first, last) = (walk[0], walk[walk.len() - 1]);
    if !comparator.better(model.predict(last), model.predict(first)) {
        walk.reverse();
    }

    let meets = |crf: f64| comparator.meets(model.predict(crf), target);

    match walk.iter().position(|&crf| meets(crf)) {
        Some(0) => Assessed::ok(walk[0]),
        Some(i) => {
            let crf = refine(walk[i - 1], walk[i], &meets);
            Assessed::ok(crf.clamp(min_crf, max_crf))
        }
        None => {
            let best = walk[walk.len() - 1];
            Assessed::with_diagnostic(
                best,
                Diagnostic::TargetUnreachable {
                    crf: best,
                    predicted: model.predict(best),
                    target,
                },
            )
        }
    }
}

/// Moves from `meeting` toward `failing` while the target is still met, then
/// snaps back onto the grid toward `meeting`.
fn refine(failing: f64, meeting: f64, meets: &dyn Fn(f64) -> bool) -> f64 {
    let direction = (failing - meeting).signum();
    let steps = ((failing - meeting).abs() / REFINE_STEP).ceil() as usize;

    let mut best = meeting;
    for k in 1..steps {
        let crf = meeting + direction * REFINE_STEP * k as f64;
        if !meets(crf) {
            break;
        }
        best = crf;
    }

    let q = best / CRF_GRID;
    let q = if (q - q.round()).abs() < GRID_TOLERANCE {
        q.round()
    } else if direction < 0.0 {
        q.ceil()
    } else {
        q.floor()
    };
    let snapped = q * CRF_GRID;
    if meets(snapped) { snapped } else { best }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{CrfResponse, ProbeResult};

    fn model(crfs: &[f64], scores: &[f64], comparator: Comparator, response: CrfResponse) -> QualityModel {
        let probes = ProbeResult::new(crfs.to_vec(), scores.to_vec()).unwrap();
        QualityModel::fit(&probes, comparator, response).value
    }

    #[test]
    fn solves_linear_scenario() {
        let m = model(&[16.0, 24.0], &[20.0, 10.0], Comparator::LowerIsBetter, CrfResponse::Improves);
        let crf = solve(&m, Comparator::LowerIsBetter, 15.0, 8.0, 40.0);
        assert!(crf.is_reliable());
        assert!((crf.value - 20.0).abs() < 1e-9);
    }

    #[test]
    fn highest_meeting_crf_for_degrading_metric() {
        // score = 0.05 * crf - 0.3; target 0.62 -> crf 18.4, grid snaps down to 18.25
        let m = model(&[16.0, 24.0], &[0.5, 0.9], Comparator::LowerIsBetter, CrfResponse::Degrades);
        let crf = solve(&m, Comparator::LowerIsBetter, 0.62, 8.0, 40.0);
        assert!(crf.is_reliable());
        assert!((crf.value - 18.25).abs() < 1e-9);
        assert!(Comparator::LowerIsBetter.meets(m.predict(crf.value), 0.62));
    }

    #[test]
    fn worst_end_meeting_returns_it() {
        let m = model(&[16.0, 24.0], &[0.1, 0.2], Comparator::LowerIsBetter, CrfResponse::Degrades);
        let crf = solve(&m, Comparator::LowerIsBetter, 0.62, 8.0, 40.0);
        assert_eq!(crf.value, 40.0);
    }

    #[test]
    fn unreachable_target_returns_best_bound() {
        let m = model(&[16.0, 24.0], &[2.0, 3.0], Comparator::LowerIsBetter, CrfResponse::Degrades);
        let crf = solve(&m, Comparator::LowerIsBetter, 0.62, 8.0, 40.0);
        assert_eq!(crf.value, 8.0);
        assert!(matches!(crf.diagnostic, Some(Diagnostic::TargetUnreachable { .. })));
    }

    #[test]
    fn step_model_solves_between_probes() {
        let m = model(&[16.0, 24.0], &[10.0, 20.0], Comparator::LowerIsBetter, CrfResponse::Improves);
        let crf = solve(&m, Comparator::LowerIsBetter, 15.0, 8.0, 40.0);
        assert!((crf.value - 16.0).abs() < 1e-9);
    }

    #[test]
    fn higher_is_better_target() {
        // score = -2.5 * crf + 120; target 70 -> crf 20
        let m = model(&[16.0, 24.0], &[80.0, 60.0], Comparator::HigherIsBetter, CrfResponse::Degrades);
        let crf = solve(&m, Comparator::HigherIsBetter, 70.0, 8.0, 40.0);
        assert!((crf.value - 20.0).abs() < 1e-9);
    }
}
