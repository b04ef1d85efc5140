// sceneboost-core/tests/property_tests.rs

use proptest::prelude::*;
use sceneboost_core::detection::{SplitParams, split_points};
use sceneboost_core::quality::{Comparator, CrfResponse, ProbeResult, QualityModel, solve};
use sceneboost_core::roi::{BlockGrid, RoiBoostMapper};
use sceneboost_core::sampling::{FrameSampler, SamplingParams};

fn split_params() -> impl Strategy<Value = SplitParams> {
    (1usize..8, 2usize..40, 2usize..6).prop_map(|(min_scene_len, target, extra_factor)| {
        let target_split = target.max(min_scene_len);
        SplitParams {
            target_split,
            extra_split: (target_split * extra_factor).max(2 * min_scene_len),
            min_scene_len,
        }
    })
}

proptest! {
    #[test]
    fn segmentation_covers_interval(
        scores in prop::collection::vec(0.0f64..3.0, 1..400),
        params in split_params(),
    ) {
        let starts = split_points(&scores, &params);
        prop_assert_eq!(starts[0], 0);
        let mut bounds = starts.clone();
        bounds.push(scores.len());
        prop_assert!(bounds.windows(2).all(|w| w[0] < w[1]));
        if scores.len() >= params.min_scene_len {
            prop_assert!(bounds.windows(2).all(|w| w[1] - w[0] >= params.min_scene_len));
        }
    }

    #[test]
    fn sampler_respects_tier_bounds(
        diffs in prop::collection::vec(0.0f64..2.0, 1..300),
        highest in 0usize..10,
        separation in 1usize..8,
        upper in 0usize..20,
        fallback in 0usize..20,
        lower in 0usize..10,
        first_frame in any::<bool>(),
        last_frame in any::<bool>(),
    ) {
        let params = SamplingParams {
            highest_diff_frames: highest,
            highest_diff_min_separation: separation,
            upper_bracket_frames: upper,
            upper_bracket_fallback_frames: fallback,
            lower_bracket_frames: lower,
            lower_bracket_min_separation: 2,
            first_frame,
            last_frame,
        };
        let offsets = FrameSampler::new(params).offsets(&diffs);

        prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(offsets.iter().all(|&o| o >= -1 && o < diffs.len() as i64));

        let forced = |o: i64| (first_frame && o == -1) || (last_frame && o == diffs.len() as i64 - 1);
        let free = offsets.iter().filter(|&&o| !forced(o)).count();
        prop_assert!(free <= highest + lower + upper.max(fallback));
    }

    #[test]
    fn solver_stays_in_bounds(
        s16 in -50.0f64..50.0,
        s24 in -50.0f64..50.0,
        target in -50.0f64..50.0,
        min_crf in 0.0f64..30.0,
        width in 1.0f64..40.0,
        higher in any::<bool>(),
        degrades in any::<bool>(),
    ) {
        let comparator = if higher { Comparator::HigherIsBetter } else { Comparator::LowerIsBetter };
        let response = if degrades { CrfResponse::Degrades } else { CrfResponse::Improves };
        let probe = ProbeResult::new(vec![16.0, 24.0], vec![s16, s24]).unwrap();
        let model = QualityModel::fit(&probe, comparator, response).value;
        let max_crf = min_crf + width;
        let crf = solve(&model, comparator, target, min_crf, max_crf).value;
        prop_assert!(crf >= min_crf && crf <= max_crf);
    }

    #[test]
    fn constant_probes_are_unreliable(
        score in -10.0f64..10.0,
        crfs in prop::collection::vec(5.0f64..50.0, 1..6),
        higher in any::<bool>(),
        degrades in any::<bool>(),
    ) {
        let comparator = if higher { Comparator::HigherIsBetter } else { Comparator::LowerIsBetter };
        let response = if degrades { CrfResponse::Degrades } else { CrfResponse::Improves };
        let scores = vec![score; crfs.len()];
        let probe = ProbeResult::new(crfs, scores).unwrap();
        let fit = QualityModel::fit(&probe, comparator, response);
        prop_assert!(!fit.is_reliable());
    }

    #[test]
    fn smoothed_roi_stays_in_unit_range(
        (cols, rows, values) in (1usize..8, 1usize..8).prop_flat_map(|(c, r)| {
            (Just(c), Just(r), prop::collection::vec(-2.0f64..2.0, c * r))
        }),
    ) {
        let grid = BlockGrid { cols, rows, values };
        let smoothed = RoiBoostMapper::smooth(&grid);
        prop_assert!(smoothed.values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
