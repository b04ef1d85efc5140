//! Split candidate scores.
//!
//! A frame's score is its diff plus the external scene-cut flag. A frame that
//! enters a luma blackout (near-black or near-white) takes a flat `+2.0`
//! instead, so fades through black always win over ordinary cuts.

use crate::stats::{ColorRange, DiffSeries, LumaFormat};

/// Bonus for the first frame of a blackout run.
pub const BLACKOUT_BONUS: f64 = 2.0;

/// 8-bit luma thresholds for blackout detection.
#[derive(Debug, Clone, Copy)]
struct BlackoutThresholds {
    /// A frame enters blackout when `min > enter_min` or `max < enter_max`.
    enter_min: f64,
    enter_max: f64,
    /// A frame stays in blackout with the relaxed `stay_*` pair.
    stay_min: f64,
    stay_max: f64,
}

impl BlackoutThresholds {
    fn for_range(range: ColorRange) -> Self {
        match range {
            ColorRange::Limited => Self {
                enter_min: 231.125,
                enter_max: 19.875,
                stay_min: 229.125,
                stay_max: 21.875,
            },
            ColorRange::Full => Self {
                enter_min: 251.125,
                enter_max: 3.875,
                stay_min: 249.125,
                stay_max: 5.875,
            },
        }
    }
}

/// Per-frame blackout state over `start..end`.
///
/// The frame before `start` is treated as already in blackout, so the range's
/// first frame can continue a blackout but never begins one.
pub fn blackout_flags(series: &DiffSeries, start: usize, end: usize, format: LumaFormat) -> Vec<bool> {
    let t = BlackoutThresholds::for_range(format.range);
    let scale = format.scale();
    let (min, max) = (series.min(), series.max());

    let mut prev = true;
    (start..end)
        .map(|f| {
            let (lo, hi) = (min[f] as f64, max[f] as f64);
            let current = if prev {
                lo > t.stay_min * scale || hi < t.stay_max * scale
            } else {
                lo > t.enter_min * scale || hi < t.enter_max * scale
            };
            prev = current;
            current
        })
        .collect()
}

/// Candidate scores for `start..end`, indexed relative to `start`.
///
/// `scene_cuts`, when given, holds one flag per frame of the range with values
/// in `0.0..=1.5`.
pub fn split_scores(
    series: &DiffSeries,
    start: usize,
    end: usize,
    format: LumaFormat,
    scene_cuts: Option<&[f32]>,
) -> Vec<f64> {
    let diff = &series.diff()[start..end];
    let blackout = blackout_flags(series, start, end, format);

    let mut prev = true;
    diff.iter()
        .enumerate()
        .map(|(i, &d)| {
            let entering = blackout[i] && !prev;
            prev = blackout[i];
            if entering {
                d as f64 + BLACKOUT_BONUS
            } else {
                let cut = scene_cuts.and_then(|c| c.get(i)).copied().unwrap_or(0.0);
                d as f64 + cut as f64
            }
        })
        .collect()
}
