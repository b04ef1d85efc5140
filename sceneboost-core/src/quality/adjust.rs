//! Final crf adjustment applied after solving.
//!
//! Probes run at a faster preset than the final encode, and crf steps are
//! worth more at slower presets. The solved crf is compressed toward 24 with
//! `(crf / 24)^exponent * 24`, rounded to the encoder's 0.25 grid and floored.

use crate::config::ZoneConfig;
use crate::quality::solver::CRF_GRID;
use crate::utils::round_to_step;

/// Pivot of the preset compensation curve.
const COMPENSATION_PIVOT: f64 = 24.0;

pub fn round_to_quarter(crf: f64) -> f64 {
    round_to_step(crf, CRF_GRID)
}

/// Turns a solved crf and the ROI crf offset into the crf written out.
pub fn adjust_final_crf(solved: f64, roi_crf_offset: f64, zone: &ZoneConfig) -> f64 {
    let crf = solved.clamp(zone.min_crf, zone.max_crf) + roi_crf_offset;
    let compensated = (crf.max(0.0) / COMPENSATION_PIVOT).powf(zone.final_crf_exponent) * COMPENSATION_PIVOT;
    round_to_quarter(compensated).max(zone.final_min_crf)
}
