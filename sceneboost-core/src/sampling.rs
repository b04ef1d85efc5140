// ============================================================================
// sceneboost-core/src/sampling.rs
// ============================================================================
//
// FRAME SAMPLING: Stratified Selection of Frames to Measure
//
// Only a handful of frames per scene are scored by the metric. They come from
// three tiers:
//
// 1. The highest-diff frames, kept apart by a minimum separation, since large
//    changes are where quality drops first.
// 2. An "upper bracket" of frames whose diff stands out from the scene's
//    typical diff (40th percentile plus five 40th-percentile deviations).
// 3. A "lower bracket" of ordinary frames, which also absorbs any shortfall of
//    the upper bracket.
//
// Bracket members are consumed in a shuffled, interleaved order so the picks
// spread over the whole scene. The shuffle uses a fixed seed per scene, so a
// resumed run samples exactly the same frames.
//
// Offsets are relative to `start_frame + 1` because a scene's first diff is
// measured against the previous scene. Offset -1 is the first frame itself.
//
// AI-ASSISTANT-INFO: Stratified per-scene frame sampling with a fixed seed

// ---- External crate imports ----
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

// ---- Internal crate imports ----
use crate::config::ZoneConfig;
use crate::scenes::Scene;
use crate::stats::DiffSeries;
use crate::utils::{PercentileMethod, percentile};

/// Seed for the bracket shuffle; every scene starts from it.
pub const SAMPLING_SEED: u64 = 1188246;

/// Percentile used for both the bracket centre and its deviation.
const BRACKET_PERCENTILE: f64 = 40.0;

/// Number of deviations above the centre that makes a diff "upper".
const BRACKET_DEVIATIONS: f64 = 5.0;

/// Tier sizes and separations for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParams {
    pub highest_diff_frames: usize,
    pub highest_diff_min_separation: usize,
    pub upper_bracket_frames: usize,
    pub upper_bracket_fallback_frames: usize,
    pub lower_bracket_frames: usize,
    pub lower_bracket_min_separation: usize,
    pub first_frame: bool,
    pub last_frame: bool,
}

impl From<&ZoneConfig> for SamplingParams {
    fn from(zone: &ZoneConfig) -> Self {
        Self {
            highest_diff_frames: zone.highest_diff_frames,
            highest_diff_min_separation: zone.highest_diff_min_separation,
            upper_bracket_frames: zone.upper_bracket_frames,
            upper_bracket_fallback_frames: zone.upper_bracket_fallback_frames,
            lower_bracket_frames: zone.lower_bracket_frames,
            lower_bracket_min_separation: zone.lower_bracket_min_separation,
            first_frame: zone.first_frame,
            last_frame: zone.last_frame,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from(&ZoneConfig::default())
    }
}

/// Absolute frame indices chosen for one scene, ascending and distinct.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleSet {
    pub frames: Vec<usize>,
}

impl SampleSet {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Picks the frames of a scene to measure.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSampler {
    params: SamplingParams,
}

impl FrameSampler {
    pub fn new(params: SamplingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SamplingParams {
        &self.params
    }

    /// Samples `scene` using the diff series.
    pub fn sample(&self, series: &DiffSeries, scene: &Scene) -> SampleSet {
        let diffs: Vec<f64> = series.diff()[scene.start_frame + 1..scene.end_frame]
            .iter()
            .map(|&d| d as f64)
            .collect();

        let base = scene.start_frame as i64 + 1;
        let frames = self
            .offsets(&diffs)
            .into_iter()
            .map(|o| (base + o) as usize)
            .collect();
        SampleSet { frames }
    }

    /// Sorted, distinct offsets relative to `start_frame + 1` for a scene whose
    /// diffs (excluding the first frame) are `diffs`. May contain -1.
    pub fn offsets(&self, diffs: &[f64]) -> Vec<i64> {
        let p = &self.params;
        if diffs.is_empty() {
            return vec![-1];
        }

        let mut chosen: Vec<i64> = Vec::new();

        // STEP 1: highest-diff tier
        let mut by_diff: Vec<usize> = (0..diffs.len()).collect();
        by_diff.sort_by(|&a, &b| diffs[b].total_cmp(&diffs[a]));
        let mut picked = 0;
        for &offset in &by_diff {
            if picked >= p.highest_diff_frames {
                break;
            }
            let offset = offset as i64;
            if too_close(&chosen, offset, p.highest_diff_min_separation) {
                continue;
            }
            chosen.push(offset);
            picked += 1;
        }

        // STEP 2: forced last frame
        let last = diffs.len() as i64 - 1;
        if p.last_frame && !chosen.contains(&last) {
            chosen.push(last);
        }

        // STEP 3: bracket split and interleaved shuffle
        let (upper, lower) = brackets(diffs);
        let mut rng = StdRng::seed_from_u64(SAMPLING_SEED);
        let upper = interleave(&upper, &mut rng);
        let lower = interleave(&lower, &mut rng);

        // STEP 4: upper bracket, with any shortfall moved to the lower quota
        let mut picked = 0;
        for &offset in &upper {
            if picked >= p.upper_bracket_frames {
                break;
            }
            let offset = offset as i64;
            if chosen.contains(&offset) {
                continue;
            }
            chosen.push(offset);
            picked += 1;
        }
        let lower_quota = p.lower_bracket_frames + p.upper_bracket_fallback_frames.saturating_sub(picked);

        // STEP 5: forced first frame
        if p.first_frame {
            chosen.push(-1);
        }

        // STEP 6: lower bracket
        let mut picked = 0;
        for &offset in &lower {
            if picked >= lower_quota {
                break;
            }
            let offset = offset as i64;
            if too_close(&chosen, offset, p.lower_bracket_min_separation) {
                continue;
            }
            chosen.push(offset);
            picked += 1;
        }

        chosen.sort_unstable();
        chosen.dedup();
        chosen
    }
}

fn too_close(chosen: &[i64], offset: i64, separation: usize) -> bool {
    chosen
        .iter()
        .any(|&c| (c - offset).unsigned_abs() < separation as u64)
}

/// Splits offsets into the upper and lower diff brackets, each in index order.
fn brackets(diffs: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let centre = percentile(diffs, BRACKET_PERCENTILE, PercentileMethod::Linear).unwrap_or(0.0);
    let deviations: Vec<f64> = diffs.iter().map(|d| (d - centre).abs()).collect();
    let deviation = percentile(&deviations, BRACKET_PERCENTILE, PercentileMethod::Linear).unwrap_or(0.0);
    let threshold = centre + BRACKET_DEVIATIONS * deviation;

    (0..diffs.len()).partition(|&i| diffs[i] > threshold)
}

/// Shuffles the first and second halves separately and interleaves them:
/// first-half items at even positions, second-half items at odd positions.
fn interleave(bracket: &[usize], rng: &mut StdRng) -> Vec<usize> {
    let n = bracket.len();
    let mut first = bracket[..n.div_ceil(2)].to_vec();
    let mut second = bracket[n - n / 2..].to_vec();
    first.shuffle(rng);
    second.shuffle(rng);

    let mut out = Vec::with_capacity(n);
    let mut second = second.into_iter();
    for item in first {
        out.push(item);
        if let Some(s) = second.next() {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SamplingParams {
        SamplingParams::default()
    }

    #[test]
    fn one_frame_scene_samples_its_first_frame() {
        let series = DiffSeries::from_diffs(vec![0.0, 0.3, 0.1]);
        let sampler = FrameSampler::new(params());
        let set = sampler.sample(&series, &Scene::new(1, 2));
        assert_eq!(set.frames, vec![1]);
    }

    #[test]
    fn highest_tier_respects_separation() {
        let sampler = FrameSampler::new(SamplingParams {
            highest_diff_frames: 3,
            highest_diff_min_separation: 4,
            upper_bracket_frames: 0,
            upper_bracket_fallback_frames: 0,
            lower_bracket_frames: 0,
            last_frame: false,
            ..params()
        });
        let mut diffs = vec![0.1; 30];
        diffs[10] = 9.0;
        diffs[11] = 8.0;
        diffs[12] = 7.0;
        diffs[20] = 6.0;
        diffs[25] = 5.0;
        assert_eq!(sampler.offsets(&diffs), vec![10, 20, 25]);
    }

    #[test]
    fn forced_frames_are_included() {
        let sampler = FrameSampler::new(SamplingParams {
            first_frame: true,
            last_frame: true,
            ..params()
        });
        let offsets = sampler.offsets(&[0.1; 50]);
        assert_eq!(offsets.first(), Some(&-1));
        assert_eq!(offsets.last(), Some(&49));
    }

    #[test]
    fn deterministic_across_calls() {
        let diffs: Vec<f64> = (0..120).map(|i| ((i * 37) % 11) as f64 * 0.1).collect();
        let sampler = FrameSampler::new(params());
        assert_eq!(sampler.offsets(&diffs), sampler.offsets(&diffs));
    }

    #[test]
    fn upper_shortfall_moves_to_lower_bracket() {
        // flat diffs: nothing exceeds the bracket threshold, so the upper tier is empty
        let sampler = FrameSampler::new(SamplingParams {
            highest_diff_frames: 0,
            last_frame: false,
            lower_bracket_frames: 0,
            upper_bracket_fallback_frames: 5,
            lower_bracket_min_separation: 2,
            ..params()
        });
        let offsets = sampler.offsets(&[0.5; 100]);
        assert_eq!(offsets.len(), 5);
        assert!(offsets.windows(2).all(|w| w[1] - w[0] >= 2));
    }

    #[test]
    fn absolute_frames_are_offset_by_start_plus_one() {
        let mut diffs = vec![0.1f32; 40];
        diffs[25] = 3.0;
        let series = DiffSeries::from_diffs(diffs);
        let sampler = FrameSampler::new(SamplingParams {
            highest_diff_frames: 1,
            upper_bracket_frames: 0,
            upper_bracket_fallback_frames: 0,
            last_frame: false,
            ..params()
        });
        let set = sampler.sample(&series, &Scene::new(20, 40));
        assert_eq!(set.frames, vec![25]);
    }

    #[test]
    fn interleave_places_halves_alternately() {
        let mut rng = StdRng::seed_from_u64(SAMPLING_SEED);
        let out = interleave(&[0, 1, 2, 3, 4], &mut rng);
        assert_eq!(out.len(), 5);
        assert!(out.iter().step_by(2).all(|&x| x <= 2));
        assert!(out.iter().skip(1).step_by(2).all(|&x| x >= 3));
    }
}
