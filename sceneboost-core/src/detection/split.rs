// ============================================================================
// sceneboost-core/src/detection/split.rs
// ============================================================================
//
// RECURSIVE BISECTION: Splitting a Zone into Scenes
//
// An interval is split at its best-scoring admissible frame until it is short
// enough to be a leaf. Which frames are acceptable depends on the interval
// length:
//
//   len <= target_split, len < 2 * min      leaf
//   len <= 2 * target_split                 strong cut (>= 1.16) leaving both
//                                           sides <= target_split
//   len <= extra_split                      strong cut leaving one side
//                                           <= target_split, then any strong
//                                           cut, else leaf
//   len >  extra_split                      weak cut (>= 1.12) that does not
//                                           add an extra_split chunk, then the
//                                           two strong rules, then any frame
//                                           that does not add a chunk
//
// A frame is admissible only when both sides keep at least `min_scene_len`
// frames. Among equal scores the lowest frame index wins.
//
// AI-ASSISTANT-INFO: Pure recursive interval bisection over candidate scores

/// A cut with at least this score is "strong".
pub const STRONG_CUT: f64 = 1.16;

/// Weaker cut threshold tried first for intervals longer than `extra_split`.
pub const WEAK_CUT: f64 = 1.12;

/// Slack added to the chunk count of the whole interval for weak cuts.
const CHUNK_SLACK: f64 = 0.15;

/// Length limits driving the bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitParams {
    pub target_split: usize,
    pub extra_split: usize,
    pub min_scene_len: usize,
}

impl SplitParams {
    fn chunks(&self, len: usize) -> usize {
        len.div_ceil(self.extra_split)
    }
}

/// Splits `[0, scores.len())` into scenes and returns their start offsets in
/// ascending order. The first entry is always 0.
pub fn split_points(scores: &[f64], params: &SplitParams) -> Vec<usize> {
    let mut starts = Vec::new();
    if scores.is_empty() {
        return starts;
    }

    // Work stack of intervals; the left half is pushed last so starts come out ordered
    let mut pending = vec![(0, scores.len())];
    while let Some((start, end)) = pending.pop() {
        match choose_split(scores, start, end, params) {
            Some(cut) => {
                pending.push((cut, end));
                pending.push((start, cut));
            }
            None => starts.push(start),
        }
    }
    starts
}

/// Picks the split frame for `[start, end)`, or `None` for a leaf.
pub fn choose_split(scores: &[f64], start: usize, end: usize, params: &SplitParams) -> Option<usize> {
    let len = end - start;
    let SplitParams {
        target_split,
        extra_split,
        min_scene_len,
    } = *params;
    let min_scene_len = min_scene_len.max(1);

    if len <= target_split || len < 2 * min_scene_len {
        return None;
    }

    // Admissible frames in descending score order; stable sort keeps index order on ties
    let mut candidates: Vec<usize> = (start + min_scene_len..=end - min_scene_len).collect();
    candidates.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let sides = |c: usize| (c - start, end - c);
    let first_with = |threshold: f64, accept: &dyn Fn(usize, usize) -> bool| {
        candidates
            .iter()
            .copied()
            .take_while(|&c| scores[c] >= threshold)
            .find(|&c| {
                let (l, r) = sides(c);
                accept(l, r)
            })
    };

    let one_side_short = |l: usize, r: usize| l <= target_split || r <= target_split;
    let any = |_: usize, _: usize| true;

    if len <= 2 * target_split {
        let both_short = |l: usize, r: usize| l <= target_split && r <= target_split;
        if let Some(c) = first_with(STRONG_CUT, &both_short) {
            return Some(c);
        }
    }

    if len <= extra_split {
        return first_with(STRONG_CUT, &one_side_short).or_else(|| first_with(STRONG_CUT, &any));
    }

    let whole_chunks_slack = ((len as f64) / (extra_split as f64) + CHUNK_SLACK).ceil() as usize;
    let no_extra_chunk_slack = |l: usize, r: usize| params.chunks(l) + params.chunks(r) <= whole_chunks_slack;
    let no_extra_chunk = |l: usize, r: usize| params.chunks(l) + params.chunks(r) <= params.chunks(len);

    first_with(WEAK_CUT, &no_extra_chunk_slack)
        .or_else(|| first_with(STRONG_CUT, &one_side_short))
        .or_else(|| first_with(STRONG_CUT, &any))
        .or_else(|| first_with(f64::NEG_INFINITY, &no_extra_chunk))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(target_split: usize, extra_split: usize, min_scene_len: usize) -> SplitParams {
        SplitParams {
            target_split,
            extra_split,
            min_scene_len,
        }
    }

    #[test]
    fn splits_at_score_peak() {
        let scores = [0.0, 5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        assert_eq!(split_points(&scores, &params(4, 20, 2)), vec![0, 4]);
    }

    #[test]
    fn short_interval_is_leaf() {
        let scores = [0.0, 9.0, 0.0];
        assert_eq!(split_points(&scores, &params(4, 20, 1)), vec![0]);
        // longer than target but shorter than two minimum scenes
        let scores = [0.0, 0.0, 9.0, 0.0, 0.0];
        assert_eq!(split_points(&scores, &params(2, 20, 3)), vec![0]);
    }

    #[test]
    fn weak_scores_stay_unsplit_below_extra_split() {
        let scores = [0.0, 0.5, 1.1, 0.9, 0.2, 0.3, 0.0, 0.1, 0.4, 0.0];
        assert_eq!(split_points(&scores, &params(4, 20, 2)), vec![0]);
    }

    #[test]
    fn ties_pick_lowest_index() {
        let scores = [0.0, 0.0, 0.0, 0.0, 2.0, 0.0, 2.0, 0.0, 0.0, 0.0];
        assert_eq!(choose_split(&scores, 0, 10, &params(6, 20, 2)), Some(4));
    }

    #[test]
    fn both_short_preferred_when_within_twice_target() {
        // 7 scores higher but would leave a side of 7 > target_split 5
        let scores = [0.0, 0.0, 0.0, 0.0, 0.0, 1.5, 0.0, 3.0, 0.0, 0.0];
        assert_eq!(choose_split(&scores, 0, 10, &params(5, 20, 2)), Some(5));
    }

    #[test]
    fn long_interval_falls_back_to_raw_order() {
        // No strong cut anywhere; the raw maximum still splits a long interval
        let mut scores = vec![0.0; 40];
        scores[20] = 0.5;
        let cut = choose_split(&scores, 0, 40, &params(5, 20, 4));
        assert_eq!(cut, Some(20));
    }

    #[test]
    fn raw_fallback_respects_chunk_count() {
        // Cutting at 5 would need ceil(5/20) + ceil(35/20) = 3 > 2 chunks
        let mut scores = vec![0.0; 40];
        scores[5] = 0.9;
        scores[20] = 0.1;
        assert_eq!(choose_split(&scores, 0, 40, &params(5, 20, 4)), Some(20));
    }

    #[test]
    fn output_covers_interval_contiguously() {
        let scores: Vec<f64> = (0..300).map(|i| if i % 37 == 0 { 1.3 } else { 0.05 }).collect();
        let starts = split_points(&scores, &params(33, 192, 12));
        assert_eq!(starts[0], 0);
        assert!(starts.windows(2).all(|w| w[0] < w[1]));
        let mut bounds = starts.clone();
        bounds.push(300);
        assert!(bounds.windows(2).all(|w| w[1] - w[0] >= 12));
    }
}
