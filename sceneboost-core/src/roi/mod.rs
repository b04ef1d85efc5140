// ============================================================================
// sceneboost-core/src/roi/mod.rs
// ============================================================================
//
// ROI BOOST: Spatial Quality Boost around Characters
//
// Character presence is sampled on the scene's first frame and every 8th frame
// after it. Each sample becomes a per-block offset line for the encoder's ROI
// map, followed by a neutral line one frame later so the boost only applies to
// the frames that start each 8-frame group.
//
// Pipeline per sampled frame:
//
//   presence -> threshold 0.95 -> 64x64 block mean -> x2
//            -> min(value, 3x3 mean) -> clamp [-1, 1]
//            -> round(-7 v) -> round(q * sigma / 1.75 * group + floor(sigma / 1.5))
//
// The group multiplier decays from the keyframe (index 0) through frames at
// multiples of 32, 16 and 8. If a line ends up entirely negative, every line is
// raised by the largest such deficit and the scene crf is lowered by a quarter
// of it instead.
//
// AI-ASSISTANT-INFO: Character-presence driven ROI map generation

pub mod map_file;
pub mod mask;

// ---- External crate imports ----
use serde::{Deserialize, Serialize};

// ---- Internal crate imports ----
use crate::config::ZoneConfig;
use crate::error::{CoreError, CoreResult};
use crate::scenes::Scene;

pub use map_file::{roi_map_file_name, write_roi_map};
pub use mask::{BLOCK_SIZE, BlockGrid, PRESENCE_THRESHOLD, PresenceMask};

/// Frames between two ROI samples.
pub const ROI_SAMPLE_INTERVAL: usize = 8;

const PRESENCE_GAIN: f64 = 2.0;
const QUANTISER_SCALE: f64 = -7.0;
const SIGMA_DIVISOR: f64 = 1.75;
const UNIFORM_OFFSET_DIVISOR: f64 = 1.5;

/// Crf change per unit of ROI deficit.
const DEFICIT_CRF_RATE: f64 = 0.25;
const DEFICIT_EPSILON: f64 = 0.01;

/// Boost decay by position of the sampled frame in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupMultipliers {
    pub keyframe: f64,
    pub every_32: f64,
    pub every_16: f64,
    pub every_8: f64,
}

impl Default for GroupMultipliers {
    fn default() -> Self {
        Self {
            keyframe: 1.00,
            every_32: 0.80,
            every_16: 0.60,
            every_8: 0.40,
        }
    }
}

impl GroupMultipliers {
    /// Multiplier for the `index`-th sampled frame of a scene.
    pub fn for_index(&self, index: usize) -> f64 {
        if index == 0 {
            self.keyframe
        } else if index % 4 == 0 {
            self.every_32
        } else if index % 2 == 0 {
            self.every_16
        } else {
            self.every_8
        }
    }
}

/// Absolute frames whose presence feeds the ROI map of `scene`.
pub fn roi_sample_frames(scene: &Scene) -> Vec<usize> {
    let count = (scene.len() / ROI_SAMPLE_INTERVAL).max(1);
    (0..count)
        .map(|i| scene.start_frame + i * ROI_SAMPLE_INTERVAL)
        .collect()
}

/// One line of an ROI map file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoiLine {
    /// Frame offset from the scene start.
    pub frame_offset: usize,
    pub values: Vec<i32>,
}

/// ROI map of one scene plus the crf compensation for any lifted deficit.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiMap {
    pub cols: usize,
    pub rows: usize,
    pub lines: Vec<RoiLine>,
    pub crf_offset: f64,
}

/// Builds ROI maps for one zone's settings.
#[derive(Debug, Clone, Copy)]
pub struct RoiBoostMapper {
    sigma: f64,
    multipliers: GroupMultipliers,
}

impl RoiBoostMapper {
    pub fn new(sigma: f64, multipliers: GroupMultipliers) -> Self {
        Self { sigma, multipliers }
    }

    pub fn from_zone(zone: &ZoneConfig) -> Self {
        Self::new(zone.character_sigma, zone.character_multipliers)
    }

    /// Gain and neighbourhood smoothing; output values lie in [-1, 1].
    pub fn smooth(grid: &BlockGrid) -> BlockGrid {
        let scaled = BlockGrid {
            values: grid.values.iter().map(|v| v * PRESENCE_GAIN).collect(),
            ..grid.clone()
        };

        let mut values = Vec::with_capacity(scaled.values.len());
        for row in 0..scaled.rows as isize {
            for col in 0..scaled.cols as isize {
                let mut sum = 0.0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        sum += scaled.at_clamped(col + dx, row + dy);
                    }
                }
                let value = scaled.at_clamped(col, row);
                values.push(value.min(sum / 9.0).clamp(-1.0, 1.0));
            }
        }
        BlockGrid { values, ..scaled }
    }

    /// Quantised line values for the `index`-th sampled frame.
    pub fn quantise(&self, smoothed: &BlockGrid, index: usize) -> Vec<f64> {
        let scale = self.sigma / SIGMA_DIVISOR * self.multipliers.for_index(index);
        let uniform = (self.sigma / UNIFORM_OFFSET_DIVISOR).floor();
        smoothed
            .values
            .iter()
            .map(|v| ((v * QUANTISER_SCALE).round() * scale + uniform).round())
            .collect()
    }

    /// Builds the map from the block grids of the sampled frames, in order.
    pub fn map(&self, grids: &[BlockGrid]) -> CoreResult<RoiMap> {
        let first = grids
            .first()
            .ok_or_else(|| CoreError::OperationFailed("no presence samples for ROI map".to_string()))?;
        let (cols, rows) = (first.cols, first.rows);
        if let Some(bad) = grids.iter().find(|g| g.cols != cols || g.rows != rows) {
            return Err(CoreError::External(format!(
                "presence grid of {}x{} blocks does not match {}x{}",
                bad.cols, bad.rows, cols, rows
            )));
        }

        let mut lines: Vec<(usize, Vec<f64>)> = Vec::with_capacity(grids.len() * 2);
        for (index, grid) in grids.iter().enumerate() {
            let offset = index * ROI_SAMPLE_INTERVAL;
            lines.push((offset, self.quantise(&Self::smooth(grid), index)));
            lines.push((offset + 1, vec![0.0; cols * rows]));
        }

        // Lift lines without any non-negative block
        let deficit = lines
            .iter()
            .map(|(_, values)| values.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .filter(|&max| max < DEFICIT_EPSILON)
            .fold(0.0f64, |needed, max| needed.max(-max));

        let mut crf_offset = 0.0;
        if deficit > DEFICIT_EPSILON {
            for (_, values) in &mut lines {
                values.iter_mut().for_each(|v| *v += deficit);
            }
            crf_offset = DEFICIT_CRF_RATE * -deficit;
        }

        Ok(RoiMap {
            cols,
            rows,
            lines: lines
                .into_iter()
                .map(|(frame_offset, values)| RoiLine {
                    frame_offset,
                    values: values.into_iter().map(|v| v as i32).collect(),
                })
                .collect(),
            crf_offset,
        })
    }

    /// Convenience for masks straight from the segmentation model.
    pub fn map_masks(&self, masks: &[PresenceMask]) -> CoreResult<RoiMap> {
        let grids: Vec<BlockGrid> = masks.iter().map(PresenceMask::block_grid).collect();
        self.map(&grids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> RoiBoostMapper {
        RoiBoostMapper::new(5.0, GroupMultipliers::default())
    }

    #[test]
    fn all_zero_mask_smooths_to_zero() {
        let grid = PresenceMask::filled(200, 130, 0.0).block_grid();
        let smoothed = RoiBoostMapper::smooth(&grid);
        assert!(smoothed.values.iter().all(|&v| v == 0.0));

        // only the uniform offset remains, so no deficit
        let map = mapper().map(&[grid]).unwrap();
        assert_eq!(map.crf_offset, 0.0);
        assert!(map.lines[0].values.iter().all(|&v| v == 3));
        assert!(map.lines[1].values.iter().all(|&v| v == 0));
    }

    #[test]
    fn all_one_mask_gives_maximum_boost() {
        let grid = PresenceMask::filled(128, 128, 1.0).block_grid();
        let smoothed = RoiBoostMapper::smooth(&grid);
        assert!(smoothed.values.iter().all(|&v| v == 1.0));
        // round(-7 * 5 / 1.75 + 3) = -17
        assert!(mapper().quantise(&smoothed, 0).iter().all(|&v| v == -17.0));

        let map = mapper().map(&[grid]).unwrap();
        assert_eq!(map.crf_offset, -4.25);
        assert!(map.lines[0].values.iter().all(|&v| v == 0));
        assert!(map.lines[1].values.iter().all(|&v| v == 17));
    }

    #[test]
    fn isolated_block_is_smoothed_down() {
        let mut grid = BlockGrid::filled(3, 3, 0.0);
        grid.values[4] = 1.0;
        let smoothed = RoiBoostMapper::smooth(&grid);
        assert!((smoothed.values[4] - 2.0 / 9.0).abs() < 1e-12);
        assert_eq!(smoothed.values[0], 0.0);
    }

    #[test]
    fn group_multipliers_by_index() {
        let m = GroupMultipliers::default();
        assert_eq!(m.for_index(0), 1.0);
        assert_eq!(m.for_index(4), 0.8);
        assert_eq!(m.for_index(2), 0.6);
        assert_eq!(m.for_index(3), 0.4);
    }

    #[test]
    fn lines_interleave_neutral_frames() {
        let grids = vec![BlockGrid::filled(2, 1, 0.0); 3];
        let map = mapper().map(&grids).unwrap();
        let offsets: Vec<_> = map.lines.iter().map(|l| l.frame_offset).collect();
        assert_eq!(offsets, vec![0, 1, 8, 9, 16, 17]);
    }

    #[test]
    fn sample_frames_every_eight() {
        assert_eq!(roi_sample_frames(&Scene::new(100, 105)), vec![100]);
        assert_eq!(roi_sample_frames(&Scene::new(100, 125)), vec![100, 108, 116]);
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let grids = [BlockGrid::filled(2, 1, 0.0), BlockGrid::filled(1, 2, 0.0)];
        assert!(mapper().map(&grids).is_err());
    }
}
