// ============================================================================
// sceneboost-core/src/detection/mod.rs
// ============================================================================
//
// SCENE DETECTION: Partitioning Zones into Scenes
//
// Each zone selects a detection method. All methods share one small trait, so
// the driver below only dispatches on the enum and then checks that the
// combined result is a valid partition of the file.
//
// KEY COMPONENTS:
// - SceneDetectionMethod: per-zone strategy selector
// - SceneDetector: trait with one implementation per method
// - detect_scenes: runs every zone and validates the partition
//
// AI-ASSISTANT-INFO: Scene detection dispatch and partition validation

pub mod external;
pub mod score;
pub mod split;

// ---- External crate imports ----
use log::{debug, info};
use serde::{Deserialize, Serialize};

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::external::SceneCutDetector;
use crate::scenes::{Scene, ScenesFile};
use crate::stats::{DiffSeries, LumaFormat};
use crate::zones::ResolvedZone;

pub use score::split_scores;
pub use split::{SplitParams, choose_split, split_points};

/// How a zone is divided into scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneDetectionMethod {
    /// Recursive bisection over diff scores.
    #[default]
    #[serde(alias = "vapoursynth")]
    Bisection,
    /// Scenes clipped from an external scene list.
    External,
    /// Scenes from an av1an scene list aligned with the zones.
    Av1an,
}

/// Everything a detector may need besides the zone itself.
#[derive(Clone, Copy)]
pub struct DetectionInputs<'a> {
    pub series: &'a DiffSeries,
    pub format: LumaFormat,
    pub scene_cuts: Option<&'a dyn SceneCutDetector>,
    pub external_scenes: Option<&'a ScenesFile>,
    pub av1an_scenes: Option<&'a ScenesFile>,
}

impl<'a> DetectionInputs<'a> {
    pub fn new(series: &'a DiffSeries, format: LumaFormat) -> Self {
        Self {
            series,
            format,
            scene_cuts: None,
            external_scenes: None,
            av1an_scenes: None,
        }
    }
}

/// Produces the scenes of one zone, in order, covering it exactly.
pub trait SceneDetector {
    fn detect(&self, zone: &ResolvedZone, inputs: &DetectionInputs<'_>) -> CoreResult<Vec<Scene>>;
}

pub struct BisectionDetector;
pub struct ExternalDetector;
pub struct Av1anDetector;

impl SceneDetectionMethod {
    pub fn detector(self) -> &'static dyn SceneDetector {
        match self {
            SceneDetectionMethod::Bisection => &BisectionDetector,
            SceneDetectionMethod::External => &ExternalDetector,
            SceneDetectionMethod::Av1an => &Av1anDetector,
        }
    }
}

impl SceneDetector for BisectionDetector {
    fn detect(&self, zone: &ResolvedZone, inputs: &DetectionInputs<'_>) -> CoreResult<Vec<Scene>> {
        let cuts = match inputs.scene_cuts {
            Some(detector) => {
                let flags = detector.scene_cuts(zone.start_frame, zone.end_frame)?;
                if flags.len() != zone.len() {
                    return Err(CoreError::External(format!(
                        "scene-cut detector returned {} flags for {} frames",
                        flags.len(),
                        zone.len()
                    )));
                }
                Some(flags)
            }
            None => None,
        };

        let scores = split_scores(
            inputs.series,
            zone.start_frame,
            zone.end_frame,
            inputs.format,
            cuts.as_deref(),
        );
        let params = SplitParams {
            target_split: zone.config.target_split,
            extra_split: zone.config.extra_split,
            min_scene_len: zone.config.min_scene_len,
        };

        let mut bounds: Vec<usize> = split_points(&scores, &params)
            .into_iter()
            .map(|s| s + zone.start_frame)
            .collect();
        bounds.push(zone.end_frame);

        Ok(bounds.windows(2).map(|w| Scene::new(w[0], w[1])).collect())
    }
}

impl SceneDetector for ExternalDetector {
    fn detect(&self, zone: &ResolvedZone, inputs: &DetectionInputs<'_>) -> CoreResult<Vec<Scene>> {
        let scenes = inputs.external_scenes.ok_or_else(|| {
            CoreError::Config(format!(
                "zone '{}' uses external scene detection but no input scenes were given",
                zone.key
            ))
        })?;
        external::clip_to_zone(scenes, zone)
    }
}

impl SceneDetector for Av1anDetector {
    fn detect(&self, zone: &ResolvedZone, inputs: &DetectionInputs<'_>) -> CoreResult<Vec<Scene>> {
        let scenes = inputs.av1an_scenes.ok_or_else(|| {
            CoreError::Config(format!(
                "zone '{}' uses av1an scene detection but no av1an scenes were given",
                zone.key
            ))
        })?;
        external::copy_av1an(scenes, zone, inputs.series.len())
    }
}

/// Detects scenes for every zone and checks the combined partition.
pub fn detect_scenes(zones: &[ResolvedZone], inputs: &DetectionInputs<'_>) -> CoreResult<ScenesFile> {
    let frame_count = inputs.series.len();
    let mut scenes = Vec::new();

    for zone in zones {
        if zone.end_frame > frame_count {
            return Err(CoreError::InvalidZone(format!(
                "zone [{}:{}] extends past the {} measured frames",
                zone.start_frame, zone.end_frame, frame_count
            )));
        }
        let method = zone.config.scene_detection_method;
        let zone_scenes = method.detector().detect(zone, inputs)?;
        check_zone_scenes(zone, &zone_scenes)?;
        debug!(
            "Zone '{}' [{}:{}] / {:?} / {} scenes",
            zone.key,
            zone.start_frame,
            zone.end_frame,
            method,
            zone_scenes.len()
        );
        scenes.extend(zone_scenes);
    }

    let file = ScenesFile::new(frame_count, scenes);
    file.check_contiguous(true)?;
    info!("Scene creation complete / {} scenes", file.scenes.len());
    Ok(file)
}

fn check_zone_scenes(zone: &ResolvedZone, scenes: &[Scene]) -> CoreResult<()> {
    let covers = scenes.first().map(|s| s.start_frame) == Some(zone.start_frame)
        && scenes.last().map(|s| s.end_frame) == Some(zone.end_frame)
        && scenes.windows(2).all(|w| w[0].end_frame == w[1].start_frame);
    if !covers {
        return Err(CoreError::Partition(format!(
            "scenes for zone [{}:{}] do not cover it contiguously",
            zone.start_frame, zone.end_frame
        )));
    }

    // Bisection may only go below the minimum when the zone itself is that short
    if zone.config.scene_detection_method == SceneDetectionMethod::Bisection
        && zone.len() >= zone.config.min_scene_len
    {
        if let Some(short) = scenes.iter().find(|s| s.len() < zone.config.min_scene_len) {
            return Err(CoreError::SceneLength {
                start: short.start_frame,
                end: short.end_frame,
                min_scene_len: zone.config.min_scene_len,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneConfig;
    use crate::external::mocks::MockSceneCuts;

    fn zone(start: usize, end: usize, config: ZoneConfig) -> ResolvedZone {
        ResolvedZone {
            start_frame: start,
            end_frame: end,
            key: "default".into(),
            config,
        }
    }

    fn small_splits() -> ZoneConfig {
        ZoneConfig {
            target_split: 4,
            extra_split: 20,
            min_scene_len: 2,
            ..ZoneConfig::default()
        }
    }

    #[test]
    fn bisection_scenario() {
        let series = DiffSeries::from_diffs(vec![0.0, 5.0, 0.0, 0.0, 6.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let inputs = DetectionInputs::new(&series, LumaFormat::default());
        let file = detect_scenes(&[zone(0, 10, small_splits())], &inputs).unwrap();
        let ranges: Vec<_> = file.scenes.iter().map(|s| (s.start_frame, s.end_frame)).collect();
        assert_eq!(ranges, vec![(0, 4), (4, 10)]);
        assert_eq!(file.frame_count, 10);
    }

    #[test]
    fn zones_are_offset_and_concatenated() {
        let mut diffs = vec![0.0f32; 20];
        diffs[14] = 6.0;
        let series = DiffSeries::from_diffs(diffs);
        let inputs = DetectionInputs::new(&series, LumaFormat::default());
        let zones = [zone(0, 10, small_splits()), zone(10, 20, small_splits())];
        let file = detect_scenes(&zones, &inputs).unwrap();
        let ranges: Vec<_> = file.scenes.iter().map(|s| (s.start_frame, s.end_frame)).collect();
        assert_eq!(ranges, vec![(0, 10), (10, 14), (14, 20)]);
    }

    #[test]
    fn scene_cut_flags_promote_cuts() {
        let series = DiffSeries::from_diffs(vec![0.2; 10]);
        let mut flags = vec![0.0; 10];
        flags[6] = 1.0;
        let cuts = MockSceneCuts::new(flags);
        let inputs = DetectionInputs {
            scene_cuts: Some(&cuts),
            ..DetectionInputs::new(&series, LumaFormat::default())
        };
        let file = detect_scenes(&[zone(0, 10, small_splits())], &inputs).unwrap();
        assert_eq!(file.scenes[1].start_frame, 6);
    }

    #[test]
    fn external_zone_without_input_is_config_error() {
        let series = DiffSeries::from_diffs(vec![0.0; 10]);
        let inputs = DetectionInputs::new(&series, LumaFormat::default());
        let config = ZoneConfig {
            scene_detection_method: SceneDetectionMethod::External,
            ..ZoneConfig::default()
        };
        let result = detect_scenes(&[zone(0, 10, config)], &inputs);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn method_names_parse() {
        let m: SceneDetectionMethod = serde_json::from_str("\"vapoursynth\"").unwrap();
        assert_eq!(m, SceneDetectionMethod::Bisection);
        let m: SceneDetectionMethod = serde_json::from_str("\"av1an\"").unwrap();
        assert_eq!(m, SceneDetectionMethod::Av1an);
    }
}
