//! Configuration structures and constants for the sceneboost-core library.
//!
//! A `ZoneConfig` holds every option that may differ between zones of one
//! file: scene detection thresholds, sampling tiers, the metric target and crf
//! bounds, final encoder parameters and character boost settings. Behavioural
//! differences are selected with plain enums rather than per-zone code.

mod builder;
mod file;
mod validation;

use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::detection::SceneDetectionMethod;
use crate::quality::{Comparator, CrfResponse, Summariser};
use crate::roi::GroupMultipliers;

pub use builder::ZoneConfigBuilder;
pub use file::{DEFAULT_ZONE_KEY, ProbeConfig, ZoneSpecs};

// Default constants

/// Intervals at or below this many frames are never split further.
pub const DEFAULT_TARGET_SPLIT: usize = 33;

/// Intervals longer than this use the chunk-count aware split rules.
pub const DEFAULT_EXTRA_SPLIT: usize = 192;

/// Minimum scene length in frames produced by bisection.
pub const DEFAULT_MIN_SCENE_LEN: usize = 12;

/// Frames picked from the highest-diff tier of each scene.
pub const DEFAULT_HIGHEST_DIFF_FRAMES: usize = 8;
pub const DEFAULT_HIGHEST_DIFF_MIN_SEPARATION: usize = 4;

pub const DEFAULT_UPPER_BRACKET_FRAMES: usize = 16;
pub const DEFAULT_UPPER_BRACKET_FALLBACK_FRAMES: usize = 10;
pub const DEFAULT_LOWER_BRACKET_FRAMES: usize = 0;
pub const DEFAULT_LOWER_BRACKET_MIN_SEPARATION: usize = 2;

/// Target for the summarised metric score (Butteraugli 3-norm by default).
pub const DEFAULT_METRIC_TARGET: f64 = 0.62;

pub const DEFAULT_MIN_CRF: f64 = 8.0;
pub const DEFAULT_MAX_CRF: f64 = 40.0;

/// Crf used for zones whose metric stage is disabled.
pub const DEFAULT_UNBOOSTED_CRF: f64 = 27.0;

/// Floor applied after the final crf adjustment.
pub const DEFAULT_FINAL_MIN_CRF: f64 = 6.5;

/// Exponent of the `(crf / 24) ^ e * 24` compensation between the probing
/// preset and the slower final preset.
pub const DEFAULT_FINAL_CRF_EXPONENT: f64 = 0.92;

pub const DEFAULT_PROBING_PRESET: i32 = 6;
pub const DEFAULT_FINAL_PRESET: i32 = 0;

pub const DEFAULT_PROBE_CRFS: [f64; 2] = [16.0, 24.0];

/// Maximum ROI boost magnitude.
pub const DEFAULT_CHARACTER_SIGMA: f64 = 5.0;

/// Scenes whose final crf lands below `final_min_crf + this` are reported.
pub const REPORTING_CRF_MARGIN: f64 = 6.0;

/// Per-zone configuration.
///
/// All fields have defaults mirroring the reference Butteraugli preset, so a
/// zone file only needs to name the options it changes. Use
/// [`ZoneConfigBuilder`] to construct one fluently in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoneConfig {
    //
    // Scene detection
    //
    pub scene_detection_method: SceneDetectionMethod,
    pub target_split: usize,
    pub extra_split: usize,
    pub min_scene_len: usize,

    //
    // Frame sampling
    //
    pub highest_diff_frames: usize,
    pub highest_diff_min_separation: usize,
    pub upper_bracket_frames: usize,
    pub upper_bracket_fallback_frames: usize,
    pub lower_bracket_frames: usize,
    pub lower_bracket_min_separation: usize,
    /// Force the scene's first frame into the sample set.
    pub first_frame: bool,
    /// Force the scene's last frame into the sample set.
    pub last_frame: bool,

    //
    // Metric and solving
    //
    pub metric_enable: bool,
    pub metric_method: MetricMethod,
    pub comparator: Comparator,
    pub crf_response: CrfResponse,
    pub summariser: Summariser,
    pub metric_target: f64,
    pub min_crf: f64,
    pub max_crf: f64,
    pub unboosted_crf: f64,

    //
    // Final encode
    //
    pub final_min_crf: f64,
    pub final_crf_exponent: f64,
    pub final_preset: i32,
    pub final_params: Vec<String>,
    /// Emit `reset` in av1an zones lines so earlier parameters are dropped.
    pub final_params_reset: bool,
    pub photon_noise: Option<u32>,
    pub photon_noise_width: Option<u32>,
    pub photon_noise_height: Option<u32>,
    pub chroma_noise: Option<bool>,

    //
    // Character boost
    //
    pub character_enable: bool,
    pub character_sigma: f64,
    pub character_multipliers: GroupMultipliers,
}

/// Which external evaluator scores probe frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricMethod {
    #[default]
    Ffvship,
    Vapoursynth,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            scene_detection_method: SceneDetectionMethod::default(),
            target_split: DEFAULT_TARGET_SPLIT,
            extra_split: DEFAULT_EXTRA_SPLIT,
            min_scene_len: DEFAULT_MIN_SCENE_LEN,

            highest_diff_frames: DEFAULT_HIGHEST_DIFF_FRAMES,
            highest_diff_min_separation: DEFAULT_HIGHEST_DIFF_MIN_SEPARATION,
            upper_bracket_frames: DEFAULT_UPPER_BRACKET_FRAMES,
            upper_bracket_fallback_frames: DEFAULT_UPPER_BRACKET_FALLBACK_FRAMES,
            lower_bracket_frames: DEFAULT_LOWER_BRACKET_FRAMES,
            lower_bracket_min_separation: DEFAULT_LOWER_BRACKET_MIN_SEPARATION,
            first_frame: false,
            last_frame: true,

            metric_enable: true,
            metric_method: MetricMethod::default(),
            comparator: Comparator::LowerIsBetter,
            // Butteraugli distance grows as crf rises.
            crf_response: CrfResponse::Degrades,
            summariser: Summariser::Max,
            metric_target: DEFAULT_METRIC_TARGET,
            min_crf: DEFAULT_MIN_CRF,
            max_crf: DEFAULT_MAX_CRF,
            unboosted_crf: DEFAULT_UNBOOSTED_CRF,

            final_min_crf: DEFAULT_FINAL_MIN_CRF,
            final_crf_exponent: DEFAULT_FINAL_CRF_EXPONENT,
            final_preset: DEFAULT_FINAL_PRESET,
            final_params: Vec::new(),
            final_params_reset: false,
            photon_noise: None,
            photon_noise_width: None,
            photon_noise_height: None,
            chroma_noise: None,

            character_enable: false,
            character_sigma: DEFAULT_CHARACTER_SIGMA,
            character_multipliers: GroupMultipliers::default(),
        }
    }
}

impl ZoneConfig {
    /// Defaults with `SCENEBOOST_*` environment overrides applied. A value
    /// that does not parse keeps the default.
    pub fn from_env() -> Self {
        let mut zone = Self::default();
        override_from_env(&mut zone.target_split, "TARGET_SPLIT");
        override_from_env(&mut zone.extra_split, "EXTRA_SPLIT");
        override_from_env(&mut zone.min_scene_len, "MIN_SCENE_LEN");
        override_flag_from_env(&mut zone.metric_enable, "METRIC_ENABLE");
        override_from_env(&mut zone.metric_target, "METRIC_TARGET");
        override_from_env(&mut zone.min_crf, "MIN_CRF");
        override_from_env(&mut zone.max_crf, "MAX_CRF");
        override_from_env(&mut zone.unboosted_crf, "UNBOOSTED_CRF");
        override_from_env(&mut zone.final_min_crf, "FINAL_MIN_CRF");
        override_from_env(&mut zone.final_preset, "FINAL_PRESET");
        override_flag_from_env(&mut zone.character_enable, "CHARACTER_ENABLE");
        override_from_env(&mut zone.character_sigma, "CHARACTER_SIGMA");
        zone
    }

    /// Crf below which a scene is always reported.
    pub fn reporting_crf(&self) -> f64 {
        self.final_min_crf + REPORTING_CRF_MARGIN
    }

    /// Parameters passed to the final encoder for a scene, excluding `--crf`.
    pub fn final_video_params(&self) -> Vec<String> {
        let mut params = vec!["--preset".to_string(), self.final_preset.to_string()];
        params.extend(self.final_params.iter().cloned());
        params
    }
}

/// Prefix of every zone override variable.
pub const ENV_PREFIX: &str = "SCENEBOOST_";

fn env_value(option: &str) -> Option<(String, String)> {
    let name = format!("{ENV_PREFIX}{option}");
    std::env::var(&name).ok().map(|value| (name, value))
}

fn override_from_env<T: FromStr>(field: &mut T, option: &str) {
    if let Some((name, value)) = env_value(option) {
        match value.trim().parse() {
            Ok(parsed) => *field = parsed,
            Err(_) => warn!("Ignoring {name}={value}: not a valid value"),
        }
    }
}

fn override_flag_from_env(field: &mut bool, option: &str) {
    if let Some((name, value)) = env_value(option) {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => *field = true,
            "0" | "false" | "no" | "off" => *field = false,
            _ => warn!("Ignoring {name}={value}: expected a boolean"),
        }
    }
}
