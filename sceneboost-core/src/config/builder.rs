// ============================================================================
// sceneboost-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ZoneConfig
//
// Fluent construction of ZoneConfig values, starting from the defaults and
// overriding only the options a caller cares about.
//
// AI-ASSISTANT-INFO: Builder pattern implementation for ZoneConfig

// ---- Internal crate imports ----
use super::{MetricMethod, ZoneConfig};
use crate::detection::SceneDetectionMethod;
use crate::error::CoreResult;
use crate::quality::{Comparator, CrfResponse, Summariser};

/// Builder for creating ZoneConfig instances.
///
/// # Examples
///
/// ```rust
/// use sceneboost_core::config::ZoneConfigBuilder;
/// use sceneboost_core::quality::Comparator;
///
/// let zone = ZoneConfigBuilder::new()
///     .split_lengths(4, 20, 2)
///     .crf_bounds(8.0, 40.0)
///     .metric_target(15.0)
///     .comparator(Comparator::LowerIsBetter)
///     .build()
///     .unwrap();
/// assert_eq!(zone.target_split, 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZoneConfigBuilder {
    config: ZoneConfig,
}

impl ZoneConfigBuilder {
    /// Creates a new builder holding the default zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing zone, e.g. the file's default zone.
    pub fn from_zone(config: ZoneConfig) -> Self {
        Self { config }
    }

    pub fn scene_detection_method(mut self, method: SceneDetectionMethod) -> Self {
        self.config.scene_detection_method = method;
        self
    }

    /// Sets `target_split`, `extra_split` and `min_scene_len` together.
    pub fn split_lengths(mut self, target_split: usize, extra_split: usize, min_scene_len: usize) -> Self {
        self.config.target_split = target_split;
        self.config.extra_split = extra_split;
        self.config.min_scene_len = min_scene_len;
        self
    }

    /// Sets the highest-diff tier size and its minimum separation.
    pub fn highest_diff(mut self, frames: usize, min_separation: usize) -> Self {
        self.config.highest_diff_frames = frames;
        self.config.highest_diff_min_separation = min_separation;
        self
    }

    /// Sets the upper bracket quota and the fallback shortfall threshold.
    pub fn upper_bracket(mut self, frames: usize, fallback_frames: usize) -> Self {
        self.config.upper_bracket_frames = frames;
        self.config.upper_bracket_fallback_frames = fallback_frames;
        self
    }

    pub fn lower_bracket(mut self, frames: usize, min_separation: usize) -> Self {
        self.config.lower_bracket_frames = frames;
        self.config.lower_bracket_min_separation = min_separation;
        self
    }

    pub fn first_frame(mut self, enable: bool) -> Self {
        self.config.first_frame = enable;
        self
    }

    pub fn last_frame(mut self, enable: bool) -> Self {
        self.config.last_frame = enable;
        self
    }

    pub fn metric_enable(mut self, enable: bool) -> Self {
        self.config.metric_enable = enable;
        self
    }

    pub fn metric_method(mut self, method: MetricMethod) -> Self {
        self.config.metric_method = method;
        self
    }

    pub fn comparator(mut self, comparator: Comparator) -> Self {
        self.config.comparator = comparator;
        self
    }

    pub fn crf_response(mut self, response: CrfResponse) -> Self {
        self.config.crf_response = response;
        self
    }

    pub fn summariser(mut self, summariser: Summariser) -> Self {
        self.config.summariser = summariser;
        self
    }

    pub fn metric_target(mut self, target: f64) -> Self {
        self.config.metric_target = target;
        self
    }

    pub fn crf_bounds(mut self, min_crf: f64, max_crf: f64) -> Self {
        self.config.min_crf = min_crf;
        self.config.max_crf = max_crf;
        self
    }

    pub fn unboosted_crf(mut self, crf: f64) -> Self {
        self.config.unboosted_crf = crf;
        self
    }

    pub fn final_min_crf(mut self, crf: f64) -> Self {
        self.config.final_min_crf = crf;
        self
    }

    pub fn final_crf_exponent(mut self, exponent: f64) -> Self {
        self.config.final_crf_exponent = exponent;
        self
    }

    pub fn final_preset(mut self, preset: i32) -> Self {
        self.config.final_preset = preset;
        self
    }

    pub fn final_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.final_params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn photon_noise(mut self, strength: Option<u32>) -> Self {
        self.config.photon_noise = strength;
        self
    }

    /// Enables the character ROI boost with the given sigma.
    pub fn character_boost(mut self, sigma: f64) -> Self {
        self.config.character_enable = true;
        self.config.character_sigma = sigma;
        self
    }

    /// Validates and returns the zone.
    pub fn build(self) -> CoreResult<ZoneConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_only_named_fields() {
        let zone = ZoneConfigBuilder::new()
            .split_lengths(4, 20, 2)
            .metric_target(15.0)
            .build()
            .unwrap();
        assert_eq!(zone.extra_split, 20);
        assert_eq!(zone.metric_target, 15.0);
        assert_eq!(zone.max_crf, super::super::DEFAULT_MAX_CRF);
    }

    #[test]
    fn builder_rejects_inverted_bounds() {
        let result = ZoneConfigBuilder::new().crf_bounds(30.0, 20.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn character_boost_enables_roi() {
        let zone = ZoneConfigBuilder::new().character_boost(3.0).build().unwrap();
        assert!(zone.character_enable);
        assert_eq!(zone.character_sigma, 3.0);
    }
}
