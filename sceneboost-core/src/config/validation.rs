//! Zone configuration validation

use super::ZoneConfig;
use crate::detection::SceneDetectionMethod;
use crate::error::{CoreError, CoreResult};

impl ZoneConfig {
    /// Checks value ranges that would otherwise surface as nonsense scenes or
    /// a solver without a valid interval.
    pub fn validate(&self) -> CoreResult<()> {
        if self.min_scene_len == 0 {
            return Err(CoreError::Config("min_scene_len must be at least 1".into()));
        }
        if self.target_split == 0 {
            return Err(CoreError::Config("target_split must be at least 1".into()));
        }
        if self.scene_detection_method == SceneDetectionMethod::Bisection
            && self.extra_split < 2 * self.min_scene_len
        {
            return Err(CoreError::Config(format!(
                "extra_split ({}) must be at least twice min_scene_len ({})",
                self.extra_split, self.min_scene_len
            )));
        }
        for (name, value) in [
            ("metric_target", self.metric_target),
            ("min_crf", self.min_crf),
            ("max_crf", self.max_crf),
            ("unboosted_crf", self.unboosted_crf),
            ("final_min_crf", self.final_min_crf),
            ("final_crf_exponent", self.final_crf_exponent),
        ] {
            if !value.is_finite() {
                return Err(CoreError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.min_crf >= self.max_crf {
            return Err(CoreError::Config(format!(
                "min_crf ({:.2}) must be below max_crf ({:.2})",
                self.min_crf, self.max_crf
            )));
        }
        if self.final_crf_exponent <= 0.0 {
            return Err(CoreError::Config("final_crf_exponent must be positive".into()));
        }
        self.summariser.validate()?;
        // The upper bracket alone can come up empty on a flat scene
        let samples_a_frame = self.highest_diff_frames > 0
            || self.lower_bracket_frames > 0
            || self.upper_bracket_fallback_frames > 0
            || self.first_frame
            || self.last_frame;
        if self.metric_enable && !samples_a_frame {
            return Err(CoreError::Config(
                "sampling selects no frames: set highest_diff_frames, lower_bracket_frames, \
                 upper_bracket_fallback_frames, first_frame or last_frame"
                    .into(),
            ));
        }
        if self.character_enable && !(self.character_sigma > 0.0 && self.character_sigma.is_finite()) {
            return Err(CoreError::Config(format!(
                "character_sigma must be positive, got {}",
                self.character_sigma
            )));
        }
        if self.final_params.iter().any(|p| p == "--crf" || p == "--preset") {
            return Err(CoreError::Config(
                "final_params must not set --crf or --preset".into(),
            ));
        }
        Ok(())
    }
}
