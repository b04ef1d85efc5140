// ============================================================================
// sceneboost-core/src/scenes.rs
// ============================================================================
//
// SCENES: Scene Records and Scenes Files
//
// The scenes file is both an input (external or av1an scene lists) and the
// final output of a run, where each scene carries the encoder overrides that
// realise its solved crf. The layout is compatible with av1an's `--scenes`.
//
// AI-ASSISTANT-INFO: Scene, ScenesFile and av1an zones line formatting

// ---- External crate imports ----
use log::debug;
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::fs;
use std::path::Path;

// ---- Internal crate imports ----
use crate::checkpoint::write_atomic;
use crate::error::{CoreError, CoreResult};

/// A contiguous frame range encoded with one parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub start_frame: usize,
    pub end_frame: usize,
    #[serde(default)]
    pub zone_overrides: Option<ZoneOverrides>,
}

impl Scene {
    pub fn new(start_frame: usize, end_frame: usize) -> Self {
        Self {
            start_frame,
            end_frame,
            zone_overrides: None,
        }
    }

    pub fn len(&self) -> usize {
        self.end_frame.saturating_sub(self.start_frame)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Encoder settings attached to a scene in the output scenes file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOverrides {
    pub encoder: String,
    pub passes: u32,
    pub video_params: Vec<String>,
    pub photon_noise: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photon_noise_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photon_noise_height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chroma_noise: Option<bool>,
    pub extra_splits_len: Option<usize>,
    pub min_scene_len: usize,
}

/// `{frame_count, scenes}`; `frames` is accepted as an alias on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenesFile {
    #[serde(alias = "frames")]
    pub frame_count: usize,
    pub scenes: Vec<Scene>,
}

impl ScenesFile {
    pub fn new(frame_count: usize, scenes: Vec<Scene>) -> Self {
        Self {
            frame_count,
            scenes,
        }
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CoreError::OperationFailed(format!("Failed to read scenes file '{}': {e}", path.display()))
        })?;
        let file: ScenesFile = serde_json::from_str(&contents)?;
        debug!("Loaded {} scenes from {}", file.scenes.len(), path.display());
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> CoreResult<()> {
        let body = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &body)
    }

    /// Checks that the scenes are non-empty, ordered and contiguous from
    /// frame 0. When `cover_all` is set they must also end at `frame_count`.
    pub fn check_contiguous(&self, cover_all: bool) -> CoreResult<()> {
        let mut head = 0;
        for scene in &self.scenes {
            if scene.start_frame != head {
                return Err(CoreError::Partition(format!(
                    "scene [{}:{}] starts at {} but the previous scene ends at {}",
                    scene.start_frame, scene.end_frame, scene.start_frame, head
                )));
            }
            if scene.end_frame <= scene.start_frame {
                return Err(CoreError::Partition(format!(
                    "scene [{}:{}] is empty",
                    scene.start_frame, scene.end_frame
                )));
            }
            head = scene.end_frame;
        }
        if head > self.frame_count || (cover_all && head != self.frame_count) {
            return Err(CoreError::Partition(format!(
                "scenes end at frame {head} but the file has {} frames",
                self.frame_count
            )));
        }
        Ok(())
    }
}

/// Formats a crf the way SVT-AV1 parameters are written: two decimals.
pub fn format_crf(crf: f64) -> String {
    format!("{crf:.2}")
}

/// One line of an av1an zones file for a boosted scene.
pub fn av1an_zone_line(scene: &Scene, crf: f64, reset: bool, params: &[String], roi_map: Option<&Path>) -> String {
    let mut line = format!("{} {} svt-av1", scene.start_frame, scene.end_frame);
    if reset {
        line.push_str(" reset");
    }
    line.push_str(" --crf ");
    line.push_str(&format_crf(crf));
    for p in params {
        line.push(' ');
        line.push_str(p);
    }
    if let Some(path) = roi_map {
        line.push_str(&format!(" --roi-map-file '{}'", path.display()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_alias_is_accepted() {
        let file: ScenesFile = serde_json::from_str(
            r#"{"frames": 20, "scenes": [{"start_frame": 0, "end_frame": 20}]}"#,
        )
        .unwrap();
        assert_eq!(file.frame_count, 20);
        assert_eq!(file.scenes[0].zone_overrides, None);
        file.check_contiguous(true).unwrap();
    }

    #[test]
    fn gaps_are_rejected() {
        let file = ScenesFile::new(20, vec![Scene::new(0, 8), Scene::new(9, 20)]);
        assert!(matches!(file.check_contiguous(true), Err(CoreError::Partition(_))));
    }

    #[test]
    fn short_list_only_fails_when_full_cover_required() {
        let file = ScenesFile::new(20, vec![Scene::new(0, 8)]);
        assert!(file.check_contiguous(false).is_ok());
        assert!(file.check_contiguous(true).is_err());
    }

    #[test]
    fn zone_line_format() {
        let line = av1an_zone_line(
            &Scene::new(10, 40),
            21.5,
            true,
            &["--preset".into(), "0".into()],
            Some(Path::new("/tmp/roi-map-1.txt")),
        );
        assert_eq!(
            line,
            "10 40 svt-av1 reset --crf 21.50 --preset 0 --roi-map-file '/tmp/roi-map-1.txt'"
        );
    }

    #[test]
    fn optional_noise_fields_are_omitted() {
        let overrides = ZoneOverrides {
            encoder: "svt_av1".into(),
            passes: 1,
            video_params: vec!["--crf".into(), "20.00".into()],
            photon_noise: None,
            photon_noise_width: None,
            photon_noise_height: None,
            chroma_noise: None,
            extra_splits_len: Some(192),
            min_scene_len: 12,
        };
        let json = serde_json::to_string(&overrides).unwrap();
        assert!(json.contains("\"photon_noise\":null"));
        assert!(!json.contains("chroma_noise"));
    }
}
