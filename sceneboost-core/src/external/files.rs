//! Collaborators replaying results recorded by external tools.
//!
//! The command-line tool does not drive an encoder or a metric itself; it
//! reads their results from JSON files:
//!
//! - probe scores: `{"probes": [{"crf": 16.0, "scores": {"0": 0.41, ...}}]}`
//! - presence masks: `{"masks": {"0": {"width": .., "height": .., "data": [..]}}}`
//! - scene-cut flags: `{"flags": [0.0, 1.0, ...]}`, one flag per frame

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::ProbeConfig;
use crate::error::{CoreError, CoreResult};
use crate::external::{MetricEvaluator, ProbeEncoder, ProbeHandle, SceneCutDetector, SegmentationModel};
use crate::roi::PresenceMask;
use crate::scenes::ScenesFile;

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> CoreResult<T> {
    let text = fs::read_to_string(path)?;
    let value = serde_json::from_str(&text)?;
    debug!("Loaded {}", path.display());
    Ok(value)
}

/// Frame scores of one recorded probe encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedProbe {
    pub crf: f64,
    pub scores: BTreeMap<usize, f64>,
}

/// Recorded probe encodes and their metric scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeScoreFile {
    pub probes: Vec<RecordedProbe>,
}

impl ProbeScoreFile {
    pub fn load(path: &Path) -> CoreResult<Self> {
        read_json(path)
    }

    fn probe(&self, crf: f64) -> Option<&RecordedProbe> {
        self.probes.iter().find(|p| (p.crf - crf).abs() < 1e-9)
    }
}

impl ProbeEncoder for ProbeScoreFile {
    fn encode(&self, crf: f64, _probe: &ProbeConfig, _scenes: &ScenesFile) -> CoreResult<ProbeHandle> {
        self.probe(crf)
            .map(|p| ProbeHandle { crf: p.crf, path: None })
            .ok_or_else(|| CoreError::External(format!("no recorded probe at crf {crf:.2}")))
    }
}

impl MetricEvaluator for ProbeScoreFile {
    fn score_frames(&self, probe: &ProbeHandle, frames: &[usize]) -> CoreResult<Vec<f64>> {
        let recorded = self
            .probe(probe.crf)
            .ok_or_else(|| CoreError::External(format!("no recorded probe at crf {:.2}", probe.crf)))?;
        frames
            .iter()
            .map(|frame| {
                recorded.scores.get(frame).copied().ok_or_else(|| {
                    CoreError::External(format!("no recorded score for frame {frame} at crf {:.2}", probe.crf))
                })
            })
            .collect()
    }
}

/// Recorded presence masks by absolute frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceMaskFile {
    pub masks: BTreeMap<usize, PresenceMask>,
}

impl PresenceMaskFile {
    pub fn load(path: &Path) -> CoreResult<Self> {
        let file: Self = read_json(path)?;
        for mask in file.masks.values() {
            mask.validate()?;
        }
        Ok(file)
    }
}

impl SegmentationModel for PresenceMaskFile {
    fn presence(&self, frame: usize) -> CoreResult<PresenceMask> {
        self.masks
            .get(&frame)
            .cloned()
            .ok_or_else(|| CoreError::External(format!("no recorded presence mask for frame {frame}")))
    }
}

/// Recorded scene-cut flags for the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneCutFile {
    pub flags: Vec<f32>,
}

impl SceneCutFile {
    pub fn load(path: &Path) -> CoreResult<Self> {
        read_json(path)
    }
}

impl SceneCutDetector for SceneCutFile {
    fn scene_cuts(&self, start: usize, end: usize) -> CoreResult<Vec<f32>> {
        self.flags
            .get(start..end)
            .map(<[f32]>::to_vec)
            .ok_or_else(|| {
                CoreError::External(format!(
                    "scene-cut flags cover {} frames, zone needs [{start}:{end}]",
                    self.flags.len()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_scores_parse_and_replay() {
        let json = r#"{"probes": [
            {"crf": 16.0, "scores": {"0": 0.4, "5": 0.5}},
            {"crf": 24.0, "scores": {"0": 0.7, "5": 0.9}}
        ]}"#;
        let file: ProbeScoreFile = serde_json::from_str(json).unwrap();
        let scenes = ScenesFile::new(10, Vec::new());
        let handle = file.encode(24.0, &ProbeConfig::default(), &scenes).unwrap();
        assert_eq!(file.score_frames(&handle, &[5, 0]).unwrap(), vec![0.9, 0.7]);
        assert!(file.score_frames(&handle, &[3]).is_err());
        assert!(file.encode(30.0, &ProbeConfig::default(), &scenes).is_err());
    }

    #[test]
    fn scene_cut_range_must_be_covered() {
        let file = SceneCutFile {
            flags: vec![0.0, 1.0, 0.5],
        };
        assert_eq!(file.scene_cuts(1, 3).unwrap(), vec![1.0, 0.5]);
        assert!(file.scene_cuts(2, 5).is_err());
    }

    #[test]
    fn presence_masks_are_validated_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masks.json");
        fs::write(&path, r#"{"masks": {"0": {"width": 2, "height": 2, "data": [1.0]}}}"#).unwrap();
        assert!(PresenceMaskFile::load(&path).is_err());
    }
}
