//! Checkpoint workspace management.
//!
//! A run keeps its intermediate results in a workspace directory so an
//! interrupted run can resume without remeasuring the source. Every file is
//! written through a temporary file in the same directory and then renamed
//! over the destination, so a crash never leaves a half-written checkpoint.

use crate::error::{CoreError, CoreResult};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::Builder as TempFileBuilder;

const SCENE_DETECTION_DIR: &str = "scene-detection";
const ROI_MAPS_DIR: &str = "roi-maps";
const SCENES_FILE: &str = "scenes.json";

/// Directory layout for one run's checkpoints.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Opens (creating if needed) a workspace rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(SCENE_DETECTION_DIR))?;
        debug!("Using checkpoint workspace {}", root.display());
        Ok(Self { root })
    }

    /// Default workspace next to an output scenes file: `<output>.boost.tmp`.
    pub fn for_output(output: &Path) -> CoreResult<Self> {
        let mut name = output
            .file_name()
            .ok_or_else(|| {
                CoreError::Checkpoint(format!("'{}' has no file name", output.display()))
            })?
            .to_os_string();
        name.push(".boost.tmp");
        Self::open(output.with_file_name(name))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the luma statistics and the detected scenes.
    pub fn scene_detection_dir(&self) -> PathBuf {
        self.root.join(SCENE_DETECTION_DIR)
    }

    pub fn scenes_path(&self) -> PathBuf {
        self.scene_detection_dir().join(SCENES_FILE)
    }

    /// Directory for per-scene ROI map files, created on first use.
    pub fn roi_maps_dir(&self) -> CoreResult<PathBuf> {
        let dir = self.root.join(ROI_MAPS_DIR);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

/// Writes `contents` to `path` atomically.
pub fn write_atomic(path: &Path, contents: &[u8]) -> CoreResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut temp = TempFileBuilder::new()
        .prefix(".checkpoint_")
        .suffix(".tmp")
        .tempfile_in(&dir)?;
    temp.write_all(contents)?;
    temp.flush()?;
    temp.persist(path).map_err(|e| CoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".checkpoint_"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn workspace_for_output_sits_beside_it() {
        let dir = tempdir().unwrap();
        let ws = Workspace::for_output(&dir.path().join("scenes.json")).unwrap();
        assert_eq!(ws.root(), dir.path().join("scenes.json.boost.tmp"));
        assert!(ws.scene_detection_dir().is_dir());
    }
}
