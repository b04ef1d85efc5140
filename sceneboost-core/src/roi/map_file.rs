//! ROI map files consumed by the encoder's `--roi-map-file`.
//!
//! One line per entry: the frame offset followed by the per-block offsets,
//! all integers separated by single spaces.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::checkpoint::write_atomic;
use crate::error::CoreResult;
use crate::roi::RoiMap;

/// `roi-map-{index}.txt`, the index zero-padded to the width of `scene_count`.
pub fn roi_map_file_name(scene_index: usize, scene_count: usize) -> String {
    let width = scene_count.max(1).to_string().len();
    format!("roi-map-{scene_index:0width$}.txt")
}

pub fn render_roi_map(map: &RoiMap) -> String {
    let mut out = String::new();
    for line in &map.lines {
        let _ = write!(out, "{}", line.frame_offset);
        for v in &line.values {
            let _ = write!(out, " {v}");
        }
        out.push('\n');
    }
    out
}

/// Writes the map of scene `scene_index` into `dir` and returns its path.
pub fn write_roi_map(dir: &Path, scene_index: usize, scene_count: usize, map: &RoiMap) -> CoreResult<PathBuf> {
    let path = dir.join(roi_map_file_name(scene_index, scene_count));
    write_atomic(&path, render_roi_map(map).as_bytes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roi::RoiLine;

    #[test]
    fn names_are_padded_to_scene_count() {
        assert_eq!(roi_map_file_name(7, 120), "roi-map-007.txt");
        assert_eq!(roi_map_file_name(7, 9), "roi-map-7.txt");
        assert_eq!(roi_map_file_name(10, 10), "roi-map-10.txt");
    }

    #[test]
    fn renders_and_writes_lines() {
        let map = RoiMap {
            cols: 3,
            rows: 1,
            lines: vec![
                RoiLine {
                    frame_offset: 0,
                    values: vec![-4, 0, 3],
                },
                RoiLine {
                    frame_offset: 1,
                    values: vec![0, 0, 0],
                },
            ],
            crf_offset: 0.0,
        };
        assert_eq!(render_roi_map(&map), "0 -4 0 3\n1 0 0 0\n");

        let dir = tempfile::tempdir().unwrap();
        let path = write_roi_map(dir.path(), 2, 30, &map).unwrap();
        assert!(path.ends_with("roi-map-02.txt"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "0 -4 0 3\n1 0 0 0\n");
    }
}
