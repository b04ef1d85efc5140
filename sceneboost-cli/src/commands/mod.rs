//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! helpers here load the inputs every command shares.

/// Scene detection from a luma statistics checkpoint.
pub mod detect;
/// Frame sampling per scene.
pub mod sample;
/// Per-scene crf solving and output files.
pub mod boost;

use crate::cli::ZoneArgs;
use crate::error::{CliResult, FileContext};

use sceneboost_core::checkpoint::Workspace;
use sceneboost_core::config::ProbeConfig;
use sceneboost_core::{
    DiffSeries, ResolvedZone, ScenesFile, ZoneConfig, ZoneSpecs, load_zones, resolve_zones,
};

use log::debug;
use std::path::Path;

/// Zone specs from `--zone-config`, or environment-adjusted defaults.
pub fn load_specs(args: &ZoneArgs) -> CliResult<ZoneSpecs> {
    match &args.zone_config {
        Some(path) => ZoneSpecs::load(path),
        None => {
            debug!("No zone config given, using defaults with environment overrides");
            let default = ZoneConfig::from_env();
            default.validate()?;
            Ok(ZoneSpecs::new(ProbeConfig::default(), default))
        }
    }
}

/// Resolves `--zones` or `--zones-file` over `frame_count` frames.
pub fn load_zone_ranges(args: &ZoneArgs, specs: &ZoneSpecs, frame_count: usize) -> CliResult<Vec<ResolvedZone>> {
    match (&args.zones, &args.zones_file) {
        (Some(zones), _) => resolve_zones(zones, specs, frame_count),
        (None, Some(path)) => load_zones(path, specs, frame_count)
            .file_context("load zones file", path),
        (None, None) => resolve_zones("", specs, frame_count),
    }
}

/// Opens `dir`, or the default `<output>.boost.tmp` workspace beside `output`.
pub fn open_workspace(dir: Option<&Path>, output: &Path) -> CliResult<Workspace> {
    match dir {
        Some(dir) => Workspace::open(dir),
        None => Workspace::for_output(output),
    }
}

/// Loads the workspace's luma statistics checkpoint.
pub fn load_series(workspace: &Workspace) -> CliResult<DiffSeries> {
    let dir = workspace.scene_detection_dir();
    let series = DiffSeries::load(&dir)
        .file_context("load luma statistics from", &dir)?;
    debug!("Loaded luma statistics for {} frames", series.len());
    Ok(series)
}

/// Scenes from `path`, or the workspace checkpoint when none is given.
pub fn load_scenes(workspace: &Workspace, path: Option<&Path>) -> CliResult<ScenesFile> {
    let path = path.map_or_else(|| workspace.scenes_path(), Path::to_path_buf);
    ScenesFile::load(&path).file_context("load scenes from", &path)
}
