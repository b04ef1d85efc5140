//! Implementation of the 'detect' subcommand.
//!
//! Loads the luma statistics checkpoint of a workspace, resolves zones and
//! runs scene detection per zone. The result is saved as the workspace's
//! scenes checkpoint and optionally copied elsewhere.

use crate::cli::DetectArgs;
use crate::commands::{load_series, load_specs, load_zone_ranges};
use crate::error::{CliResult, FileContext};
use crate::output::{print_section, print_status, print_success};

use sceneboost_core::checkpoint::Workspace;
use sceneboost_core::external::{SceneCutDetector, SceneCutFile};
use sceneboost_core::stats::ColorRange;
use sceneboost_core::{BoostPipeline, DetectionInputs, LumaFormat, ScenesFile};

use log::info;
use std::fs;
use std::path::Path;

fn load_scene_list(path: Option<&Path>, what: &str) -> CliResult<Option<ScenesFile>> {
    path.map(|p| {
        ScenesFile::load(p).file_context(format!("load {what} scenes from"), p)
    })
    .transpose()
}

/// Runs scene detection and returns the detected scenes.
pub fn run_detect(args: DetectArgs) -> CliResult<ScenesFile> {
    let specs = load_specs(&args.zone_args)?;
    let workspace = Workspace::open(&args.workspace)?;
    let series = load_series(&workspace)?;
    let zones = load_zone_ranges(&args.zone_args, &specs, series.len())?;

    if args.force {
        remove_checkpoint(&workspace)?;
    }

    let scene_cuts = args
        .scene_cuts
        .as_deref()
        .map(|p| {
            SceneCutFile::load(p).file_context("load scene cuts from", p)
        })
        .transpose()?;
    let external = load_scene_list(args.external_scenes.as_deref(), "external")?;
    let av1an = load_scene_list(args.av1an_scenes.as_deref(), "av1an")?;

    let format = LumaFormat {
        bits: args.bits,
        range: if args.full_range {
            ColorRange::Full
        } else {
            ColorRange::Limited
        },
    };
    let mut inputs = DetectionInputs::new(&series, format);
    inputs.scene_cuts = scene_cuts.as_ref().map(|c| c as &dyn SceneCutDetector);
    inputs.external_scenes = external.as_ref();
    inputs.av1an_scenes = av1an.as_ref();

    print_section("Scene detection");
    let pipeline = BoostPipeline::new(&specs, workspace);
    let scenes = pipeline.detect(&zones, &inputs)?;

    print_status("Frames", &series.len().to_string(), false);
    print_status("Zones", &zones.len().to_string(), false);
    print_status("Scenes", &scenes.scenes.len().to_string(), true);

    if let Some(output) = &args.output {
        scenes
            .save(output)
            .file_context("write scenes to", output)?;
        info!("Scenes written to {}", output.display());
    }
    print_success("Scene detection complete");
    Ok(scenes)
}

fn remove_checkpoint(workspace: &Workspace) -> CliResult<()> {
    let path = workspace.scenes_path();
    if path.exists() {
        fs::remove_file(&path)
            .file_context("remove scenes checkpoint", &path)?;
        info!("Removed existing scenes checkpoint");
    }
    Ok(())
}
