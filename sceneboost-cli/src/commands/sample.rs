//! Implementation of the 'sample' subcommand.
//!
//! Writes the frames the boost stage would score for every scene, so probe
//! metric runs can be limited to them.

use crate::cli::SampleArgs;
use crate::commands::{load_scenes, load_series, load_specs, load_zone_ranges};
use crate::error::{CliResult, FileContext};
use crate::output::{print_section, print_status, print_success};

use sceneboost_core::BoostPipeline;
use sceneboost_core::checkpoint::Workspace;

use serde::{Deserialize, Serialize};
use std::fs;

/// Sampled frames of one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSamples {
    pub index: usize,
    pub start_frame: usize,
    pub end_frame: usize,
    pub frames: Vec<usize>,
}

/// Samples every scene and writes the frame lists as JSON.
pub fn run_sample(args: SampleArgs) -> CliResult<Vec<SceneSamples>> {
    let specs = load_specs(&args.zone_args)?;
    let workspace = Workspace::open(&args.workspace)?;
    let series = load_series(&workspace)?;
    let scenes = load_scenes(&workspace, args.scenes.as_deref())?;
    let zones = load_zone_ranges(&args.zone_args, &specs, series.len())?;

    print_section("Frame sampling");
    let pipeline = BoostPipeline::new(&specs, workspace);
    let sets = pipeline.sample(&series, &zones, &scenes)?;

    let samples: Vec<SceneSamples> = scenes
        .scenes
        .iter()
        .zip(sets)
        .enumerate()
        .map(|(index, (scene, set))| SceneSamples {
            index,
            start_frame: scene.start_frame,
            end_frame: scene.end_frame,
            frames: set.frames,
        })
        .collect();

    let total: usize = samples.iter().map(|s| s.frames.len()).sum();
    print_status("Scenes", &samples.len().to_string(), false);
    print_status("Sampled frames", &total.to_string(), true);

    let json = serde_json::to_string_pretty(&samples)?;
    fs::write(&args.output, json)
        .file_context("write samples to", &args.output)?;
    print_success(&format!("Samples written to {}", args.output.display()));
    Ok(samples)
}
