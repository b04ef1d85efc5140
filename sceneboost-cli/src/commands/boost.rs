//! Implementation of the 'boost' subcommand.
//!
//! Solves the final crf of every scene from recorded probe scores, optionally
//! adds character ROI maps, and writes the boosted scenes file plus an
//! optional av1an zones file.

use crate::cli::BoostArgs;
use crate::commands::{load_scenes, load_series, load_specs, load_zone_ranges, open_workspace};
use crate::error::{CliResult, FileContext};
use crate::output::{print_section, print_status, print_success};
use crate::progress::BarProgress;

use sceneboost_core::external::{MetricEvaluators, PresenceMaskFile, ProbeScoreFile};
use sceneboost_core::scenes::format_crf;
use sceneboost_core::{BoostOutcome, BoostPipeline};

use log::{info, warn};

/// Runs the boost stage and writes its outputs.
pub fn run_boost(args: BoostArgs, verbose: bool) -> CliResult<BoostOutcome> {
    let specs = load_specs(&args.zone_args)?;
    let workspace = open_workspace(args.workspace.as_deref(), &args.output)?;
    let series = load_series(&workspace)?;
    let scenes = load_scenes(&workspace, args.scenes.as_deref())?;
    let zones = load_zone_ranges(&args.zone_args, &specs, series.len())?;

    let probes = args
        .probe_scores
        .as_deref()
        .map(|p| {
            ProbeScoreFile::load(p).file_context("load probe scores from", p)
        })
        .transpose()?;
    let masks = args
        .presence_masks
        .as_deref()
        .map(|p| {
            PresenceMaskFile::load(p)
                .file_context("load presence masks from", p)
        })
        .transpose()?;

    if probes.is_none() && zones.iter().any(|z| z.config.metric_enable) {
        warn!("No probe scores given but metric boosting is enabled");
    }

    print_section("Boost");
    let progress = BarProgress::new(args.no_progress);
    let mut pipeline = BoostPipeline::new(&specs, workspace)
        .with_progress(&progress)
        .verbose(verbose);
    if let Some(probes) = &probes {
        pipeline = pipeline
            .with_encoder(probes)
            .with_metrics(MetricEvaluators::single(probes));
    }
    if let Some(masks) = &masks {
        pipeline = pipeline.with_segmentation(masks);
    }

    let outcome = pipeline.boost(&series, &zones, &scenes)?;
    drop(progress);

    summarise(&outcome);

    outcome
        .write_scenes(&args.output)
        .file_context("write scenes to", &args.output)?;
    info!("Boosted scenes written to {}", args.output.display());

    if let Some(path) = &args.av1an_zones {
        outcome
            .write_av1an_zones(path)
            .file_context("write av1an zones to", path)?;
        info!("av1an zones written to {}", path.display());
    }

    print_success("Boost complete");
    Ok(outcome)
}

fn summarise(outcome: &BoostOutcome) {
    let reports = &outcome.reports;
    if reports.is_empty() {
        return;
    }
    let total_frames: usize = reports.iter().map(|r| r.scene.len()).sum();
    // Frame-weighted mean so short scenes do not dominate
    let mean = reports
        .iter()
        .map(|r| r.final_crf * r.scene.len() as f64)
        .sum::<f64>()
        / total_frames.max(1) as f64;
    let lowest = reports.iter().map(|r| r.final_crf).fold(f64::INFINITY, f64::min);
    let flagged = reports.iter().filter(|r| !r.diagnostics.is_empty()).count();

    print_status("Scenes", &reports.len().to_string(), false);
    print_status("Mean final crf", &format!("{mean:.2}"), true);
    print_status("Lowest final crf", &format_crf(lowest), false);
    if flagged > 0 {
        print_status("Scenes flagged", &flagged.to_string(), true);
    }
}
