// sceneboost-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "SceneBoost: per-scene crf boosting",
    long_about = "Splits a source into scenes, samples frames and solves a per-scene crf \
                  from recorded probe scores, using checkpoint files from a workspace."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug output and report every scene
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detects scenes from a luma statistics checkpoint
    Detect(DetectArgs),
    /// Lists the frames sampled from every scene
    Sample(SampleArgs),
    /// Solves the final crf of every scene from recorded probe scores
    Boost(BoostArgs),
}

/// Zone specification shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ZoneArgs {
    /// TOML zone file with [probe], [default] and [zones.<key>] tables.
    /// Without one, defaults with SCENEBOOST_* environment overrides are used.
    #[arg(short = 'c', long = "zone-config", value_name = "TOML")]
    pub zone_config: Option<PathBuf>,

    /// Zones string of `start_frame end_frame zone_key` triples
    #[arg(long, value_name = "ZONES", conflicts_with = "zones_file")]
    pub zones: Option<String>,

    /// File containing a zones string
    #[arg(long, value_name = "FILE")]
    pub zones_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Workspace directory holding the scene-detection checkpoint
    #[arg(short = 'w', long, value_name = "DIR")]
    pub workspace: PathBuf,

    /// Optional: also write the detected scenes here
    #[arg(short, long, value_name = "SCENES_JSON")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub zone_args: ZoneArgs,

    /// Optional: JSON file of per-frame scene-cut flags
    #[arg(long, value_name = "JSON")]
    pub scene_cuts: Option<PathBuf>,

    /// Optional: scenes used by zones with external scene detection
    #[arg(long, value_name = "SCENES_JSON")]
    pub external_scenes: Option<PathBuf>,

    /// Optional: av1an scenes used by zones with av1an scene detection
    #[arg(long, value_name = "SCENES_JSON")]
    pub av1an_scenes: Option<PathBuf>,

    /// Bit depth of the measured luma plane
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(8..=16))]
    pub bits: u32,

    /// The luma plane uses full range instead of limited range
    #[arg(long, default_value_t = false)]
    pub full_range: bool,

    /// Detect again even when a scenes checkpoint exists
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct SampleArgs {
    /// Workspace directory holding the scene-detection checkpoint
    #[arg(short = 'w', long, value_name = "DIR")]
    pub workspace: PathBuf,

    /// Optional: scenes file (defaults to the workspace checkpoint)
    #[arg(short, long, value_name = "SCENES_JSON")]
    pub scenes: Option<PathBuf>,

    /// Where to write the sampled frames
    #[arg(short, long, value_name = "JSON")]
    pub output: PathBuf,

    #[command(flatten)]
    pub zone_args: ZoneArgs,
}

#[derive(Parser, Debug)]
pub struct BoostArgs {
    /// Workspace directory holding the scene-detection checkpoint
    /// (defaults to OUTPUT.boost.tmp)
    #[arg(short = 'w', long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Optional: scenes file (defaults to the workspace checkpoint)
    #[arg(short, long, value_name = "SCENES_JSON")]
    pub scenes: Option<PathBuf>,

    /// Where to write the boosted scenes
    #[arg(short, long, value_name = "SCENES_JSON")]
    pub output: PathBuf,

    #[command(flatten)]
    pub zone_args: ZoneArgs,

    /// Recorded probe encodes and per-frame metric scores
    #[arg(short, long, value_name = "JSON")]
    pub probe_scores: Option<PathBuf>,

    /// Optional: per-frame character presence masks for ROI boosting
    #[arg(long, value_name = "JSON")]
    pub presence_masks: Option<PathBuf>,

    /// Optional: write an av1an zones file as well
    #[arg(long, value_name = "FILE")]
    pub av1an_zones: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}
