// sceneboost-cli/src/lib.rs
//
// Library portion of the SceneBoost CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;

// Re-export items needed by the binary or integration tests
pub use cli::{BoostArgs, Cli, Commands, DetectArgs, SampleArgs, ZoneArgs};
pub use commands::boost::run_boost;
pub use commands::detect::run_detect;
pub use commands::sample::run_sample;
pub use error::CliResult;

/// Dispatches a parsed command line.
pub fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Detect(args) => run_detect(args).map(|_| ()),
        Commands::Sample(args) => run_sample(args).map(|_| ()),
        Commands::Boost(args) => run_boost(args, cli.verbose).map(|_| ()),
    }
}
