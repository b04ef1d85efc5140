// ============================================================================
// sceneboost-cli/src/main.rs
// ============================================================================
//
// MAIN ENTRY POINT: SceneBoost CLI Application
//
// Parses arguments, initialises logging and dispatches to the command
// implementations in the library half of this crate. Fatal errors are printed
// to stderr and exit with status 1.
//
// AI-ASSISTANT-INFO: Main entry point for the CLI application

// ---- External crate imports ----
use clap::Parser;
use owo_colors::OwoColorize;

// ---- Internal crate imports ----
use sceneboost_cli::logging::{init_logging, should_use_color};
use sceneboost_cli::{Cli, run};

// ---- Standard library imports ----
use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        if should_use_color() {
            eprintln!("{} {}", "Error:".bright_red().bold(), e);
        } else {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}
