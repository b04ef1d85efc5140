// ============================================================================
// sceneboost-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger Initialisation for the CLI
//
// The core library logs through the `log` facade; this module installs the
// env_logger backend with a timestamped, coloured format.
//
// USAGE:
// - default level is info, `--verbose` raises it to debug
// - RUST_LOG overrides either, e.g. RUST_LOG=sceneboost_core=trace
// - NO_COLOR disables colours
//
// AI-ASSISTANT-INFO: Logger initialisation for the CLI

// ---- External crate imports ----
use log::{Level, LevelFilter, debug};
use owo_colors::OwoColorize;

// ---- Standard library imports ----
use std::io::Write;

/// Check if color should be used (respects NO_COLOR environment variable)
pub fn should_use_color() -> bool {
    std::env::var("NO_COLOR").is_err()
}

/// Returns the current local time formatted for log lines.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn level_label(level: Level, color: bool) -> String {
    let label = match level {
        Level::Error => "ERROR",
        Level::Warn => "WARN ",
        Level::Info => "INFO ",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    };
    if !color {
        return label.to_string();
    }
    match level {
        Level::Error => label.bright_red().to_string(),
        Level::Warn => label.yellow().to_string(),
        Level::Info => label.green().to_string(),
        Level::Debug => label.blue().to_string(),
        Level::Trace => label.magenta().to_string(),
    }
}

/// Initialise the global logger.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let color = should_use_color();

    let mut builder = env_logger::Builder::new();
    builder
        .format(move |buf, record| {
            let timestamp = get_timestamp();
            let timestamp = if color {
                timestamp.dimmed().to_string()
            } else {
                timestamp
            };
            writeln!(
                buf,
                "{} {} {}",
                timestamp,
                level_label(record.level(), color),
                record.args()
            )
        })
        .filter_level(level)
        .parse_default_env();

    // A second initialisation (tests driving run() twice) keeps the first logger
    if builder.try_init().is_ok() {
        debug!("Logger initialized with level: {}", level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_labels_are_aligned() {
        for level in [Level::Error, Level::Warn, Level::Info, Level::Debug, Level::Trace] {
            assert_eq!(level_label(level, false).len(), 5);
        }
    }
}
