//! Terminal output helpers.
//!
//! Everything goes through the `log` facade so the env_logger format and
//! level apply. Colour is skipped when NO_COLOR is set.

use log::info;
use owo_colors::OwoColorize;

use crate::logging::should_use_color;

const LABEL_WIDTH: usize = 18;

/// Print a section header
pub fn print_section(title: &str) {
    if should_use_color() {
        info!("===== {} =====", title.to_uppercase().cyan().bold());
    } else {
        info!("===== {} =====", title.to_uppercase());
    }
}

/// Print an aligned `label: value` line
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let padding = LABEL_WIDTH.saturating_sub(label.len()).max(1);
    if should_use_color() && highlight {
        info!("  {}:{}{}", label, " ".repeat(padding), value.bold());
    } else {
        info!("  {}:{}{}", label, " ".repeat(padding), value);
    }
}

/// Print a success message
pub fn print_success(message: &str) {
    if should_use_color() {
        info!("✓ {}", message.green());
    } else {
        info!("✓ {}", message);
    }
}
