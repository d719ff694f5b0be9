//! Progress reporting for long-running pipeline phases
//!
//! Thin wrappers over indicatif with one shared style, so every phase
//! renders the same way. Bars are hidden entirely when progress display
//! is disabled in the configuration.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Default style for a phase progress bar
pub const PHASE_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({per_sec}) {msg}";

/// Create a progress bar for a phase with a known item count
///
/// # Arguments
/// * `length` - Total number of items the phase will process
/// * `description` - Message shown next to the bar
/// * `visible` - Whether to render the bar at all
#[must_use]
pub fn phase_bar(length: u64, description: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(length);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(PHASE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(description.to_string());
    pb
}

/// Create a spinner for a phase without a known length
#[must_use]
pub fn phase_spinner(message: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {elapsed_precise} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with a completion message
pub fn finish(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(message.to_string());
}
