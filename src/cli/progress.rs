//! CLI-specific progress handling for douyin-dl
//!
//! Provides progress bar implementation for the command-line interface.

use std::sync::Arc;
use indicatif::{ProgressBar, ProgressStyle};
use douyin_dl::ProgressCallback;

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {bytes_per_sec} ETA: {eta}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} {bytes_per_sec}";

/// Creates a progress bar for CLI display with enhanced information
pub fn create_progress_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_style(bar_style());
    pb
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Progress manager for a single media download
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_size: u64, message: &str) -> Self {
        let pb = create_progress_bar(total_size);

        // Print initial message to stderr
        eprintln!("{}", message);

        Self { pb }
    }

    /// Callback that feeds download progress into the bar.
    ///
    /// A total of 0 means the server sent no length; the bar then turns into
    /// a byte-counting spinner.
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        Arc::new(move |downloaded, total| {
            if total == 0 {
                if pb.length().is_some() {
                    pb.set_style(spinner_style());
                    pb.unset_length();
                }
            } else if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(downloaded);
            if total > 0 && downloaded >= total {
                pb.finish_with_message("✅ Download completed!");
            }
        })
    }

    /// Stop the bar, leaving the last state on screen
    pub fn finish(&self) {
        if !self.pb.is_finished() {
            self.pb.finish();
        }
    }
}
