//! Download options for douyin-dl
//!
//! Options shared by media downloads: progress reporting, buffer size and
//! what to do about an existing destination file.

use std::sync::Arc;

/// Progress callback: `(bytes_written, total_bytes)`, total is 0 when unknown
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Overwrite behavior for existing files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteBehavior {
    /// Replace the existing file
    Force,
    /// Never overwrite, fail if file exists
    #[default]
    NeverOverwrite,
}

/// Options for media downloads
#[derive(Clone)]
pub struct DownloadOptions {
    /// Optional progress callback
    pub progress: Option<ProgressCallback>,

    /// Buffer size for streaming operations
    pub buffer_size: usize,

    /// Behavior when destination file already exists
    pub overwrite: OverwriteBehavior,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            progress: None,
            buffer_size: 64 * 1024, // 64KB
            overwrite: OverwriteBehavior::default(),
        }
    }
}

impl DownloadOptions {
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_overwrite(mut self, overwrite: OverwriteBehavior) -> Self {
        self.overwrite = overwrite;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_options_defaults() {
        let options = DownloadOptions::default();
        assert!(options.progress.is_none());
        assert_eq!(options.buffer_size, 64 * 1024);
        assert_eq!(options.overwrite, OverwriteBehavior::NeverOverwrite);
    }

    #[test]
    fn test_download_options_builders() {
        let options = DownloadOptions::default()
            .with_overwrite(OverwriteBehavior::Force)
            .with_progress(Arc::new(|_, _| {}));
        assert!(options.progress.is_some());
        assert_eq!(options.overwrite, OverwriteBehavior::Force);
    }
}
