//! # douyin-dl
//!
//! Demonstration scraper for Douyin share links: resolves the short link,
//! extracts a playable media URL from the page (static HTML first, a headless
//! browser as fallback) and streams the video to disk.
//!
//! This is a learning example. It does no request signing and will stop
//! working whenever the site changes its page layout.
//!
//! ```no_run
//! # async fn demo() -> douyin_dl::Result<()> {
//! let result = douyin_dl::extract("https://v.douyin.com/iANyYmXn/").await;
//! if let Some(url) = result.media_url() {
//!     let path = douyin_dl::download(url, "downloads").await?;
//!     println!("{} -> {}", result.title(), path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

pub mod core;

pub use crate::core::downloader::{default_file_name, MediaDownloader};
pub use crate::core::error::{Error, Result};
pub use crate::core::extract::{
    ExtractionResult, Extractor, ExtractorConfig, Strategy, NO_MATCH_REASON, PLACEHOLDER_TITLE,
};
pub use crate::core::fetch::{FetchedPage, HttpFetcher, PageFetcher};
pub use crate::core::render::{
    DisabledRenderer, DomProbe, DomQueryOptions, PageRenderer, RenderOutcome, SnapshotOptions,
    WaitUntil, WebDriverRenderer,
};
pub use crate::core::source::{extract_video_id, find_share_url, SourceConfig};
pub use crate::core::stream::{DownloadOptions, OverwriteBehavior, ProgressCallback};

/// A finished share-link download
#[derive(Debug, Clone)]
pub struct Downloaded {
    pub extraction: ExtractionResult,
    pub path: PathBuf,
}

/// Extract title and media URL from a share link with default settings
pub async fn extract(share_url: &str) -> ExtractionResult {
    match Extractor::new(ExtractorConfig::default()) {
        Ok(extractor) => extractor.extract(share_url).await,
        Err(e) => ExtractionResult::failure(PLACEHOLDER_TITLE, e.to_string()),
    }
}

/// Download a media URL into `dest_dir` under a generated file name
pub async fn download(media_url: &str, dest_dir: impl AsRef<Path>) -> Result<PathBuf> {
    download_with_options(media_url, dest_dir, &DownloadOptions::default()).await
}

/// Download a media URL into `dest_dir` with custom options
pub async fn download_with_options(
    media_url: &str,
    dest_dir: impl AsRef<Path>,
    options: &DownloadOptions,
) -> Result<PathBuf> {
    MediaDownloader::new()
        .download(media_url, dest_dir.as_ref(), &default_file_name(None), options)
        .await
}

/// Extract a share link with `extractor` and download the result into `dest_dir`
///
/// `file_name` defaults to `video_<id>.mp4` (or a timestamp when the post id
/// is unknown). A failed extraction becomes [`Error::ExtractionFailed`].
pub async fn fetch_and_download(
    extractor: &Extractor,
    downloader: &MediaDownloader,
    share_url: &str,
    dest_dir: impl AsRef<Path>,
    file_name: Option<&str>,
    options: &DownloadOptions,
) -> Result<Downloaded> {
    let extraction = extractor.extract(share_url).await;
    let media_url = match extraction.media_url() {
        Some(url) => url.to_string(),
        None => {
            let reason = extraction.failure_reason().unwrap_or(NO_MATCH_REASON);
            return Err(Error::ExtractionFailed(reason.to_string()));
        }
    };

    let file_name = match file_name {
        Some(name) => name.to_string(),
        None => default_file_name(extraction.video_id()),
    };
    let path = downloader
        .download(&media_url, dest_dir.as_ref(), &file_name, options)
        .await?;

    Ok(Downloaded { extraction, path })
}
