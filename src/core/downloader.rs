//! Media download for douyin-dl
//!
//! Streams a media URL to disk in fixed-size chunks, reporting progress after
//! every chunk. Media files are short clips, so there is no range splitting
//! and no retry: a failed download is reported and the user can run it again.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use log::{debug, info};
use reqwest::header::REFERER;
use reqwest::Client;
use futures::TryStreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::core::error::{Error, Result};
use crate::core::fetch::{build_client, GLOBAL_CLIENT};
use crate::core::source::{resolve_output_filename, SourceConfig};
use crate::core::stream::{DownloadOptions, OverwriteBehavior};

/// Referer sent with media requests; the CDN rejects some requests without one
const MEDIA_REFERER: &str = "https://www.douyin.com/";

/// Budget for one media download, connection and body included
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Suffix of the file a download is written to before it completes
const PART_SUFFIX: &str = ".part";

/// Check if destination file exists and handle overwrite behavior
fn check_overwrite_permission(file_path: &Path, behavior: OverwriteBehavior) -> Result<()> {
    if !file_path.exists() {
        return Ok(());
    }

    match behavior {
        OverwriteBehavior::Force => {
            info!("overwriting existing file: {}", file_path.display());
            Ok(())
        }
        OverwriteBehavior::NeverOverwrite => Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!(
                "File already exists: {} (use --force to overwrite)",
                file_path.display()
            ),
        ))),
    }
}

/// Default file name for a download started now
pub fn default_file_name(video_id: Option<&str>) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    resolve_output_filename(video_id, timestamp)
}

/// Streams media files to disk
#[derive(Clone)]
pub struct MediaDownloader {
    client: Client,
}

impl Default for MediaDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaDownloader {
    /// Create a downloader on the shared client
    pub fn new() -> Self {
        Self {
            client: GLOBAL_CLIENT.clone(),
        }
    }

    /// Create a downloader sending the headers from `config`
    pub fn with_config(config: &SourceConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
        })
    }

    /// Download `media_url` into `dest_dir/file_name` and return the written path
    pub async fn download(
        &self,
        media_url: &str,
        dest_dir: &Path,
        file_name: &str,
        options: &DownloadOptions,
    ) -> Result<PathBuf> {
        if file_name.is_empty() || file_name == ".." || file_name.contains(['/', '\\']) {
            return Err(Error::InvalidInput(format!(
                "invalid output file name: '{file_name}'"
            )));
        }

        tokio::fs::create_dir_all(dest_dir).await?;
        let file_path = dest_dir.join(file_name);
        check_overwrite_permission(&file_path, options.overwrite)?;

        info!("starting download: {media_url}");
        let response = self
            .client
            .get(media_url)
            .header(REFERER, MEDIA_REFERER)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("Failed to download: {status}")));
        }

        let total_size = response.content_length().unwrap_or(0);
        debug!("content length: {total_size}");

        // Only complete files ever appear under the final name
        let part_path = dest_dir.join(format!("{file_name}{PART_SUFFIX}"));
        if let Err(e) = write_part(response, &part_path, total_size, options).await {
            if let Err(remove_err) = tokio::fs::remove_file(&part_path).await {
                debug!("could not remove {}: {remove_err}", part_path.display());
            }
            return Err(e);
        }
        tokio::fs::rename(&part_path, &file_path).await?;

        info!("saved to: {}", file_path.display());
        Ok(file_path)
    }
}

/// Streams the response body into `part_path` and checks the byte count
async fn write_part(
    response: reqwest::Response,
    part_path: &Path,
    total_size: u64,
    options: &DownloadOptions,
) -> Result<()> {
    let body = StreamReader::new(response.bytes_stream().map_err(std::io::Error::other));
    let mut file = tokio::fs::File::create(part_path).await?;
    let written = stream_to_writer(body, &mut file, total_size, options).await?;
    file.flush().await?;

    if total_size > 0 && written != total_size {
        return Err(Error::DownloadFailed(format!(
            "expected {total_size} bytes, received {written}"
        )));
    }
    Ok(())
}

/// Copies `reader` into `writer` chunk by chunk, returning the byte count
async fn stream_to_writer<R, W>(
    mut reader: R,
    writer: &mut W,
    total_size: u64,
    options: &DownloadOptions,
) -> Result<u64>
where
    R: AsyncRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut buffer = vec![0u8; options.buffer_size.max(1)];
    let mut downloaded = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .await
            .map_err(|e| Error::DownloadFailed(format!("Stream read error: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        writer.write_all(&buffer[..bytes_read]).await?;
        downloaded += bytes_read as u64;

        if let Some(ref progress) = options.progress {
            progress(downloaded, total_size);
        }
    }

    Ok(downloaded)
}
