//! Interactive menu for douyin-dl
//!
//! A thin shell over the library: it collects the share text, the
//! confirmation and the save directory from the user, then hands resolved
//! values to the extractor and the downloader.

use std::io::{BufRead, Write};
use std::path::Path;
use douyin_dl::{
    default_file_name, find_share_url, DownloadOptions, Extractor, MediaDownloader,
    OverwriteBehavior, Result,
};

use crate::cli::{confirm_overwrite, ProgressManager};

const BANNER: &str = "
    ====================================
    Douyin video downloader (demo)

    Please note:
    1. This tool is for learning purposes only
    2. Respect the Douyin user agreement and applicable law
    3. Do not use it for anything illegal
    4. Respect the copyright and privacy of downloaded content
    ====================================
";

/// One interactive session reading from `input` and writing to `output`
pub struct Menu<'a, R, W> {
    extractor: &'a Extractor,
    downloader: &'a MediaDownloader,
    input: R,
    output: W,
    default_save_dir: String,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(
        extractor: &'a Extractor,
        downloader: &'a MediaDownloader,
        input: R,
        output: W,
    ) -> Self {
        let default_save_dir = extractor.config().source.default_save_dir.clone();
        Self {
            extractor,
            downloader,
            input,
            output,
            default_save_dir,
        }
    }

    /// Runs the menu until the user exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{BANNER}")?;

        loop {
            writeln!(self.output, "\n{}", "=".repeat(30))?;
            writeln!(self.output, "1. Download a single video")?;
            writeln!(self.output, "2. Batch download (requires a file)")?;
            writeln!(self.output, "3. Exit")?;

            let Some(choice) = self.prompt("Choose an option (1-3): ")? else {
                break;
            };

            match choice.as_str() {
                "1" => {
                    self.single_download().await?;
                }
                "2" => {
                    writeln!(
                        self.output,
                        "Batch download has to deal with anti-scraping measures and is not part of this demo."
                    )?;
                    writeln!(self.output, "Use the official API or an authorized tool instead.")?;
                }
                "3" => {
                    writeln!(self.output, "Thanks for using douyin-dl, goodbye!")?;
                    break;
                }
                _ => {
                    writeln!(self.output, "Invalid choice, please try again!")?;
                }
            }
        }

        Ok(())
    }

    /// Extract one share link and optionally download it; returns whether a file was saved
    async fn single_download(&mut self) -> Result<bool> {
        let Some(share_text) = self.prompt("Paste the Douyin share link: ")? else {
            return Ok(false);
        };
        if share_text.is_empty() {
            writeln!(self.output, "The link cannot be empty!")?;
            return Ok(false);
        }
        let Some(share_url) = find_share_url(&share_text) else {
            writeln!(self.output, "❌ No URL found in the share text")?;
            return Ok(false);
        };

        let result = self.extractor.extract(&share_url).await;
        let Some(media_url) = result.media_url() else {
            writeln!(
                self.output,
                "❌ Failed: {}",
                result.failure_reason().unwrap_or_default()
            )?;
            return Ok(false);
        };

        writeln!(self.output, "🎬 Title: {}", result.title())?;
        writeln!(self.output, "🔗 Video URL: {media_url}")?;

        let answer = self
            .prompt("\nDownload this video? (y/n): ")?
            .unwrap_or_default()
            .to_lowercase();
        if answer != "y" {
            writeln!(self.output, "Cancelled")?;
            return Ok(false);
        }

        let save_dir = self
            .prompt(&format!(
                "Save directory (default: {}): ",
                self.default_save_dir
            ))?
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| self.default_save_dir.clone());

        let file_name = default_file_name(result.video_id());
        let file_path = Path::new(&save_dir).join(&file_name);
        let overwrite = if file_path.exists() {
            if !confirm_overwrite(&file_path, &mut self.input, &mut self.output)? {
                return Ok(false);
            }
            OverwriteBehavior::Force
        } else {
            OverwriteBehavior::NeverOverwrite
        };

        let progress = ProgressManager::new(0, &format!("🌐 Downloading {}", result.title()));
        let options = DownloadOptions::default()
            .with_overwrite(overwrite)
            .with_progress(progress.callback());

        match self
            .downloader
            .download(media_url, Path::new(&save_dir), &file_name, &options)
            .await
        {
            Ok(path) => {
                progress.finish();
                writeln!(self.output, "✅ Download complete: {}", path.display())?;
                Ok(true)
            }
            Err(e) => {
                progress.finish();
                log::error!("download failed: {e}");
                writeln!(self.output, "❌ Download failed: {e}")?;
                Ok(false)
            }
        }
    }

    /// Prints `label` and reads one trimmed line; `None` at end of input
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
