//! # douyin-dl CLI
//!
//! Command-line interface for the douyin-dl library.
//! Without a subcommand it runs the interactive menu.

use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use clap::{Args, Parser, Subcommand};
use douyin_dl::{
    default_file_name, find_share_url, DownloadOptions, Error, ExtractionResult, Extractor,
    ExtractorConfig, MediaDownloader, OverwriteBehavior, Result,
};
use log::{debug, error};

mod cli;

/// Command-line interface for douyin-dl
#[derive(Parser)]
#[command(name = "douyin-dl")]
#[command(about = "Demonstration downloader for Douyin share links")]
#[command(long_about = "Extracts the video behind a Douyin share link and downloads it:
  douyin-dl                                      # Interactive menu
  douyin-dl extract \"<share text>\"               # Print title and video URL
  douyin-dl extract \"<share text>\" --json        # Same, as JSON
  douyin-dl download \"<share text>\" -o videos    # Download into ./videos

The share text may be the whole message copied from the app; the first URL in
it is used. Rendering fallbacks need a running chromedriver (see --webdriver).

File Overwrite Behavior:
  By default, you'll be prompted if destination file exists
  --force                          # Overwrite without asking
  --no-clobber                     # Never overwrite, fail if file exists")]
#[command(version = env!("DOUYIN_DL_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// WebDriver (chromedriver) endpoint for the headless browser fallbacks
    #[arg(long, global = true, value_name = "URL")]
    webdriver: Option<String>,

    /// Only use the static page fetch, never start a browser
    #[arg(long, global = true)]
    no_browser: bool,

    /// Show the browser window instead of running it headless
    #[arg(long, global = true)]
    show_browser: bool,

    /// Timeout for the static page fetch, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the title and video URL without downloading
    Extract {
        /// Share link or the full share text copied from the app
        share: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract and download a video
    Download(DownloadArgs),
}

#[derive(Args)]
struct DownloadArgs {
    /// Share link or the full share text copied from the app
    share: String,

    /// Directory to save into
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// File name to save as (default: video_<id>.mp4)
    #[arg(long, value_name = "FILE")]
    name: Option<String>,

    /// Enable dry-run mode (show what would be downloaded without downloading)
    #[arg(long)]
    dry_run: bool,

    /// Force overwrite existing files without prompting
    #[arg(short, long)]
    force: bool,

    /// Never overwrite existing files (fail if destination exists)
    #[arg(long)]
    no_clobber: bool,

    /// Answer yes to the overwrite prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("❌ Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("🎬 douyin-dl v{} starting...", env!("DOUYIN_DL_VERSION"));
    }

    let extractor = Extractor::new(extractor_config(&cli))?;
    let downloader = MediaDownloader::with_config(&extractor.config().source)?;

    match cli.command {
        None => {
            let stdin = std::io::stdin();
            let mut menu = cli::Menu::new(
                &extractor,
                &downloader,
                BufReader::new(stdin.lock()),
                std::io::stdout(),
            );
            menu.run().await
        }
        Some(Command::Extract { share, json }) => run_extract(&extractor, &share, json).await,
        Some(Command::Download(args)) => run_download(&extractor, &downloader, &args).await,
    }
}

/// Build the extractor configuration from global flags
fn extractor_config(cli: &Cli) -> ExtractorConfig {
    let mut config = ExtractorConfig::default()
        .with_browser(!cli.no_browser)
        .with_headless(!cli.show_browser);
    if let Some(url) = &cli.webdriver {
        config = config.with_webdriver_url(url.clone());
    }
    if let Some(secs) = cli.timeout {
        config = config.with_fetch_timeout(Duration::from_secs(secs));
    }
    config
}

/// Pull the share URL out of the pasted text
fn share_url_from(text: &str) -> Result<String> {
    find_share_url(text)
        .ok_or_else(|| Error::InvalidInput(format!("no URL found in share text: '{text}'")))
}

/// Determine overwrite behavior from CLI flags
fn overwrite_behavior(force: bool, no_clobber: bool) -> Result<Option<OverwriteBehavior>> {
    match (force, no_clobber) {
        (true, true) => Err(Error::InvalidInput(
            "--force and --no-clobber cannot be used together".to_string(),
        )),
        (true, false) => Ok(Some(OverwriteBehavior::Force)),
        (false, true) => Ok(Some(OverwriteBehavior::NeverOverwrite)),
        // Decided interactively once the destination is known
        (false, false) => Ok(None),
    }
}

fn failure_error(result: &ExtractionResult) -> Error {
    Error::ExtractionFailed(result.failure_reason().unwrap_or_default().to_string())
}

async fn run_extract(extractor: &Extractor, share: &str, json: bool) -> Result<()> {
    let share_url = share_url_from(share)?;
    let result = extractor.extract(&share_url).await;

    if json {
        let rendered = serde_json::to_string_pretty(&result)
            .map_err(|e| Error::InvalidInput(format!("cannot serialize result: {e}")))?;
        println!("{rendered}");
        if !result.succeeded() {
            std::process::exit(1);
        }
        return Ok(());
    }

    let Some(media_url) = result.media_url() else {
        return Err(failure_error(&result));
    };
    println!("Title: {}", result.title());
    println!("URL: {media_url}");
    if let Some(strategy) = result.strategy() {
        println!("Strategy: {strategy}");
    }
    Ok(())
}

async fn run_download(
    extractor: &Extractor,
    downloader: &MediaDownloader,
    args: &DownloadArgs,
) -> Result<()> {
    let overwrite = overwrite_behavior(args.force, args.no_clobber)?;
    let share_url = share_url_from(&args.share)?;

    let result = extractor.extract(&share_url).await;
    let Some(media_url) = result.media_url() else {
        return Err(failure_error(&result));
    };

    let dest_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&extractor.config().source.default_save_dir));
    let file_name = args
        .name
        .clone()
        .unwrap_or_else(|| default_file_name(result.video_id()));
    let file_path = dest_dir.join(&file_name);

    eprintln!("🎬 Title: {}", result.title());
    if args.dry_run {
        eprintln!(
            "🔍 [DRY RUN] Would download: {media_url} to {}",
            file_path.display()
        );
        return Ok(());
    }

    let overwrite = match overwrite {
        Some(behavior) => behavior,
        None => resolve_prompted_overwrite(&file_path, args.yes)?,
    };

    eprintln!("📁 Saving to: {}", file_path.display());
    debug!("media URL: {media_url}");

    let progress_manager = cli::ProgressManager::new(0, &format!("🌐 Downloading {}", result.title()));
    let options = DownloadOptions::default()
        .with_overwrite(overwrite)
        .with_progress(progress_manager.callback());

    let saved = downloader
        .download(media_url, &dest_dir, &file_name, &options)
        .await;
    progress_manager.finish();
    let saved = saved?;

    println!("{}", saved.display());
    Ok(())
}

/// Overwrite policy when neither --force nor --no-clobber was given
fn resolve_prompted_overwrite(file_path: &Path, yes: bool) -> Result<OverwriteBehavior> {
    if yes || !file_path.exists() {
        return Ok(OverwriteBehavior::Force);
    }

    let stdin = std::io::stdin();
    let confirmed =
        cli::confirm_overwrite(file_path, &mut stdin.lock(), &mut std::io::stderr())?;
    if confirmed {
        Ok(OverwriteBehavior::Force)
    } else {
        Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::Interrupted,
            "Download cancelled by user",
        )))
    }
}
