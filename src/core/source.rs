//! Share-link handling for douyin-dl
//!
//! Turns the text copied from the app into a URL, parses post ids out of
//! resolved URLs and names output files.

use once_cell::sync::Lazy;
use regex::Regex;

/// Desktop Chrome user agent sent by the HTTP client and the headless browser
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

static SHARE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("valid share URL regex"));

static VIDEO_ID_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [r"/video/(\d+)", r"/share/video/(\d+)", r"video_id=(\d+)"]
        .iter()
        .map(|p| Regex::new(p).expect("valid video id regex"))
        .collect()
});

/// Configuration for talking to the source site
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// User agent for page fetches, media downloads and browser sessions
    pub user_agent: String,

    /// `Accept` header for page fetches
    pub accept: String,

    /// `Accept-Language` header for page fetches
    pub accept_language: String,

    /// Locale handed to the headless browser
    pub locale: String,

    /// WebDriver endpoint (chromedriver) for the render fallbacks
    pub webdriver_url: String,

    /// Directory used when the user does not pick one
    pub default_save_dir: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "zh-CN,zh;q=0.9".to_string(),
            locale: "zh-CN".to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            default_save_dir: "downloads".to_string(),
        }
    }
}

/// Finds the first http(s) URL inside pasted share text
///
/// The app copies something like `7.43 复制打开抖音，看看【…】 https://v.douyin.com/iANyYmXn/ …`,
/// so the URL is cut at whitespace and trailing punctuation is dropped.
pub fn find_share_url(text: &str) -> Option<String> {
    let found = SHARE_URL_RE.find(text)?.as_str();
    let trimmed = found.trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}')
            || !c.is_ascii()
    });
    let scheme_end = trimmed.find("://").map_or(trimmed.len(), |idx| idx + 3);
    if trimmed.len() <= scheme_end {
        return None;
    }
    Some(trimmed.to_string())
}

/// Extracts the numeric post id from a resolved video URL
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RES
        .iter()
        .find_map(|re| re.captures(url).map(|caps| caps[1].to_string()))
}

/// Generates the output filename for a downloaded video
pub fn resolve_output_filename(video_id: Option<&str>, timestamp: u64) -> String {
    match video_id {
        Some(id) if !id.is_empty() => format!("video_{id}.mp4"),
        _ => format!("video_{timestamp}.mp4"),
    }
}
