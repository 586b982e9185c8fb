//! Text patterns used to mine pages for titles and media addresses
//!
//! Media addresses are tried as an ordered chain of named patterns; the first
//! pattern that matches wins, so more specific fields come before the bare
//! `.mp4` heuristic.

use once_cell::sync::Lazy;
use regex::Regex;

/// Escaped forward slash as it appears inside JSON embedded in the page
pub const ESCAPED_SLASH: &str = r"\u002F";

static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""desc":"(.*?)""#).expect("valid title regex"));

// Scheme separators may be JSON-escaped like every other slash
static PLAY_ADDR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""playAddr":"(https?:(?://|\\u002F\\u002F)[^"]+)""#).expect("valid playAddr regex"));

static SRC_NO_MARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""srcNoMark":"(https?:(?://|\\u002F\\u002F)[^"]+)""#).expect("valid srcNoMark regex"));

static DOWNLOAD_ADDR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""downloadAddr":"(https?:(?://|\\u002F\\u002F)[^"]+)""#).expect("valid downloadAddr regex")
});

static BARE_MP4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(https?:(?://|\\u002F\\u002F)v[^\s"']+\.mp4)"#).expect("valid mp4 regex"));

/// A named media-address matcher
pub struct MediaPattern {
    /// Name reported when this pattern produced the URL
    pub name: &'static str,
    regex: &'static Lazy<Regex>,
}

impl MediaPattern {
    /// Returns the decoded first capture if the pattern matches `text`
    pub fn extract(&self, text: &str) -> Option<String> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| decode_slashes(m.as_str()))
            .filter(|url| !url.is_empty())
    }
}

/// A successful pattern-chain lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: &'static str,
    pub url: String,
}

/// `playAddr` field of the embedded page data
pub static PLAY_ADDR: MediaPattern = MediaPattern {
    name: "playAddr",
    regex: &PLAY_ADDR_RE,
};

/// `srcNoMark` field (watermark-free source)
pub static SRC_NO_MARK: MediaPattern = MediaPattern {
    name: "srcNoMark",
    regex: &SRC_NO_MARK_RE,
};

/// `downloadAddr` field
pub static DOWNLOAD_ADDR: MediaPattern = MediaPattern {
    name: "downloadAddr",
    regex: &DOWNLOAD_ADDR_RE,
};

/// Any absolute `.mp4` URL on a `v*` host
pub static BARE_MP4: MediaPattern = MediaPattern {
    name: "mp4",
    regex: &BARE_MP4_RE,
};

/// Pattern chain for the static HTML and the rendered-snapshot stages
pub static STATIC_PATTERNS: [&MediaPattern; 1] = [&PLAY_ADDR];

/// Pattern chain for the rendered script scan, in priority order
pub static SCRIPT_PATTERNS: [&MediaPattern; 4] = [&PLAY_ADDR, &SRC_NO_MARK, &DOWNLOAD_ADDR, &BARE_MP4];

/// Runs `patterns` in order against `text` and stops at the first match
pub fn first_match(patterns: &[&MediaPattern], text: &str) -> Option<PatternMatch> {
    patterns.iter().find_map(|pattern| {
        pattern.extract(text).map(|url| PatternMatch {
            pattern: pattern.name,
            url,
        })
    })
}

/// Replaces every JSON-escaped slash with a literal `/`
pub fn decode_slashes(value: &str) -> String {
    value.replace(ESCAPED_SLASH, "/")
}

/// Extracts the post description used as the video title
pub fn extract_title(html: &str) -> Option<String> {
    TITLE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
