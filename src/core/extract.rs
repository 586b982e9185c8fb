//! Extraction pipeline for douyin-dl
//!
//! Resolves a share link and mines the page for a playable media URL. The
//! strategies run in a fixed order, cheapest first, and the first one that
//! yields a URL wins:
//!
//! 1. fetch the share link (redirects followed); a transport failure ends
//!    the attempt
//! 2. read the post description as title
//! 3. `playAddr` in the static HTML
//! 4. `src` of the `<video>` element in a headless browser
//! 5. media patterns in the rendered page's script text
//! 6. `playAddr` in a rendered HTML snapshot
//!
//! Everything after step 1 degrades to the next step instead of failing, so
//! [`Extractor::extract`] always returns an [`ExtractionResult`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use log::{Level, Log, Metadata, Record};
use serde::Serialize;

use crate::core::error::Result;
use crate::core::fetch::{HttpFetcher, PageFetcher};
use crate::core::patterns::{self, PatternMatch, SCRIPT_PATTERNS, STATIC_PATTERNS};
use crate::core::render::{
    DisabledRenderer, DomProbe, DomQueryOptions, PageRenderer, RenderOutcome, SnapshotOptions,
    WaitUntil, WebDriverRenderer,
};
use crate::core::source::{extract_video_id, SourceConfig};

/// Title used when the page carries no description
pub const PLACEHOLDER_TITLE: &str = "未命名视频";

/// Reason reported when every strategy came up empty
pub const NO_MATCH_REASON: &str =
    "failed to extract a video URL: the content may require login or the page structure has changed";

/// Log target used by the pipeline
const LOG_TARGET: &str = "douyin_dl::extract";

/// Number of body characters included in the debug dump of a fetched page
const DEBUG_SNIPPET_CHARS: usize = 3000;

/// Which strategy produced the media URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", content = "pattern", rename_all = "snake_case")]
pub enum Strategy {
    StaticHtml,
    VideoElement,
    ScriptScan(String),
    RenderedHtml,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::StaticHtml => write!(f, "static HTML"),
            Strategy::VideoElement => write!(f, "rendered <video> element"),
            Strategy::ScriptScan(pattern) => write!(f, "rendered script scan ({pattern})"),
            Strategy::RenderedHtml => write!(f, "rendered HTML snapshot"),
        }
    }
}

/// Outcome of one extraction attempt
///
/// `succeeded` holds exactly when `media_url` is present and non-empty;
/// otherwise `failure_reason` is present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    title: String,
    media_url: Option<String>,
    succeeded: bool,
    failure_reason: Option<String>,
    resolved_url: Option<String>,
    video_id: Option<String>,
    strategy: Option<Strategy>,
}

impl ExtractionResult {
    /// Successful extraction; an empty `media_url` is turned into a failure
    pub fn success(title: impl Into<String>, media_url: impl Into<String>, strategy: Strategy) -> Self {
        let media_url = media_url.into();
        if media_url.is_empty() {
            return Self::failure(title, NO_MATCH_REASON);
        }
        Self {
            title: title.into(),
            media_url: Some(media_url),
            succeeded: true,
            failure_reason: None,
            resolved_url: None,
            video_id: None,
            strategy: Some(strategy),
        }
    }

    /// Failed extraction; an empty reason is replaced by the generic one
    pub fn failure(title: impl Into<String>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.is_empty() {
            NO_MATCH_REASON.to_string()
        } else {
            reason
        };
        Self {
            title: title.into(),
            media_url: None,
            succeeded: false,
            failure_reason: Some(reason),
            resolved_url: None,
            video_id: None,
            strategy: None,
        }
    }

    fn with_resolved(mut self, resolved_url: &str, video_id: Option<String>) -> Self {
        self.resolved_url = Some(resolved_url.to_string());
        self.video_id = video_id;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn media_url(&self) -> Option<&str> {
        self.media_url.as_deref()
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Final URL of the share link after redirects
    pub fn resolved_url(&self) -> Option<&str> {
        self.resolved_url.as_deref()
    }

    pub fn video_id(&self) -> Option<&str> {
        self.video_id.as_deref()
    }

    pub fn strategy(&self) -> Option<&Strategy> {
        self.strategy.as_ref()
    }
}

/// Timeouts and browser settings for an extraction
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub source: SourceConfig,
    /// Budget for the static fetch (redirects included)
    pub fetch_timeout: Duration,
    /// Navigation budget of the DOM query
    pub dom_nav_timeout: Duration,
    /// How long to wait for the `<video>` element
    pub selector_timeout: Duration,
    /// Navigation budget of the HTML snapshot
    pub snapshot_nav_timeout: Duration,
    /// Network-idle wait of the HTML snapshot
    pub snapshot_settle_timeout: Duration,
    pub bypass_csp: bool,
    /// Use the headless browser fallbacks at all
    pub browser_enabled: bool,
    /// Hide the browser window
    pub headless: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            fetch_timeout: Duration::from_secs(10),
            dom_nav_timeout: Duration::from_secs(60),
            selector_timeout: Duration::from_secs(30),
            snapshot_nav_timeout: Duration::from_secs(30),
            snapshot_settle_timeout: Duration::from_secs(15),
            bypass_csp: true,
            browser_enabled: true,
            headless: true,
        }
    }
}

impl ExtractorConfig {
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.source.webdriver_url = url.into();
        self
    }

    pub fn with_browser(mut self, enabled: bool) -> Self {
        self.browser_enabled = enabled;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    fn dom_query_options(&self) -> DomQueryOptions {
        DomQueryOptions {
            user_agent: self.source.user_agent.clone(),
            locale: self.source.locale.clone(),
            bypass_csp: self.bypass_csp,
            nav_timeout: self.dom_nav_timeout,
            wait_until: WaitUntil::DomContentLoaded,
            selector: "video".to_string(),
            selector_timeout: self.selector_timeout,
        }
    }

    fn snapshot_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            user_agent: Some(self.source.user_agent.clone()),
            nav_timeout: self.snapshot_nav_timeout,
            wait_until: WaitUntil::NetworkIdle,
            settle_timeout: self.snapshot_settle_timeout,
        }
    }
}

/// Forwards to whatever logger the process installed through the `log` facade
struct FacadeLogger;

impl Log for FacadeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record)
    }

    fn flush(&self) {
        log::logger().flush()
    }
}

/// Share-link extraction pipeline
pub struct Extractor {
    fetcher: Arc<dyn PageFetcher>,
    renderer: Arc<dyn PageRenderer>,
    logger: Arc<dyn Log>,
    config: ExtractorConfig,
}

impl Extractor {
    /// Create an extractor with HTTP fetching and, if enabled, WebDriver rendering
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::with_config(&config.source)?);
        let renderer: Arc<dyn PageRenderer> = if config.browser_enabled {
            Arc::new(
                WebDriverRenderer::new(config.source.webdriver_url.clone())
                    .with_headless(config.headless),
            )
        } else {
            Arc::new(DisabledRenderer::default())
        };
        Ok(Self::with_collaborators(fetcher, renderer, config))
    }

    /// Create an extractor on explicit collaborators
    pub fn with_collaborators(
        fetcher: Arc<dyn PageFetcher>,
        renderer: Arc<dyn PageRenderer>,
        config: ExtractorConfig,
    ) -> Self {
        Self {
            fetcher,
            renderer,
            logger: Arc::new(FacadeLogger),
            config,
        }
    }

    /// Route pipeline log records to `logger`
    pub fn with_logger(mut self, logger: Arc<dyn Log>) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Runs the fallback chain for `share_url`
    pub async fn extract(&self, share_url: &str) -> ExtractionResult {
        self.emit(Level::Info, &format!("processing link: {share_url}"));

        let page = match self.fetcher.fetch(share_url, self.config.fetch_timeout).await {
            Ok(page) => page,
            Err(e) => {
                self.emit(Level::Error, &format!("request failed: {e}"));
                return ExtractionResult::failure(PLACEHOLDER_TITLE, e.to_string());
            }
        };

        self.emit(
            Level::Debug,
            &format!(
                "HTTP status: {}, final URL: {}, HTML snippet:\n{}",
                page.status,
                page.final_url,
                snippet(&page.body, DEBUG_SNIPPET_CHARS)
            ),
        );
        self.emit(Level::Info, &format!("resolved URL: {}", page.final_url));

        let video_id = extract_video_id(&page.final_url);
        if let Some(id) = &video_id {
            self.emit(Level::Debug, &format!("video id: {id}"));
        }

        let title = patterns::extract_title(&page.body).unwrap_or_else(|| PLACEHOLDER_TITLE.to_string());

        self.extract_from_page(share_url, &page.body, title)
            .await
            .with_resolved(&page.final_url, video_id)
    }

    async fn extract_from_page(&self, share_url: &str, body: &str, title: String) -> ExtractionResult {
        if let Some(found) = patterns::first_match(&STATIC_PATTERNS, body) {
            return ExtractionResult::success(title, found.url, Strategy::StaticHtml);
        }

        self.emit(Level::Info, "no playAddr in static HTML, trying headless browser");
        match self
            .renderer
            .probe_dom(share_url, &self.config.dom_query_options())
            .await
        {
            RenderOutcome::Success(DomProbe::VideoSource(src)) if !src.is_empty() => {
                return ExtractionResult::success(title, src, Strategy::VideoElement);
            }
            RenderOutcome::Success(DomProbe::VideoSource(_)) => {
                self.emit(Level::Debug, "<video> element has an empty src");
            }
            RenderOutcome::Success(DomProbe::ScriptText(text)) => {
                if let Some(PatternMatch { pattern, url }) =
                    patterns::first_match(&SCRIPT_PATTERNS, &text)
                {
                    return ExtractionResult::success(
                        title,
                        url,
                        Strategy::ScriptScan(pattern.to_string()),
                    );
                }
                self.emit(Level::Debug, "no media pattern in rendered script text");
            }
            RenderOutcome::Unavailable(reason) => {
                self.emit(Level::Warn, &format!("browser DOM extraction unavailable: {reason}"));
            }
            RenderOutcome::Timeout => {
                self.emit(Level::Warn, "browser DOM extraction timed out");
            }
        }

        match self
            .renderer
            .render_html(share_url, &self.config.snapshot_options())
            .await
        {
            RenderOutcome::Success(html) => {
                if let Some(found) = patterns::first_match(&STATIC_PATTERNS, &html) {
                    return ExtractionResult::success(title, found.url, Strategy::RenderedHtml);
                }
                self.emit(Level::Debug, "no playAddr in rendered HTML");
            }
            RenderOutcome::Unavailable(reason) => {
                self.emit(Level::Warn, &format!("browser rendering unavailable: {reason}"));
            }
            RenderOutcome::Timeout => {
                self.emit(Level::Warn, "browser rendering timed out");
            }
        }

        ExtractionResult::failure(title, NO_MATCH_REASON)
    }

    fn emit(&self, level: Level, message: &str) {
        let metadata = Metadata::builder().level(level).target(LOG_TARGET).build();
        if self.logger.enabled(&metadata) {
            self.logger.log(
                &Record::builder()
                    .metadata(metadata)
                    .args(format_args!("{message}"))
                    .module_path_static(Some(module_path!()))
                    .build(),
            );
        }
    }
}

/// First `max_chars` characters of `text`
fn snippet(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use async_trait::async_trait;

    use crate::core::error::Error;
    use crate::core::fetch::FetchedPage;
    use crate::core::patterns::ESCAPED_SLASH;

    struct StubFetcher {
        result: std::result::Result<FetchedPage, String>,
    }

    impl StubFetcher {
        fn page(body: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(FetchedPage {
                    status: 200,
                    final_url: "https://www.douyin.com/video/7301234567890".to_string(),
                    body: body.to_string(),
                }),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                result: Err(message.to_string()),
            })
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _url: &str, _timeout: Duration) -> Result<FetchedPage> {
            self.result
                .clone()
                .map_err(Error::NetworkError)
        }
    }

    #[derive(Default)]
    struct StubRenderer {
        dom: Option<RenderOutcome<DomProbe>>,
        snapshot: Option<RenderOutcome<String>>,
        dom_calls: AtomicUsize,
        snapshot_calls: AtomicUsize,
    }

    impl StubRenderer {
        fn new(dom: RenderOutcome<DomProbe>, snapshot: RenderOutcome<String>) -> Arc<Self> {
            Arc::new(Self {
                dom: Some(dom),
                snapshot: Some(snapshot),
                ..Default::default()
            })
        }

        fn unavailable() -> Arc<Self> {
            Self::new(
                RenderOutcome::Unavailable("no driver".to_string()),
                RenderOutcome::Unavailable("no driver".to_string()),
            )
        }
    }

    #[async_trait]
    impl PageRenderer for StubRenderer {
        async fn probe_dom(&self, _url: &str, _options: &DomQueryOptions) -> RenderOutcome<DomProbe> {
            self.dom_calls.fetch_add(1, Ordering::SeqCst);
            self.dom
                .clone()
                .unwrap_or(RenderOutcome::Unavailable("unset".to_string()))
        }

        async fn render_html(&self, _url: &str, _options: &SnapshotOptions) -> RenderOutcome<String> {
            self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
            self.snapshot
                .clone()
                .unwrap_or(RenderOutcome::Unavailable("unset".to_string()))
        }
    }

    #[derive(Default)]
    struct CapturingLogger {
        lines: Mutex<Vec<(Level, String)>>,
    }

    impl Log for CapturingLogger {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            self.lines
                .lock()
                .unwrap()
                .push((record.level(), record.args().to_string()));
        }

        fn flush(&self) {}
    }

    fn extractor(fetcher: Arc<StubFetcher>, renderer: Arc<StubRenderer>) -> Extractor {
        Extractor::with_collaborators(fetcher, renderer, ExtractorConfig::default())
    }

    fn escaped(url: &str) -> String {
        url.replace('/', ESCAPED_SLASH)
    }

    #[tokio::test]
    async fn test_static_play_addr_with_title() {
        let body = format!(
            r#"<script>{{"desc":"晚霞","playAddr":"{}"}}</script>"#,
            escaped("https://v.example.com/play/abc.mp4")
        );
        let renderer = StubRenderer::unavailable();
        let result = extractor(StubFetcher::page(&body), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(result.succeeded());
        assert_eq!(result.title(), "晚霞");
        assert_eq!(result.media_url(), Some("https://v.example.com/play/abc.mp4"));
        assert_eq!(result.failure_reason(), None);
        assert_eq!(result.strategy(), Some(&Strategy::StaticHtml));
        assert_eq!(result.video_id(), Some("7301234567890"));
        assert_eq!(
            result.resolved_url(),
            Some("https://www.douyin.com/video/7301234567890")
        );
        assert_eq!(renderer.dom_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_rendering() {
        let renderer = StubRenderer::unavailable();
        let result = extractor(StubFetcher::failing("connection reset by peer"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(!result.succeeded());
        assert_eq!(result.media_url(), None);
        assert!(result.failure_reason().unwrap().contains("connection reset by peer"));
        assert_eq!(result.title(), PLACEHOLDER_TITLE);
        assert_eq!(result.resolved_url(), None);
        assert_eq!(renderer.dom_calls.load(Ordering::SeqCst), 0);
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_placeholder_title_and_no_match() {
        let renderer = StubRenderer::unavailable();
        let result = extractor(StubFetcher::page("<html>nothing here</html>"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(!result.succeeded());
        assert_eq!(result.title(), PLACEHOLDER_TITLE);
        assert_eq!(result.failure_reason(), Some(NO_MATCH_REASON));
        assert!(NO_MATCH_REASON.contains("may require login"));
        assert_eq!(renderer.dom_calls.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_video_element_short_circuits() {
        let renderer = StubRenderer::new(
            RenderOutcome::Success(DomProbe::VideoSource(
                "blob:https://www.douyin.com/1234".to_string(),
            )),
            RenderOutcome::Unavailable("should not be used".to_string()),
        );
        let result = extractor(StubFetcher::page(r#"{"desc":"cat"}"#), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(result.succeeded());
        assert_eq!(result.title(), "cat");
        assert_eq!(result.media_url(), Some("blob:https://www.douyin.com/1234"));
        assert_eq!(result.strategy(), Some(&Strategy::VideoElement));
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_script_scan_download_addr() {
        let scripts = format!(
            r#"window._ROUTER_DATA = {{"downloadAddr":"{}"}};"#,
            escaped("https://x/y.mp4")
        );
        let renderer = StubRenderer::new(
            RenderOutcome::Success(DomProbe::ScriptText(scripts)),
            RenderOutcome::Unavailable("should not be used".to_string()),
        );
        let result = extractor(StubFetcher::page("<html></html>"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(result.succeeded());
        assert_eq!(result.media_url(), Some("https://x/y.mp4"));
        assert_eq!(
            result.strategy(),
            Some(&Strategy::ScriptScan("downloadAddr".to_string()))
        );
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_snapshot_after_script_scan_without_match() {
        let html = format!(r#"<script>{{"playAddr":"{}"}}</script>"#, escaped("https://v.example.com/s.mp4"));
        let renderer = StubRenderer::new(
            RenderOutcome::Success(DomProbe::ScriptText("var nothing = 1;".to_string())),
            RenderOutcome::Success(html),
        );
        let result = extractor(StubFetcher::page("<html></html>"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(result.succeeded());
        assert_eq!(result.media_url(), Some("https://v.example.com/s.mp4"));
        assert_eq!(result.strategy(), Some(&Strategy::RenderedHtml));
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_stages_empty_reports_no_match() {
        let renderer = StubRenderer::new(
            RenderOutcome::Success(DomProbe::ScriptText("var x = 1;".to_string())),
            RenderOutcome::Success("<html></html>".to_string()),
        );
        let result = extractor(StubFetcher::page("<html></html>"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(!result.succeeded());
        assert_eq!(result.failure_reason(), Some(NO_MATCH_REASON));
        assert_eq!(renderer.dom_calls.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_snapshot_after_dom_timeout() {
        let html = format!(r#"<script>{{"playAddr":"{}"}}</script>"#, escaped("https://v.example.com/r.mp4"));
        let renderer = StubRenderer::new(RenderOutcome::Timeout, RenderOutcome::Success(html));
        let result = extractor(StubFetcher::page("<html></html>"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(result.succeeded());
        assert_eq!(result.media_url(), Some("https://v.example.com/r.mp4"));
        assert_eq!(result.strategy(), Some(&Strategy::RenderedHtml));
        assert_eq!(renderer.dom_calls.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_video_src_falls_back_to_snapshot() {
        let renderer = StubRenderer::new(
            RenderOutcome::Success(DomProbe::VideoSource(String::new())),
            RenderOutcome::Success("<html></html>".to_string()),
        );
        let result = extractor(StubFetcher::page("<html></html>"), renderer.clone())
            .extract("https://v.douyin.com/abc/")
            .await;

        assert!(!result.succeeded());
        assert_eq!(renderer.snapshot_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extract_is_idempotent() {
        let scripts = r#"{"srcNoMark":"https://nm.example.com/n.mp4"}"#.to_string();
        let renderer = StubRenderer::new(
            RenderOutcome::Success(DomProbe::ScriptText(scripts)),
            RenderOutcome::Timeout,
        );
        let extractor = extractor(StubFetcher::page(r#"{"desc":"同一个"}"#), renderer);

        let first = extractor.extract("https://v.douyin.com/abc/").await;
        let second = extractor.extract("https://v.douyin.com/abc/").await;
        assert_eq!(first, second);
        assert!(first.succeeded());
    }

    #[tokio::test]
    async fn test_logs_go_to_injected_logger() {
        let logger = Arc::new(CapturingLogger::default());
        let extractor = extractor(StubFetcher::page("<html></html>"), StubRenderer::unavailable())
            .with_logger(logger.clone());

        extractor.extract("https://v.douyin.com/abc/").await;

        let lines = logger.lines.lock().unwrap();
        assert!(lines
            .iter()
            .any(|(level, line)| *level == Level::Info && line.contains("https://v.douyin.com/abc/")));
        assert!(lines
            .iter()
            .any(|(level, line)| *level == Level::Warn && line.contains("no driver")));
    }

    #[test]
    fn test_result_invariants() {
        let ok = ExtractionResult::success("t", "https://a/b", Strategy::StaticHtml);
        assert!(ok.succeeded() && ok.media_url().is_some() && ok.failure_reason().is_none());

        let empty = ExtractionResult::success("t", "", Strategy::StaticHtml);
        assert!(!empty.succeeded());
        assert_eq!(empty.failure_reason(), Some(NO_MATCH_REASON));

        let failed = ExtractionResult::failure("t", "");
        assert!(!failed.succeeded() && failed.media_url().is_none());
        assert!(!failed.failure_reason().unwrap().is_empty());
    }

    #[test]
    fn test_result_serializes_to_json() {
        let result = ExtractionResult::success("t", "https://a/b", Strategy::ScriptScan("mp4".to_string()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["media_url"], "https://a/b");
        assert_eq!(json["succeeded"], true);
        assert_eq!(json["strategy"]["stage"], "script_scan");
        assert_eq!(json["strategy"]["pattern"], "mp4");
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        assert_eq!(snippet("抖音视频", 2), "抖音");
        assert_eq!(snippet("short", 3000), "short");
    }
}
