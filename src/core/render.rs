//! Headless browser rendering for douyin-dl
//!
//! The render collaborator drives a Chrome instance through a WebDriver
//! endpoint (chromedriver). Every request opens its own session and closes it
//! before returning, whatever happened in between.
//!
//! Failures are reported as [`RenderOutcome`] values rather than errors: the
//! extraction pipeline treats an unavailable or slow browser as "no result"
//! and moves on to its next fallback.

use std::time::{Duration, Instant};
use async_trait::async_trait;
use fantoccini::error::{CmdError, ErrorStatus};
use fantoccini::wd::{TimeoutConfiguration, WebDriverCompatibleCommand};
use fantoccini::{Client, ClientBuilder, Locator};
use log::{debug, warn};
use serde_json::{json, Map, Value};

/// Concatenated text of every `<script>` element on the page
const SCRIPT_TEXT_JS: &str = "return Array.from(document.querySelectorAll('script'))\
    .map(function (e) { return e.textContent || ''; }).join('\\n');";

/// Ready state plus number of fetched resources, used to detect network idle
const LOAD_STATE_JS: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// Interval between load-state polls
const SETTLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Resource count must stay unchanged this long to count as idle
const NETWORK_IDLE_QUIET: Duration = Duration::from_millis(500);

/// Result of a render request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome<T> {
    /// The browser could not be started or the session failed
    Unavailable(String),
    /// Navigation did not finish within its budget
    Timeout,
    /// The page was rendered
    Success(T),
}

/// What a DOM query found on the rendered page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomProbe {
    /// Non-empty `src` attribute of the awaited element
    VideoSource(String),
    /// No usable element; script text (or page source) for pattern scanning
    ScriptText(String),
}

/// Navigation completion condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// DOM parsed, subresources may still be loading
    DomContentLoaded,
    /// `load` event fired
    Load,
    /// `load` fired and no new resources were requested for a short while
    NetworkIdle,
}

impl WaitUntil {
    /// WebDriver page load strategy matching this condition
    pub fn page_load_strategy(self) -> &'static str {
        match self {
            WaitUntil::DomContentLoaded => "eager",
            WaitUntil::Load | WaitUntil::NetworkIdle => "normal",
        }
    }
}

/// Options for a DOM query
#[derive(Debug, Clone)]
pub struct DomQueryOptions {
    pub user_agent: String,
    pub locale: String,
    pub bypass_csp: bool,
    pub nav_timeout: Duration,
    pub wait_until: WaitUntil,
    /// CSS selector of the element whose `src` is read
    pub selector: String,
    pub selector_timeout: Duration,
}

/// Options for an HTML snapshot
#[derive(Debug, Clone)]
pub struct SnapshotOptions {
    pub user_agent: Option<String>,
    pub nav_timeout: Duration,
    pub wait_until: WaitUntil,
    /// Upper bound for the post-navigation settle wait
    pub settle_timeout: Duration,
}

/// Render collaborator used by the extraction pipeline
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Opens `url`, waits for `options.selector` and reads its `src`.
    ///
    /// When no element (or an empty `src`) shows up, the script text of the
    /// same page is returned instead.
    async fn probe_dom(&self, url: &str, options: &DomQueryOptions) -> RenderOutcome<DomProbe>;

    /// Returns the rendered document HTML of `url`
    async fn render_html(&self, url: &str, options: &SnapshotOptions) -> RenderOutcome<String>;
}

/// Renderer that never starts a browser
#[derive(Debug, Clone)]
pub struct DisabledRenderer {
    reason: String,
}

impl Default for DisabledRenderer {
    fn default() -> Self {
        Self::new("browser rendering disabled")
    }
}

impl DisabledRenderer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl PageRenderer for DisabledRenderer {
    async fn probe_dom(&self, _url: &str, _options: &DomQueryOptions) -> RenderOutcome<DomProbe> {
        RenderOutcome::Unavailable(self.reason.clone())
    }

    async fn render_html(&self, _url: &str, _options: &SnapshotOptions) -> RenderOutcome<String> {
        RenderOutcome::Unavailable(self.reason.clone())
    }
}

/// Chrome driven through a WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverRenderer {
    /// Create a renderer talking to the WebDriver server at `webdriver_url`
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless: true,
        }
    }

    /// Show the browser window (useful when debugging selectors)
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    async fn open_session(&self, capabilities: Map<String, Value>) -> Result<Client, String> {
        ClientBuilder::native()
            .capabilities(capabilities)
            .connect(&self.webdriver_url)
            .await
            .map_err(|e| format!("cannot start browser session at {}: {e}", self.webdriver_url))
    }

    async fn run_dom_probe(
        &self,
        client: &Client,
        url: &str,
        options: &DomQueryOptions,
    ) -> RenderOutcome<DomProbe> {
        apply_timeouts(client, options.nav_timeout).await;

        if options.bypass_csp {
            if let Err(e) = client.issue_cmd(CdpCommand::bypass_csp()).await {
                debug!("CSP bypass not supported by this driver: {e}");
            }
        }

        if let Err(e) = client.goto(url).await {
            return failed_outcome("navigation", e);
        }

        match client
            .wait()
            .at_most(options.selector_timeout)
            .for_element(Locator::Css(&options.selector))
            .await
        {
            Ok(element) => match element.attr("src").await {
                Ok(Some(src)) if !src.is_empty() => {
                    return RenderOutcome::Success(DomProbe::VideoSource(src));
                }
                Ok(_) => debug!("<{}> element has no src attribute", options.selector),
                Err(e) => debug!("reading src of <{}> failed: {e}", options.selector),
            },
            Err(e) => debug!(
                "no <{}> element within {:?}: {e}",
                options.selector, options.selector_timeout
            ),
        }

        match client.execute(SCRIPT_TEXT_JS, Vec::new()).await {
            Ok(Value::String(text)) => RenderOutcome::Success(DomProbe::ScriptText(text)),
            Ok(other) => {
                debug!("script collection returned {other}, using page source");
                page_source(client).await.map_script_text()
            }
            Err(e) => {
                debug!("script collection failed ({e}), using page source");
                page_source(client).await.map_script_text()
            }
        }
    }

    async fn run_snapshot(
        &self,
        client: &Client,
        url: &str,
        options: &SnapshotOptions,
    ) -> RenderOutcome<String> {
        apply_timeouts(client, options.nav_timeout).await;

        if let Err(e) = client.goto(url).await {
            return failed_outcome("navigation", e);
        }
        wait_for_settle(client, options.wait_until, options.settle_timeout).await;
        page_source(client).await
    }
}

#[async_trait]
impl PageRenderer for WebDriverRenderer {
    async fn probe_dom(&self, url: &str, options: &DomQueryOptions) -> RenderOutcome<DomProbe> {
        let capabilities = chrome_capabilities(
            Some(&options.user_agent),
            Some(&options.locale),
            options.wait_until,
            self.headless,
        );
        let client = match self.open_session(capabilities).await {
            Ok(client) => client,
            Err(reason) => return RenderOutcome::Unavailable(reason),
        };

        let outcome = self.run_dom_probe(&client, url, options).await;
        close_session(client).await;
        outcome
    }

    async fn render_html(&self, url: &str, options: &SnapshotOptions) -> RenderOutcome<String> {
        let capabilities = chrome_capabilities(
            options.user_agent.as_deref(),
            None,
            options.wait_until,
            self.headless,
        );
        let client = match self.open_session(capabilities).await {
            Ok(client) => client,
            Err(reason) => return RenderOutcome::Unavailable(reason),
        };

        let outcome = self.run_snapshot(&client, url, options).await;
        close_session(client).await;
        outcome
    }
}

trait ScriptTextOutcome {
    fn map_script_text(self) -> RenderOutcome<DomProbe>;
}

impl ScriptTextOutcome for RenderOutcome<String> {
    fn map_script_text(self) -> RenderOutcome<DomProbe> {
        match self {
            RenderOutcome::Success(html) => RenderOutcome::Success(DomProbe::ScriptText(html)),
            RenderOutcome::Unavailable(reason) => RenderOutcome::Unavailable(reason),
            RenderOutcome::Timeout => RenderOutcome::Timeout,
        }
    }
}

/// Chrome session capabilities for a render request
pub fn chrome_capabilities(
    user_agent: Option<&str>,
    locale: Option<&str>,
    wait_until: WaitUntil,
    headless: bool,
) -> Map<String, Value> {
    let mut args: Vec<String> = vec![
        "--disable-gpu".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--mute-audio".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }
    if let Some(ua) = user_agent {
        args.push(format!("--user-agent={ua}"));
    }

    let mut chrome_options = Map::new();
    if let Some(locale) = locale {
        args.push(format!("--lang={locale}"));
        chrome_options.insert("prefs".to_string(), json!({ "intl.accept_languages": locale }));
    }
    chrome_options.insert("args".to_string(), json!(args));

    let mut capabilities = Map::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert(
        "pageLoadStrategy".to_string(),
        json!(wait_until.page_load_strategy()),
    );
    capabilities.insert("goog:chromeOptions".to_string(), Value::Object(chrome_options));
    capabilities
}

/// chromedriver's vendor endpoint for Chrome DevTools Protocol commands
#[derive(Debug, Clone)]
struct CdpCommand {
    cmd: &'static str,
    params: Value,
}

impl CdpCommand {
    fn bypass_csp() -> Self {
        Self {
            cmd: "Page.setBypassCSP",
            params: json!({ "enabled": true }),
        }
    }
}

impl WebDriverCompatibleCommand for CdpCommand {
    fn endpoint(
        &self,
        base_url: &url::Url,
        session_id: Option<&str>,
    ) -> Result<url::Url, url::ParseError> {
        let session_id = session_id.unwrap_or_default();
        base_url.join(&format!("session/{session_id}/goog/cdp/execute"))
    }

    fn method_and_body(&self, _request_url: &url::Url) -> (http::Method, Option<String>) {
        let body = json!({ "cmd": self.cmd, "params": self.params });
        (http::Method::POST, Some(body.to_string()))
    }
}

async fn apply_timeouts(client: &Client, nav_timeout: Duration) {
    let timeouts = TimeoutConfiguration::new(Some(nav_timeout), Some(nav_timeout), None);
    if let Err(e) = client.update_timeouts(timeouts).await {
        debug!("could not set browser timeouts: {e}");
    }
}

async fn page_source(client: &Client) -> RenderOutcome<String> {
    match client.source().await {
        Ok(html) => RenderOutcome::Success(html),
        Err(e) => failed_outcome("reading page source", e),
    }
}

/// Waits until the page satisfies `wait_until` or `budget` runs out.
///
/// Running out of budget is not an error: the snapshot is taken anyway.
async fn wait_for_settle(client: &Client, wait_until: WaitUntil, budget: Duration) {
    if wait_until == WaitUntil::DomContentLoaded {
        return;
    }

    let deadline = Instant::now() + budget;
    let mut last_count: Option<u64> = None;
    let mut quiet_since = Instant::now();

    while Instant::now() < deadline {
        let state = match client.execute(LOAD_STATE_JS, Vec::new()).await {
            Ok(state) => state,
            Err(e) => {
                debug!("load state probe failed: {e}");
                return;
            }
        };
        let ready = state[0].as_str() == Some("complete");
        let count = state[1].as_u64().unwrap_or(0);

        if ready {
            if wait_until == WaitUntil::Load {
                return;
            }
            if last_count == Some(count) {
                if quiet_since.elapsed() >= NETWORK_IDLE_QUIET {
                    return;
                }
            } else {
                last_count = Some(count);
                quiet_since = Instant::now();
            }
        }

        tokio::time::sleep(SETTLE_POLL_INTERVAL).await;
    }
    debug!("page did not settle within {budget:?}, taking snapshot anyway");
}

async fn close_session(client: Client) {
    if let Err(e) = client.close().await {
        warn!("failed to close browser session: {e}");
    }
}

fn failed_outcome<T>(step: &str, err: CmdError) -> RenderOutcome<T> {
    if is_timeout(&err) {
        debug!("{step} timed out: {err}");
        RenderOutcome::Timeout
    } else {
        RenderOutcome::Unavailable(format!("{step} failed: {err}"))
    }
}

fn is_timeout(err: &CmdError) -> bool {
    match err {
        CmdError::WaitTimeout => true,
        CmdError::Standard(e) => matches!(e.error, ErrorStatus::Timeout | ErrorStatus::ScriptTimeout),
        _ => false,
    }
}
