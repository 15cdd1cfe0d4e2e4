//! Rendering-session abstraction over a headless browser.
//!
//! The extraction engine only talks to [`PageSession`]; Chromium (via
//! chromiumoxide) is the production implementation. Result nodes are
//! addressed by their index in the most recent [`PageSession::collect_nodes`]
//! call so that sessions stay object-safe.

pub mod chromium;
#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ScraperError;

/// Hides the `navigator.webdriver` flag that page scripts use to detect
/// automation. Installed before any page script runs.
pub const STEALTH_SCRIPT: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Launch flags that reduce the automation fingerprint and switch off
/// browser features unrelated to rendering a search page.
pub const STEALTH_ARGS: [&str; 7] = [
    "--disable-blink-features=AutomationControlled",
    "--disable-gpu",
    "--disable-extensions",
    "--disable-features=Translate",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-dev-shm-usage",
];

/// How an isolated session is launched.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub user_agent: String,
    /// Scripts evaluated on every new document before page scripts.
    pub init_scripts: Vec<String>,
    pub extra_args: Vec<String>,
}

impl SessionOptions {
    /// Options for a session that presents `user_agent` and hides the usual
    /// automation signals.
    #[must_use]
    pub fn stealth(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            init_scripts: vec![STEALTH_SCRIPT.to_string()],
            extra_args: STEALTH_ARGS.iter().map(|a| (*a).to_string()).collect(),
        }
    }
}

/// Opens isolated rendering sessions.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Launches a fresh session; nothing is shared with other sessions.
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Box<dyn PageSession>, ScraperError>;
}

/// One browser tab driven by the extraction engine.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError>;

    /// Clicks the first visible `<button>` whose text contains `text`,
    /// case-insensitively. Returns `false` when no such button exists.
    async fn click_button_with_text(&self, text: &str) -> Result<bool, ScraperError>;

    /// Clicks the first element matching `selector`. Returns `false` when
    /// nothing matches.
    async fn click_selector(&self, selector: &str) -> Result<bool, ScraperError>;

    /// Waits until an element matching `selector` is visible in the page.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), ScraperError>;

    /// Collects every element matching `selector`, replacing any previously
    /// collected nodes, and returns how many were found.
    async fn collect_nodes(&mut self, selector: &str) -> Result<usize, ScraperError>;

    /// Waits until `selector`, scoped to collected node `node`, is visible.
    async fn wait_visible_in(
        &self,
        node: usize,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScraperError>;

    /// Visible text of the first match of `selector` within `node`.
    async fn text_in(&self, node: usize, selector: &str) -> Result<String, ScraperError>;

    /// Attribute value of the first match of `selector` within `node`;
    /// `None` when the element exists but lacks the attribute.
    async fn attribute_in(
        &self,
        node: usize,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, ScraperError>;

    /// Evaluates `script` in the page and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError>;

    /// Releases the session and its browser process.
    async fn close(self: Box<Self>);
}
