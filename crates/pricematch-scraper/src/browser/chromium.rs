//! Chromium-backed sessions using chromiumoxide.
//!
//! Every session launches its own browser process with its own profile
//! directory, so one retailer's cookies, crashes, or hangs never leak into
//! another's.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::{Browser, PageSession, SessionOptions};
use crate::error::ScraperError;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const IS_VISIBLE_FN: &str = "function() { \
    const r = this.getBoundingClientRect(); \
    const s = window.getComputedStyle(this); \
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
}";

/// Launches a headless Chromium per session.
#[derive(Debug, Default)]
pub struct ChromiumBrowser {
    chrome_path: Option<PathBuf>,
    launched: AtomicU64,
}

impl ChromiumBrowser {
    /// `chrome_path` of `None` lets chromiumoxide locate an installed
    /// Chrome/Chromium.
    #[must_use]
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self {
            chrome_path,
            launched: AtomicU64::new(0),
        }
    }

    fn profile_dir(&self) -> PathBuf {
        let n = self.launched.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("pricematch-{}-{n}", std::process::id()))
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Box<dyn PageSession>, ScraperError> {
        let profile_dir = self.profile_dir();

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&profile_dir)
            .arg("--no-sandbox")
            .arg(format!("--user-agent={}", options.user_agent))
            .args(options.extra_args.iter().map(String::as_str));
        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::browser)?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(ScraperError::browser)?;

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                shutdown(browser, handler, &profile_dir).await;
                return Err(ScraperError::browser(e));
            }
        };

        for script in &options.init_scripts {
            if let Err(e) = page
                .execute(AddScriptToEvaluateOnNewDocumentParams::new(script.clone()))
                .await
            {
                let _ = page.close().await;
                shutdown(browser, handler, &profile_dir).await;
                return Err(ScraperError::browser(e));
            }
        }

        Ok(Box::new(ChromiumSession {
            browser,
            page,
            handler,
            profile_dir,
            nodes: Vec::new(),
        }))
    }
}

async fn shutdown(mut browser: CdpBrowser, handler: JoinHandle<()>, profile_dir: &Path) {
    if let Err(e) = browser.close().await {
        tracing::debug!(error = %e, "browser close failed");
    }
    let _ = browser.wait().await;
    handler.abort();
    let _ = tokio::fs::remove_dir_all(profile_dir).await;
}

pub struct ChromiumSession {
    browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
    nodes: Vec<Element>,
}

impl ChromiumSession {
    fn node(&self, index: usize) -> Result<&Element, ScraperError> {
        self.nodes.get(index).ok_or_else(|| ScraperError::Browser {
            reason: format!("node {index} was not collected"),
        })
    }
}

async fn is_visible(element: &Element) -> bool {
    match element.call_js_fn(IS_VISIBLE_FN, false).await {
        Ok(ret) => ret
            .result
            .value
            .as_ref()
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false),
        Err(_) => false,
    }
}

async fn any_visible(elements: &[Element]) -> bool {
    for element in elements {
        if is_visible(element).await {
            return true;
        }
    }
    false
}

#[async_trait]
impl PageSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.nodes.clear();
        self.page.goto(url).await.map_err(ScraperError::browser)?;
        Ok(())
    }

    async fn click_button_with_text(&self, text: &str) -> Result<bool, ScraperError> {
        let needle = serde_json::to_string(&text.to_lowercase()).map_err(ScraperError::browser)?;
        let script = format!(
            "(function(needle) {{ \
                const buttons = Array.from(document.querySelectorAll('button')); \
                const hit = buttons.find(b => b.offsetParent !== null && \
                    (b.innerText || b.textContent || '').toLowerCase().includes(needle)); \
                if (!hit) return false; \
                hit.click(); \
                return true; \
            }})({needle})"
        );
        let clicked = self.evaluate(&script).await?;
        Ok(clicked.as_bool().unwrap_or(false))
    }

    async fn click_selector(&self, selector: &str) -> Result<bool, ScraperError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(ScraperError::browser)?;
        let Some(first) = elements.first() else {
            return Ok(false);
        };
        first.click().await.map_err(ScraperError::browser)?;
        Ok(true)
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), ScraperError> {
        let poll = async {
            loop {
                if let Ok(elements) = self.page.find_elements(selector).await {
                    if any_visible(&elements).await {
                        return;
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ScraperError::timeout(format!("waiting for {selector:?}"), timeout))
    }

    async fn collect_nodes(&mut self, selector: &str) -> Result<usize, ScraperError> {
        self.nodes = self
            .page
            .find_elements(selector)
            .await
            .map_err(ScraperError::browser)?;
        Ok(self.nodes.len())
    }

    async fn wait_visible_in(
        &self,
        node: usize,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScraperError> {
        let root = self.node(node)?;
        let poll = async {
            loop {
                if let Ok(elements) = root.find_elements(selector).await {
                    if any_visible(&elements).await {
                        return;
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| ScraperError::timeout(format!("waiting for {selector:?}"), timeout))
    }

    async fn text_in(&self, node: usize, selector: &str) -> Result<String, ScraperError> {
        let element = self
            .node(node)?
            .find_element(selector)
            .await
            .map_err(ScraperError::browser)?;
        let text = element.inner_text().await.map_err(ScraperError::browser)?;
        Ok(text.unwrap_or_default())
    }

    async fn attribute_in(
        &self,
        node: usize,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, ScraperError> {
        let element = self
            .node(node)?
            .find_element(selector)
            .await
            .map_err(ScraperError::browser)?;
        element
            .attribute(attribute)
            .await
            .map_err(ScraperError::browser)
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(ScraperError::browser)?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(self: Box<Self>) {
        let ChromiumSession {
            browser,
            page,
            handler,
            profile_dir,
            ..
        } = *self;
        let _ = page.close().await;
        shutdown(browser, handler, &profile_dir).await;
    }
}
