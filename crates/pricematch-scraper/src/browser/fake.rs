//! Scripted in-memory browser for exercising the extraction engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{Browser, PageSession, SessionOptions};
use crate::error::ScraperError;

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeNode {
    pub title: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    /// Price selector to visible text.
    pub prices: HashMap<String, String>,
    /// Reading the title never completes.
    pub stall: bool,
}

impl FakeNode {
    pub(crate) fn card(title: &str, link: &str, price_selector: &str, price: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            image: Some(format!(" https://img.example.com/{title}.jpg ")),
            link: Some(link.to_string()),
            prices: HashMap::from([(price_selector.to_string(), price.to_string())]),
            stall: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakePage {
    pub fail_navigation: bool,
    pub container_visible: bool,
    pub nodes: Vec<FakeNode>,
    /// Texts of buttons that accept a click.
    pub consent_buttons: Vec<String>,
    /// Selectors that accept a click.
    pub consent_selectors: Vec<String>,
    /// Value returned by any script evaluation.
    pub script_result: Option<String>,
    /// Navigation never completes.
    pub hang_navigation: bool,
}

#[derive(Debug, Default)]
pub(crate) struct FakeLog {
    pub opened: usize,
    pub closed: usize,
    pub navigated: Vec<String>,
    pub clicked: Vec<String>,
    pub scripts: Vec<String>,
    pub user_agents: Vec<String>,
}

pub(crate) struct FakeBrowser {
    page: FakePage,
    fail_open: bool,
    pub log: Arc<Mutex<FakeLog>>,
}

impl FakeBrowser {
    pub(crate) fn new(page: FakePage) -> Self {
        Self {
            page,
            fail_open: false,
            log: Arc::default(),
        }
    }

    pub(crate) fn failing_to_open() -> Self {
        Self {
            page: FakePage::default(),
            fail_open: true,
            log: Arc::default(),
        }
    }

    pub(crate) fn log(&self) -> std::sync::MutexGuard<'_, FakeLog> {
        self.log.lock().expect("fake log poisoned")
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn open_session(
        &self,
        options: &SessionOptions,
    ) -> Result<Box<dyn PageSession>, ScraperError> {
        if self.fail_open {
            return Err(ScraperError::Browser {
                reason: "could not launch".to_string(),
            });
        }
        {
            let mut log = self.log();
            log.opened += 1;
            log.user_agents.push(options.user_agent.clone());
        }
        Ok(Box::new(FakeSession {
            page: self.page.clone(),
            collected: 0,
            log: Arc::clone(&self.log),
        }))
    }
}

pub(crate) struct FakeSession {
    page: FakePage,
    collected: usize,
    log: Arc<Mutex<FakeLog>>,
}

impl FakeSession {
    pub(crate) fn new(page: FakePage) -> Self {
        Self {
            page,
            collected: 0,
            log: Arc::default(),
        }
    }

    pub(crate) fn log(&self) -> std::sync::MutexGuard<'_, FakeLog> {
        self.log.lock().expect("fake log poisoned")
    }

    fn node(&self, index: usize) -> Result<&FakeNode, ScraperError> {
        if index >= self.collected {
            return Err(ScraperError::Browser {
                reason: format!("node {index} was not collected"),
            });
        }
        self.page.nodes.get(index).ok_or(ScraperError::Browser {
            reason: format!("node {index} out of range"),
        })
    }
}

fn missing(selector: &str) -> ScraperError {
    ScraperError::Browser {
        reason: format!("no element matches {selector:?}"),
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScraperError> {
        self.log().navigated.push(url.to_string());
        if self.page.hang_navigation {
            std::future::pending::<()>().await;
        }
        if self.page.fail_navigation {
            return Err(ScraperError::Browser {
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        Ok(())
    }

    async fn click_button_with_text(&self, text: &str) -> Result<bool, ScraperError> {
        let hit = self
            .page
            .consent_buttons
            .iter()
            .any(|b| b.to_lowercase().contains(text));
        if hit {
            self.log().clicked.push(text.to_string());
        }
        Ok(hit)
    }

    async fn click_selector(&self, selector: &str) -> Result<bool, ScraperError> {
        if self.page.consent_selectors.iter().any(|s| s == selector) {
            self.log().clicked.push(selector.to_string());
            return Ok(true);
        }
        // Unknown selectors behave like a broken overlay script.
        Err(missing(selector))
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<(), ScraperError> {
        if self.page.container_visible {
            Ok(())
        } else {
            tokio::time::sleep(timeout).await;
            Err(ScraperError::timeout(format!("waiting for {selector:?}"), timeout))
        }
    }

    async fn collect_nodes(&mut self, _selector: &str) -> Result<usize, ScraperError> {
        self.collected = self.page.nodes.len();
        Ok(self.collected)
    }

    async fn wait_visible_in(
        &self,
        node: usize,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), ScraperError> {
        if self.node(node)?.prices.contains_key(selector) {
            Ok(())
        } else {
            Err(ScraperError::timeout(format!("waiting for {selector:?}"), timeout))
        }
    }

    async fn text_in(&self, node: usize, selector: &str) -> Result<String, ScraperError> {
        let fake = self.node(node)?;
        if let Some(price) = fake.prices.get(selector) {
            return Ok(price.clone());
        }
        if fake.stall {
            std::future::pending::<()>().await;
        }
        fake.title.clone().ok_or_else(|| missing(selector))
    }

    async fn attribute_in(
        &self,
        node: usize,
        selector: &str,
        attribute: &str,
    ) -> Result<Option<String>, ScraperError> {
        let fake = self.node(node)?;
        let value = if attribute == "href" {
            fake.link.clone()
        } else {
            fake.image.clone()
        };
        value.map(Some).ok_or_else(|| missing(selector))
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, ScraperError> {
        self.log().scripts.push(script.to_string());
        Ok(self
            .page
            .script_result
            .clone()
            .map_or(serde_json::Value::String(String::new()), serde_json::Value::String))
    }

    async fn close(self: Box<Self>) {
        self.log().closed += 1;
    }
}
