//! Platform registry and category routing.
//!
//! Built once at startup from the platforms file and handed to the
//! orchestrator; nothing here is mutated afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use pricematch_core::platforms::platform_key;
use pricematch_core::{CategoryRoutes, ExtractionProfile, Listing, PlatformsFile};

use crate::browser::{Browser, SessionOptions};
use crate::error::ScraperError;
use crate::extract::extract_listings;
use crate::settings::ExtractionSettings;

/// Fetches raw listings for a query from one retailer.
#[async_trait]
pub trait PlatformScraper: Send + Sync {
    fn platform_name(&self) -> &str;

    async fn fetch(&self, query: &str) -> Result<Vec<Listing>, ScraperError>;
}

/// Scrapes a retailer described by an [`ExtractionProfile`], one isolated
/// browser session per fetch.
pub struct ProfileScraper {
    profile: ExtractionProfile,
    browser: Arc<dyn Browser>,
    settings: ExtractionSettings,
}

impl ProfileScraper {
    #[must_use]
    pub fn new(
        profile: ExtractionProfile,
        browser: Arc<dyn Browser>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            profile,
            browser,
            settings,
        }
    }

    #[must_use]
    pub fn profile(&self) -> &ExtractionProfile {
        &self.profile
    }

    fn unavailable(&self, reason: impl std::fmt::Display) -> ScraperError {
        ScraperError::PlatformUnavailable {
            platform: self.profile.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl PlatformScraper for ProfileScraper {
    fn platform_name(&self) -> &str {
        &self.profile.name
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Listing>, ScraperError> {
        let search_url = self.profile.build_search_url(query);
        let timeouts = &self.settings.timeouts;

        let mut session = self
            .browser
            .open_session(&SessionOptions::stealth(&self.settings.user_agent))
            .await
            .map_err(|e| self.unavailable(e))?;

        tracing::debug!(platform = %self.profile.name, url = %search_url, "session opened");

        let extraction = extract_listings(session.as_mut(), &self.profile, &search_url, timeouts);
        let outcome = tokio::time::timeout(timeouts.session, extraction).await;
        session.close().await;

        match outcome {
            Ok(Ok(listings)) => Ok(listings),
            Ok(Err(e @ ScraperError::PlatformUnavailable { .. })) => Err(e),
            Ok(Err(e)) => Err(self.unavailable(e)),
            Err(_) => Err(self.unavailable(ScraperError::timeout(
                "platform extraction",
                timeouts.session,
            ))),
        }
    }
}

/// Platform name to scraper, plus the category routes.
pub struct PlatformRegistry {
    scrapers: BTreeMap<String, Arc<dyn PlatformScraper>>,
    routes: CategoryRoutes,
}

impl PlatformRegistry {
    /// Registers a [`ProfileScraper`] for every configured profile.
    #[must_use]
    pub fn from_config(
        file: &PlatformsFile,
        browser: &Arc<dyn Browser>,
        settings: &ExtractionSettings,
    ) -> Self {
        let scrapers = file
            .platforms
            .iter()
            .map(|profile| {
                Arc::new(ProfileScraper::new(
                    profile.clone(),
                    Arc::clone(browser),
                    settings.clone(),
                )) as Arc<dyn PlatformScraper>
            })
            .collect();
        Self::new(scrapers, file.categories.clone())
    }

    /// Registers `scrapers` under their own platform names, ignoring case.
    /// A later scraper with the same name replaces an earlier one.
    #[must_use]
    pub fn new(scrapers: Vec<Arc<dyn PlatformScraper>>, routes: CategoryRoutes) -> Self {
        let scrapers = scrapers
            .into_iter()
            .map(|s| (platform_key(s.platform_name()), s))
            .collect();
        Self { scrapers, routes }
    }

    /// Platform names routed for `category`, falling back to the default
    /// route for unknown categories.
    #[must_use]
    pub fn platforms_for(&self, category: &str) -> &[String] {
        self.routes.platforms_for(category)
    }

    /// Matches `platform` against registered names case-insensitively.
    #[must_use]
    pub fn scraper_for(&self, platform: &str) -> Option<Arc<dyn PlatformScraper>> {
        self.scrapers.get(&platform_key(platform)).cloned()
    }

    /// Scrapers for `category` in route order, tagged with each scraper's
    /// own platform name. Route entries with no registered scraper are
    /// skipped with a warning.
    #[must_use]
    pub fn resolve(&self, category: &str) -> Vec<(String, Arc<dyn PlatformScraper>)> {
        self.platforms_for(category)
            .iter()
            .filter_map(|name| match self.scraper_for(name) {
                Some(scraper) => Some((scraper.platform_name().to_string(), scraper)),
                None => {
                    let err = ScraperError::UnknownScraperReference {
                        platform: name.clone(),
                    };
                    tracing::warn!(category, error = %err, "skipping platform");
                    None
                }
            })
            .collect()
    }

    #[must_use]
    pub fn routes(&self) -> &CategoryRoutes {
        &self.routes
    }

    pub fn platform_names(&self) -> impl Iterator<Item = &str> {
        self.scrapers.values().map(|s| s.platform_name())
    }
}
