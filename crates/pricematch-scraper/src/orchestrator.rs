//! Cache-first search across the retailers routed for a category.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use pricematch_core::platforms::DEFAULT_CATEGORY;
use pricematch_core::{PlatformResult, Repository};

use crate::error::SearchError;
use crate::persist::PersistQueue;
use crate::registry::{PlatformRegistry, PlatformScraper};
use crate::relevance::{query_words, RelevanceFilter};
use crate::settings::ExtractionSettings;

/// Prefixes shorter than this never reach the repository.
const MIN_SUGGEST_CHARS: usize = 2;

pub struct SearchService {
    registry: PlatformRegistry,
    repository: Arc<dyn Repository>,
    persist: Arc<dyn PersistQueue>,
    relevance: RelevanceFilter,
    settings: ExtractionSettings,
}

impl SearchService {
    #[must_use]
    pub fn new(
        registry: PlatformRegistry,
        repository: Arc<dyn Repository>,
        persist: Arc<dyn PersistQueue>,
        settings: ExtractionSettings,
    ) -> Self {
        Self {
            registry,
            repository,
            persist,
            relevance: RelevanceFilter::new(settings.relevance_threshold),
            settings,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &PlatformRegistry {
        &self.registry
    }

    /// Returns stored listings matching `query` when any exist; otherwise
    /// scrapes every platform routed for `category` and queues the results
    /// for persistence.
    ///
    /// Platform failures only shrink the result. A blank `category` uses the
    /// default route.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::EmptyQuery`] when `query` has no letters or
    /// digits.
    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
    ) -> Result<Vec<PlatformResult>, SearchError> {
        let query = query.trim();
        if query_words(query).is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        match self.repository.search_by_name(query).await {
            Ok(rows) if !rows.is_empty() => {
                let results = PlatformResult::group_stored(rows);
                tracing::info!(
                    query,
                    platforms = results.len(),
                    listings = PlatformResult::listing_count(&results),
                    "serving stored listings"
                );
                return Ok(results);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(query, error = %e, "stored listing lookup failed; scraping"),
        }

        let category = category
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);
        let targets = self.registry.resolve(category);
        let deadline = self.settings.platform_deadline();

        let results: Vec<PlatformResult> = stream::iter(targets)
            .map(|(platform, scraper)| self.scrape_platform(platform, scraper, query, deadline))
            .buffered(self.settings.max_concurrent_platforms.max(1))
            .filter_map(|result| async move { result })
            .collect()
            .await;

        tracing::info!(
            query,
            category,
            platforms = results.len(),
            listings = PlatformResult::listing_count(&results),
            "scrape finished"
        );

        let new_products = PlatformResult::to_new_products(&results);
        if !new_products.is_empty() {
            self.persist.enqueue(new_products);
        }

        Ok(results)
    }

    async fn scrape_platform(
        &self,
        platform: String,
        scraper: Arc<dyn PlatformScraper>,
        query: &str,
        deadline: Duration,
    ) -> Option<PlatformResult> {
        let listings = match tokio::time::timeout(deadline, scraper.fetch(query)).await {
            Ok(Ok(listings)) => listings,
            Ok(Err(e)) => {
                tracing::warn!(platform = %platform, error = %e, "platform scrape failed");
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    platform = %platform,
                    deadline_ms = deadline.as_millis(),
                    "platform scrape exceeded its deadline"
                );
                return None;
            }
        };

        let found = listings.len();
        let listings: Vec<_> = self
            .relevance
            .retain_relevant(query, listings)
            .into_iter()
            .filter(pricematch_core::Listing::is_valid)
            .collect();
        tracing::info!(
            platform = %platform,
            found,
            relevant = listings.len(),
            "platform scraped"
        );

        Some(PlatformResult { platform, listings })
    }

    /// Up to the configured number of stored names starting with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Repository`] when the lookup fails.
    pub async fn suggest(&self, prefix: &str) -> Result<Vec<String>, SearchError> {
        let prefix = prefix.trim();
        if prefix.chars().count() < MIN_SUGGEST_CHARS {
            return Ok(Vec::new());
        }
        let limit = self.settings.suggest_limit;
        let mut names = self.repository.suggest_names(prefix, limit).await?;
        names.truncate(limit);
        Ok(names)
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
