//! Retailer extraction profiles and category routing, loaded once at startup.
//!
//! Adding a retailer means adding a profile to `config/platforms.yaml` and
//! naming it in one or more category routes; no engine code changes.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Reserved category key used when a requested category is unknown.
pub const DEFAULT_CATEGORY: &str = "default";

/// Placeholder in `search_url` replaced by the form-encoded query.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Where to find each field on a retailer's search-result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionProfile {
    pub name: String,
    /// Search page template, e.g. `"https://www.bcf.com.au/search?q={query}"`.
    pub search_url: String,
    /// Selector matching one result card.
    pub container: String,
    pub title: String,
    /// Candidate price selectors, most preferred first.
    pub prices: Vec<String>,
    pub image: String,
    #[serde(default = "default_image_attr")]
    pub image_attr: String,
    pub link: String,
    /// Price markup lives inside shadow roots and needs a piercing search.
    #[serde(default)]
    pub deep_price: bool,
}

fn default_image_attr() -> String {
    "src".to_string()
}

impl ExtractionProfile {
    /// Builds the search page URL for `query`.
    #[must_use]
    pub fn build_search_url(&self, query: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        self.search_url.replace(QUERY_PLACEHOLDER, &encoded)
    }
}

/// Category key to ordered platform names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRoutes(BTreeMap<String, Vec<String>>);

impl CategoryRoutes {
    #[must_use]
    pub fn new(routes: BTreeMap<String, Vec<String>>) -> Self {
        Self(
            routes
                .into_iter()
                .map(|(key, platforms)| (normalize_category(&key), platforms))
                .collect(),
        )
    }

    /// Ordered platform names for `category`, falling back to the default
    /// route when the key is absent or blank.
    #[must_use]
    pub fn platforms_for(&self, category: &str) -> &[String] {
        self.0
            .get(&normalize_category(category))
            .or_else(|| self.0.get(DEFAULT_CATEGORY))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Category keys in sorted order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    fn get(&self, category: &str) -> Option<&Vec<String>> {
        self.0.get(category)
    }
}

fn normalize_category(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Lookup key for a platform name. Names that differ only in case or
/// surrounding whitespace refer to the same platform.
#[must_use]
pub fn platform_key(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformsFile {
    pub platforms: Vec<ExtractionProfile>,
    pub categories: CategoryRoutes,
}

/// Load and validate the platforms configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_platforms(path: &Path) -> Result<PlatformsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlatformsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_platforms(&content)
}

/// Parse and validate platforms configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or fails validation.
pub fn parse_platforms(content: &str) -> Result<PlatformsFile, ConfigError> {
    let mut file: PlatformsFile = serde_yaml::from_str(content)?;
    // Keys written in any case resolve the same way at lookup.
    file.categories = CategoryRoutes::new(file.categories.0);
    validate_platforms(&file)?;
    Ok(file)
}

fn validate_platforms(file: &PlatformsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for profile in &file.platforms {
        if profile.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "platform name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(platform_key(&profile.name)) {
            return Err(ConfigError::Validation(format!(
                "duplicate platform name: '{}'",
                profile.name
            )));
        }

        if !profile.search_url.contains(QUERY_PLACEHOLDER) {
            return Err(ConfigError::Validation(format!(
                "platform '{}' search_url must contain {QUERY_PLACEHOLDER}",
                profile.name
            )));
        }

        let selectors = [
            ("container", &profile.container),
            ("title", &profile.title),
            ("image", &profile.image),
            ("image_attr", &profile.image_attr),
            ("link", &profile.link),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "platform '{}' has an empty {field} selector",
                    profile.name
                )));
            }
        }

        if profile.prices.is_empty() || profile.prices.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "platform '{}' needs at least one non-empty price selector",
                profile.name
            )));
        }
    }

    match file.categories.get(DEFAULT_CATEGORY) {
        Some(defaults) if !defaults.is_empty() => Ok(()),
        _ => Err(ConfigError::Validation(format!(
            "categories must define a non-empty '{DEFAULT_CATEGORY}' route"
        ))),
    }
}
