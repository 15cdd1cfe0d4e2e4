//! Profile-driven extraction of listings from one retailer's search page.
//!
//! Page-level failures (navigation, the result container never appearing)
//! fail the whole platform. Anything that goes wrong inside a single result
//! card only drops that card.

use pricematch_core::{ExtractionProfile, Listing};
use url::Url;

use crate::browser::PageSession;
use crate::consent::dismiss_consent;
use crate::error::ScraperError;
use crate::normalize::normalize_price;
use crate::settings::ScrapeTimeouts;

/// Shadow roots are searched at most this many levels deep.
const SHADOW_DEPTH: usize = 4;

/// Loads `search_url` in `session` and extracts every valid listing.
///
/// # Errors
///
/// Returns an error when navigation fails, the search URL is not absolute,
/// or the result container never becomes visible. Zero result cards is an
/// empty `Ok`.
pub async fn extract_listings(
    session: &mut dyn PageSession,
    profile: &ExtractionProfile,
    search_url: &str,
    timeouts: &ScrapeTimeouts,
) -> Result<Vec<Listing>, ScraperError> {
    let base = Url::parse(search_url).map_err(|e| ScraperError::PlatformUnavailable {
        platform: profile.name.clone(),
        reason: format!("invalid search url {search_url:?}: {e}"),
    })?;

    session.navigate(search_url).await?;
    tokio::time::sleep(timeouts.settle).await;

    let consent = dismiss_consent(&*session, timeouts).await;
    tracing::debug!(
        platform = %profile.name,
        attempts = consent.attempts,
        dismissed = consent.dismissed(),
        "consent handling finished"
    );
    tokio::time::sleep(timeouts.settle).await;

    session
        .wait_visible(&profile.container, timeouts.container)
        .await?;
    tokio::time::sleep(timeouts.settle).await;

    let count = session.collect_nodes(&profile.container).await?;
    if count == 0 {
        tracing::info!(platform = %profile.name, "no result cards found");
        return Ok(Vec::new());
    }

    let session = &*session;
    let mut listings = Vec::with_capacity(count);
    for node in 0..count {
        let extraction = extract_node(session, node, profile, &base, timeouts);
        match tokio::time::timeout(timeouts.node, extraction).await {
            Ok(Ok(listing)) if listing.is_valid() => listings.push(listing),
            Ok(Ok(listing)) => {
                tracing::debug!(
                    platform = %profile.name,
                    node,
                    name = %listing.name,
                    price = %listing.price,
                    "dropping listing with empty name or non-positive price"
                );
            }
            Ok(Err(e)) => {
                tracing::debug!(platform = %profile.name, node, error = %e, "dropping result card");
            }
            Err(_) => {
                tracing::debug!(
                    platform = %profile.name,
                    node,
                    error = %ScraperError::timeout("result card extraction", timeouts.node),
                    "dropping result card"
                );
            }
        }
    }

    tracing::info!(
        platform = %profile.name,
        cards = count,
        listings = listings.len(),
        "extraction finished"
    );
    Ok(listings)
}

async fn extract_node(
    session: &dyn PageSession,
    node: usize,
    profile: &ExtractionProfile,
    base: &Url,
    timeouts: &ScrapeTimeouts,
) -> Result<Listing, ScraperError> {
    let name = session
        .text_in(node, &profile.title)
        .await
        .map_err(|_| missing("title", &profile.title))?;

    let image_url = session
        .attribute_in(node, &profile.image, &profile.image_attr)
        .await
        .ok()
        .flatten()
        .ok_or_else(|| missing("image", &profile.image))?;

    let href = session
        .attribute_in(node, &profile.link, "href")
        .await
        .ok()
        .flatten()
        .ok_or_else(|| missing("link", &profile.link))?;
    let link = resolve_link(base, href.trim()).ok_or_else(|| missing("link", &profile.link))?;

    let price_text = if profile.deep_price {
        deep_price_text(session, &profile.prices).await
    } else {
        direct_price_text(session, node, &profile.prices, timeouts).await
    }
    .ok_or_else(|| missing("price", &profile.prices.join(", ")))?;

    let price = normalize_price(&price_text)?;

    Ok(Listing {
        name: name.trim().to_string(),
        price,
        image_url: image_url.trim().to_string(),
        link,
    })
}

fn missing(field: &'static str, selector: &str) -> ScraperError {
    ScraperError::ExtractionFieldMissing {
        field,
        selector: selector.to_string(),
    }
}

/// Resolves `href` against the search page. Absolute links pass through.
fn resolve_link(base: &Url, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

/// First non-empty text among the node's price selectors, each given a
/// bounded wait to become visible.
async fn direct_price_text(
    session: &dyn PageSession,
    node: usize,
    selectors: &[String],
    timeouts: &ScrapeTimeouts,
) -> Option<String> {
    for selector in selectors {
        if session
            .wait_visible_in(node, selector, timeouts.price_wait)
            .await
            .is_err()
        {
            continue;
        }
        match session.text_in(node, selector).await {
            Ok(text) if !text.trim().is_empty() => return Some(text),
            Ok(_) => {}
            Err(e) => tracing::debug!(node, selector = %selector, error = %e, "price read failed"),
        }
    }
    None
}

/// Searches the whole document, descending into shadow roots, for the first
/// non-empty price selector match.
async fn deep_price_text(session: &dyn PageSession, selectors: &[String]) -> Option<String> {
    let script = match deep_price_script(selectors) {
        Ok(script) => script,
        Err(e) => {
            tracing::debug!(error = %e, "could not build shadow price script");
            return None;
        }
    };
    match session.evaluate(&script).await {
        Ok(value) => value
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        Err(e) => {
            tracing::debug!(error = %e, "shadow price script failed");
            None
        }
    }
}

fn deep_price_script(selectors: &[String]) -> Result<String, serde_json::Error> {
    let selectors = serde_json::to_string(selectors)?;
    Ok(format!(
        "(function(selectors) {{
  const findInShadow = (root, selector, depth = 0) => {{
    if (!root || depth > {SHADOW_DEPTH}) return null;
    const el = root.querySelector ? root.querySelector(selector) : null;
    if (el) return el;
    const hosts = root.querySelectorAll ? root.querySelectorAll('*') : [];
    for (const host of hosts) {{
      if (host.shadowRoot) {{
        const found = findInShadow(host.shadowRoot, selector, depth + 1);
        if (found) return found;
      }}
    }}
    return null;
  }};
  for (const sel of selectors) {{
    const el = findInShadow(document, sel);
    if (el) {{
      const text = (el.innerText || el.textContent || '').trim();
      if (text) return text;
    }}
  }}
  return '';
}})({selectors})"
    ))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
