//! Human-readable rendering of command results.

use std::fmt::Write as _;

use pricematch_core::platforms::platform_key;
use pricematch_core::{PlatformResult, PlatformsFile};

/// One block per platform, listings cheapest first.
pub(crate) fn format_results(results: &[PlatformResult]) -> String {
    if results.is_empty() {
        return "no listings found\n".to_string();
    }

    let mut out = String::new();
    for result in results {
        let _ = writeln!(out, "{} ({} listings)", result.platform, result.listings.len());
        let mut listings: Vec<_> = result.listings.iter().collect();
        listings.sort_by(|a, b| a.price.cmp(&b.price));
        for listing in listings {
            let _ = writeln!(out, "  ${:>10}  {}", listing.price, listing.name);
            let _ = writeln!(out, "               {}", listing.link);
        }
    }
    out
}

/// The platforms routed for `category`, marking entries with no profile.
pub(crate) fn format_route(file: &PlatformsFile, category: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "category: {category}");
    for name in file.categories.platforms_for(category) {
        let key = platform_key(name);
        let profile = file.platforms.iter().find(|p| platform_key(&p.name) == key);
        match profile {
            Some(p) if p.deep_price => {
                let _ = writeln!(out, "  {name}  (shadow-DOM prices)");
            }
            Some(_) => {
                let _ = writeln!(out, "  {name}");
            }
            None => {
                let _ = writeln!(out, "  {name}  (no profile configured, skipped)");
            }
        }
    }
    let categories: Vec<&str> = file.categories.categories().collect();
    let _ = writeln!(out, "known categories: {}", categories.join(", "));
    out
}
