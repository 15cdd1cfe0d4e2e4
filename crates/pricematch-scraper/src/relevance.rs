//! Word-overlap relevance scoring between a search query and listing titles.
//!
//! Retailer titles often drop brand words that appear in the query ("Apple
//! iPhone 15" vs "iPhone 15 256GB"), so a title is relevant when it contains
//! a configurable fraction of the query's words rather than all of them.

use pricematch_core::Listing;

/// Default fraction of query words a title must contain.
pub const DEFAULT_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceFilter {
    threshold: f64,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl RelevanceFilter {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns `true` when at least `threshold` of the query's words appear
    /// in `title`. A query with no words matches nothing.
    #[must_use]
    pub fn is_relevant(&self, query: &str, title: &str) -> bool {
        let words = query_words(query);
        self.matches_words(&words, title)
    }

    /// Keeps the listings whose names are relevant to `query`, in order.
    #[must_use]
    pub fn retain_relevant(&self, query: &str, listings: Vec<Listing>) -> Vec<Listing> {
        let words = query_words(query);
        if words.is_empty() {
            return Vec::new();
        }
        listings
            .into_iter()
            .filter(|listing| self.matches_words(&words, &listing.name))
            .collect()
    }

    fn matches_words(&self, words: &[String], title: &str) -> bool {
        if words.is_empty() {
            return false;
        }
        let searchable = strip_non_alphanumeric(&title.to_lowercase());
        let matched = words
            .iter()
            .filter(|w| searchable.contains(w.as_str()))
            .count();

        #[allow(clippy::cast_precision_loss)]
        let ratio = matched as f64 / words.len() as f64;
        ratio >= self.threshold
    }
}

/// Lower-cased, punctuation-stripped words of `query`. Tokens with no
/// letters or digits are dropped.
#[must_use]
pub fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(strip_non_alphanumeric)
        .filter(|w| !w.is_empty())
        .collect()
}

fn strip_non_alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn listing(name: &str) -> Listing {
        Listing {
            name: name.to_string(),
            price: Decimal::ONE,
            image_url: String::new(),
            link: "https://shop.example.com/p".to_string(),
        }
    }

    #[test]
    fn four_of_five_words_is_relevant_at_default_threshold() {
        let filter = RelevanceFilter::default();
        assert!(filter.is_relevant("apple iphone 15 pro max", "iPhone 15 Pro Max 256GB"));
    }

    #[test]
    fn unrelated_title_is_not_relevant() {
        let filter = RelevanceFilter::default();
        assert!(!filter.is_relevant("apple iphone 15 pro max", "Samsung Galaxy S23"));
    }

    #[test]
    fn three_of_five_words_falls_below_threshold() {
        let filter = RelevanceFilter::default();
        assert!(!filter.is_relevant("apple iphone 15 pro max", "iPhone 15 Pro 128GB"));
    }

    #[test]
    fn punctuation_and_spacing_differences_are_ignored() {
        let filter = RelevanceFilter::default();
        assert!(filter.is_relevant("ps5 dual-sense", "PlayStation PS5 DualSense Controller"));
        assert!(filter.is_relevant("wi-fi router", "WiFi 6 Router"));
    }

    #[test]
    fn query_word_may_match_inside_a_longer_title_word() {
        let filter = RelevanceFilter::default();
        assert!(filter.is_relevant("esky", "Eskys 45L Cooler"));
    }

    #[test]
    fn empty_query_is_never_relevant() {
        let filter = RelevanceFilter::default();
        assert!(!filter.is_relevant("   ", "Anything at all"));
    }

    #[test]
    fn punctuation_only_query_is_never_relevant() {
        let filter = RelevanceFilter::default();
        assert!(query_words("!!! -- ...").is_empty());
        assert!(!filter.is_relevant("!!!", "Coleman Tent"));
        assert!(filter.retain_relevant("!!!", vec![listing("Coleman Tent")]).is_empty());
    }

    #[test]
    fn punctuation_tokens_do_not_count_as_matched_words() {
        let lenient = RelevanceFilter::new(0.5);
        assert_eq!(query_words("tent - 6p"), ["tent", "6p"]);
        assert!(!lenient.is_relevant("!! ?? tent", "Camping Chair"));
        assert!(lenient.is_relevant("!! ?? tent", "Coleman Tent"));
    }

    #[test]
    fn retain_relevant_with_empty_query_returns_nothing() {
        let filter = RelevanceFilter::default();
        let kept = filter.retain_relevant("", vec![listing("Tent"), listing("Swag")]);
        assert!(kept.is_empty());
    }

    #[test]
    fn retain_relevant_keeps_matching_listings_in_order() {
        let filter = RelevanceFilter::default();
        let kept = filter.retain_relevant(
            "coleman tent",
            vec![
                listing("Coleman Instant Tent 6P"),
                listing("Camping Chair"),
                listing("Tent Pegs by Coleman"),
            ],
        );
        let names: Vec<&str> = kept.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Coleman Instant Tent 6P", "Tent Pegs by Coleman"]);
    }

    #[test]
    fn custom_threshold_is_honoured() {
        let lenient = RelevanceFilter::new(0.5);
        assert!(lenient.is_relevant("apple iphone 15 pro max", "iPhone 15 Pro 128GB"));
        assert!((lenient.threshold() - 0.5).abs() < f64::EPSILON);
    }
}
