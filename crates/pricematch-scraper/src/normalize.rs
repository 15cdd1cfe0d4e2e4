//! Parsing of visible retailer price text into a decimal value.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::ScraperError;

/// Currency and marketing tokens removed before digit filtering.
const STRIP_TOKENS: [&str; 5] = ["au$", "a$", "aud", "from", "rrp"];

/// Parses price text such as `"AU$1,299.00"` or `"From $49.95"`.
///
/// Keeps only digits and `.` (thousands separators drop out) and parses the
/// remainder without rounding, preserving the retailer's displayed precision.
///
/// # Errors
///
/// Returns [`ScraperError::MalformedPrice`] when nothing numeric remains or
/// the remainder is not a valid decimal (e.g. `"1.299.00"`).
pub fn normalize_price(text: &str) -> Result<Decimal, ScraperError> {
    let mut cleaned = text.to_lowercase();
    for token in STRIP_TOKENS {
        cleaned = cleaned.replace(token, "");
    }

    let digits: String = cleaned
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return Err(malformed(text));
    }

    Decimal::from_str(&digits).map_err(|_| malformed(text))
}

fn malformed(text: &str) -> ScraperError {
    ScraperError::MalformedPrice {
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn strips_currency_prefix_and_thousands_separator() {
        assert_eq!(normalize_price("AU$1,299.00").unwrap(), dec("1299.00"));
    }

    #[test]
    fn strips_from_marker() {
        assert_eq!(normalize_price("From $49.95").unwrap(), dec("49.95"));
    }

    #[test]
    fn preserves_displayed_precision() {
        let price = normalize_price("$19.90").unwrap();
        assert_eq!(price.scale(), 2);
        assert_eq!(price.to_string(), "19.90");
    }

    #[test]
    fn handles_whitespace_and_newlines_between_parts() {
        assert_eq!(normalize_price("$\n 1 299\n.95").unwrap(), dec("1299.95"));
    }

    #[test]
    fn whole_dollar_price_parses() {
        assert_eq!(normalize_price("A$ 79").unwrap(), dec("79"));
    }

    #[test]
    fn empty_text_is_malformed() {
        assert!(matches!(
            normalize_price(""),
            Err(ScraperError::MalformedPrice { .. })
        ));
    }

    #[test]
    fn free_is_malformed() {
        let err = normalize_price("Free").unwrap_err();
        assert!(
            matches!(err, ScraperError::MalformedPrice { ref text } if text == "Free"),
            "got: {err:?}"
        );
    }

    #[test]
    fn multiple_decimal_points_are_malformed() {
        assert!(matches!(
            normalize_price("$1.299.00"),
            Err(ScraperError::MalformedPrice { .. })
        ));
    }

    #[test]
    fn bare_separator_is_malformed() {
        assert!(matches!(
            normalize_price(","),
            Err(ScraperError::MalformedPrice { .. })
        ));
    }

    #[test]
    fn zero_price_parses_so_the_caller_can_reject_it() {
        assert_eq!(normalize_price("$0.00").unwrap(), Decimal::ZERO);
    }
}
