use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product/price record scraped from one retailer's search page.
///
/// Produced once per scrape and never mutated afterwards. `link` is always
/// absolute: relative hrefs are resolved against the search page URL at
/// extraction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    pub link: String,
}

impl Listing {
    /// A listing is kept only with a non-empty name and a positive price.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && self.price > Decimal::ZERO
    }
}

/// All listings found for one retailer in one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformResult {
    pub platform: String,
    pub listings: Vec<Listing>,
}

impl PlatformResult {
    /// Groups stored rows by platform, preserving the order in which each
    /// platform first appears.
    #[must_use]
    pub fn group_stored(rows: Vec<StoredProduct>) -> Vec<PlatformResult> {
        let mut grouped: Vec<PlatformResult> = Vec::new();
        for row in rows {
            let listing = row.to_listing();
            match grouped.iter_mut().find(|g| g.platform == row.platform) {
                Some(group) => group.listings.push(listing),
                None => grouped.push(PlatformResult {
                    platform: row.platform,
                    listings: vec![listing],
                }),
            }
        }
        grouped
    }

    /// Flattens scrape results into rows ready for insertion.
    #[must_use]
    pub fn to_new_products(results: &[PlatformResult]) -> Vec<NewProduct> {
        results
            .iter()
            .flat_map(|result| {
                result
                    .listings
                    .iter()
                    .map(|listing| NewProduct::from_listing(&result.platform, listing))
            })
            .collect()
    }

    #[must_use]
    pub fn listing_count(results: &[PlatformResult]) -> usize {
        results.iter().map(|r| r.listings.len()).sum()
    }
}

/// A persisted product row.
///
/// `name` carries a non-unique index; the same listing saved twice produces
/// two rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProduct {
    pub id: i64,
    pub name: String,
    pub platform: String,
    pub price: Decimal,
    pub link: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredProduct {
    #[must_use]
    pub fn to_listing(&self) -> Listing {
        Listing {
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
            link: self.link.clone(),
        }
    }
}

/// A product row awaiting insertion; ids and timestamps are assigned by the
/// repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub platform: String,
    pub price: Decimal,
    pub link: String,
    pub image_url: String,
}

impl NewProduct {
    #[must_use]
    pub fn from_listing(platform: &str, listing: &Listing) -> Self {
        Self {
            name: listing.name.clone(),
            platform: platform.to_string(),
            price: listing.price,
            link: listing.link.clone(),
            image_url: listing.image_url.clone(),
        }
    }
}
