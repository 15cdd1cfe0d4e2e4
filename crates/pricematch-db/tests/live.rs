//! Live integration tests for pricematch-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. Run with `DATABASE_URL` set and `--ignored`.

use pricematch_core::{NewProduct, Repository};
use pricematch_db::products::{insert_products, search_products_by_name, suggest_product_names};
use pricematch_db::{health_check, PgRepository};
use rust_decimal::Decimal;

fn product(platform: &str, name: &str, cents: i64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        platform: platform.to_string(),
        price: Decimal::new(cents, 2),
        link: format!("https://shop.example.com/p/{}", name.replace(' ', "-")),
        image_url: String::new(),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn health_check_passes_on_fresh_database(pool: sqlx::PgPool) {
    health_check(&pool).await.expect("health check failed");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn search_is_case_insensitive_substring_ordered_by_platform(pool: sqlx::PgPool) {
    insert_products(
        &pool,
        &[
            product("JB Hi-Fi", "Apple MacBook Air", 179_900),
            product("Big W", "MacBook Pro Sleeve", 3_900),
            product("JB Hi-Fi", "iPad Air", 89_900),
        ],
    )
    .await
    .expect("insert failed");

    let rows = search_products_by_name(&pool, "macbook").await.expect("search failed");

    let found: Vec<(&str, &str)> = rows
        .iter()
        .map(|r| (r.platform.as_str(), r.name.as_str()))
        .collect();
    assert_eq!(
        found,
        [("Big W", "MacBook Pro Sleeve"), ("JB Hi-Fi", "Apple MacBook Air")]
    );
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn like_wildcards_in_term_match_literally(pool: sqlx::PgPool) {
    insert_products(
        &pool,
        &[product("BCF", "Esky 100% Cooler", 9_900), product("BCF", "Esky 1000 Cooler", 12_900)],
    )
    .await
    .expect("insert failed");

    let rows = search_products_by_name(&pool, "100%").await.expect("search failed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Esky 100% Cooler");
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn saving_the_same_listing_twice_stores_two_rows(pool: sqlx::PgPool) {
    let repo = PgRepository::new(pool);
    let batch = [product("BCF", "Coleman Tent", 19_999)];

    assert_eq!(repo.save(&batch).await.expect("first save"), 1);
    assert_eq!(repo.save(&batch).await.expect("second save"), 1);

    let stored = repo.search_by_name("coleman").await.expect("search failed");
    assert_eq!(stored.len(), 2);
    assert_ne!(stored[0].id, stored[1].id);
    assert_eq!(stored[0].price, Decimal::new(19_999, 2));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn non_positive_price_is_rejected_and_batch_rolled_back(pool: sqlx::PgPool) {
    let result = insert_products(
        &pool,
        &[product("BCF", "Good Tent", 9_900), product("BCF", "Free Tent", 0)],
    )
    .await;
    assert!(result.is_err());

    let rows = search_products_by_name(&pool, "tent").await.expect("search failed");
    assert!(rows.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn suggestions_are_distinct_prefix_matches_capped_by_limit(pool: sqlx::PgPool) {
    insert_products(
        &pool,
        &[
            product("BCF", "Tent Pegs", 900),
            product("Anaconda", "Tent Pegs", 850),
            product("BCF", "tent light", 2_500),
            product("BCF", "Tarp", 3_000),
            product("BCF", "Swag Tent", 19_900),
        ],
    )
    .await
    .expect("insert failed");

    let names = suggest_product_names(&pool, "TE", 10).await.expect("suggest failed");
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Tent Pegs".to_string()));
    assert!(names.contains(&"tent light".to_string()));

    let capped = suggest_product_names(&pool, "t", 1).await.expect("suggest failed");
    assert_eq!(capped.len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn prices_keep_their_scraped_precision(pool: sqlx::PgPool) {
    let mut three_places = product("Amazon AU", "Tent Peg Single", 0);
    three_places.price = Decimal::new(1_995, 3);
    let mut fraction = product("Amazon AU", "Tent Guy Rope Clip", 0);
    fraction.price = Decimal::new(4, 3);

    let written = insert_products(&pool, &[three_places, fraction])
        .await
        .expect("sub-cent prices should be accepted");
    assert_eq!(written, 2);

    let rows = search_products_by_name(&pool, "tent").await.expect("search failed");
    let mut prices: Vec<String> = rows.iter().map(|r| r.price.to_string()).collect();
    prices.sort();
    assert_eq!(prices, ["0.004", "1.995"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn very_large_price_does_not_sink_the_batch(pool: sqlx::PgPool) {
    let mut huge = product("Big W", "Tent Bundle Misprint", 0);
    huge.price = Decimal::new(10_012_991_199, 0);
    let batch = [product("BCF", "Coleman Tent", 19_900), huge];

    let written = insert_products(&pool, &batch).await.expect("insert failed");
    assert_eq!(written, 2);

    let rows = search_products_by_name(&pool, "tent").await.expect("search failed");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().any(|r| r.price == Decimal::new(10_012_991_199, 0)));
}
