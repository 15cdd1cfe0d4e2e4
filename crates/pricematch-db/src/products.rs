//! Database operations for the `products` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pricematch_core::{NewProduct, Repository, RepositoryError, StoredProduct};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::DbError;

/// Rows per multi-row `INSERT`; keeps bind parameters well under the
/// Postgres limit of 65535.
const INSERT_CHUNK: usize = 1000;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub platform: String,
    pub price: Decimal,
    pub link: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for StoredProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            platform: row.platform,
            price: row.price,
            link: row.link,
            image_url: row.image_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// products operations
// ---------------------------------------------------------------------------

/// Escapes `%`, `_` and `\` so `term` matches literally inside a `LIKE`
/// pattern.
#[must_use]
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Rows whose name contains `term`, case-insensitively, ordered by platform
/// then insertion order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_products_by_name(pool: &PgPool, term: &str) -> Result<Vec<ProductRow>, DbError> {
    let pattern = format!("%{}%", escape_like(term));
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, platform, price, link, image_url, created_at, updated_at \
         FROM products \
         WHERE name ILIKE $1 \
         ORDER BY platform, id",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Inserts every product in one transaction. If any chunk fails the whole
/// batch is rolled back.
///
/// Returns the number of rows written. No uniqueness is enforced.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn insert_products(pool: &PgPool, products: &[NewProduct]) -> Result<u64, DbError> {
    if products.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for chunk in products.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO products (name, platform, price, link, image_url) ");
        builder.push_values(chunk, |mut row, product| {
            row.push_bind(&product.name)
                .push_bind(&product.platform)
                .push_bind(product.price)
                .push_bind(&product.link)
                .push_bind(&product.image_url);
        });
        written += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

/// Up to `limit` distinct names starting with `prefix`, case-insensitively,
/// in alphabetical order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn suggest_product_names(
    pool: &PgPool,
    prefix: &str,
    limit: usize,
) -> Result<Vec<String>, DbError> {
    let pattern = format!("{}%", escape_like(prefix));
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let names = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT name FROM products \
         WHERE name ILIKE $1 \
         ORDER BY name \
         LIMIT $2",
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(names)
}

// ---------------------------------------------------------------------------
// Repository implementation
// ---------------------------------------------------------------------------

/// Postgres-backed [`Repository`].
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn backend(operation: &'static str) -> impl FnOnce(DbError) -> RepositoryError {
    move |e| RepositoryError::Backend {
        operation,
        reason: e.to_string(),
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn search_by_name(&self, term: &str) -> Result<Vec<StoredProduct>, RepositoryError> {
        let rows = search_products_by_name(&self.pool, term)
            .await
            .map_err(backend("search_by_name"))?;
        Ok(rows.into_iter().map(StoredProduct::from).collect())
    }

    async fn save(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        let written = insert_products(&self.pool, products)
            .await
            .map_err(backend("save"))?;
        tracing::debug!(written, "products inserted");
        Ok(written)
    }

    async fn suggest_names(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError> {
        suggest_product_names(&self.pool, prefix, limit)
            .await
            .map_err(backend("suggest_names"))
    }
}
