//! Storage collaborator consumed by the search orchestrator.

use async_trait::async_trait;
use thiserror::Error;

use crate::products::{NewProduct, StoredProduct};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository {operation} failed: {reason}")]
    Backend {
        operation: &'static str,
        reason: String,
    },
}

/// Read and write access to stored product listings.
///
/// Implementations own their transaction discipline; callers treat every
/// method as a single atomic operation.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Stored rows whose name contains `term`, case-insensitively.
    async fn search_by_name(&self, term: &str) -> Result<Vec<StoredProduct>, RepositoryError>;

    /// Inserts every row in `products`, returning how many were written.
    /// No uniqueness is enforced.
    async fn save(&self, products: &[NewProduct]) -> Result<u64, RepositoryError>;

    /// Up to `limit` distinct stored names starting with `prefix`,
    /// case-insensitively.
    async fn suggest_names(
        &self,
        prefix: &str,
        limit: usize,
    ) -> Result<Vec<String>, RepositoryError>;
}
