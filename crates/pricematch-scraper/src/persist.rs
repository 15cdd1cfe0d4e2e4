//! Write-behind persistence of freshly scraped listings.
//!
//! The search path hands batches to a [`PersistQueue`] and never waits for
//! the database. Failures are logged by the worker and go no further.

use std::sync::Arc;

use pricematch_core::{NewProduct, Repository};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ScraperError;

/// Accepts batches for persistence without blocking.
pub trait PersistQueue: Send + Sync {
    fn enqueue(&self, products: Vec<NewProduct>);
}

/// Sends batches to the worker started by [`spawn_persist_worker`].
#[derive(Debug, Clone)]
pub struct ChannelPersist {
    tx: mpsc::UnboundedSender<Vec<NewProduct>>,
}

impl PersistQueue for ChannelPersist {
    fn enqueue(&self, products: Vec<NewProduct>) {
        if products.is_empty() {
            return;
        }
        let count = products.len();
        if self.tx.send(products).is_err() {
            tracing::warn!(count, "persistence worker has stopped; dropping batch");
        }
    }
}

/// Starts the worker that drains queued batches into `repository`.
///
/// The worker exits once every [`ChannelPersist`] clone has been dropped and
/// the queue is empty, so awaiting the handle flushes pending writes.
pub fn spawn_persist_worker(repository: Arc<dyn Repository>) -> (ChannelPersist, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<NewProduct>>();

    let handle = tokio::spawn(async move {
        while let Some(batch) = rx.recv().await {
            let count = batch.len();
            match repository.save(&batch).await {
                Ok(saved) => tracing::debug!(count, saved, "persisted scraped listings"),
                Err(e) => {
                    let err = ScraperError::PersistenceFailure(e);
                    tracing::warn!(count, error = %err, "dropping scraped listings");
                }
            }
        }
    });

    (ChannelPersist { tx }, handle)
}
