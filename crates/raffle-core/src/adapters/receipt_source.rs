//! Receipt Source Adapter
//!
//! Tabular implementation of the `ReceiptSource` port. In production this
//! would run parameterized queries against the retail back office; here the
//! table is held in memory. Connections are modeled as semaphore permits:
//! a session owns one permit and returns it to the pool when dropped, so
//! the release happens on every exit path.

use crate::domain::{RaffleError, Receipt, ReceiptQuery};
use crate::ports::outbound::{ReceiptSession, ReceiptSource};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// One row of the upstream receipt table. The number and series columns
/// are query criteria only; they are not part of the returned [`Receipt`].
#[derive(Clone, Debug)]
pub struct ReceiptRow {
    /// Receipt number.
    pub number: u32,
    /// Receipt series.
    pub series: u32,
    /// The fields the lookup returns.
    pub receipt: Receipt,
}

/// Memory-backed tabular receipt source with a bounded connection pool.
#[derive(Clone)]
pub struct TabularReceiptSource {
    rows: Arc<Vec<ReceiptRow>>,
    pool: Arc<Semaphore>,
    fail_queries: bool,
}

impl TabularReceiptSource {
    /// Create a source over fixture rows with `pool_size` connections.
    pub fn new(rows: Vec<ReceiptRow>, pool_size: usize) -> Self {
        Self {
            rows: Arc::new(rows),
            pool: Arc::new(Semaphore::new(pool_size)),
            fail_queries: false,
        }
    }

    /// Make every query fail, simulating an unreachable back office.
    pub fn with_failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    /// Connections currently free in the pool.
    pub fn available_connections(&self) -> usize {
        self.pool.available_permits()
    }
}

#[async_trait]
impl ReceiptSource for TabularReceiptSource {
    async fn acquire(&self) -> Result<Box<dyn ReceiptSession>, RaffleError> {
        let permit = Arc::clone(&self.pool)
            .acquire_owned()
            .await
            .map_err(|_| RaffleError::LookupFailure("receipt connection pool closed".into()))?;
        debug!("[raffle] receipt session opened");

        Ok(Box::new(TabularSession {
            rows: Arc::clone(&self.rows),
            fail_queries: self.fail_queries,
            _permit: permit,
        }))
    }
}

struct TabularSession {
    rows: Arc<Vec<ReceiptRow>>,
    fail_queries: bool,
    // Held for the session's lifetime; dropping the session frees the
    // connection no matter how the lookup ended.
    _permit: OwnedSemaphorePermit,
}

impl TabularSession {
    fn row_matches(row: &ReceiptRow, query: &ReceiptQuery) -> bool {
        query
            .key
            .as_ref()
            .map_or(true, |key| row.receipt.receipt_key == *key)
            && query.number.map_or(true, |number| row.number == number)
            && query.series.map_or(true, |series| row.series == series)
    }
}

#[async_trait]
impl ReceiptSession for TabularSession {
    async fn fetch(
        &mut self,
        query: &ReceiptQuery,
        max_rows: usize,
    ) -> Result<Vec<Receipt>, RaffleError> {
        if self.fail_queries {
            return Err(RaffleError::LookupFailure(
                "receipt source unreachable".into(),
            ));
        }

        Ok(self
            .rows
            .iter()
            .filter(|row| Self::row_matches(row, query))
            .take(max_rows)
            .map(|row| row.receipt.clone())
            .collect())
    }
}
