//! Client Directory Adapter
//!
//! Memory-backed implementation of the `ClientDirectory` port.

use crate::domain::{Client, RaffleError};
use crate::ports::outbound::ClientDirectory;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory client registry keyed by tax id.
#[derive(Clone, Default)]
pub struct InMemoryClientDirectory {
    clients: Arc<RwLock<HashMap<String, Vec<Client>>>>,
}

impl InMemoryClientDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory pre-populated with clients.
    pub fn with_clients(clients: &[Client]) -> Self {
        let directory = Self::new();
        for client in clients {
            directory.insert(client.clone());
        }
        directory
    }

    /// Register a client.
    pub fn insert(&self, client: Client) {
        self.clients
            .write()
            .entry(client.tax_id.clone())
            .or_default()
            .push(client);
    }
}

#[async_trait]
impl ClientDirectory for InMemoryClientDirectory {
    async fn find_by_tax_id(&self, tax_id: &str) -> Result<Vec<Client>, RaffleError> {
        Ok(self
            .clients
            .read()
            .get(tax_id)
            .cloned()
            .unwrap_or_default())
    }
}
