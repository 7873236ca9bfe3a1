//! Shop-wide document store.
//!
//! # Store: `LocalStore`
//!
//! Holds JSON documents by key, shared by every visitor of the shop:
//!
//! ## Documents
//!
//! - `createdAccounts` - Accounts created through registration
//! - `orders` - Placed orders, oldest first
//! - `wholesaleRequests` - Wholesale account requests
//!
//! Each document is a JSON list. Reads are lenient: a document that isn't a
//! list reads as empty and a list element that doesn't decode is skipped, both
//! with a warning. Writes read, modify and write back under one write lock.

pub mod accounts;
pub mod orders;

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;

pub use accounts::AccountRepository;
pub use orders::{OrderRepository, WholesaleRequestRepository};

/// Document keys.
pub mod keys {
    pub const CREATED_ACCOUNTS: &str = "createdAccounts";
    pub const ORDERS: &str = "orders";
    pub const WHOLESALE_REQUESTS: &str = "wholesaleRequests";
}

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A document could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The record would duplicate an existing one.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The record to update does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// In-memory JSON document store.
#[derive(Debug, Default)]
pub struct LocalStore {
    documents: RwLock<HashMap<String, String>>,
}

impl LocalStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document text, if present.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        self.documents.read().await.get(key).cloned()
    }

    /// Replace a document with raw text.
    pub async fn set_raw(&self, key: &str, text: impl Into<String>) {
        self.documents
            .write()
            .await
            .insert(key.to_string(), text.into());
    }

    /// Read a list document.
    pub async fn read_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let documents = self.documents.read().await;
        decode_list(key, documents.get(key).map(String::as_str))
    }

    /// Read, modify and write back a list document under the write lock.
    ///
    /// The document is left untouched when `update` fails.
    ///
    /// # Errors
    ///
    /// Returns the error from `update`, or `StorageError::Serialize` if the
    /// modified list can't be encoded.
    pub async fn update_list<T, R, F>(&self, key: &str, update: F) -> Result<R, StorageError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<R, StorageError>,
    {
        let mut documents = self.documents.write().await;
        let mut list = decode_list(key, documents.get(key).map(String::as_str));
        let result = update(&mut list)?;
        let text = serde_json::to_string(&list)?;
        documents.insert(key.to_string(), text);
        Ok(result)
    }
}

/// Decode a list document, skipping what doesn't decode.
fn decode_list<T: DeserializeOwned>(key: &str, text: Option<&str>) -> Vec<T> {
    let Some(text) = text else {
        return Vec::new();
    };

    let values: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable document");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}
