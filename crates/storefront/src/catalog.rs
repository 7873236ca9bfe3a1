//! Catalog document client.
//!
//! Loads the shop's `web.json` from disk, over HTTP, or from memory and caches
//! the parsed catalog using `moka` (5-minute TTL by default). Failed loads are
//! not cached, so the next request tries again.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::{debug, instrument};

use balloon_fiesta_core::catalog::{Catalog, CatalogError};

use crate::config::CatalogSource;

/// Message shown to shoppers when the catalog can't be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Error loading products. Please refresh the page.";

/// Errors that can occur while fetching the catalog document.
#[derive(Debug, Error)]
pub enum CatalogFetchError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog request returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Parse(#[from] CatalogError),
}

/// Client for the catalog document.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    source: CatalogSource,
    cache: Cache<(), Arc<Catalog>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    #[must_use]
    pub fn new(source: CatalogSource, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                source,
                cache,
            }),
        }
    }

    /// Where the catalog comes from.
    #[must_use]
    pub fn source(&self) -> &CatalogSource {
        &self.inner.source
    }

    /// Get the catalog, fetching it if the cached copy has expired.
    ///
    /// # Errors
    ///
    /// Returns the fetch or parse error. The error is shared with any
    /// concurrent callers waiting on the same fetch.
    pub async fn try_load(&self) -> Result<Arc<Catalog>, Arc<CatalogFetchError>> {
        self.inner
            .cache
            .try_get_with((), async { self.fetch().await.map(Arc::new) })
            .await
    }

    /// Get the catalog, or an empty one with default settings if it can't be loaded.
    pub async fn load(&self) -> Arc<Catalog> {
        match self.try_load().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(source = %self.inner.source, error = %e, "Failed to load catalog");
                Arc::new(Catalog::default())
            }
        }
    }

    /// Drop the cached catalog.
    pub async fn invalidate(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    #[instrument(skip(self), fields(source = %self.inner.source))]
    async fn fetch(&self) -> Result<Catalog, CatalogFetchError> {
        let text = match &self.inner.source {
            CatalogSource::File(path) => tokio::fs::read_to_string(path).await?,
            CatalogSource::Url(url) => {
                let response = self.inner.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    tracing::error!(status = %status, "Catalog request returned non-success status");
                    return Err(CatalogFetchError::Status(status));
                }
                response.text().await?
            }
            CatalogSource::Inline(text) => text.clone(),
        };

        let load = Catalog::from_json(&text)?;
        for warning in &load.warnings {
            tracing::warn!(index = ?warning.index, "{}", warning.message);
        }
        debug!(products = load.catalog.products().len(), "Catalog loaded");

        Ok(load.catalog)
    }
}
