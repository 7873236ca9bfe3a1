//! Application state shared across handlers.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};

use crate::catalog::CatalogClient;
use crate::config::StorefrontConfig;
use crate::models::Account;
use crate::storage::LocalStore;

/// Source of the shop-local time used for store hours and order dates.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The host's local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog, the shop store, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: CatalogClient,
    store: LocalStore,
    accounts: Vec<Account>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `accounts` - Predefined accounts
    /// * `clock` - Source of shop-local time
    #[must_use]
    pub fn new(config: StorefrontConfig, accounts: Vec<Account>, clock: Arc<dyn Clock>) -> Self {
        let catalog = CatalogClient::new(config.catalog.clone(), config.catalog_cache_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                store: LocalStore::new(),
                accounts,
                clock,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the shop-wide document store.
    #[must_use]
    pub fn store(&self) -> &LocalStore {
        &self.inner.store
    }

    /// Predefined accounts.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.inner.accounts
    }

    /// Current shop-local time.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.inner.clock.now()
    }
}
