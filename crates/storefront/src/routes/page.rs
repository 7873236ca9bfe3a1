//! Layout data shared by every full page.

use std::sync::Arc;

use axum::http::HeaderMap;
use tower_sessions::Session;

use balloon_fiesta_core::AccountType;
use balloon_fiesta_core::catalog::Catalog;
use balloon_fiesta_core::hours::{self, StoreStatus};

use crate::catalog::LOAD_FAILED_MESSAGE;
use crate::middleware::Visitor;
use crate::middleware::session::{get_cart, set_notice, take_notice};
use crate::models::{Notice, Shopper};
use crate::state::AppState;

/// What the layout needs: who is logged in, the cart badge, the store status
/// line, and the flashed notice.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub shopper: Option<Shopper>,
    pub cart_count: u32,
    pub store: StoreStatus,
    pub notice: Option<Notice>,
}

impl PageContext {
    /// Build the context, consuming the flashed notice.
    pub async fn build(state: &AppState, session: &Session, visitor: &Visitor) -> Self {
        Self {
            shopper: visitor.0.clone(),
            cart_count: get_cart(session).await.count(),
            store: hours::status(state.now()),
            notice: take_notice(session).await,
        }
    }

    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.shopper.is_some()
    }

    #[must_use]
    pub fn username(&self) -> &str {
        self.shopper.as_ref().map_or("", |s| s.username.as_str())
    }

    #[must_use]
    pub fn account_type(&self) -> AccountType {
        self.shopper.as_ref().map(|s| s.account_type).unwrap_or_default()
    }

    #[must_use]
    pub fn account_label(&self) -> &'static str {
        self.account_type().label()
    }

    /// Badge CSS modifier: `retail`, `wholesale` or `admin`.
    #[must_use]
    pub fn account_class(&self) -> String {
        self.account_type().to_string()
    }

    #[must_use]
    pub fn is_wholesale(&self) -> bool {
        self.account_type().is_wholesale()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.account_type().is_admin()
    }

    #[must_use]
    pub const fn store_open(&self) -> bool {
        self.store.is_open()
    }

    #[must_use]
    pub fn store_message(&self) -> String {
        self.store.message()
    }

    #[must_use]
    pub const fn hours_summary(&self) -> &'static str {
        hours::WEEKLY_SUMMARY
    }
}

/// Load the catalog for a page, flashing an error notice if it is unavailable.
pub async fn load_catalog(state: &AppState, session: &Session) -> Arc<Catalog> {
    match state.catalog().try_load().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::error!(source = %state.catalog().source(), error = %e, "Failed to load catalog");
            set_notice(session, Notice::error(LOAD_FAILED_MESSAGE)).await;
            Arc::new(Catalog::default())
        }
    }
}

/// Whether the request came from HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}
