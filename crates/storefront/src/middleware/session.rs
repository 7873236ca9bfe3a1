//! Session middleware configuration and session helpers.
//!
//! Sets up in-memory sessions using tower-sessions. A visitor's cart, login,
//! checkout prefill and flashed notice live in their session and are gone
//! when it expires.

use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use balloon_fiesta_core::ProductId;
use balloon_fiesta_core::cart::Cart;
use balloon_fiesta_core::checkout::CheckoutPrefill;

use crate::config::StorefrontConfig;
use crate::models::{Notice, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    let store = MemoryStore::default();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The visitor's cart. Missing or unreadable carts are empty.
pub async fn get_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Save the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_cart(session: &Session, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CART, cart).await
}

/// Flash a notice for the next rendered page.
///
/// Failures are logged; a lost notice never fails the request.
pub async fn set_notice(session: &Session, notice: Notice) {
    if let Err(e) = session.insert(session_keys::NOTICE, notice).await {
        tracing::error!("Failed to save notice to session: {e}");
    }
}

/// Take the flashed notice, clearing it.
pub async fn take_notice(session: &Session) -> Option<Notice> {
    session
        .remove::<Notice>(session_keys::NOTICE)
        .await
        .ok()
        .flatten()
}

/// Contact details carried from the cart to checkout.
pub async fn get_prefill(session: &Session) -> Option<CheckoutPrefill> {
    session
        .get::<CheckoutPrefill>(session_keys::CHECKOUT_PREFILL)
        .await
        .ok()
        .flatten()
}

/// Save the checkout prefill.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_prefill(
    session: &Session,
    prefill: &CheckoutPrefill,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CHECKOUT_PREFILL, prefill).await
}

/// Drop the checkout prefill.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_prefill(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CheckoutPrefill>(session_keys::CHECKOUT_PREFILL)
        .await?;
    Ok(())
}

/// Remember a product to highlight on the home page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_highlight(session: &Session, id: ProductId) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::HIGHLIGHT_PRODUCT, id).await
}

/// Take the product to highlight, clearing it.
pub async fn take_highlight(session: &Session) -> Option<ProductId> {
    session
        .remove::<ProductId>(session_keys::HIGHLIGHT_PRODUCT)
        .await
        .ok()
        .flatten()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::NoticeKind;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_notice_is_taken_once() {
        let session = session();
        set_notice(&session, Notice::success("Saved")).await;

        let notice = take_notice(&session).await.unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "Saved");
        assert!(take_notice(&session).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_cart_is_empty() {
        let session = session();
        assert!(get_cart(&session).await.is_empty());

        session.insert(session_keys::CART, "garbage").await.unwrap();
        assert!(get_cart(&session).await.is_empty());
    }

    #[tokio::test]
    async fn test_highlight_is_taken_once() {
        let session = session();
        set_highlight(&session, ProductId::new(7)).await.unwrap();
        assert_eq!(take_highlight(&session).await, Some(ProductId::new(7)));
        assert_eq!(take_highlight(&session).await, None);
    }
}
