//! Extractors for the logged-in shopper.
//!
//! The shopper lives in the session under `session_keys::SHOPPER`, written
//! by [`set_shopper`] on login and removed by [`clear_shopper`] on logout.

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use balloon_fiesta_core::AccountType;

use crate::models::{Shopper, session_keys};

const LOGIN_PATH: &str = "/login";

async fn session_shopper(parts: &Parts) -> Option<Shopper> {
    let session = parts.extensions.get::<Session>()?;
    session.get(session_keys::SHOPPER).await.ok().flatten()
}

/// A logged-in shopper, or a trip to the login page.
pub struct RequireLogin(pub Shopper);

/// Sends anonymous visitors to the login page. HTMX requests get an
/// `HX-Redirect` so the whole page navigates instead of a fragment swap.
pub struct LoginRedirect {
    htmx: bool,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        if self.htmx {
            [("HX-Redirect", HeaderValue::from_static(LOGIN_PATH))].into_response()
        } else {
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

impl<S> FromRequestParts<S> for RequireLogin
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_shopper(parts).await {
            Some(shopper) => Ok(Self(shopper)),
            None => Err(LoginRedirect {
                htmx: parts.headers.contains_key("hx-request"),
            }),
        }
    }
}

/// Whoever is browsing, logged in or not.
pub struct Visitor(pub Option<Shopper>);

impl Visitor {
    /// Account type used for prices and visibility. Anonymous visitors shop retail.
    #[must_use]
    pub fn account_type(&self) -> AccountType {
        self.0.as_ref().map(|s| s.account_type).unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_shopper(parts).await))
    }
}

/// Record the logged-in shopper.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_shopper(session: &Session, shopper: &Shopper) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::SHOPPER, shopper).await
}

/// Log the shopper out.
///
/// Clears the login, the cart, and the checkout prefill. The shop's orders
/// and accounts are untouched.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_shopper(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove_value(session_keys::SHOPPER).await?;
    session.remove_value(session_keys::CART).await?;
    session.remove_value(session_keys::CHECKOUT_PREFILL).await?;
    Ok(())
}
