//! Integration tests for Balloon Fiesta.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p balloon-fiesta-integration-tests
//! ```
//!
//! Tests drive the full storefront router in-process with `tower::ServiceExt::oneshot`.
//! The catalog is held inline, the clock is fixed to Monday 2026-01-05 10:00
//! (store open), and each [`Client`] carries its own session cookie.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc, clippy::must_use_candidate)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use chrono::NaiveDateTime;
use tower::ServiceExt;

use balloon_fiesta_core::{AccountType, Email};
use balloon_fiesta_storefront::config::{CatalogSource, StorefrontConfig};
use balloon_fiesta_storefront::create_router;
use balloon_fiesta_storefront::middleware::session::SESSION_COOKIE_NAME;
use balloon_fiesta_storefront::models::Account;
use balloon_fiesta_storefront::services::auth::hash_password;
use balloon_fiesta_storefront::state::{AppState, FixedClock};

/// Password shared by the predefined test accounts.
pub const PASSWORD: &str = "Balloons!2026";

/// A small catalog: a foil balloon with a wholesale minimum, a latex pack
/// hidden from retail, and a product with color options.
pub const CATALOG: &str = r#"[{
    "settings": {"wholesaleSettings": {"defaultMinimumOrder": 5}},
    "products": [
        {
            "id": 1,
            "name": "Red Heart",
            "category": "Foil Balloons",
            "description": "A shiny red heart",
            "pricing": {"retail": 4, "wholesale": 2},
            "minimumOrderQuantity": 10,
            "stock": 40
        },
        {
            "id": 2,
            "name": "Bulk Latex Pack",
            "category": "Latex Balloons",
            "pricing": {"retail": 10, "wholesale": 6},
            "showInRetail": false
        },
        {
            "id": 3,
            "name": "Number Balloon",
            "category": "Number Balloons",
            "pricing": {"retail": 7, "wholesale": 4},
            "options": {"colors": ["Gold", "Silver"], "numbers": ["1", "2"]}
        }
    ]
}]"#;

/// Monday 2026-01-05 10:00, shop-local.
#[must_use]
pub fn monday_morning() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2026-01-05 10:00", "%Y-%m-%d %H:%M").unwrap()
}

fn account(username: &str, account_type: AccountType) -> Account {
    Account {
        username: username.to_string(),
        password_hash: hash_password(PASSWORD).unwrap(),
        account_type,
        email: Email::parse(&format!("{username}@example.com")).unwrap(),
        phone: None,
        created_at: None,
    }
}

/// The storefront under test.
pub struct TestApp {
    router: Router,
}

impl TestApp {
    /// Storefront with the test catalog and a wholesale (`partyco`) and an
    /// admin (`admin`) account.
    pub fn new() -> Self {
        Self::with_catalog(CATALOG)
    }

    pub fn with_catalog(document: &str) -> Self {
        let config = StorefrontConfig {
            catalog: CatalogSource::Inline(document.to_string()),
            ..StorefrontConfig::default()
        };
        let accounts = vec![
            account("partyco", AccountType::Wholesale),
            account("admin", AccountType::Admin),
        ];
        let state = AppState::new(config, accounts, Arc::new(FixedClock(monday_morning())));

        Self {
            router: create_router(state),
        }
    }

    /// A visitor with a fresh session.
    pub fn client(&self) -> Client {
        Client {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Redirect target, if any.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location(), Some(to));
    }
}

/// One visitor: sends requests and keeps the session cookie between them.
pub struct Client {
    router: Router,
    cookie: Option<String>,
}

impl Client {
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri);
        self.send(request, Body::empty()).await
    }

    /// GET with the `HX-Request` header set.
    pub async fn htmx_get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri).header("hx-request", "true");
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(encode(fields))).await
    }

    /// Form POST with the `HX-Request` header set.
    pub async fn htmx_post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        self.send(request, Body::from(encode(fields))).await
    }

    /// Log in, asserting success.
    pub async fn login(&mut self, username: &str, password: &str) {
        let response = self
            .post_form("/login", &[("username", username), ("password", password)])
            .await;
        response.assert_redirect("/");
    }

    /// Register a retail account and log in with it.
    pub async fn register_and_login(&mut self, username: &str) {
        let email = format!("{username}@example.com");
        let response = self
            .post_form(
                "/register",
                &[
                    ("username", username),
                    ("password", PASSWORD),
                    ("confirm_password", PASSWORD),
                    ("email", &email),
                    ("phone", "555-123-4567"),
                ],
            )
            .await;
        response.assert_redirect("/login");
        self.login(username, PASSWORD).await;
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            if pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")) {
                self.cookie = Some(pair.to_string());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

fn encode(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}
