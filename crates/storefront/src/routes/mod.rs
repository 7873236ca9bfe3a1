//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page (grouped products, search, highlight)
//! GET  /store/status            - Open/closed fragment (HTMX)
//! GET  /health                  - Health check
//!
//! # Products
//! GET  /products/{id}           - Product detail
//! POST /products/{id}           - Add with options, inflation and quantity
//! GET  /products/{id}/image     - Image fragment for the selected color (HTMX)
//!
//! # Wholesale catalog
//! GET  /catalog                 - Filter, sort and search (wholesale only)
//! POST /catalog/add             - Quick add at the minimum quantity
//! GET  /catalog/view/{id}       - Highlight a product on the home page
//! GET  /catalog/download        - Plain-text price list
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update             - Change a quantity (returns cart_items fragment)
//! POST /cart/remove             - Remove a line (returns cart_items fragment)
//! GET  /cart/count              - Cart count badge (fragment)
//! POST /cart/checkout           - Check the cart and continue to checkout
//!
//! # Checkout
//! GET  /checkout                - Checkout form
//! POST /checkout                - Place the order
//! GET  /checkout/slots          - Pickup time slots for a date (fragment)
//! GET  /order-confirmation      - Placed order summary
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! POST /logout                  - Logout action
//! POST /forgot-password         - Username check
//! GET  /register                - Register page
//! POST /register                - Register action
//! GET  /password-strength       - Strength meter fragment (HTMX)
//! GET  /wholesale-request       - Wholesale account request form
//! POST /wholesale-request       - Submit a wholesale account request
//!
//! # Account (requires login)
//! GET  /account                 - Account info and order history
//! POST /account/password        - Change password
//!
//! # Admin (requires an admin login)
//! GET  /admin                   - Orders and wholesale requests
//! GET  /admin/orders.csv        - Order export
//! POST /admin/catalog/refresh   - Reload the catalog document
//!
//! # Contact
//! GET  /contact                 - Contact page
//! POST /contact                 - Send a message
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod page;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/password-strength", get(auth::password_strength_meter))
        .route(
            "/wholesale-request",
            get(auth::wholesale_request_page).post(auth::wholesale_request),
        )
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(products::show).post(products::add))
        .route("/{id}/image", get(products::image))
}

/// Create the wholesale catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/add", post(catalog::quick_add))
        .route("/view/{id}", get(catalog::view_in_shop))
        .route("/download", get(catalog::download))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
        .route("/checkout", post(cart::checkout))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::submit))
        .route("/slots", get(checkout::slots))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/password", post(account::change_password))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::index))
        .route("/orders.csv", get(admin::export_csv))
        .route("/catalog/refresh", post(admin::refresh_catalog))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/store/status", get(home::store_status))
        .nest("/products", product_routes())
        .nest("/catalog", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .route("/order-confirmation", get(checkout::confirmation))
        .nest("/account", account_routes())
        .nest("/admin", admin_routes())
        .route("/contact", get(contact::show).post(contact::submit))
        .merge(auth_routes())
}
