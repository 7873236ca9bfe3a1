//! Wholesale catalog, admin pages, and account management.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use balloon_fiesta_integration_tests::{Client, PASSWORD, TestApp};

async fn place_wholesale_order(client: &mut Client) {
    client.login("partyco", PASSWORD).await;
    client.post_form("/products/1", &[("quantity", "12")]).await;
    client.post_form("/cart/checkout", &[]).await.assert_redirect("/checkout");
    let response = client
        .post_form(
            "/checkout",
            &[
                ("name", "Party Co"),
                ("email", "orders@partyco.example"),
                ("address", "1 Warehouse Rd"),
                ("phone", "555-987-6543"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER, "body: {}", response.body);
}

// =============================================================================
// Wholesale catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_lists_wholesale_products() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("partyco", PASSWORD).await;

    let response = client.get("/catalog").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Bulk Latex Pack"));
    assert!(response.body.contains("$6.00"));
}

#[tokio::test]
async fn test_catalog_filters_by_search() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("partyco", PASSWORD).await;

    let response = client.get("/catalog?q=latex").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Bulk Latex Pack"));
    assert!(response.body.contains("href=\"/catalog/view/2\""));
    assert!(!response.body.contains("href=\"/catalog/view/3\""));
    assert!(!response.body.contains("href=\"/catalog/view/1\""));
}

#[tokio::test]
async fn test_catalog_restricted_for_retail() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    let response = client.get("/catalog").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body.contains("Access Restricted"));
}

#[tokio::test]
async fn test_catalog_download() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("partyco", PASSWORD).await;

    let response = client.get("/catalog/download").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .header("content-disposition")
            .unwrap()
            .contains("BalloonsFiesta-Wholesale-Catalog-2026-01-05.txt")
    );
    assert!(response.body.contains("Account: partyco"));
    assert!(response.body.contains("Bulk Latex Pack"));
}

#[tokio::test]
async fn test_catalog_download_needs_wholesale_login() {
    let app = TestApp::new();
    app.client()
        .get("/catalog/download")
        .await
        .assert_redirect("/catalog");
}

#[tokio::test]
async fn test_catalog_quick_add_uses_minimum() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("partyco", PASSWORD).await;

    client
        .post_form("/catalog/add", &[("product_id", "2")])
        .await
        .assert_redirect("/catalog");

    let count = client.get("/cart/count").await;
    assert!(count.body.contains(">5<"));
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_dashboard() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("admin", PASSWORD).await;

    let response = client.get("/admin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Customer Orders"));
}

#[tokio::test]
async fn test_admin_denied_for_retail() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    let response = client.get("/admin").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.body.contains("Access Denied"));
}

#[tokio::test]
async fn test_admin_requires_login() {
    let app = TestApp::new();
    app.client().get("/admin").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_export_without_orders() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("admin", PASSWORD).await;

    client.get("/admin/orders.csv").await.assert_redirect("/admin");
    let page = client.get("/admin").await;
    assert!(page.body.contains("No orders to export."));
}

#[tokio::test]
async fn test_admin_sees_and_exports_orders() {
    let app = TestApp::new();
    let mut shopper = app.client();
    place_wholesale_order(&mut shopper).await;

    let mut admin = app.client();
    admin.login("admin", PASSWORD).await;

    let page = admin.get("/admin").await;
    assert!(page.body.contains("Party Co"));
    assert!(page.body.contains("ORD-"));

    let csv = admin.get("/admin/orders.csv").await;
    assert_eq!(csv.status, StatusCode::OK);
    assert!(csv.header("content-type").unwrap().starts_with("text/csv"));
    assert!(csv.body.contains("Party Co"));
}

#[tokio::test]
async fn test_admin_reloads_catalog() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("admin", PASSWORD).await;

    client
        .post_form("/admin/catalog/refresh", &[])
        .await
        .assert_redirect("/admin");
    let page = client.get("/admin").await;
    assert!(page.body.contains("Catalog reloaded: 3 products"));
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let app = TestApp::new();
    let response = app
        .client()
        .post_form(
            "/register",
            &[
                ("username", "dana"),
                ("password", "abc"),
                ("confirm_password", "abc"),
                ("email", "dana@example.com"),
                ("phone", "555-123-4567"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Create an Account"));
    assert!(response.body.contains("dana@example.com"));
}

#[tokio::test]
async fn test_register_rejects_taken_username() {
    let app = TestApp::new();
    let mut client = app.client();

    let response = client
        .post_form(
            "/register",
            &[
                ("username", "partyco"),
                ("password", PASSWORD),
                ("confirm_password", PASSWORD),
                ("email", "other@example.com"),
                ("phone", "555-123-4567"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Username already exists"));
}

#[tokio::test]
async fn test_account_page_and_logout() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    let account = client.get("/account").await;
    assert_eq!(account.status, StatusCode::OK);
    assert!(account.body.contains("dana@example.com"));
    assert!(account.body.contains("Change Password"));

    client.post_form("/logout", &[]).await.assert_redirect("/");
    client.get("/account").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_change_password_then_login_with_new_one() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    client
        .post_form(
            "/account/password",
            &[
                ("current_password", PASSWORD),
                ("new_password", "Streamers#2027"),
                ("confirm_password", "Streamers#2027"),
            ],
        )
        .await
        .assert_redirect("/login");

    client.get("/account").await.assert_redirect("/login");
    client
        .post_form("/login", &[("username", "dana"), ("password", PASSWORD)])
        .await
        .assert_redirect("/login");
    client.login("dana", "Streamers#2027").await;
}

#[tokio::test]
async fn test_wholesale_request_submitted() {
    let app = TestApp::new();
    let mut client = app.client();

    client
        .post_form(
            "/wholesale-request",
            &[
                ("business_name", "Party Co"),
                ("contact_name", "Sam Lee"),
                ("email", "sam@partyco.example"),
                ("phone", "555-987-6543"),
                ("business_address", "1 Warehouse Rd"),
                ("business_type", "Party Store"),
                ("tax_id", "12-3456789"),
                ("expected_volume", "500-1000"),
            ],
        )
        .await
        .assert_redirect("/wholesale-request");

    let page = client.get("/wholesale-request").await;
    assert!(page.body.contains("Wholesale account request submitted successfully!"));

    let mut admin = app.client();
    admin.login("admin", PASSWORD).await;
    let dashboard = admin.get("/admin").await;
    assert!(dashboard.body.contains("Sam Lee"));
}

#[tokio::test]
async fn test_wholesale_request_needs_tax_id() {
    let app = TestApp::new();
    let response = app
        .client()
        .post_form(
            "/wholesale-request",
            &[
                ("business_name", "Party Co"),
                ("contact_name", "Sam Lee"),
                ("email", "sam@partyco.example"),
                ("phone", "555-987-6543"),
                ("business_address", "1 Warehouse Rd"),
                ("business_type", "Party Store"),
                ("tax_id", "12"),
                ("expected_volume", "500-1000"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Party Co"));
}
