//! Checkout flows for retail and wholesale shoppers.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use balloon_fiesta_integration_tests::{Client, PASSWORD, TestApp};

async fn place_retail_order(client: &mut Client) -> String {
    client
        .post_form("/cart/add", &[("product_id", "1")])
        .await
        .assert_redirect("/");
    client.post_form("/cart/checkout", &[]).await.assert_redirect("/checkout");

    let response = client
        .post_form(
            "/checkout",
            &[
                ("name", "Dana Reyes"),
                ("email", "dana@example.com"),
                ("address", "12 Main St"),
                ("phone", "555-123-4567"),
                ("pickup_date", "2026-01-05"),
                ("pickup_time", "14:00"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::SEE_OTHER, "body: {}", response.body);
    let location = response.location().unwrap().to_string();
    assert!(location.starts_with("/order-confirmation?order=ORD-"), "{location}");
    location
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let app = TestApp::new();
    let mut client = app.client();

    client.post_form("/cart/add", &[("product_id", "1")]).await;
    client.post_form("/cart/checkout", &[]).await.assert_redirect("/login");

    let login = client.get("/login").await;
    assert!(login.body.contains("Please login to proceed with checkout"));
}

#[tokio::test]
async fn test_checkout_page_redirects_anonymous_visitor() {
    let app = TestApp::new();
    app.client().get("/checkout").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    client.post_form("/cart/checkout", &[]).await.assert_redirect("/cart");
    let cart = client.get("/cart").await;
    assert!(cart.body.contains("Your cart is empty!"));
}

#[tokio::test]
async fn test_retail_order_placed_and_listed() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    let location = place_retail_order(&mut client).await;
    let order_id = location.trim_start_matches("/order-confirmation?order=").to_string();

    let confirmation = client.get(&location).await;
    assert_eq!(confirmation.status, StatusCode::OK);
    assert!(confirmation.body.contains("Thank you for your order!"));
    assert!(confirmation.body.contains(&order_id));
    assert!(confirmation.body.contains("Red Heart"));

    let count = client.get("/cart/count").await;
    assert!(!count.body.contains("badge"));

    let account = client.get("/account").await;
    assert_eq!(account.status, StatusCode::OK);
    assert!(account.body.contains(&order_id));
    assert!(account.body.contains("Order #001"));
}

#[tokio::test]
async fn test_retail_checkout_rejects_past_pickup() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register_and_login("dana").await;

    client.post_form("/cart/add", &[("product_id", "1")]).await;
    client.post_form("/cart/checkout", &[]).await;

    let response = client
        .post_form(
            "/checkout",
            &[
                ("name", "Dana Reyes"),
                ("email", "dana@example.com"),
                ("address", "12 Main St"),
                ("phone", "555-123-4567"),
                ("pickup_date", "2026-01-05"),
                ("pickup_time", "09:00"),
            ],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Checkout"));

    let account = client.get("/account").await;
    assert!(!account.body.contains("ORD-"));
}

#[tokio::test]
async fn test_pickup_slots_fragment() {
    let app = TestApp::new();
    let response = app
        .client()
        .htmx_get("/checkout/slots?pickup_date=2026-01-05")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("19:30"));
    assert!(!response.body.contains("20:00"));
}

#[tokio::test]
async fn test_unknown_order_confirmation() {
    let app = TestApp::new();
    let response = app.client().get("/order-confirmation?order=ORD-1").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Order not found"));
}

#[tokio::test]
async fn test_wrong_password_rejected() {
    let app = TestApp::new();
    let mut client = app.client();

    client
        .post_form("/login", &[("username", "partyco"), ("password", "nope")])
        .await
        .assert_redirect("/login");

    let account = client.get("/account").await;
    account.assert_redirect("/login");
}

#[tokio::test]
async fn test_wholesale_minimum_enforced_on_details_page() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("partyco", PASSWORD).await;

    client
        .post_form("/products/1", &[("quantity", "3")])
        .await
        .assert_redirect("/products/1");

    let page = client.get("/products/1").await;
    assert!(page.body.contains("Minimum order for Red Heart is 10 units"));

    let count = client.get("/cart/count").await;
    assert!(!count.body.contains("badge"));
}

#[tokio::test]
async fn test_wholesale_order_without_pickup() {
    let app = TestApp::new();
    let mut client = app.client();
    client.login("partyco", PASSWORD).await;

    client
        .post_form("/products/1", &[("quantity", "10")])
        .await
        .assert_redirect("/products/1");

    let cart = client.get("/cart").await;
    assert!(cart.body.contains("$2.00"));

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
    assert!(
        response
            .location()
            .unwrap()
            .starts_with("/order-confirmation?order=ORD-")
    );
}
