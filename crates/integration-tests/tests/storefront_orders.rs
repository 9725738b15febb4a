//! Integration tests for the order dashboards.
//!
//! These tests require:
//! - A running marketplace backend with seeded accounts
//! - The storefront running (cargo run -p tiffinbox-storefront)
//! - `TEST_CUSTOMER_EMAIL` / `TEST_CUSTOMER_PASSWORD` and
//!   `TEST_PROVIDER_EMAIL` / `TEST_PROVIDER_PASSWORD` in the environment
//!
//! Run with: cargo test -p tiffinbox-integration-tests -- --ignored

use reqwest::{Client, StatusCode};

use tiffinbox_integration_tests::{browser_client, storefront_base_url};

fn test_account(role: &str) -> Option<(String, String)> {
    let email = std::env::var(format!("TEST_{role}_EMAIL")).ok()?;
    let password = std::env::var(format!("TEST_{role}_PASSWORD")).ok()?;
    Some((email, password))
}

/// Log a client in through the storefront's own login form.
async fn login(client: &Client, base_url: &str, email: &str, password: &str) {
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("Failed to post login");
    assert!(resp.status().is_success() || resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded accounts"]
async fn test_order_history_requires_customer_login() {
    let base_url = storefront_base_url();

    // Anonymous visitors are redirected to login.
    let bare = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client");
    let resp = bare
        .get(format!("{base_url}/account/orders"))
        .send()
        .await
        .expect("Failed to get orders");
    assert!(resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded accounts"]
async fn test_customer_sees_order_history() {
    let Some((email, password)) = test_account("CUSTOMER") else {
        panic!("TEST_CUSTOMER_EMAIL / TEST_CUSTOMER_PASSWORD not set");
    };

    let client = browser_client();
    let base_url = storefront_base_url();
    login(&client, &base_url, &email, &password).await;

    let resp = client
        .get(format!("{base_url}/account/orders"))
        .send()
        .await
        .expect("Failed to get orders");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("My Orders"));
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded accounts"]
async fn test_provider_dashboard_rejects_customers() {
    let Some((email, password)) = test_account("CUSTOMER") else {
        panic!("TEST_CUSTOMER_EMAIL / TEST_CUSTOMER_PASSWORD not set");
    };

    let client = browser_client();
    let base_url = storefront_base_url();
    login(&client, &base_url, &email, &password).await;

    let resp = client
        .get(format!("{base_url}/provider/orders"))
        .send()
        .await
        .expect("Failed to get provider orders");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running storefront and seeded accounts"]
async fn test_provider_sees_incoming_orders() {
    let Some((email, password)) = test_account("PROVIDER") else {
        panic!("TEST_PROVIDER_EMAIL / TEST_PROVIDER_PASSWORD not set");
    };

    let client = browser_client();
    let base_url = storefront_base_url();
    login(&client, &base_url, &email, &password).await;

    let resp = client
        .get(format!("{base_url}/provider/orders"))
        .send()
        .await
        .expect("Failed to get provider orders");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Incoming Orders"));

    // Status filtering narrows the list without erroring.
    let resp = client
        .get(format!("{base_url}/provider/orders?status=PLACED"))
        .send()
        .await
        .expect("Failed to filter provider orders");
    assert_eq!(resp.status(), StatusCode::OK);
}
