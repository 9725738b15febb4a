//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Catalog
//! GET  /meals                  - Meal listing with filters
//! GET  /meals/{id}             - Meal detail
//! GET  /providers              - Provider directory
//! GET  /providers/{id}         - Provider menu
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! POST /cart/checkout          - Submit one provider group as an order
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (replays a pending cart add)
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action (keeps the cart)
//!
//! # Account (requires customer role)
//! GET  /account/orders         - Order history
//! GET  /account/orders/{id}    - Order detail + review form
//! POST /account/orders/{id}/cancel  - Cancel (only from PLACED)
//! POST /account/orders/{id}/reviews - Review a delivered meal
//!
//! # Provider dashboard (requires provider role)
//! GET  /provider/orders        - Incoming orders with status filter
//! POST /provider/orders/{id}/advance - Advance order status (HTMX)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod home;
pub mod meals;
pub mod provider;
pub mod providers;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the meal catalog routes router.
pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(meals::index))
        .route("/{id}", get(meals::show))
}

/// Create the provider directory routes router.
pub fn provider_directory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(providers::index))
        .route("/{id}", get(providers::show))
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

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the customer account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route("/orders/{id}/cancel", post(account::cancel_order))
        .route("/orders/{id}/reviews", post(account::submit_review))
}

/// Create the provider dashboard routes router.
pub fn provider_dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(provider::orders))
        .route("/orders/{id}/advance", post(provider::advance_order))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/meals", meal_routes())
        .nest("/providers", provider_directory_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Auth
        .nest("/auth", auth_routes())
        // Customer account
        .nest("/account", account_routes())
        // Provider dashboard
        .nest("/provider", provider_dashboard_routes())
}
