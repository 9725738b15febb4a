//! Integration tests for Tiffinbox.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the marketplace backend, then the storefront
//! cargo run -p tiffinbox-storefront
//!
//! # Run integration tests
//! cargo test -p tiffinbox-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `storefront_cart` - Cart page and HTMX fragment tests
//! - `storefront_orders` - Order dashboard tests (require accounts)
//!
//! All network tests are `#[ignore]`d so `cargo test` stays green without
//! a running stack.

/// Base URL for the storefront (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create a client with a cookie store, so the session (and with it the
/// cart) persists across requests like a browser profile.
#[must_use]
pub fn browser_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
