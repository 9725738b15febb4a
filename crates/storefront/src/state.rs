//! Application state shared across handlers.

use std::sync::Arc;

use tower_sessions::Session;

use crate::api::BackendClient;
use crate::cart::{CartBus, CartStore, SessionCartRepository};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: configuration, the backend API client, and the cart
/// change bus. The bus lives here - not in a module-level singleton - so
/// its lifecycle is the application's and tests can build their own.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: BackendClient,
    cart_bus: CartBus,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = BackendClient::new(&config.backend);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                cart_bus: CartBus::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the marketplace backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the cart change bus.
    #[must_use]
    pub fn cart_bus(&self) -> &CartBus {
        &self.inner.cart_bus
    }

    /// Build the per-request cart store over the visitor's session.
    #[must_use]
    pub fn cart_store(&self, session: Session) -> CartStore<SessionCartRepository> {
        CartStore::new(
            SessionCartRepository::new(session),
            self.inner.cart_bus.clone(),
        )
    }
}
