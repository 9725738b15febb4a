//! Cart persistence port.
//!
//! The cart is one serialized record under a single fixed key. Production
//! keeps it in the tower-sessions session (scoped to one browser profile by
//! the session cookie); tests use the in-memory implementation.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tower_sessions::Session;

use tiffinbox_core::Cart;

use crate::models::session_keys;

/// Errors from the cart storage backend.
#[derive(Debug, thiserror::Error)]
pub enum CartStoreError {
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Where the cart record lives.
///
/// `load` never fails: absent or unparsable data reads as an empty cart so
/// a corrupt record can never take a page down.
pub trait CartRepository {
    /// Read the current cart.
    async fn load(&self) -> Cart;

    /// Persist the full cart record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend rejects the write. Callers
    /// treat this as non-fatal.
    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError>;
}

/// Decode a stored cart value, tolerating anything malformed.
fn decode(value: Option<serde_json::Value>) -> Cart {
    value
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

// =============================================================================
// Session-backed repository (production)
// =============================================================================

/// Cart record in the visitor's session, under [`session_keys::CART`].
#[derive(Clone)]
pub struct SessionCartRepository {
    session: Session,
}

impl SessionCartRepository {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartRepository for SessionCartRepository {
    async fn load(&self) -> Cart {
        // Fetch as a raw value first so a record written by an older
        // release (or hand-edited into nonsense) degrades to empty instead
        // of erroring.
        let raw = self
            .session
            .get::<serde_json::Value>(session_keys::CART)
            .await
            .ok()
            .flatten();
        decode(raw)
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        self.session.insert(session_keys::CART, cart).await?;
        Ok(())
    }
}

// =============================================================================
// In-memory repository (tests)
// =============================================================================

/// In-memory cart record with a write counter, for tests that assert the
/// one-write-per-mutation invariant.
#[derive(Default)]
pub struct MemoryCartRepository {
    cart: Mutex<Cart>,
    saves: AtomicUsize,
}

impl MemoryCartRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CartRepository for MemoryCartRepository {
    async fn load(&self) -> Cart {
        self.cart
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    async fn save(&self, cart: &Cart) -> Result<(), CartStoreError> {
        *self
            .cart
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = cart.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_absent_is_empty() {
        assert!(decode(None).is_empty());
    }

    #[test]
    fn test_decode_corrupt_record_is_empty_not_an_error() {
        // Anything that is not a line array reads as an empty cart.
        assert!(decode(Some(json!("not a cart"))).is_empty());
        assert!(decode(Some(json!({"id": "m1"}))).is_empty());
        assert!(decode(Some(json!(42))).is_empty());
        assert!(decode(Some(json!([{"qty": "NaN"}]))).is_empty());
    }

    #[test]
    fn test_decode_valid_record() {
        let cart = decode(Some(json!([
            {"id": "m1", "providerId": "p1", "name": "Bhuna Khichuri", "price": "120", "qty": 2}
        ])));
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 2);
    }

    #[tokio::test]
    async fn test_memory_repository_counts_saves() {
        let repo = MemoryCartRepository::new();
        assert_eq!(repo.save_count(), 0);

        let cart = repo.load().await;
        assert!(cart.is_empty());
        assert_eq!(repo.save_count(), 0);

        repo.save(&cart).await.unwrap();
        assert_eq!(repo.save_count(), 1);
    }
}
