//! The cart store: single source of truth for the pending selection.

use tiffinbox_core::{Cart, MealId, MealSnapshot, ProviderId};

use crate::cart::bus::CartBus;
use crate::cart::repository::CartRepository;

/// Mutation path for the cart.
///
/// Constructed per request around the visitor's repository plus the
/// app-wide [`CartBus`]. Every mutating operation persists the whole line
/// list and then emits exactly one change notification; `read` does
/// neither. The mutated cart is returned so handlers can render it without
/// a second load.
pub struct CartStore<R> {
    repository: R,
    bus: CartBus,
}

impl<R: CartRepository> CartStore<R> {
    pub const fn new(repository: R, bus: CartBus) -> Self {
        Self { repository, bus }
    }

    /// Current cart contents. Absent or corrupt storage reads as empty.
    pub async fn read(&self) -> Cart {
        self.repository.load().await
    }

    /// Add one unit of a meal (incrementing an existing line).
    pub async fn add(&self, snapshot: MealSnapshot) -> Cart {
        self.mutate(|cart| cart.add(snapshot)).await
    }

    /// Remove a line entirely.
    pub async fn remove(&self, id: &MealId) -> Cart {
        self.mutate(|cart| cart.remove(id)).await
    }

    /// Set a line's quantity, floored at 1.
    pub async fn update_qty(&self, id: &MealId, qty: u32) -> Cart {
        self.mutate(|cart| cart.set_qty(id, qty)).await
    }

    /// Drop a provider's whole group, after its order was submitted.
    pub async fn clear_for_provider(&self, provider_id: Option<&ProviderId>) -> Cart {
        self.mutate(|cart| cart.clear_for_provider(provider_id)).await
    }

    async fn mutate(&self, apply: impl FnOnce(&mut Cart)) -> Cart {
        let mut cart = self.repository.load().await;
        apply(&mut cart);

        if let Err(e) = self.repository.save(&cart).await {
            // Availability over cart correctness: the page keeps working
            // and subscribers still hear about the attempted change.
            tracing::warn!("failed to persist cart: {e}");
        }

        self.bus.emit();
        cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use super::*;
    use crate::cart::repository::{CartStoreError, MemoryCartRepository};

    fn snapshot(id: &str, provider: Option<&str>) -> MealSnapshot {
        MealSnapshot {
            id: MealId::new(id),
            provider_id: provider.map(ProviderId::new),
            name: format!("meal {id}"),
            price: Decimal::from(100),
            image: None,
        }
    }

    fn store_with_counter() -> (CartStore<MemoryCartRepository>, Arc<AtomicUsize>) {
        let bus = CartBus::new();
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        bus.on(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (CartStore::new(MemoryCartRepository::new(), bus), notifications)
    }

    #[tokio::test]
    async fn test_each_mutation_is_one_save_and_one_emit() {
        let (store, notifications) = store_with_counter();

        store.add(snapshot("m1", Some("p1"))).await;
        assert_eq!(store.repository.save_count(), 1);
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        store.update_qty(&MealId::new("m1"), 5).await;
        assert_eq!(store.repository.save_count(), 2);
        assert_eq!(notifications.load(Ordering::SeqCst), 2);

        store.remove(&MealId::new("m1")).await;
        assert_eq!(store.repository.save_count(), 3);
        assert_eq!(notifications.load(Ordering::SeqCst), 3);

        store.clear_for_provider(None).await;
        assert_eq!(store.repository.save_count(), 4);
        assert_eq!(notifications.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_read_neither_saves_nor_emits() {
        let (store, notifications) = store_with_counter();

        let cart = store.read().await;
        assert!(cart.is_empty());
        assert_eq!(store.repository.save_count(), 0);
        assert_eq!(notifications.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_twice_increments() {
        let (store, _) = store_with_counter();

        store.add(snapshot("m1", Some("p1"))).await;
        let cart = store.add(snapshot("m1", Some("p1"))).await;

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].qty, 2);

        // Persisted, not just returned.
        let reread = store.read().await;
        assert_eq!(reread.lines()[0].qty, 2);
    }

    #[tokio::test]
    async fn test_update_qty_floors_at_one() {
        let (store, _) = store_with_counter();

        store.add(snapshot("m1", Some("p1"))).await;
        let cart = store.update_qty(&MealId::new("m1"), 0).await;
        assert_eq!(cart.lines()[0].qty, 1);
    }

    #[tokio::test]
    async fn test_checkout_clears_only_that_provider() {
        let (store, _) = store_with_counter();

        store.add(snapshot("m1", Some("p1"))).await;
        store.add(snapshot("m2", Some("p2"))).await;

        let cart = store
            .clear_for_provider(Some(&ProviderId::new("p1")))
            .await;

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id, MealId::new("m2"));
    }

    /// Repository whose writes always fail, to pin the swallow policy.
    struct BrokenRepository;

    impl CartRepository for BrokenRepository {
        async fn load(&self) -> Cart {
            Cart::new()
        }

        async fn save(&self, _cart: &Cart) -> Result<(), CartStoreError> {
            Err(CartStoreError::Session(
                tower_sessions::session::Error::Store(
                    tower_sessions::session_store::Error::Backend("storage down".to_string()),
                ),
            ))
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let bus = CartBus::new();
        let notifications = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notifications);
        bus.on(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let store = CartStore::new(BrokenRepository, bus);

        // No panic, the in-memory result still comes back, and subscribers
        // are still told to re-read.
        let cart = store.add(snapshot("m1", None)).await;
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(notifications.load(Ordering::SeqCst), 1);
    }
}
