//! Cart change notification subject.
//!
//! An explicit observable owned by `AppState` rather than a module-level
//! singleton, so lifecycle and testing stay visible. Dispatch is
//! synchronous and in subscription order; notifications carry no payload -
//! subscribers re-read the cart store themselves, which keeps the store the
//! single source of truth and rules out stale-payload bugs from reordered
//! notifications.

use std::sync::{Arc, Mutex, PoisonError};

/// Handle returned by [`CartBus::on`], accepted by [`CartBus::off`].
///
/// Whoever subscribes owns the unsubscribe; the bus itself never tears
/// handlers down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    /// Kept in subscription order; emit walks front to back.
    subscribers: Vec<(u64, Handler)>,
}

/// The cart-changed publish/subscribe channel.
///
/// Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct CartBus {
    inner: Arc<Mutex<BusInner>>,
}

impl CartBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler. Handlers run on the emitting thread.
    pub fn on(&self, handler: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.subscribers.push((id, Arc::new(handler)));
        SubscriptionId(id)
    }

    /// Unsubscribe. Returns `false` if the subscription was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub_id, _)| *sub_id != id.0);
        inner.subscribers.len() != before
    }

    /// Notify all current subscribers, synchronously, in subscription order.
    ///
    /// The subscriber list is snapshotted before dispatch, so a handler may
    /// subscribe or unsubscribe without deadlocking; such changes take
    /// effect from the next emission.
    pub fn emit(&self) {
        let handlers: Vec<Handler> = self
            .lock()
            .subscribers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in handlers {
            handler();
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BusInner> {
        // A panicking handler must not wedge every future cart mutation.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        CartBus::new().emit();
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = CartBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = Arc::clone(&seen);
            bus.on(move || seen.lock().unwrap().push(label));
        }

        bus.emit();
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_off_removes_handler() {
        let bus = CartBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let id = bus.on(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit();
        assert!(bus.off(id));
        bus.emit();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        // Second removal is a no-op.
        assert!(!bus.off(id));
    }

    #[test]
    fn test_emission_is_synchronous() {
        let bus = CartBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        bus.on(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit();
        // Observable on the very next line - no queuing, no async dispatch.
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself_during_emit() {
        let bus = CartBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let bus_clone = bus.clone();
        let counter = Arc::clone(&count);
        let id = Arc::new(Mutex::new(None::<SubscriptionId>));
        let id_clone = Arc::clone(&id);
        let registered = bus.on(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *id_clone.lock().unwrap() {
                bus_clone.off(id);
            }
        });
        *id.lock().unwrap() = Some(registered);

        bus.emit();
        bus.emit();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let bus = CartBus::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        bus.clone().on(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 1);
    }
}
