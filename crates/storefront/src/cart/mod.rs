//! The cart subsystem: store, persistence port, and change bus.
//!
//! # Architecture
//!
//! - [`CartStore`] is the single mutation path for the pending selection.
//!   Every mutating operation persists the full line list back to one fixed
//!   storage key and then emits exactly one payload-free notification.
//! - [`CartRepository`] is the persistence port. Production uses the
//!   session-backed implementation (the cart record is scoped to one
//!   browser profile via the session cookie); tests use the in-memory one.
//! - [`CartBus`] is the change notification subject, owned by `AppState`
//!   and handed to each per-request store. In-process consumers subscribe
//!   directly; browser-side consumers get the same signal as the
//!   `HX-Trigger: cart-updated` response header, which HTMX fans out to
//!   every listening fragment. Both paths mean the same thing: re-read the
//!   store.
//!
//! Reads fail soft: absent or corrupt storage is an empty cart, and write
//! failures are swallowed after logging. A broken cart must never take the
//! rest of the page down with it.

mod bus;
mod repository;
mod store;

pub use bus::{CartBus, SubscriptionId};
pub use repository::{
    CartRepository, CartStoreError, MemoryCartRepository, SessionCartRepository,
};
pub use store::CartStore;
