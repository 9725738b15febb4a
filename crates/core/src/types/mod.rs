//! Core types for Tiffinbox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use cart::{Cart, CartLine, MealSnapshot, ProviderGroup, UNKNOWN_PROVIDER};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use status::{OrderStatus, UserRole};
