//! Cache types for catalog API responses.
//!
//! Only anonymous catalog reads are cached. Orders, auth, and reviews are
//! per-user and always hit the backend.

use crate::api::types::{Meal, MealPage, Provider};

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Meal(String),
    /// Keyed by the rendered query string so each filter combination is
    /// its own entry.
    Meals(String),
    Provider(String),
    Providers,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Meal(Box<Meal>),
    Meals(MealPage),
    Provider(Box<Provider>),
    Providers(Vec<Provider>),
}
