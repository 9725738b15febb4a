//! Session-related types.
//!
//! Types stored in the session for authentication state and the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffinbox_core::{Email, MealId, MealSnapshot, ProviderId, UserId, UserRole};

use crate::api::types::UserProfile;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user and
/// gate role-specific surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's backend ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Marketplace role.
    pub role: UserRole,
}

impl From<UserProfile> for CurrentUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: profile.role,
        }
    }
}

/// An add-to-cart action stashed across a login redirect.
///
/// Written when an anonymous visitor hits "Order now", replayed exactly
/// once by the login handler, then removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCartAdd {
    pub meal_id: MealId,
    pub provider_id: Option<ProviderId>,
    pub name: String,
    pub price: Decimal,
    pub image: Option<String>,
}

impl From<PendingCartAdd> for MealSnapshot {
    fn from(pending: PendingCartAdd) -> Self {
        Self {
            id: pending.meal_id,
            provider_id: pending.provider_id,
            name: pending.name,
            price: pending.price,
            image: pending.image,
        }
    }
}

/// Session keys for authentication and cart data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend session cookie captured at login.
    pub const BACKEND_SESSION: &str = "backend_session";

    /// Key for the serialized cart record. The single fixed storage key of
    /// the cart store; the whole line list lives under it as one value.
    pub const CART: &str = "cart";

    /// Key for an add-to-cart action pending a login redirect.
    pub const PENDING_CART_ADD: &str = "pending_cart_add";
}
