//! Domain types for the marketplace backend API.
//!
//! The backend serializes camelCase JSON with optional fields omitted, so
//! everything that can be absent defaults. These types are the wire shapes;
//! templates render dedicated `*View` structs built from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tiffinbox_core::{
    CategoryId, Email, MealId, OrderId, OrderStatus, ProviderId, ReviewId, UserId, UserRole,
};

// =============================================================================
// Catalog Types
// =============================================================================

/// A meal offered by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub id: MealId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub provider_id: Option<ProviderId>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    /// Average review rating, absent until the first review lands.
    #[serde(default)]
    pub rating: Option<f64>,
}

const fn default_true() -> bool {
    true
}

/// A seller (restaurant or home kitchen).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Present on the provider detail response, empty elsewhere.
    #[serde(default)]
    pub meals: Vec<Meal>,
}

/// Pagination block returned alongside list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// One page of the meal catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPage {
    #[serde(default)]
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Catalog query parameters for `GET /meals`.
#[derive(Debug, Clone, Default)]
pub struct MealFilter {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// The backend's `category` param filters by cuisine.
    pub category: Option<String>,
    pub search: Option<String>,
    pub provider_id: Option<ProviderId>,
}

impl MealFilter {
    /// Render as query pairs in a stable order (also the cache key order).
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        query.push(("page", self.page.unwrap_or(1).to_string()));
        query.push(("limit", self.limit.unwrap_or(10).to_string()));
        if let Some(min_price) = self.min_price {
            query.push(("minPrice", min_price.to_string()));
        }
        if let Some(max_price) = self.max_price {
            query.push(("maxPrice", max_price.to_string()));
        }
        if let Some(category) = &self.category {
            query.push(("category", category.clone()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(provider_id) = &self.provider_id {
            query.push(("providerId", provider_id.as_str().to_string()));
        }
        query
    }
}

// =============================================================================
// Order Types
// =============================================================================

/// Lightweight user reference embedded in order responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Lightweight meal reference embedded in order items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRef {
    #[serde(default)]
    pub id: Option<MealId>,
    #[serde(default)]
    pub name: Option<String>,
}

/// One line of a backend order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub meal_id: Option<MealId>,
    #[serde(default)]
    pub meal: Option<MealRef>,
    pub quantity: u32,
}

impl OrderItem {
    /// The meal id, wherever the backend put it.
    #[must_use]
    pub fn resolved_meal_id(&self) -> Option<&MealId> {
        self.meal_id
            .as_ref()
            .or_else(|| self.meal.as_ref().and_then(|meal| meal.id.as_ref()))
    }

    /// Display name, empty when the meal was deleted.
    #[must_use]
    pub fn meal_name(&self) -> &str {
        self.meal
            .as_ref()
            .and_then(|meal| meal.name.as_deref())
            .unwrap_or("")
    }
}

/// A backend-persisted order. The storefront holds a read-mostly projection;
/// the backend owns the authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub customer: Option<UserRef>,
    #[serde(default)]
    pub provider: Option<UserRef>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for `POST /orders` (one provider group).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub provider_id: Option<ProviderId>,
    pub delivery_address: String,
    pub items: Vec<CreateOrderItem>,
    pub note: Option<String>,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub meal_id: MealId,
    pub quantity: u32,
}

// =============================================================================
// Review Types
// =============================================================================

/// A customer review of a meal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub meal_id: MealId,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Request body for `POST /reviews`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewInput {
    pub meal_id: MealId,
    pub order_id: OrderId,
    pub rating: u8,
    pub comment: Option<String>,
}

// =============================================================================
// Auth Types
// =============================================================================

/// The authenticated user's profile as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// The backend session captured at login.
///
/// Holds the raw `name=value` cookie pair from the backend's `Set-Cookie`
/// response, replayed as a `Cookie` header on authenticated calls. Stored
/// in the storefront session, never logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSession {
    cookie: String,
}

impl BackendSession {
    /// Extract the session cookie from a login response's headers.
    ///
    /// Takes the first `Set-Cookie` pair, dropping attributes after the
    /// first `;`.
    #[must_use]
    pub fn from_response(response: &reqwest::Response) -> Option<Self> {
        let raw = response
            .headers()
            .get(reqwest::header::SET_COOKIE)?
            .to_str()
            .ok()?;
        Self::from_set_cookie(raw)
    }

    /// Parse a raw `Set-Cookie` header value.
    #[must_use]
    pub fn from_set_cookie(raw: &str) -> Option<Self> {
        let pair = raw.split(';').next()?.trim();
        if pair.is_empty() || !pair.contains('=') {
            return None;
        }
        Some(Self {
            cookie: pair.to_string(),
        })
    }

    /// The value sent as the `Cookie` request header.
    #[must_use]
    pub fn cookie_header(&self) -> &str {
        &self.cookie
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_filter_query_defaults() {
        let query = MealFilter::default().to_query();
        assert_eq!(query[0], ("page", "1".to_string()));
        assert_eq!(query[1], ("limit", "10".to_string()));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_meal_filter_query_full() {
        let filter = MealFilter {
            page: Some(2),
            limit: Some(20),
            min_price: Some(Decimal::from(50)),
            max_price: Some(Decimal::from(300)),
            category: Some("Bengali".to_string()),
            search: Some("biryani".to_string()),
            provider_id: Some(ProviderId::new("p1")),
        };
        let query = filter.to_query();
        assert!(query.contains(&("minPrice", "50".to_string())));
        assert!(query.contains(&("category", "Bengali".to_string())));
        assert!(query.contains(&("search", "biryani".to_string())));
        assert!(query.contains(&("providerId", "p1".to_string())));
    }

    #[test]
    fn test_order_tolerates_sparse_payloads() {
        let order: Order = serde_json::from_str(r#"{"id":"o1"}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Placed);
        assert!(order.items.is_empty());
        assert!(order.created_at.is_none());
    }

    #[test]
    fn test_order_item_meal_id_fallback() {
        let item: OrderItem =
            serde_json::from_str(r#"{"meal":{"id":"m1","name":"Khichuri"},"quantity":2}"#).unwrap();
        assert_eq!(item.resolved_meal_id(), Some(&MealId::new("m1")));
        assert_eq!(item.meal_name(), "Khichuri");
    }

    #[test]
    fn test_backend_session_from_set_cookie() {
        let session =
            BackendSession::from_set_cookie("connect.sid=abc123; Path=/; HttpOnly").unwrap();
        assert_eq!(session.cookie_header(), "connect.sid=abc123");

        assert!(BackendSession::from_set_cookie("").is_none());
        assert!(BackendSession::from_set_cookie("garbage").is_none());
    }

    #[test]
    fn test_create_order_input_wire_shape() {
        let input = CreateOrderInput {
            provider_id: Some(ProviderId::new("p1")),
            delivery_address: "12 Lake Road, Dhaka".to_string(),
            items: vec![CreateOrderItem {
                meal_id: MealId::new("m1"),
                quantity: 2,
            }],
            note: Some("Payment: Cash on Delivery".to_string()),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["providerId"], "p1");
        assert_eq!(json["deliveryAddress"], "12 Lake Road, Dhaka");
        assert_eq!(json["items"][0]["mealId"], "m1");
        assert_eq!(json["items"][0]["quantity"], 2);
    }
}
