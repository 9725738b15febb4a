//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart record lives in the session; every mutation answers with an
//! `HX-Trigger: cart-updated` header so all listening fragments (badge,
//! cart items) re-read the store.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use tiffinbox_core::{Cart, MealId, MealSnapshot, ProviderId, UNKNOWN_PROVIDER, UserRole};

use crate::api::types::{BackendSession, CreateOrderInput, CreateOrderItem};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{PendingCartAdd, session_keys};
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub qty: u32,
    pub price: String,
    pub line_total: String,
    pub image: Option<String>,
}

/// One provider's slice of the cart, with its own checkout form.
#[derive(Clone)]
pub struct CartGroupView {
    /// Human label; the unknown bucket renders as "Unknown".
    pub provider_label: String,
    /// Form value for checkout; empty string selects the unknown bucket.
    pub provider_key: String,
    pub items: Vec<CartItemView>,
    pub subtotal: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub groups: Vec<CartGroupView>,
    pub total: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            groups: Vec::new(),
            total: "0".to_string(),
            item_count: 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let groups = cart
            .group_by_provider()
            .iter()
            .map(|group| CartGroupView {
                provider_label: group
                    .provider_id
                    .map_or_else(|| UNKNOWN_PROVIDER.to_string(), ToString::to_string),
                provider_key: group
                    .provider_id
                    .map_or_else(String::new, ToString::to_string),
                items: group
                    .lines
                    .iter()
                    .map(|line| CartItemView {
                        id: line.id.as_str().to_string(),
                        name: line.name.clone(),
                        qty: line.qty,
                        price: line.price.to_string(),
                        line_total: line.subtotal().to_string(),
                        image: line.image.clone(),
                    })
                    .collect(),
                subtotal: group.subtotal().to_string(),
            })
            .collect();

        Self {
            groups,
            total: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Form & Query Types
// =============================================================================

/// Add to cart form data: the meal id plus its display snapshot, captured
/// from the page that rendered the button.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub meal_id: String,
    pub provider_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    /// "Order now": add, then continue to the cart (via login if needed).
    pub buy_now: Option<bool>,
}

impl AddToCartForm {
    fn into_snapshot(self) -> MealSnapshot {
        MealSnapshot {
            id: MealId::new(self.meal_id),
            provider_id: none_if_blank(self.provider_id).map(ProviderId::new),
            name: self.name.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            image: none_if_blank(self.image),
        }
    }
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub meal_id: String,
    /// Kept as text: non-numeric input means quantity 1, not a 422.
    pub qty: String,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub meal_id: String,
}

/// Checkout form data (one provider group per submission).
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    /// Empty string selects the unknown bucket.
    pub provider_id: Option<String>,
    pub address: Option<String>,
    pub payment: Option<String>,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn cart_redirect(kind: &str, message: &str) -> Redirect {
    Redirect::to(&format!("/cart?{kind}={}", urlencoding::encode(message)))
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    let cart = state.cart_store(session).read().await;

    CartShowTemplate {
        cart: CartView::from(&cart),
        error: query.error,
        success: query.success,
    }
}

/// Add item to cart (HTMX), or stage it across a login redirect.
///
/// The plain add returns the refreshed count badge with an HTMX trigger to
/// update other fragments. "Order now" (`buy_now`) heads for the cart page
/// instead; anonymous visitors detour through login and the add is replayed
/// by the login handler.
#[instrument(skip(state, session, auth))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(auth): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let buy_now = form.buy_now.unwrap_or(false);

    if buy_now && auth.is_none() {
        let pending = PendingCartAdd {
            meal_id: MealId::new(form.meal_id.clone()),
            provider_id: none_if_blank(form.provider_id.clone()).map(ProviderId::new),
            name: form.name.clone().unwrap_or_default(),
            price: form.price.unwrap_or_default(),
            image: none_if_blank(form.image.clone()),
        };
        if let Err(e) = session.insert(session_keys::PENDING_CART_ADD, &pending).await {
            tracing::error!("Failed to stash pending cart add: {e}");
        }
        return Redirect::to("/auth/login?next=/cart").into_response();
    }

    let cart = state.cart_store(session).add(form.into_snapshot()).await;

    if buy_now {
        return Redirect::to("/cart").into_response();
    }

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.item_count(),
        },
    )
        .into_response()
}

/// Update cart item quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> impl IntoResponse {
    // Invalid input means 1; the store floors it there anyway.
    let qty = form.qty.trim().parse::<u32>().unwrap_or(1);
    let cart = state
        .cart_store(session)
        .update_qty(&MealId::new(form.meal_id), qty)
        .await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> impl IntoResponse {
    let cart = state
        .cart_store(session)
        .remove(&MealId::new(form.meal_id))
        .await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(&cart),
        },
    )
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = state.cart_store(session).read().await;

    CartCountTemplate {
        count: cart.item_count(),
    }
}

/// Submit one provider group as an order.
///
/// Requires a logged-in customer. On success the submitted group is cleared
/// from the cart (one store mutation, one notification) and the page
/// redirects back to the cart - whose fresh GET re-reads everything.
#[instrument(skip(state, session))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Response {
    let Some(address) = none_if_blank(form.address.clone()) else {
        return cart_redirect("error", "Please enter delivery address").into_response();
    };

    // Checkout needs the customer role; everyone else browses only.
    let user = session
        .get::<crate::models::CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();
    let backend_session = session
        .get::<BackendSession>(session_keys::BACKEND_SESSION)
        .await
        .ok()
        .flatten();

    let (user, backend_session) = match (user, backend_session) {
        (Some(user), Some(backend_session)) => (user, backend_session),
        _ => return Redirect::to("/auth/login?next=/cart").into_response(),
    };

    if user.role != UserRole::Customer {
        return cart_redirect("error", "Only customers can place orders").into_response();
    }

    let provider_id = none_if_blank(form.provider_id).map(ProviderId::new);
    let store = state.cart_store(session);
    let cart = store.read().await;

    let items: Vec<CreateOrderItem> = cart
        .lines()
        .iter()
        .filter(|line| line.provider_id.as_ref() == provider_id.as_ref())
        .map(|line| CreateOrderItem {
            meal_id: line.id.clone(),
            quantity: line.qty,
        })
        .collect();

    if items.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let payment = form
        .payment
        .unwrap_or_else(|| "Cash on Delivery".to_string());
    let input = CreateOrderInput {
        provider_id: provider_id.clone(),
        delivery_address: address,
        items,
        note: Some(format!("Payment: {payment}")),
    };

    match state.backend().create_order(&backend_session, &input).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, "Order created");
            store.clear_for_provider(provider_id.as_ref()).await;
            cart_redirect("success", "Order placed").into_response()
        }
        Err(e) => {
            tracing::warn!("Checkout failed: {e}");
            cart_redirect("error", &e.user_message()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiffinbox_core::Cart;

    fn line(id: &str, provider: Option<&str>, price: i64) -> MealSnapshot {
        MealSnapshot {
            id: MealId::new(id),
            provider_id: provider.map(ProviderId::new),
            name: format!("meal {id}"),
            price: Decimal::from(price),
            image: None,
        }
    }

    #[test]
    fn test_cart_view_groups_and_totals() {
        let mut cart = Cart::new();
        cart.add(line("m1", Some("p1"), 100));
        cart.add(line("m1", Some("p1"), 100));
        cart.add(line("m2", None, 40));

        let view = CartView::from(&cart);
        assert_eq!(view.groups.len(), 2);
        assert_eq!(view.groups[0].provider_key, "p1");
        assert_eq!(view.groups[0].subtotal, "200");
        assert_eq!(view.groups[1].provider_label, UNKNOWN_PROVIDER);
        assert_eq!(view.groups[1].provider_key, "");
        assert_eq!(view.total, "240");
        assert_eq!(view.item_count, 3);
        assert!(!view.is_empty());
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from(&Cart::new());
        assert!(view.is_empty());
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_add_form_snapshot_blank_provider_is_unknown() {
        let form = AddToCartForm {
            meal_id: "m1".to_string(),
            provider_id: Some("  ".to_string()),
            name: None,
            price: None,
            image: Some(String::new()),
            buy_now: None,
        };
        let snapshot = form.into_snapshot();
        assert!(snapshot.provider_id.is_none());
        assert!(snapshot.image.is_none());
        assert_eq!(snapshot.price, Decimal::ZERO);
    }
}
