//! Customer account route handlers: order history, cancellation, reviews.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use tiffinbox_core::{MealId, OrderId, OrderStatus};

use crate::api::types::{CreateReviewInput, Order};
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireCustomer;
use crate::orders::{self, CancelOutcome};
use crate::routes::cart::MessageQuery;
use crate::state::AppState;

/// Order summary display data for the history list.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub status: String,
    pub created_at: String,
    pub total: String,
    pub items_summary: String,
    pub can_cancel: bool,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            status: order.status.to_string(),
            created_at: order
                .created_at
                .map(|at| at.format("%d %b %Y %H:%M").to_string())
                .unwrap_or_default(),
            total: order.total_amount.to_string(),
            items_summary: items_summary(order),
            can_cancel: order.status.can_cancel(),
        }
    }
}

/// One order line on the detail page, with its review affordance.
#[derive(Clone)]
pub struct OrderItemView {
    pub meal_id: String,
    pub name: String,
    pub qty: u32,
    pub reviewed: bool,
}

fn items_summary(order: &Order) -> String {
    order
        .items
        .iter()
        .map(|item| format!("{}\u{d7} {}", item.quantity, item.meal_name()))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Templates
// =============================================================================

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub orders: Vec<OrderView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Order detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub order: OrderView,
    pub items: Vec<OrderItemView>,
    pub can_review: bool,
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the customer's order history.
#[instrument(skip(state, auth))]
pub async fn orders(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Query(query): Query<MessageQuery>,
) -> Result<OrdersTemplate> {
    let orders = state.backend().my_orders(&auth.api).await?;

    Ok(OrdersTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
        error: query.error,
        success: query.success,
    })
}

/// Display one order, with review forms once it is delivered.
#[instrument(skip(state, auth))]
pub async fn order_detail(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<OrderDetailTemplate> {
    let order_id = OrderId::new(id);
    let order = state.backend().get_order(&auth.api, &order_id).await?;

    // Mark which meals this customer already reviewed; a failure here only
    // costs the "Reviewed" tags.
    let reviewed: HashSet<MealId> = match state.backend().my_reviews(&auth.api).await {
        Ok(reviews) => reviews.into_iter().map(|review| review.meal_id).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch reviews: {e}");
            HashSet::new()
        }
    };

    let items = order
        .items
        .iter()
        .map(|item| {
            let meal_id = item.resolved_meal_id();
            OrderItemView {
                meal_id: meal_id.map_or_else(String::new, ToString::to_string),
                name: item.meal_name().to_string(),
                qty: item.quantity,
                reviewed: meal_id.is_some_and(|meal_id| reviewed.contains(meal_id)),
            }
        })
        .collect();

    Ok(OrderDetailTemplate {
        can_review: order.status == OrderStatus::Delivered,
        order: OrderView::from(&order),
        items,
        error: query.error,
        success: query.success,
    })
}

/// Cancel an order. Gated locally to `PLACED`; the backend revalidates.
///
/// On success the redirect back to the list is the authoritative re-fetch -
/// nothing is patched locally.
#[instrument(skip(state, auth))]
pub async fn cancel_order(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(id): Path<String>,
) -> Response {
    let order_id = OrderId::new(id);

    let current = match state.backend().get_order(&auth.api, &order_id).await {
        Ok(order) => order.status,
        Err(e) => {
            tracing::warn!("Failed to fetch order for cancel: {e}");
            return orders_redirect("error", &e.user_message()).into_response();
        }
    };

    match orders::cancel(state.backend(), &auth.api, &order_id, current).await {
        Ok(CancelOutcome::Cancelled(_)) => {
            orders_redirect("success", "Order cancelled").into_response()
        }
        Ok(CancelOutcome::NotCancellable) => {
            orders_redirect("error", "Only placed orders can be cancelled").into_response()
        }
        Err(e) => {
            tracing::warn!("Cancel failed: {e}");
            orders_redirect("error", &e.user_message()).into_response()
        }
    }
}

/// Review submission form data.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub meal_id: String,
    pub rating: u8,
    pub comment: Option<String>,
}

/// Submit a review for a meal from a delivered order.
#[instrument(skip(state, auth, form))]
pub async fn submit_review(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Path(id): Path<String>,
    Form(form): Form<ReviewForm>,
) -> Response {
    let order_id = OrderId::new(id);
    let back = |kind: &str, message: &str| {
        Redirect::to(&format!(
            "/account/orders/{order_id}?{kind}={}",
            urlencoding::encode(message)
        ))
    };

    if !(1..=5).contains(&form.rating) {
        return back("error", "Rating must be between 1 and 5").into_response();
    }

    // Reviews open up only after delivery.
    match state.backend().get_order(&auth.api, &order_id).await {
        Ok(order) if order.status == OrderStatus::Delivered => {}
        Ok(_) => {
            return back(
                "error",
                "Reviews can only be submitted after the order is delivered",
            )
            .into_response();
        }
        Err(e) => return back("error", &e.user_message()).into_response(),
    }

    let input = CreateReviewInput {
        meal_id: MealId::new(form.meal_id),
        order_id: order_id.clone(),
        rating: form.rating,
        comment: form
            .comment
            .filter(|comment| !comment.trim().is_empty()),
    };

    match state.backend().create_review(&auth.api, &input).await {
        Ok(_) => back("success", "Review submitted").into_response(),
        Err(e) => {
            tracing::warn!("Review submission failed: {e}");
            back("error", &e.user_message()).into_response()
        }
    }
}

fn orders_redirect(kind: &str, message: &str) -> Redirect {
    Redirect::to(&format!(
        "/account/orders?{kind}={}",
        urlencoding::encode(message)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{MealRef, OrderItem};

    #[test]
    fn test_items_summary() {
        let order = Order {
            id: OrderId::new("o1"),
            status: OrderStatus::Placed,
            total_amount: rust_decimal::Decimal::from(340),
            created_at: None,
            items: vec![
                OrderItem {
                    meal_id: Some(MealId::new("m1")),
                    meal: Some(MealRef {
                        id: None,
                        name: Some("Morog Polao".to_string()),
                    }),
                    quantity: 2,
                },
                OrderItem {
                    meal_id: Some(MealId::new("m2")),
                    meal: Some(MealRef {
                        id: None,
                        name: Some("Beguni".to_string()),
                    }),
                    quantity: 4,
                },
            ],
            customer: None,
            provider: None,
            delivery_address: None,
            note: None,
        };

        assert_eq!(items_summary(&order), "2\u{d7} Morog Polao, 4\u{d7} Beguni");
        let view = OrderView::from(&order);
        assert!(view.can_cancel);
        assert_eq!(view.total, "340");
    }
}
