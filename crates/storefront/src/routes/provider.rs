//! Provider dashboard route handlers: incoming orders and status advancing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use tiffinbox_core::{OrderId, OrderStatus};

use crate::api::types::Order;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireProvider;
use crate::orders::{self, AdvanceOutcome};
use crate::state::AppState;

/// Incoming order display data for the provider dashboard.
#[derive(Clone)]
pub struct ProviderOrderView {
    pub id: String,
    pub customer_name: String,
    pub items_summary: String,
    pub created_at: String,
    pub total: String,
    pub status: String,
    /// Label for the advance button; `None` hides it (terminal states).
    pub next_label: Option<String>,
}

impl From<&Order> for ProviderOrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_str().to_string(),
            customer_name: order
                .customer
                .as_ref()
                .and_then(|customer| customer.name.clone())
                .unwrap_or_else(|| "Customer".to_string()),
            items_summary: order
                .items
                .iter()
                .map(|item| format!("{}\u{d7} {}", item.quantity, item.meal_name()))
                .collect::<Vec<_>>()
                .join(", "),
            created_at: order
                .created_at
                .map(|at| at.format("%d %b %Y %H:%M").to_string())
                .unwrap_or_default(),
            total: order.total_amount.to_string(),
            status: order.status.to_string(),
            next_label: order.status.next().map(|next| format!("Mark {next}")),
        }
    }
}

/// Status filter query: `ALL` or one of the lifecycle states.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

/// Advance form data: the status the acting page displayed.
#[derive(Debug, Deserialize)]
pub struct AdvanceForm {
    pub status: OrderStatus,
}

// =============================================================================
// Templates
// =============================================================================

/// Provider orders page template.
///
/// Shares the fragment's field names so `{% include %}` resolves them.
#[derive(Template, WebTemplate)]
#[template(path = "provider/orders.html")]
pub struct ProviderOrdersTemplate {
    pub orders: Vec<ProviderOrderView>,
    pub filter: String,
    pub shown: usize,
    pub total: usize,
    pub error: Option<String>,
    pub statuses: Vec<String>,
}

/// Orders list fragment (HTMX swap target after an advance).
#[derive(Template, WebTemplate)]
#[template(path = "partials/provider_orders.html")]
pub struct ProviderOrdersFragment {
    pub orders: Vec<ProviderOrderView>,
    pub filter: String,
    pub shown: usize,
    pub total: usize,
    pub error: Option<String>,
}

fn build_fragment(orders: &[Order], filter: &str, error: Option<String>) -> ProviderOrdersFragment {
    let selected: Option<OrderStatus> = filter.parse().ok();
    let filtered: Vec<ProviderOrderView> = orders
        .iter()
        .filter(|order| selected.is_none_or(|status| order.status == status))
        .map(ProviderOrderView::from)
        .collect();

    ProviderOrdersFragment {
        shown: filtered.len(),
        total: orders.len(),
        orders: filtered,
        filter: filter.to_string(),
        error,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display incoming orders, optionally filtered by status.
#[instrument(skip(state, auth))]
pub async fn orders(
    State(state): State<AppState>,
    RequireProvider(auth): RequireProvider,
    Query(query): Query<OrdersQuery>,
) -> Result<ProviderOrdersTemplate> {
    let orders = state.backend().provider_orders(&auth.api).await?;
    let filter = query.status.unwrap_or_else(|| "ALL".to_string());
    let fragment = build_fragment(&orders, &filter, None);

    Ok(ProviderOrdersTemplate {
        orders: fragment.orders,
        filter: fragment.filter,
        shown: fragment.shown,
        total: fragment.total,
        error: fragment.error,
        statuses: OrderStatus::ALL.iter().map(ToString::to_string).collect(),
    })
}

/// Advance one order along the status chain (HTMX).
///
/// The next status is computed locally from the table; terminal states
/// never reach the network. Whatever happens, the response is a freshly
/// re-fetched list - the display always reflects the backend, never an
/// optimistic patch.
#[instrument(skip(state, auth, form))]
pub async fn advance_order(
    State(state): State<AppState>,
    RequireProvider(auth): RequireProvider,
    Path(id): Path<String>,
    Form(form): Form<AdvanceForm>,
) -> impl IntoResponse {
    let order_id = OrderId::new(id);

    let error = match orders::advance(state.backend(), &auth.api, &order_id, form.status).await {
        Ok(AdvanceOutcome::Advanced(order)) => {
            tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
            None
        }
        Ok(AdvanceOutcome::Terminal) => None,
        Err(e) => {
            tracing::warn!("Failed to advance order: {e}");
            Some(e.user_message())
        }
    };

    // Authoritative re-fetch; on failure keep rendering what the backend
    // last told us (an empty list plus the error line).
    let orders = match state.backend().provider_orders(&auth.api).await {
        Ok(orders) => orders,
        Err(e) => {
            tracing::warn!("Failed to re-fetch provider orders: {e}");
            return build_fragment(&[], "ALL", Some(e.user_message()));
        }
    };

    build_fragment(&orders, "ALL", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn order(id: &str, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(id),
            status,
            total_amount: Decimal::from(100),
            created_at: None,
            items: Vec::new(),
            customer: None,
            provider: None,
            delivery_address: None,
            note: None,
        }
    }

    #[test]
    fn test_fragment_filtering() {
        let orders = vec![
            order("o1", OrderStatus::Placed),
            order("o2", OrderStatus::Ready),
            order("o3", OrderStatus::Placed),
        ];

        let all = build_fragment(&orders, "ALL", None);
        assert_eq!(all.shown, 3);
        assert_eq!(all.total, 3);

        let placed = build_fragment(&orders, "PLACED", None);
        assert_eq!(placed.shown, 2);
        assert_eq!(placed.total, 3);

        // Garbage filters fall back to showing everything.
        let garbage = build_fragment(&orders, "WHATEVER", None);
        assert_eq!(garbage.shown, 3);
    }

    #[test]
    fn test_next_label_follows_the_chain() {
        let view = ProviderOrderView::from(&order("o1", OrderStatus::Placed));
        assert_eq!(view.next_label.as_deref(), Some("Mark PREPARING"));

        let view = ProviderOrderView::from(&order("o2", OrderStatus::Ready));
        assert_eq!(view.next_label.as_deref(), Some("Mark DELIVERED"));

        // Terminal states offer no action.
        let view = ProviderOrderView::from(&order("o3", OrderStatus::Delivered));
        assert!(view.next_label.is_none());
        let view = ProviderOrderView::from(&order("o4", OrderStatus::Cancelled));
        assert!(view.next_label.is_none());
    }
}
