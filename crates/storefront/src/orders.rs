//! Order lifecycle actions.
//!
//! The accepted transition is computed locally from the table in
//! [`OrderStatus`], then requested remotely. On success the caller re-reads
//! the authoritative order collection from the backend instead of patching
//! local state - displayed status is always the backend's, at the price of
//! one extra round trip.

use tiffinbox_core::{OrderId, OrderStatus};

use crate::api::types::{BackendSession, Order};
use crate::api::{ApiError, BackendClient};

/// Result of attempting to advance an order.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// The backend accepted the transition; re-fetch the collection.
    Advanced(Order),
    /// The order is already terminal. No request was issued.
    Terminal,
}

/// Result of attempting to cancel an order.
#[derive(Debug)]
pub enum CancelOutcome {
    /// The backend accepted the cancellation; re-fetch the collection.
    Cancelled(Order),
    /// The order has moved past `PLACED`. No request was issued.
    NotCancellable,
}

/// Advance an order one step along the provider chain.
///
/// `current` is the status the acting page displayed. Terminal states are
/// rejected locally without touching the network; the backend still
/// revalidates whatever we send.
///
/// # Errors
///
/// Returns the backend's error when the remote transition is refused; the
/// displayed state is then left unchanged.
pub async fn advance(
    backend: &BackendClient,
    auth: &BackendSession,
    id: &OrderId,
    current: OrderStatus,
) -> Result<AdvanceOutcome, ApiError> {
    let Some(next) = current.next() else {
        return Ok(AdvanceOutcome::Terminal);
    };

    let order = backend.update_order_status(auth, id, next).await?;
    Ok(AdvanceOutcome::Advanced(order))
}

/// Cancel an order, permitted only while it is still `PLACED`.
///
/// # Errors
///
/// Returns the backend's error when the remote cancellation is refused.
pub async fn cancel(
    backend: &BackendClient,
    auth: &BackendSession,
    id: &OrderId,
    current: OrderStatus,
) -> Result<CancelOutcome, ApiError> {
    if !current.can_cancel() {
        return Ok(CancelOutcome::NotCancellable);
    }

    let order = backend.cancel_order(auth, id).await?;
    Ok(CancelOutcome::Cancelled(order))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::types::BackendSession;
    use crate::config::BackendConfig;

    /// A client pointing at a dead address: any issued request errors, so
    /// an `Ok` outcome proves the network was never touched.
    fn dead_backend() -> BackendClient {
        BackendClient::new(&BackendConfig::new("http://127.0.0.1:9").unwrap())
    }

    fn auth() -> BackendSession {
        BackendSession::from_set_cookie("sid=test").unwrap()
    }

    #[tokio::test]
    async fn test_advance_is_a_no_op_on_terminal_states() {
        let backend = dead_backend();
        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            let outcome = advance(&backend, &auth(), &OrderId::new("o1"), status)
                .await
                .unwrap();
            assert!(matches!(outcome, AdvanceOutcome::Terminal));
        }
    }

    #[tokio::test]
    async fn test_cancel_rejected_locally_when_not_placed() {
        let backend = dead_backend();
        for status in [
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let outcome = cancel(&backend, &auth(), &OrderId::new("o1"), status)
                .await
                .unwrap();
            assert!(matches!(outcome, CancelOutcome::NotCancellable));
        }
    }

    #[tokio::test]
    async fn test_advance_from_placed_issues_a_request() {
        // With a dead backend the request itself must fail, proving the
        // non-terminal path does reach for the network.
        let backend = dead_backend();
        let result = advance(&backend, &auth(), &OrderId::new("o1"), OrderStatus::Placed).await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn test_cancel_from_placed_issues_a_request() {
        let backend = dead_backend();
        let result = cancel(&backend, &auth(), &OrderId::new("o1"), OrderStatus::Placed).await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }
}
