//! Order lifecycle and user roles.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Orders move forward along a fixed chain advanced by the provider
/// (`Placed -> Preparing -> Ready -> Delivered`), with a single side exit
/// to `Cancelled` available to the customer while the order is still
/// `Placed`. `Delivered` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Placed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in lifecycle order (cancel last), for dashboard filters.
    pub const ALL: [Self; 5] = [
        Self::Placed,
        Self::Preparing,
        Self::Ready,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The provider-advanced successor. `None` for terminal states.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Placed => Some(Self::Preparing),
            Self::Preparing => Some(Self::Ready),
            Self::Ready => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether no further transition exists from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether the customer may still cancel the order.
    #[must_use]
    pub const fn can_cancel(self) -> bool {
        matches!(self, Self::Placed)
    }

    /// Validate a transition against the full table, actor included.
    ///
    /// The same table is assumed to be enforced authoritatively by the
    /// backend; this check only gates which actions the UI offers.
    #[must_use]
    pub const fn can_transition(self, to: Self, actor: UserRole) -> bool {
        matches!(
            (self, to, actor),
            (Self::Placed, Self::Preparing, UserRole::Provider)
                | (Self::Preparing, Self::Ready, UserRole::Provider)
                | (Self::Ready, Self::Delivered, UserRole::Provider)
                | (Self::Placed, Self::Cancelled, UserRole::Customer)
        )
    }

    /// Uppercase wire name, e.g. `PLACED`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "PLACED",
            Self::Preparing => "PREPARING",
            Self::Ready => "READY",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLACED" => Ok(Self::Placed),
            "PREPARING" => Ok(Self::Preparing),
            "READY" => Ok(Self::Ready),
            "DELIVERED" => Ok(Self::Delivered),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Marketplace user role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Places orders and may cancel them while still `Placed`.
    Customer,
    /// Fulfills orders and advances their status.
    Provider,
    /// Platform administration; has no order-lifecycle actions here.
    Admin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Customer => write!(f, "CUSTOMER"),
            Self::Provider => write!(f, "PROVIDER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CUSTOMER" => Ok(Self::Customer),
            "PROVIDER" => Ok(Self::Provider),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        assert_eq!(OrderStatus::Placed.next(), Some(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Preparing.next(), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::Ready.next(), Some(OrderStatus::Delivered));
    }

    #[test]
    fn test_terminal_states_have_no_next() {
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Placed.is_terminal());
    }

    #[test]
    fn test_cancel_only_from_placed() {
        assert!(OrderStatus::Placed.can_cancel());
        assert!(!OrderStatus::Preparing.can_cancel());
        assert!(!OrderStatus::Ready.can_cancel());
        assert!(!OrderStatus::Delivered.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_transition_table_actors() {
        use OrderStatus::{Cancelled, Delivered, Placed, Preparing, Ready};
        use UserRole::{Admin, Customer, Provider};

        // Provider advances the forward chain.
        assert!(Placed.can_transition(Preparing, Provider));
        assert!(Preparing.can_transition(Ready, Provider));
        assert!(Ready.can_transition(Delivered, Provider));

        // Only the customer may take the side exit, and only from Placed.
        assert!(Placed.can_transition(Cancelled, Customer));
        assert!(!Placed.can_transition(Cancelled, Provider));
        assert!(!Preparing.can_transition(Cancelled, Customer));

        // No skipping, no admin shortcuts, nothing out of a terminal state.
        assert!(!Placed.can_transition(Ready, Provider));
        assert!(!Placed.can_transition(Preparing, Customer));
        assert!(!Placed.can_transition(Preparing, Admin));
        assert!(!Delivered.can_transition(Cancelled, Customer));
        assert!(!Cancelled.can_transition(Placed, Provider));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"PREPARING\"");

        let parsed: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_status_from_str_roundtrip() {
        for status in OrderStatus::ALL {
            let parsed: OrderStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("CUSTOMER".parse::<UserRole>().unwrap(), UserRole::Customer);
        assert_eq!("PROVIDER".parse::<UserRole>().unwrap(), UserRole::Provider);
        assert!("GUEST".parse::<UserRole>().is_err());
    }
}
