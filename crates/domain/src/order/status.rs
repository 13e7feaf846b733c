//! Order status.

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of an order in the kitchen/fulfillment flow.
///
/// ```text
/// Pending ──► Confirmed ──► Preparing ──► Ready ──► Delivered ──► Completed
///    └────────────┴─────────────┴───────────┴──────────┴──────► Cancelled
/// ```
///
/// The flow above is the expected path only. Any status may be set from
/// any other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Order has been placed and not yet acknowledged by the kitchen.
    #[default]
    Pending,

    /// Kitchen has accepted the order.
    Confirmed,

    /// Order is being cooked.
    Preparing,

    /// Order is ready for pickup or delivery.
    Ready,

    /// Order has been handed to the customer.
    Delivered,

    /// Order is closed (terminal in the expected flow).
    Completed,

    /// Order was cancelled (terminal in the expected flow).
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// Returns the status name as stored and rendered.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::Ready => "READY",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    /// Parses a status name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OrderError::InvalidStatus(s.to_string()))
    }
}
