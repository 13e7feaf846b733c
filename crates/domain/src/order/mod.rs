//! Order aggregate and the order workflow.

mod aggregate;
mod commands;
mod id;
mod service;
mod status;
mod value_objects;

pub use aggregate::{CustomerSummary, Order, OrderItem};
pub use commands::*;
pub use id::{ORDER_ID_DIGITS, ORDER_ID_PREFIX, OrderIdGenerator};
pub use service::{DEFAULT_MAX_ID_ATTEMPTS, OrderService};
pub use status::OrderStatus;
pub use value_objects::Money;

use thiserror::Error;

/// Validation failures of order requests.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The request did not name a customer phone number.
    #[error("customer phone required")]
    PhoneRequired,

    /// Order has no items.
    #[error("order must contain at least one item")]
    NoItems,

    /// Two lines of a by-name request name the same menu item.
    #[error("duplicate menu items in order")]
    DuplicateItems,

    #[error("menu item '{name}' not found")]
    MenuItemNotFound { name: String },

    #[error("menu item with id {id} not found")]
    MenuItemIdNotFound { id: common::MenuItemId },

    #[error("menu item '{name}' is currently not available")]
    MenuItemUnavailable { name: String },

    /// Invalid quantity.
    #[error("invalid quantity {quantity} for menu item {name}")]
    InvalidQuantity { quantity: i64, name: String },

    /// A line's subtotal is more than a money column can hold.
    #[error("subtotal {amount} for menu item {name} exceeds the maximum of {max}", max = Money::MAX)]
    SubtotalTooLarge { amount: Money, name: String },

    #[error("order total {0} exceeds the maximum of {max}", max = Money::MAX)]
    TotalTooLarge(Money),

    #[error("invalid order status '{0}'")]
    InvalidStatus(String),
}
