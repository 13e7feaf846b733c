//! Shared identifier types used across the restaurant order service.

mod types;

pub use types::{CustomerId, MenuItemId, OrderId};
