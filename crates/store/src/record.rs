//! Row-shaped records exchanged with the storage backends.
//!
//! Money columns are `NUMERIC(10,2)` in PostgreSQL and travel as
//! [`Decimal`] so no binary floating point is involved anywhere.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CustomerId, MenuItemId, OrderId};

/// A registered customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// Column values for inserting or replacing a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomerRecord {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

/// A menu item as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemRecord {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub available: bool,
}

/// Column values for inserting or replacing a menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMenuItemRecord {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub available: bool,
}

/// An order header together with all of its item rows.
///
/// `customer_name`, `customer_phone` and the item names are joined in on
/// read; they are ignored when the record is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub customer_phone: String,
    pub status: String,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Item rows in insertion order.
    pub items: Vec<OrderItemRecord>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub menu_item_id: MenuItemId,
    pub menu_item_name: String,
    pub quantity: i32,
    /// Price captured when the order was placed.
    pub unit_price: Decimal,
    pub total_price: Decimal,
}
