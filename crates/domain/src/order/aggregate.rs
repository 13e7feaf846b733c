//! Order aggregate implementation.

use chrono::{DateTime, Duration, Utc};
use common::{CustomerId, MenuItemId, OrderId};
use serde::{Deserialize, Serialize};
use store::{CustomerRecord, OrderItemRecord, OrderRecord};

use crate::error::DomainError;

use super::{Money, OrderError, OrderStatus};

/// The customer an order belongs to, as shown on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub phone_number: String,
}

impl From<&CustomerRecord> for CustomerSummary {
    fn from(customer: &CustomerRecord) -> Self {
        Self {
            id: customer.id,
            name: customer.name.clone(),
            phone_number: customer.phone_number.clone(),
        }
    }
}

/// An item in an order.
///
/// The unit price is a snapshot taken when the order was placed and is
/// never refreshed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The menu item ordered.
    pub menu_item_id: MenuItemId,

    /// Human-readable menu item name.
    pub menu_item_name: String,

    /// Quantity ordered, always greater than zero.
    pub quantity: u32,

    /// Price per unit at order time.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        menu_item_id: MenuItemId,
        menu_item_name: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            menu_item_id,
            menu_item_name: menu_item_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Order aggregate root.
///
/// An order owns its items. Both are written together and, once stored,
/// only the status and the updated-at timestamp change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    customer: CustomerSummary,
    status: OrderStatus,
    /// Items in the order they were requested.
    items: Vec<OrderItem>,
    /// Sum of item totals; derived, never set directly.
    total_amount: Money,
    ordered_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

// Query methods
impl Order {
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the order number printed on receipts, which is the id.
    pub fn order_number(&self) -> &str {
        self.id.as_str()
    }

    pub fn customer(&self) -> &CustomerSummary {
        &self.customer
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// Command methods
impl Order {
    /// Places a new pending order.
    ///
    /// Fails if there are no items, any quantity is zero, or a subtotal or
    /// the total is above [`Money::MAX`].
    pub fn place(
        id: OrderId,
        customer: CustomerSummary,
        items: Vec<OrderItem>,
        now: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if items.is_empty() {
            return Err(OrderError::NoItems);
        }
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                quantity: 0,
                name: item.menu_item_name.clone(),
            });
        }
        if let Some(item) = items.iter().find(|item| item.total_price() > Money::MAX) {
            return Err(OrderError::SubtotalTooLarge {
                amount: item.total_price(),
                name: item.menu_item_name.clone(),
            });
        }

        let mut order = Self {
            id,
            customer,
            status: OrderStatus::default(),
            items,
            total_amount: Money::zero(),
            ordered_at: now,
            updated_at: now,
        };
        order.recalculate_total();
        if order.total_amount > Money::MAX {
            return Err(OrderError::TotalTooLarge(order.total_amount));
        }
        Ok(order)
    }

    /// Moves the order to a new status.
    ///
    /// Any status may follow any other. The updated-at timestamp always
    /// moves forward, even if the clock has not. The total is untouched.
    pub fn change_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now.max(self.updated_at + Duration::microseconds(1));
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(OrderItem::total_price).sum();
    }
}

// Storage mapping
impl Order {
    /// Converts the aggregate into its storage record.
    pub fn to_record(&self) -> OrderRecord {
        OrderRecord {
            id: self.id.clone(),
            customer_id: self.customer.id,
            customer_name: self.customer.name.clone(),
            customer_phone: self.customer.phone_number.clone(),
            status: self.status.as_str().to_string(),
            total_amount: self.total_amount.amount(),
            created_at: self.ordered_at,
            updated_at: self.updated_at,
            items: self
                .items
                .iter()
                .map(|item| OrderItemRecord {
                    menu_item_id: item.menu_item_id,
                    menu_item_name: item.menu_item_name.clone(),
                    quantity: item.quantity as i32,
                    unit_price: item.unit_price.amount(),
                    total_price: item.total_price().amount(),
                })
                .collect(),
        }
    }

    /// Rebuilds the aggregate from a stored record.
    ///
    /// The stored total is kept as written; it was derived from the same
    /// items when the order was placed.
    pub fn from_record(record: OrderRecord) -> Result<Self, DomainError> {
        let status = record
            .status
            .parse::<OrderStatus>()
            .map_err(|e| DomainError::Corrupt(format!("order {}: {e}", record.id)))?;

        let items = record
            .items
            .into_iter()
            .map(|item| {
                let quantity = u32::try_from(item.quantity).map_err(|_| {
                    DomainError::Corrupt(format!(
                        "order {}: negative quantity {}",
                        record.id, item.quantity
                    ))
                })?;
                let unit_price = money_from_column(item.unit_price, &record.id)?;
                Ok(OrderItem::new(
                    item.menu_item_id,
                    item.menu_item_name,
                    quantity,
                    unit_price,
                ))
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(Self {
            total_amount: money_from_column(record.total_amount, &record.id)?,
            id: record.id,
            customer: CustomerSummary {
                id: record.customer_id,
                name: record.customer_name,
                phone_number: record.customer_phone,
            },
            status,
            items,
            ordered_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

fn money_from_column(value: rust_decimal::Decimal, id: &OrderId) -> Result<Money, DomainError> {
    Money::from_decimal(value)
        .ok_or_else(|| DomainError::Corrupt(format!("order {id}: amount {value} exceeds cents")))
}
