//! Order commands.

use common::{MenuItemId, OrderId};
use serde::Deserialize;

/// A requested line naming the menu item by its name.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemByName {
    pub menu_item_name: String,
    /// Kept wide so that out-of-range values are reported, not truncated.
    pub quantity: i64,
}

impl ItemByName {
    pub fn new(menu_item_name: impl Into<String>, quantity: i64) -> Self {
        Self {
            menu_item_name: menu_item_name.into(),
            quantity,
        }
    }
}

/// A requested line naming the menu item by its id.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemById {
    pub menu_item_id: MenuItemId,
    pub quantity: i64,
}

impl ItemById {
    pub fn new(menu_item_id: impl Into<MenuItemId>, quantity: i64) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            quantity,
        }
    }
}

/// Command to place an order with items named by menu item name.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderByName {
    /// Phone number of a registered customer.
    #[serde(default)]
    pub customer_phone: Option<String>,

    #[serde(default)]
    pub items: Vec<ItemByName>,
}

impl CreateOrderByName {
    /// Creates a new CreateOrderByName command.
    pub fn new(customer_phone: impl Into<String>, items: Vec<ItemByName>) -> Self {
        Self {
            customer_phone: Some(customer_phone.into()),
            items,
        }
    }
}

/// Command to place an order with items named by menu item id.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderById {
    #[serde(default)]
    pub customer_phone: Option<String>,

    #[serde(default, rename = "order_items")]
    pub items: Vec<ItemById>,
}

impl CreateOrderById {
    /// Creates a new CreateOrderById command.
    pub fn new(customer_phone: impl Into<String>, items: Vec<ItemById>) -> Self {
        Self {
            customer_phone: Some(customer_phone.into()),
            items,
        }
    }
}

/// Command to move an order to another status.
#[derive(Debug, Clone)]
pub struct UpdateOrderStatus {
    pub order_id: OrderId,

    /// Status name as supplied by the caller; parsed by the service.
    pub status: String,
}

impl UpdateOrderStatus {
    /// Creates a new UpdateOrderStatus command.
    pub fn new(order_id: impl Into<OrderId>, status: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            status: status.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_id_payload_uses_order_items_field() {
        let cmd: CreateOrderById = serde_json::from_str(
            r#"{"customer_phone":"123-456-7890","order_items":[{"menu_item_id":3,"quantity":2}]}"#,
        )
        .unwrap();
        assert_eq!(cmd.items.len(), 1);
        assert_eq!(cmd.items[0].menu_item_id, MenuItemId::new(3));
    }

    #[test]
    fn missing_phone_and_items_deserialize_as_empty() {
        let cmd: CreateOrderByName = serde_json::from_str("{}").unwrap();
        assert!(cmd.customer_phone.is_none());
        assert!(cmd.items.is_empty());
    }
}
