use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    CustomerId, CustomerRecord, MenuItemId, MenuItemRecord, NewCustomerRecord, NewMenuItemRecord,
    OrderId, OrderRecord, Result,
};

/// Lookup and persistence of registered customers.
///
/// Email and phone number are each unique; violating either yields
/// `DuplicateKey` with the matching constraint name.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Inserts a customer and returns it with its assigned id.
    async fn insert_customer(&self, customer: NewCustomerRecord) -> Result<CustomerRecord>;

    /// Replaces every column of an existing customer.
    ///
    /// Fails with `NotFound` if the id is unknown.
    async fn update_customer(
        &self,
        id: CustomerId,
        customer: NewCustomerRecord,
    ) -> Result<CustomerRecord>;

    /// Deletes a customer.
    ///
    /// Fails with `NotFound` if the id is unknown and with `ForeignKey` if
    /// the customer still owns orders.
    async fn delete_customer(&self, id: CustomerId) -> Result<()>;

    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>>;

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerRecord>>;

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<CustomerRecord>>;

    /// Returns all customers in id order.
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>>;
}

/// Lookup and persistence of menu items.
///
/// Lookups here ignore availability; filtering is a service concern.
#[async_trait]
pub trait MenuCatalog: Send + Sync {
    async fn insert_menu_item(&self, item: NewMenuItemRecord) -> Result<MenuItemRecord>;

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        item: NewMenuItemRecord,
    ) -> Result<MenuItemRecord>;

    /// Deletes a menu item. Items referenced by orders cannot be deleted.
    async fn delete_menu_item(&self, id: MenuItemId) -> Result<()>;

    async fn find_menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItemRecord>>;

    /// Finds a menu item by name, ignoring case.
    async fn find_menu_item_by_name(&self, name: &str) -> Result<Option<MenuItemRecord>>;

    /// Returns menu items in id order, optionally restricted to available ones.
    async fn list_menu_items(&self, available_only: bool) -> Result<Vec<MenuItemRecord>>;

    /// Returns the distinct categories, sorted.
    async fn list_categories(&self) -> Result<Vec<String>>;
}

/// Persistence of the order aggregate.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Writes an order header and all of its items atomically.
    ///
    /// Either everything commits or nothing does. An id that already exists
    /// fails with `DuplicateKey` on [`ORDERS_PKEY`](crate::constraints::ORDERS_PKEY).
    /// Returns the order as read back from storage.
    async fn save_order(&self, order: OrderRecord) -> Result<OrderRecord>;

    async fn find_order(&self, id: &OrderId) -> Result<Option<OrderRecord>>;

    /// Sets the status and updated-at timestamp of an order.
    ///
    /// Returns `None` if the order does not exist; nothing is written then.
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<OrderRecord>>;

    /// Returns every order in storage order.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>>;

    async fn find_orders_by_customer_phone(&self, phone: &str) -> Result<Vec<OrderRecord>>;

    /// Returns the most recently placed order for a phone number.
    ///
    /// Orders placed at the same instant are ordered by id, highest wins.
    async fn find_latest_order_by_customer_phone(&self, phone: &str)
    -> Result<Option<OrderRecord>>;

    async fn find_orders_by_status(&self, status: &str) -> Result<Vec<OrderRecord>>;

    async fn count_orders_by_status(&self, status: &str) -> Result<u64>;
}

/// A single backend serving customers, menu items and orders.
pub trait RestaurantStore: CustomerDirectory + MenuCatalog + OrderStore + Clone + 'static {}

impl<T> RestaurantStore for T where T: CustomerDirectory + MenuCatalog + OrderStore + Clone + 'static {}
