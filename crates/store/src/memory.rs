use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    CustomerId, CustomerRecord, MenuItemId, MenuItemRecord, NewCustomerRecord, NewMenuItemRecord,
    OrderId, OrderRecord, Result, StoreError, constraints,
    store::{CustomerDirectory, MenuCatalog, OrderStore},
};

#[derive(Default)]
struct Tables {
    customers: BTreeMap<CustomerId, CustomerRecord>,
    menu_items: BTreeMap<MenuItemId, MenuItemRecord>,
    /// Orders in insertion order.
    orders: Vec<OrderRecord>,
    last_customer_id: i64,
    last_menu_item_id: i64,
}

impl Tables {
    fn check_customer_unique(
        &self,
        customer: &NewCustomerRecord,
        except: Option<CustomerId>,
    ) -> Result<()> {
        for existing in self.customers.values() {
            if Some(existing.id) == except {
                continue;
            }
            if existing.email == customer.email {
                return Err(StoreError::duplicate(constraints::CUSTOMERS_EMAIL_KEY));
            }
            if existing.phone_number == customer.phone_number {
                return Err(StoreError::duplicate(constraints::CUSTOMERS_PHONE_KEY));
            }
        }
        Ok(())
    }

    fn check_menu_item_unique(
        &self,
        item: &NewMenuItemRecord,
        except: Option<MenuItemId>,
    ) -> Result<()> {
        let name = item.name.to_lowercase();
        let taken = self
            .menu_items
            .values()
            .any(|existing| Some(existing.id) != except && existing.name.to_lowercase() == name);
        if taken {
            return Err(StoreError::duplicate(constraints::MENU_ITEMS_NAME_KEY));
        }
        Ok(())
    }

    /// Joins the current customer and menu item names into a stored order.
    fn materialize(&self, order: &OrderRecord) -> OrderRecord {
        let mut order = order.clone();
        if let Some(customer) = self.customers.get(&order.customer_id) {
            order.customer_name = customer.name.clone();
            order.customer_phone = customer.phone_number.clone();
        }
        for item in &mut order.items {
            if let Some(menu_item) = self.menu_items.get(&item.menu_item_id) {
                item.menu_item_name = menu_item.name.clone();
            }
        }
        order
    }

    fn phone_of(&self, customer_id: CustomerId) -> Option<&str> {
        self.customers
            .get(&customer_id)
            .map(|c| c.phone_number.as_str())
    }
}

/// In-memory store implementation for tests and local runs.
///
/// All tables sit behind one lock, so every write, including an order with
/// all of its items, is applied in a single step.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.tables.read().await.orders.len()
    }

    /// Clears all tables.
    pub async fn clear(&self) {
        *self.tables.write().await = Tables::default();
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryStore {
    async fn insert_customer(&self, customer: NewCustomerRecord) -> Result<CustomerRecord> {
        let mut tables = self.tables.write().await;
        tables.check_customer_unique(&customer, None)?;

        tables.last_customer_id += 1;
        let record = CustomerRecord {
            id: CustomerId::new(tables.last_customer_id),
            name: customer.name,
            email: customer.email,
            phone_number: customer.phone_number,
            created_at: customer.created_at,
        };
        tables.customers.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        customer: NewCustomerRecord,
    ) -> Result<CustomerRecord> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Err(StoreError::NotFound(format!("customer {id}")));
        }
        tables.check_customer_unique(&customer, Some(id))?;

        let record = CustomerRecord {
            id,
            name: customer.name,
            email: customer.email,
            phone_number: customer.phone_number,
            created_at: customer.created_at,
        };
        tables.customers.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.customers.contains_key(&id) {
            return Err(StoreError::NotFound(format!("customer {id}")));
        }
        if tables.orders.iter().any(|o| o.customer_id == id) {
            return Err(StoreError::foreign_key(constraints::ORDERS_CUSTOMER_FKEY));
        }
        tables.customers.remove(&id);
        Ok(())
    }

    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<CustomerRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .customers
            .values()
            .find(|c| c.phone_number == phone)
            .cloned())
    }

    async fn list_customers(&self) -> Result<Vec<CustomerRecord>> {
        Ok(self.tables.read().await.customers.values().cloned().collect())
    }
}

#[async_trait]
impl MenuCatalog for InMemoryStore {
    async fn insert_menu_item(&self, item: NewMenuItemRecord) -> Result<MenuItemRecord> {
        let mut tables = self.tables.write().await;
        tables.check_menu_item_unique(&item, None)?;

        tables.last_menu_item_id += 1;
        let record = MenuItemRecord {
            id: MenuItemId::new(tables.last_menu_item_id),
            name: item.name,
            description: item.description,
            price: item.price,
            category: item.category,
            available: item.available,
        };
        tables.menu_items.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        item: NewMenuItemRecord,
    ) -> Result<MenuItemRecord> {
        let mut tables = self.tables.write().await;
        if !tables.menu_items.contains_key(&id) {
            return Err(StoreError::NotFound(format!("menu item {id}")));
        }
        tables.check_menu_item_unique(&item, Some(id))?;

        let record = MenuItemRecord {
            id,
            name: item.name,
            description: item.description,
            price: item.price,
            category: item.category,
            available: item.available,
        };
        tables.menu_items.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<()> {
        let mut tables = self.tables.write().await;
        if !tables.menu_items.contains_key(&id) {
            return Err(StoreError::NotFound(format!("menu item {id}")));
        }
        let referenced = tables
            .orders
            .iter()
            .flat_map(|o| o.items.iter())
            .any(|item| item.menu_item_id == id);
        if referenced {
            return Err(StoreError::foreign_key(
                constraints::ORDER_ITEMS_MENU_ITEM_FKEY,
            ));
        }
        tables.menu_items.remove(&id);
        Ok(())
    }

    async fn find_menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItemRecord>> {
        Ok(self.tables.read().await.menu_items.get(&id).cloned())
    }

    async fn find_menu_item_by_name(&self, name: &str) -> Result<Option<MenuItemRecord>> {
        let name = name.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .menu_items
            .values()
            .find(|item| item.name.to_lowercase() == name)
            .cloned())
    }

    async fn list_menu_items(&self, available_only: bool) -> Result<Vec<MenuItemRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .menu_items
            .values()
            .filter(|item| !available_only || item.available)
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<String> = tables
            .menu_items
            .values()
            .map(|item| item.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn save_order(&self, order: OrderRecord) -> Result<OrderRecord> {
        let mut tables = self.tables.write().await;

        if tables.orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::duplicate(constraints::ORDERS_PKEY));
        }
        if !tables.customers.contains_key(&order.customer_id) {
            return Err(StoreError::foreign_key(constraints::ORDERS_CUSTOMER_FKEY));
        }
        if order
            .items
            .iter()
            .any(|item| !tables.menu_items.contains_key(&item.menu_item_id))
        {
            return Err(StoreError::foreign_key(
                constraints::ORDER_ITEMS_MENU_ITEM_FKEY,
            ));
        }

        let saved = tables.materialize(&order);
        tables.orders.push(order);
        Ok(saved)
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .find(|o| &o.id == id)
            .map(|o| tables.materialize(o)))
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<OrderRecord>> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.orders.iter().position(|o| &o.id == id) else {
            return Ok(None);
        };

        let order = &mut tables.orders[index];
        order.status = status.to_string();
        order.updated_at = updated_at;

        let updated = tables.materialize(&tables.orders[index]);
        Ok(Some(updated))
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.iter().map(|o| tables.materialize(o)).collect())
    }

    async fn find_orders_by_customer_phone(&self, phone: &str) -> Result<Vec<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|o| tables.phone_of(o.customer_id) == Some(phone))
            .map(|o| tables.materialize(o))
            .collect())
    }

    async fn find_latest_order_by_customer_phone(
        &self,
        phone: &str,
    ) -> Result<Option<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|o| tables.phone_of(o.customer_id) == Some(phone))
            .max_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|o| tables.materialize(o)))
    }

    async fn find_orders_by_status(&self, status: &str) -> Result<Vec<OrderRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|o| o.status == status)
            .map(|o| tables.materialize(o))
            .collect())
    }

    async fn count_orders_by_status(&self, status: &str) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.orders.iter().filter(|o| o.status == status).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    use super::*;
    use crate::OrderItemRecord;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn new_customer(name: &str, email: &str, phone: &str) -> NewCustomerRecord {
        NewCustomerRecord {
            name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
            created_at: at(0),
        }
    }

    fn new_menu_item(name: &str, cents: i64, available: bool) -> NewMenuItemRecord {
        NewMenuItemRecord {
            name: name.to_string(),
            description: String::new(),
            price: Decimal::new(cents, 2),
            category: "Pizza".to_string(),
            available,
        }
    }

    fn order(
        id: &str,
        customer: &CustomerRecord,
        item: &MenuItemRecord,
        created_at: DateTime<Utc>,
    ) -> OrderRecord {
        OrderRecord {
            id: OrderId::from(id),
            customer_id: customer.id,
            customer_name: String::new(),
            customer_phone: String::new(),
            status: "PENDING".to_string(),
            total_amount: item.price * Decimal::from(2),
            created_at,
            updated_at: created_at,
            items: vec![OrderItemRecord {
                menu_item_id: item.id,
                menu_item_name: String::new(),
                quantity: 2,
                unit_price: item.price,
                total_price: item.price * Decimal::from(2),
            }],
        }
    }

    async fn seeded() -> (InMemoryStore, CustomerRecord, MenuItemRecord) {
        let store = InMemoryStore::new();
        let customer = store
            .insert_customer(new_customer("Ana", "ana@example.com", "9951402390"))
            .await
            .unwrap();
        let item = store
            .insert_menu_item(new_menu_item("Margherita Pizza", 1299, true))
            .await
            .unwrap();
        (store, customer, item)
    }

    #[tokio::test]
    async fn insert_customer_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let a = store
            .insert_customer(new_customer("A", "a@example.com", "1"))
            .await
            .unwrap();
        let b = store
            .insert_customer(new_customer("B", "b@example.com", "2"))
            .await
            .unwrap();
        assert_eq!(a.id.as_i64(), 1);
        assert_eq!(b.id.as_i64(), 2);
    }

    #[tokio::test]
    async fn duplicate_customer_email_and_phone_are_rejected() {
        let store = InMemoryStore::new();
        store
            .insert_customer(new_customer("A", "a@example.com", "1"))
            .await
            .unwrap();

        let err = store
            .insert_customer(new_customer("B", "a@example.com", "2"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(constraints::CUSTOMERS_EMAIL_KEY));

        let err = store
            .insert_customer(new_customer("B", "b@example.com", "1"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(constraints::CUSTOMERS_PHONE_KEY));
    }

    #[tokio::test]
    async fn update_customer_may_keep_its_own_email() {
        let store = InMemoryStore::new();
        let a = store
            .insert_customer(new_customer("A", "a@example.com", "1"))
            .await
            .unwrap();
        let updated = store
            .update_customer(a.id, new_customer("A. Renamed", "a@example.com", "1"))
            .await
            .unwrap();
        assert_eq!(updated.name, "A. Renamed");
    }

    #[tokio::test]
    async fn menu_name_lookup_ignores_case() {
        let (store, _, item) = seeded().await;
        let found = store
            .find_menu_item_by_name("margherita PIZZA")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, item.id);

        let err = store
            .insert_menu_item(new_menu_item("MARGHERITA PIZZA", 100, true))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(constraints::MENU_ITEMS_NAME_KEY));
    }

    #[tokio::test]
    async fn list_menu_items_filters_unavailable() {
        let (store, _, _) = seeded().await;
        store
            .insert_menu_item(new_menu_item("Seasonal Soup", 500, false))
            .await
            .unwrap();

        assert_eq!(store.list_menu_items(false).await.unwrap().len(), 2);
        assert_eq!(store.list_menu_items(true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn save_order_rejects_duplicate_id_without_partial_write() {
        let (store, customer, item) = seeded().await;
        store
            .save_order(order("ORD11111", &customer, &item, at(1)))
            .await
            .unwrap();

        let err = store
            .save_order(order("ORD11111", &customer, &item, at(2)))
            .await
            .unwrap_err();
        assert!(err.is_duplicate_of(constraints::ORDERS_PKEY));
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn save_order_joins_customer_and_item_names() {
        let (store, customer, item) = seeded().await;
        let saved = store
            .save_order(order("ORD11111", &customer, &item, at(1)))
            .await
            .unwrap();
        assert_eq!(saved.customer_name, "Ana");
        assert_eq!(saved.customer_phone, "9951402390");
        assert_eq!(saved.items[0].menu_item_name, "Margherita Pizza");
    }

    #[tokio::test]
    async fn save_order_for_unknown_customer_is_rejected() {
        let (store, mut customer, item) = seeded().await;
        customer.id = CustomerId::new(99);
        let err = store
            .save_order(order("ORD11111", &customer, &item, at(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { .. }));
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn update_status_of_missing_order_writes_nothing() {
        let (store, _, _) = seeded().await;
        let result = store
            .update_order_status(&OrderId::from("ORD00000"), "COMPLETED", at(5))
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn latest_order_breaks_timestamp_ties_by_id() {
        let (store, customer, item) = seeded().await;
        store
            .save_order(order("ORD20000", &customer, &item, at(10)))
            .await
            .unwrap();
        store
            .save_order(order("ORD30000", &customer, &item, at(10)))
            .await
            .unwrap();
        store
            .save_order(order("ORD90000", &customer, &item, at(10) - Duration::seconds(1)))
            .await
            .unwrap();

        let latest = store
            .find_latest_order_by_customer_phone("9951402390")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id.as_str(), "ORD30000");
    }

    #[tokio::test]
    async fn status_queries_count_and_filter() {
        let (store, customer, item) = seeded().await;
        store
            .save_order(order("ORD11111", &customer, &item, at(1)))
            .await
            .unwrap();
        store
            .save_order(order("ORD22222", &customer, &item, at(2)))
            .await
            .unwrap();
        store
            .update_order_status(&OrderId::from("ORD22222"), "READY", at(3))
            .await
            .unwrap();

        assert_eq!(store.count_orders_by_status("PENDING").await.unwrap(), 1);
        assert_eq!(store.count_orders_by_status("READY").await.unwrap(), 1);
        let ready = store.find_orders_by_status("READY").await.unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0].updated_at, at(3));
    }

    #[tokio::test]
    async fn customer_with_orders_cannot_be_deleted() {
        let (store, customer, item) = seeded().await;
        store
            .save_order(order("ORD11111", &customer, &item, at(1)))
            .await
            .unwrap();

        let err = store.delete_customer(customer.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { .. }));
        let err = store.delete_menu_item(item.id).await.unwrap_err();
        assert!(matches!(err, StoreError::ForeignKey { .. }));
    }

    #[tokio::test]
    async fn categories_are_distinct_and_sorted() {
        let store = InMemoryStore::new();
        for (name, category) in [("a", "Salad"), ("b", "Pizza"), ("c", "Salad")] {
            let mut item = new_menu_item(name, 100, true);
            item.category = category.to_string();
            store.insert_menu_item(item).await.unwrap();
        }
        assert_eq!(
            store.list_categories().await.unwrap(),
            vec!["Pizza".to_string(), "Salad".to_string()]
        );
    }
}
