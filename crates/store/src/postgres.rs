use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgPoolOptions, postgres::PgRow};

use crate::{
    CustomerId, CustomerRecord, MenuItemId, MenuItemRecord, NewCustomerRecord, NewMenuItemRecord,
    OrderId, OrderItemRecord, OrderRecord, Result, StoreError,
    store::{CustomerDirectory, MenuCatalog, OrderStore},
};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone_number, created_at";

const MENU_ITEM_COLUMNS: &str = "id, name, description, price, category, available";

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.customer_id, c.name AS customer_name, c.phone_number AS customer_phone,
           o.status, o.total_amount, o.created_at, o.updated_at
    FROM orders o
    JOIN customers c ON c.id = o.customer_id
"#;

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a new pool to the given database URL.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    fn row_to_customer(row: PgRow) -> Result<CustomerRecord> {
        Ok(CustomerRecord {
            id: CustomerId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone_number: row.try_get("phone_number")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_menu_item(row: PgRow) -> Result<MenuItemRecord> {
        Ok(MenuItemRecord {
            id: MenuItemId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            category: row.try_get("category")?,
            available: row.try_get("available")?,
        })
    }

    fn row_to_order_header(row: PgRow) -> Result<OrderRecord> {
        Ok(OrderRecord {
            id: OrderId::new(row.try_get::<String, _>("id")?),
            customer_id: CustomerId::new(row.try_get("customer_id")?),
            customer_name: row.try_get("customer_name")?,
            customer_phone: row.try_get("customer_phone")?,
            status: row.try_get("status")?,
            total_amount: row.try_get("total_amount")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            items: Vec::new(),
        })
    }

    /// Loads the item rows of every given order header in one query.
    async fn attach_items(&self, rows: Vec<PgRow>) -> Result<Vec<OrderRecord>> {
        let mut orders = rows
            .into_iter()
            .map(Self::row_to_order_header)
            .collect::<Result<Vec<_>>>()?;
        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<String> = orders.iter().map(|o| o.id.as_str().to_string()).collect();
        let item_rows = sqlx::query(
            r#"
            SELECT oi.order_id, oi.menu_item_id, m.name AS menu_item_name,
                   oi.quantity, oi.unit_price, oi.total_price
            FROM order_items oi
            JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.order_id, oi.position ASC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_order: HashMap<String, Vec<OrderItemRecord>> = HashMap::new();
        for row in item_rows {
            let order_id: String = row.try_get("order_id")?;
            items_by_order
                .entry(order_id)
                .or_default()
                .push(OrderItemRecord {
                    menu_item_id: MenuItemId::new(row.try_get("menu_item_id")?),
                    menu_item_name: row.try_get("menu_item_name")?,
                    quantity: row.try_get("quantity")?,
                    unit_price: row.try_get("unit_price")?,
                    total_price: row.try_get("total_price")?,
                });
        }

        for order in &mut orders {
            order.items = items_by_order
                .remove(order.id.as_str())
                .unwrap_or_default();
        }
        Ok(orders)
    }
}

/// Maps constraint violations to their store error, anything else to `Database`.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && let Some(constraint) = db_err.constraint()
    {
        if db_err.is_unique_violation() {
            return StoreError::duplicate(constraint);
        }
        if db_err.is_foreign_key_violation() {
            return StoreError::foreign_key(constraint);
        }
    }
    StoreError::Database(e)
}

#[async_trait]
impl CustomerDirectory for PostgresStore {
    async fn insert_customer(&self, customer: NewCustomerRecord) -> Result<CustomerRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO customers (name, email, phone_number, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(customer.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Self::row_to_customer(row)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        customer: NewCustomerRecord,
    ) -> Result<CustomerRecord> {
        let row = sqlx::query(&format!(
            "UPDATE customers SET name = $2, email = $3, phone_number = $4, created_at = $5 \
             WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone_number)
        .bind(customer.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match row {
            Some(row) => Self::row_to_customer(row),
            None => Err(StoreError::NotFound(format!("customer {id}"))),
        }
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("customer {id}")));
        }
        Ok(())
    }

    async fn find_customer_by_id(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn find_customer_by_phone(&self, phone: &str) -> Result<Option<CustomerRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone_number = $1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn list_customers(&self) -> Result<Vec<CustomerRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_customer).collect()
    }
}

#[async_trait]
impl MenuCatalog for PostgresStore {
    async fn insert_menu_item(&self, item: NewMenuItemRecord) -> Result<MenuItemRecord> {
        let row = sqlx::query(&format!(
            "INSERT INTO menu_items (name, description, price, category, available) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {MENU_ITEM_COLUMNS}"
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.available)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Self::row_to_menu_item(row)
    }

    async fn update_menu_item(
        &self,
        id: MenuItemId,
        item: NewMenuItemRecord,
    ) -> Result<MenuItemRecord> {
        let row = sqlx::query(&format!(
            "UPDATE menu_items SET name = $2, description = $3, price = $4, category = $5, \
             available = $6 WHERE id = $1 RETURNING {MENU_ITEM_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.category)
        .bind(item.available)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        match row {
            Some(row) => Self::row_to_menu_item(row),
            None => Err(StoreError::NotFound(format!("menu item {id}"))),
        }
    }

    async fn delete_menu_item(&self, id: MenuItemId) -> Result<()> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("menu item {id}")));
        }
        Ok(())
    }

    async fn find_menu_item_by_id(&self, id: MenuItemId) -> Result<Option<MenuItemRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_menu_item).transpose()
    }

    async fn find_menu_item_by_name(&self, name: &str) -> Result<Option<MenuItemRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items WHERE LOWER(name) = LOWER($1)"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_menu_item).transpose()
    }

    async fn list_menu_items(&self, available_only: bool) -> Result<Vec<MenuItemRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {MENU_ITEM_COLUMNS} FROM menu_items \
             WHERE available OR NOT $1 ORDER BY id ASC"
        ))
        .bind(available_only)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_menu_item).collect()
    }

    async fn list_categories(&self) -> Result<Vec<String>> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM menu_items ORDER BY category")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    async fn save_order(&self, order: OrderRecord) -> Result<OrderRecord> {
        // Header and items commit together or not at all
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, total_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.customer_id.as_i64())
        .bind(&order.status)
        .bind(order.total_amount)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, menu_item_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.id.as_str())
            .bind(position as i32)
            .bind(item.menu_item_id.as_i64())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.total_price)
            .execute(&mut *tx)
            .await
            .map_err(map_write_error)?;
        }

        tx.commit().await?;
        tracing::debug!(order_id = %order.id, items = order.items.len(), "order saved");

        self.find_order(&order.id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("order {}", order.id)))
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<OrderRecord>> {
        let rows = sqlx::query(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id.as_str())
            .fetch_all(&self.pool)
            .await?;

        Ok(self.attach_items(rows).await?.into_iter().next())
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<OrderRecord>> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(status)
            .bind(updated_at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_order(id).await
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(&format!(
            "{ORDER_SELECT} ORDER BY o.created_at ASC, o.id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    async fn find_orders_by_customer_phone(&self, phone: &str) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(&format!(
            "{ORDER_SELECT} WHERE c.phone_number = $1 ORDER BY o.created_at ASC, o.id ASC"
        ))
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    async fn find_latest_order_by_customer_phone(
        &self,
        phone: &str,
    ) -> Result<Option<OrderRecord>> {
        let rows = sqlx::query(&format!(
            "{ORDER_SELECT} WHERE c.phone_number = $1 \
             ORDER BY o.created_at DESC, o.id DESC LIMIT 1"
        ))
        .bind(phone)
        .fetch_all(&self.pool)
        .await?;

        Ok(self.attach_items(rows).await?.into_iter().next())
    }

    async fn find_orders_by_status(&self, status: &str) -> Result<Vec<OrderRecord>> {
        let rows = sqlx::query(&format!(
            "{ORDER_SELECT} WHERE o.status = $1 ORDER BY o.created_at ASC, o.id ASC"
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(rows).await
    }

    async fn count_orders_by_status(&self, status: &str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}
