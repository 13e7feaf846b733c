//! Order service: the order workflow engine.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Instant;

use chrono::{DateTime, SubsecRound, Utc};
use common::{MenuItemId, OrderId};
use store::{CustomerDirectory, MenuCatalog, MenuItemRecord, OrderStore, constraints};

use crate::error::DomainError;

use super::{
    CreateOrderById, CreateOrderByName, CustomerSummary, Money, Order, OrderError,
    OrderIdGenerator, OrderItem, OrderStatus, UpdateOrderStatus,
};

/// Number of ids tried before order creation gives up.
pub const DEFAULT_MAX_ID_ATTEMPTS: u32 = 5;

/// How a requested line names its menu item.
#[derive(Debug, Clone, Copy)]
enum ItemRef<'a> {
    Name(&'a str),
    Id(MenuItemId),
}

/// One requested line before it is resolved against the catalog.
struct RequestedLine<'a> {
    item: ItemRef<'a>,
    quantity: i64,
}

/// Service for placing and tracking orders.
///
/// Both creation paths run the same pipeline: validate the request,
/// resolve the customer and every menu item, build the aggregate, then
/// persist it under a freshly generated id. Nothing is written unless
/// every check passes.
pub struct OrderService<S> {
    store: S,
    ids: Mutex<OrderIdGenerator>,
    max_attempts: u32,
}

impl<S> OrderService<S>
where
    S: CustomerDirectory + MenuCatalog + OrderStore,
{
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            ids: Mutex::new(OrderIdGenerator::from_os_rng()),
            max_attempts: DEFAULT_MAX_ID_ATTEMPTS,
        }
    }

    /// Replaces the order id generator.
    pub fn with_id_generator(mut self, generator: OrderIdGenerator) -> Self {
        self.ids = Mutex::new(generator);
        self
    }

    /// Sets how many ids are tried before creation fails. At least one
    /// attempt is always made.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places an order whose items are named by menu item name.
    #[tracing::instrument(skip(self, cmd), fields(items = cmd.items.len()))]
    pub async fn create_order_by_name(&self, cmd: CreateOrderByName) -> Result<Order, DomainError> {
        let started = Instant::now();
        let result = self.create_by_name(&cmd).await;
        record_create(&result, started);
        result
    }

    /// Places an order whose items are named by menu item id.
    #[tracing::instrument(skip(self, cmd), fields(items = cmd.items.len()))]
    pub async fn create_order_by_id(&self, cmd: CreateOrderById) -> Result<Order, DomainError> {
        let started = Instant::now();
        let result = self.create_by_id(&cmd).await;
        record_create(&result, started);
        result
    }

    async fn create_by_name(&self, cmd: &CreateOrderByName) -> Result<Order, DomainError> {
        check_request(cmd.customer_phone.as_deref(), cmd.items.len())?;
        let mut seen = HashSet::new();
        if !cmd
            .items
            .iter()
            .all(|line| seen.insert(line.menu_item_name.as_str()))
        {
            return Err(OrderError::DuplicateItems.into());
        }

        let lines = cmd
            .items
            .iter()
            .map(|line| RequestedLine {
                item: ItemRef::Name(&line.menu_item_name),
                quantity: line.quantity,
            })
            .collect::<Vec<_>>();
        self.create(cmd.customer_phone.as_deref(), &lines).await
    }

    async fn create_by_id(&self, cmd: &CreateOrderById) -> Result<Order, DomainError> {
        let lines = cmd
            .items
            .iter()
            .map(|line| RequestedLine {
                item: ItemRef::Id(line.menu_item_id),
                quantity: line.quantity,
            })
            .collect::<Vec<_>>();
        self.create(cmd.customer_phone.as_deref(), &lines).await
    }

    async fn create(
        &self,
        phone: Option<&str>,
        lines: &[RequestedLine<'_>],
    ) -> Result<Order, DomainError> {
        let phone = check_request(phone, lines.len())?;

        let customer = self
            .store
            .find_customer_by_phone(phone)
            .await?
            .ok_or_else(|| DomainError::CustomerNotRegistered {
                phone: phone.to_string(),
            })?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            items.push(self.resolve_line(line).await?);
        }

        self.place_order(CustomerSummary::from(&customer), items)
            .await
    }

    /// Resolves one requested line into an order item, snapshotting the
    /// current catalog price.
    async fn resolve_line(&self, line: &RequestedLine<'_>) -> Result<OrderItem, DomainError> {
        let menu_item = match line.item {
            ItemRef::Name(name) => {
                let menu_item = self.store.find_menu_item_by_name(name).await?.ok_or_else(
                    || OrderError::MenuItemNotFound {
                        name: name.to_string(),
                    },
                )?;
                if !menu_item.available {
                    return Err(OrderError::MenuItemUnavailable {
                        name: menu_item.name,
                    }
                    .into());
                }
                menu_item
            }
            // Unavailable items are hidden from id lookups altogether.
            ItemRef::Id(id) => self
                .store
                .find_menu_item_by_id(id)
                .await?
                .filter(|menu_item| menu_item.available)
                .ok_or(OrderError::MenuItemIdNotFound { id })?,
        };

        let quantity = check_quantity(line.quantity, &menu_item)?;
        let unit_price = Money::from_decimal(menu_item.price).ok_or_else(|| {
            DomainError::Corrupt(format!(
                "menu item {} has price {} with more than two decimals",
                menu_item.id, menu_item.price
            ))
        })?;

        Ok(OrderItem::new(
            menu_item.id,
            menu_item.name,
            quantity,
            unit_price,
        ))
    }

    /// Persists a new order, retrying with a fresh id whenever the
    /// generated one is already taken.
    async fn place_order(
        &self,
        customer: CustomerSummary,
        items: Vec<OrderItem>,
    ) -> Result<Order, DomainError> {
        let now = Utc::now().trunc_subsecs(6);

        for attempt in 1..=self.max_attempts {
            let id = self.next_id();
            let order = Order::place(id, customer.clone(), items.clone(), now)?;

            match self.store.save_order(order.to_record()).await {
                Ok(saved) => {
                    let order = Order::from_record(saved)?;
                    tracing::info!(
                        order_id = %order.id(),
                        total = %order.total_amount(),
                        attempt,
                        "order created"
                    );
                    return Ok(order);
                }
                Err(e) if e.is_duplicate_of(constraints::ORDERS_PKEY) => {
                    metrics::counter!("order_id_collisions_total").increment(1);
                    tracing::warn!(order_id = %order.id(), attempt, "order id already taken, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(DomainError::OrderIdExhausted {
            attempts: self.max_attempts,
        })
    }

    fn next_id(&self) -> OrderId {
        // A panic while holding the lock cannot leave the generator in a
        // broken state, so a poisoned lock is still usable.
        let mut ids = self
            .ids
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.generate()
    }

    /// Moves an order to another status.
    ///
    /// Any status may follow any other. Fails with `OrderNotFound` if the
    /// order does not exist, in which case nothing is written.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, cmd: UpdateOrderStatus) -> Result<Order, DomainError> {
        let status = cmd.status.parse::<OrderStatus>()?;

        let mut order = self
            .load(&cmd.order_id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(cmd.order_id.clone()))?;
        let previous = order.status();
        order.change_status(status, now());

        let saved = self
            .store
            .update_order_status(order.id(), status.as_str(), order.updated_at())
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(cmd.order_id.clone()))?;

        metrics::counter!("order_status_updates_total").increment(1);
        tracing::info!(order_id = %cmd.order_id, from = %previous, to = %status, "order status updated");
        Order::from_record(saved)
    }

    // Queries

    /// Loads an order by id.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        self.store
            .find_order(id)
            .await?
            .map(Order::from_record)
            .transpose()
    }

    /// Fetches an order by id, failing with `OrderNotFound` if absent.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.load(id)
            .await?
            .ok_or_else(|| DomainError::OrderNotFound(id.clone()))
    }

    /// Returns every order in storage order.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        to_orders(self.store.list_orders().await?)
    }

    /// Returns all orders placed by the customer with the given phone.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_phone(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        to_orders(self.store.find_orders_by_customer_phone(phone).await?)
    }

    /// Returns the most recent order for a phone number.
    ///
    /// Orders placed at the same instant are ordered by id, highest wins.
    /// A blank phone number is rejected.
    #[tracing::instrument(skip(self))]
    pub async fn latest_order_for_phone(&self, phone: &str) -> Result<Order, DomainError> {
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(OrderError::PhoneRequired.into());
        }

        self.store
            .find_latest_order_by_customer_phone(phone)
            .await?
            .map(Order::from_record)
            .transpose()?
            .ok_or_else(|| DomainError::NotFound(format!("no orders found for phone {phone}")))
    }

    #[tracing::instrument(skip(self))]
    pub async fn orders_with_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        to_orders(self.store.find_orders_by_status(status.as_str()).await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn count_with_status(&self, status: OrderStatus) -> Result<u64, DomainError> {
        Ok(self.store.count_orders_by_status(status.as_str()).await?)
    }
}

/// Checks the parts of a request that need no lookups and returns the
/// trimmed phone number.
fn check_request(phone: Option<&str>, line_count: usize) -> Result<&str, OrderError> {
    let phone = phone
        .map(str::trim)
        .filter(|phone| !phone.is_empty())
        .ok_or(OrderError::PhoneRequired)?;
    if line_count == 0 {
        return Err(OrderError::NoItems);
    }
    Ok(phone)
}

fn check_quantity(quantity: i64, menu_item: &MenuItemRecord) -> Result<u32, OrderError> {
    if quantity <= 0 || quantity > i64::from(i32::MAX) {
        return Err(OrderError::InvalidQuantity {
            quantity,
            name: menu_item.name.clone(),
        });
    }
    Ok(quantity as u32)
}

fn record_create(result: &Result<Order, DomainError>, started: Instant) {
    metrics::histogram!("order_create_duration_seconds").record(started.elapsed().as_secs_f64());
    match result {
        Ok(_) => metrics::counter!("orders_created_total").increment(1),
        Err(e) => {
            metrics::counter!("order_create_failures_total", "kind" => e.kind().as_str())
                .increment(1);
            tracing::debug!(error = %e, "order creation rejected");
        }
    }
}

fn to_orders(records: Vec<store::OrderRecord>) -> Result<Vec<Order>, DomainError> {
    records.into_iter().map(Order::from_record).collect()
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
