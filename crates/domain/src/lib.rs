//! Domain layer for the restaurant order service.
//!
//! This crate provides:
//! - The order aggregate with its price-snapshotted items
//! - The order workflow engine: validated creation by item name or id,
//!   status transitions and reporting queries
//! - Customer directory and menu catalog services

pub mod customer;
pub mod error;
pub mod menu;
pub mod order;

pub use customer::{CustomerService, NewCustomer};
pub use error::{DomainError, ErrorKind};
pub use menu::{MenuService, NewMenuItem};
pub use order::{
    CreateOrderById, CreateOrderByName, CustomerSummary, DEFAULT_MAX_ID_ATTEMPTS, ItemById,
    ItemByName, Money, Order, OrderError, OrderIdGenerator, OrderItem, OrderService, OrderStatus,
    UpdateOrderStatus,
};
pub use store::{CustomerRecord, MenuItemRecord};
