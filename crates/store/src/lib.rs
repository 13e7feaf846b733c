pub mod error;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod store;

pub use common::{CustomerId, MenuItemId, OrderId};
pub use sqlx;
pub use error::{Result, StoreError, constraints};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use record::{
    CustomerRecord, MenuItemRecord, NewCustomerRecord, NewMenuItemRecord, OrderItemRecord,
    OrderRecord,
};
pub use store::{CustomerDirectory, MenuCatalog, OrderStore, RestaurantStore};
