use thiserror::Error;

/// Names of the unique and foreign-key constraints the backends enforce.
///
/// The in-memory store reports the same names as the PostgreSQL schema so
/// callers can match on them regardless of backend.
pub mod constraints {
    pub const ORDERS_PKEY: &str = "orders_pkey";
    pub const CUSTOMERS_EMAIL_KEY: &str = "customers_email_key";
    pub const CUSTOMERS_PHONE_KEY: &str = "customers_phone_number_key";
    pub const MENU_ITEMS_NAME_KEY: &str = "menu_items_name_lower_key";
    pub const ORDERS_CUSTOMER_FKEY: &str = "orders_customer_id_fkey";
    pub const ORDER_ITEMS_MENU_ITEM_FKEY: &str = "order_items_menu_item_id_fkey";
}

/// Errors that can occur when interacting with the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated a unique constraint.
    #[error("Duplicate key violates unique constraint {constraint}")]
    DuplicateKey { constraint: String },

    /// A write or delete violated a foreign-key constraint.
    #[error("Foreign key constraint {constraint} violated")]
    ForeignKey { constraint: String },

    /// The row targeted by an update or delete does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    /// Returns true if this is a unique violation of the given constraint.
    pub fn is_duplicate_of(&self, name: &str) -> bool {
        matches!(self, StoreError::DuplicateKey { constraint } if constraint == name)
    }

    pub(crate) fn duplicate(constraint: &str) -> Self {
        StoreError::DuplicateKey {
            constraint: constraint.to_string(),
        }
    }

    pub(crate) fn foreign_key(constraint: &str) -> Self {
        StoreError::ForeignKey {
            constraint: constraint.to_string(),
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_duplicate_of_matches_constraint_name() {
        let err = StoreError::duplicate(constraints::ORDERS_PKEY);
        assert!(err.is_duplicate_of(constraints::ORDERS_PKEY));
        assert!(!err.is_duplicate_of(constraints::CUSTOMERS_EMAIL_KEY));
        assert!(!StoreError::NotFound("x".into()).is_duplicate_of(constraints::ORDERS_PKEY));
    }
}
