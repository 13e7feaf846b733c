//! Domain error types.

use common::OrderId;
use store::StoreError;
use thiserror::Error;

use crate::order::OrderError;

/// Coarse classification of a domain failure, used by callers to decide
/// how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input or a business-rule violation.
    BadRequest,
    /// An unknown customer, menu item or order.
    NotFound,
    /// A uniqueness or reference constraint was violated.
    Conflict,
    /// An unexpected failure in the backing store.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An order request failed validation.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A customer or menu item payload failed validation.
    #[error("{0}")]
    Validation(String),

    /// No customer is registered under the phone number of an order request.
    #[error("customer with phone {phone} is not registered")]
    CustomerNotRegistered { phone: String },

    #[error("order not found with id {0}")]
    OrderNotFound(OrderId),

    /// A customer or menu item lookup by id or key found nothing.
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Every generated order id collided with an existing order.
    #[error("could not allocate a unique order id after {attempts} attempts")]
    OrderIdExhausted { attempts: u32 },

    /// Stored data could not be mapped back into the domain model.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl DomainError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Order(_) | DomainError::Validation(_) => ErrorKind::BadRequest,
            DomainError::CustomerNotRegistered { .. }
            | DomainError::OrderNotFound(_)
            | DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::Conflict(_) | DomainError::OrderIdExhausted { .. } => ErrorKind::Conflict,
            DomainError::Store(StoreError::DuplicateKey { .. } | StoreError::ForeignKey { .. }) => {
                ErrorKind::Conflict
            }
            DomainError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            DomainError::Corrupt(_) | DomainError::Store(_) => ErrorKind::Internal,
        }
    }
}
