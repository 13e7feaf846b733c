//! HTTP route handlers.

pub mod customers;
pub mod health;
pub mod menu;
pub mod metrics;
pub mod orders;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use domain::{CustomerService, MenuService, OrderService};
use store::RestaurantStore;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: RestaurantStore> {
    pub order_service: OrderService<S>,
    pub customer_service: CustomerService<S>,
    pub menu_service: MenuService<S>,
    pub store: S,
}

/// Unwraps a JSON body, reporting malformed payloads in the API's error
/// format.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}
