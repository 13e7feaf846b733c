//! Customer directory endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::CustomerId;
use domain::{CustomerRecord, NewCustomer};
use store::RestaurantStore;

use super::{AppState, json_body};
use crate::error::ApiError;

/// POST /api/customers
#[tracing::instrument(skip(state, payload))]
pub async fn register<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerRecord>), ApiError> {
    let customer = state
        .customer_service
        .register(json_body(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/customers
#[tracing::instrument(skip(state))]
pub async fn list<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<CustomerRecord>>, ApiError> {
    Ok(Json(state.customer_service.list().await?))
}

/// GET /api/customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerRecord>, ApiError> {
    Ok(Json(
        state
            .customer_service
            .get_by_id(CustomerId::new(id))
            .await?,
    ))
}

/// PUT /api/customers/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    payload: Result<Json<NewCustomer>, JsonRejection>,
) -> Result<Json<CustomerRecord>, ApiError> {
    let customer = state
        .customer_service
        .update(CustomerId::new(id), json_body(payload)?)
        .await?;
    Ok(Json(customer))
}

/// DELETE /api/customers/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.customer_service.delete(CustomerId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/customers/email/{email}
#[tracing::instrument(skip(state))]
pub async fn by_email<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<CustomerRecord>, ApiError> {
    Ok(Json(state.customer_service.get_by_email(&email).await?))
}

/// GET /api/customers/phone/{phone}
#[tracing::instrument(skip(state))]
pub async fn by_phone<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(phone): Path<String>,
) -> Result<Json<CustomerRecord>, ApiError> {
    Ok(Json(state.customer_service.get_by_phone(&phone).await?))
}

/// DELETE /api/customers/phone/{phone}
#[tracing::instrument(skip(state))]
pub async fn delete_by_phone<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(phone): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.customer_service.delete_by_phone(&phone).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/customers/exists/email/{email}
pub async fn email_exists<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(email): Path<String>,
) -> Result<Json<bool>, ApiError> {
    Ok(Json(state.customer_service.email_exists(&email).await?))
}

/// GET /api/customers/exists/phone/{phone}
pub async fn phone_exists<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(phone): Path<String>,
) -> Result<Json<bool>, ApiError> {
    Ok(Json(state.customer_service.phone_exists(&phone).await?))
}
