//! Menu catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::MenuItemId;
use domain::{MenuItemRecord, NewMenuItem};
use store::RestaurantStore;

use super::{AppState, json_body};
use crate::error::ApiError;

/// GET /api/menu: items that can currently be ordered.
#[tracing::instrument(skip(state))]
pub async fn list_available<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<MenuItemRecord>>, ApiError> {
    Ok(Json(state.menu_service.list_available().await?))
}

/// GET /api/menu/categories
#[tracing::instrument(skip(state))]
pub async fn categories<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.menu_service.categories().await?))
}

/// GET /api/menu/category/{category}
#[tracing::instrument(skip(state))]
pub async fn by_category<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(category): Path<String>,
) -> Result<Json<Vec<MenuItemRecord>>, ApiError> {
    Ok(Json(state.menu_service.list_by_category(&category).await?))
}

/// GET /api/menu/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<Json<MenuItemRecord>, ApiError> {
    Ok(Json(state.menu_service.get(MenuItemId::new(id)).await?))
}

/// POST /api/menu
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<NewMenuItem>, JsonRejection>,
) -> Result<(StatusCode, Json<MenuItemRecord>), ApiError> {
    let item = state.menu_service.create(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/menu/{id}
#[tracing::instrument(skip(state, payload))]
pub async fn update<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
    payload: Result<Json<NewMenuItem>, JsonRejection>,
) -> Result<Json<MenuItemRecord>, ApiError> {
    let item = state
        .menu_service
        .update(MenuItemId::new(id), json_body(payload)?)
        .await?;
    Ok(Json(item))
}

/// DELETE /api/menu/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.menu_service.delete(MenuItemId::new(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
