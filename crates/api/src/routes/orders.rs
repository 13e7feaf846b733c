//! Order placement, status and reporting endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::OrderId;
use domain::{
    CreateOrderById, CreateOrderByName, Money, Order, OrderItem, OrderStatus, UpdateOrderStatus,
};
use serde::{Deserialize, Serialize};
use store::RestaurantStore;

use super::{AppState, json_body};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: String,
}

// -- Response types --

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub customer_name: String,
    pub customer_phone: String,
    /// Placement time, RFC 3339.
    pub order_date: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub items: Vec<OrderItemResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub menu_item_name: String,
    pub quantity: u32,
    pub price: Money,
    pub subtotal: Money,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            menu_item_name: item.menu_item_name.clone(),
            quantity: item.quantity,
            price: item.unit_price,
            subtotal: item.total_price(),
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id().to_string(),
            order_number: order.order_number().to_string(),
            customer_name: order.customer().name.clone(),
            customer_phone: order.customer().phone_number.clone(),
            order_date: order.ordered_at().to_rfc3339(),
            status: order.status(),
            total_amount: order.total_amount(),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
        }
    }
}

fn to_responses(orders: Vec<Order>) -> Json<Vec<OrderResponse>> {
    Json(orders.into_iter().map(OrderResponse::from).collect())
}

// -- Handlers --

/// POST /api/orders/by-name: place an order naming items by menu name.
#[tracing::instrument(skip(state, payload))]
pub async fn create_by_name<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrderByName>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let cmd = json_body(payload)?;
    let order = state.order_service.create_order_by_name(cmd).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// POST /api/orders: place an order naming items by menu item id.
#[tracing::instrument(skip(state, payload))]
pub async fn create_by_id<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateOrderById>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let cmd = json_body(payload)?;
    let order = state.order_service.create_order_by_id(cmd).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// GET /api/orders: list every order.
#[tracing::instrument(skip(state))]
pub async fn list<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    Ok(to_responses(state.order_service.list_orders().await?))
}

/// GET /api/orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.get_order(&OrderId::from(id)).await?;
    Ok(Json(order.into()))
}

/// GET /api/orders/customer/phone/{phone}
#[tracing::instrument(skip(state))]
pub async fn by_phone<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(phone): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    Ok(to_responses(
        state.order_service.orders_for_phone(&phone).await?,
    ))
}

/// GET /api/orders/customer/phone/{phone}/latest
#[tracing::instrument(skip(state))]
pub async fn latest_by_phone<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(phone): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order = state.order_service.latest_order_for_phone(&phone).await?;
    Ok(Json(order.into()))
}

/// PUT /api/orders/{id}/status: move an order to another status.
#[tracing::instrument(skip(state, payload))]
pub async fn update_status<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, ApiError> {
    let req = json_body(payload)?;
    if req.status.trim().is_empty() {
        return Err(ApiError::BadRequest("status is required".to_string()));
    }

    let order = state
        .order_service
        .update_status(UpdateOrderStatus::new(id, req.status))
        .await?;
    Ok(Json(order.into()))
}

/// GET /api/orders/status/{status}
#[tracing::instrument(skip(state))]
pub async fn by_status<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(status): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let status = status.parse::<OrderStatus>()?;
    Ok(to_responses(
        state.order_service.orders_with_status(status).await?,
    ))
}

/// GET /api/orders/status/{status}/count
#[tracing::instrument(skip(state))]
pub async fn count_by_status<S: RestaurantStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(status): Path<String>,
) -> Result<Json<u64>, ApiError> {
    let status = status.parse::<OrderStatus>()?;
    Ok(Json(state.order_service.count_with_status(status).await?))
}
