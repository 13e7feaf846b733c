//! HTTP API server with observability for the restaurant order service.
//!
//! Provides REST endpoints for placing and tracking orders, the customer
//! directory and the menu catalog, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use domain::{CustomerService, MenuService, OrderService};
use metrics_exporter_prometheus::PrometheusHandle;
use store::RestaurantStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: RestaurantStore>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    use routes::{customers, menu, orders};

    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/orders",
            post(orders::create_by_id::<S>).get(orders::list::<S>),
        )
        .route("/api/orders/by-name", post(orders::create_by_name::<S>))
        .route("/api/orders/{id}", get(orders::get::<S>))
        .route("/api/orders/{id}/status", put(orders::update_status::<S>))
        .route(
            "/api/orders/customer/phone/{phone}",
            get(orders::by_phone::<S>),
        )
        .route(
            "/api/orders/customer/phone/{phone}/latest",
            get(orders::latest_by_phone::<S>),
        )
        .route("/api/orders/status/{status}", get(orders::by_status::<S>))
        .route(
            "/api/orders/status/{status}/count",
            get(orders::count_by_status::<S>),
        )
        .route(
            "/api/customers",
            post(customers::register::<S>).get(customers::list::<S>),
        )
        .route(
            "/api/customers/{id}",
            get(customers::get::<S>)
                .put(customers::update::<S>)
                .delete(customers::delete::<S>),
        )
        .route(
            "/api/customers/email/{email}",
            get(customers::by_email::<S>),
        )
        .route(
            "/api/customers/phone/{phone}",
            get(customers::by_phone::<S>).delete(customers::delete_by_phone::<S>),
        )
        .route(
            "/api/customers/exists/email/{email}",
            get(customers::email_exists::<S>),
        )
        .route(
            "/api/customers/exists/phone/{phone}",
            get(customers::phone_exists::<S>),
        )
        .route(
            "/api/menu",
            get(menu::list_available::<S>).post(menu::create::<S>),
        )
        .route("/api/menu/categories", get(menu::categories::<S>))
        .route("/api/menu/category/{category}", get(menu::by_category::<S>))
        .route(
            "/api/menu/{id}",
            get(menu::get::<S>)
                .put(menu::update::<S>)
                .delete(menu::delete::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every service sharing one store.
pub fn create_state<S: RestaurantStore>(store: S, order_id_max_attempts: u32) -> Arc<AppState<S>> {
    Arc::new(AppState {
        order_service: OrderService::new(store.clone()).with_max_attempts(order_id_max_attempts),
        customer_service: CustomerService::new(store.clone()),
        menu_service: MenuService::new(store.clone()),
        store,
    })
}
