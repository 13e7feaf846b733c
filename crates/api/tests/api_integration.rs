//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

const JOHN: &str = "123-456-7890";

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// Builds an app over a store holding the sample customers and menu.
async fn setup() -> (axum::Router, Arc<AppState<InMemoryStore>>) {
    let store = InMemoryStore::new();
    api::seed::seed_sample_data(&store).await.unwrap();
    let state = api::create_state(store, 5);
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()))
    };
    (status, json)
}

async fn place_pizza_order(app: &axum::Router, quantity: i64) -> Value {
    let (status, order) = send(
        app,
        "POST",
        "/api/orders/by-name",
        Some(json!({
            "customer_phone": JOHN,
            "items": [{"menu_item_name": "Margherita Pizza", "quantity": quantity}]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    order
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;
    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

mod orders {
    use super::*;

    #[tokio::test]
    async fn create_by_name_returns_order_view() {
        let (app, _) = setup().await;
        let order = place_pizza_order(&app, 2).await;

        assert_eq!(order["status"], "PENDING");
        assert_eq!(order["total_amount"], "25.98");
        assert_eq!(order["customer_name"], "John Doe");
        assert_eq!(order["customer_phone"], JOHN);
        assert_eq!(order["id"], order["order_number"]);
        assert!(order["order_date"].as_str().unwrap().contains('T'));

        let item = &order["items"][0];
        assert_eq!(item["menu_item_name"], "Margherita Pizza");
        assert_eq!(item["quantity"], 2);
        assert_eq!(item["price"], "12.99");
        assert_eq!(item["subtotal"], "25.98");
    }

    #[tokio::test]
    async fn create_by_id_uses_order_items() {
        let (app, state) = setup().await;
        let pizza = state
            .menu_service
            .get_by_name("Margherita Pizza")
            .await
            .unwrap();

        let (status, order) = send(
            &app,
            "POST",
            "/api/orders",
            Some(json!({
                "customer_phone": JOHN,
                "order_items": [{"menu_item_id": pizza.id, "quantity": 2}]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["total_amount"], "25.98");
    }

    #[tokio::test]
    async fn rejected_orders_report_kind_and_message() {
        let (app, state) = setup().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/orders/by-name",
            Some(json!({
                "customer_phone": JOHN,
                "items": [
                    {"menu_item_name": "Margherita Pizza", "quantity": 1},
                    {"menu_item_name": "Margherita Pizza", "quantity": 1}
                ]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "duplicate menu items in order");

        let (status, body) = send(
            &app,
            "POST",
            "/api/orders/by-name",
            Some(json!({
                "customer_phone": "0000000000",
                "items": [{"menu_item_name": "Iced Tea", "quantity": 1}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["error"],
            "customer with phone 0000000000 is not registered"
        );

        let (status, _) = send(
            &app,
            "POST",
            "/api/orders/by-name",
            Some(json!({
                "customer_phone": JOHN,
                "items": [{"menu_item_name": "Iced Tea", "quantity": 0}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            "POST",
            "/api/orders/by-name",
            Some(json!({"items": [{"menu_item_name": "Iced Tea", "quantity": 1}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "customer phone required");

        assert_eq!(state.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (app, _) = setup().await;
        let (status, body) = send(
            &app,
            "POST",
            "/api/orders/by-name",
            Some(json!({"customer_phone": JOHN, "items": "pizza"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn get_and_status_update() {
        let (app, _) = setup().await;
        let order = place_pizza_order(&app, 1).await;
        let id = order["id"].as_str().unwrap();

        let (status, fetched) = send(&app, "GET", &format!("/api/orders/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, order);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/orders/{id}/status"),
            Some(json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "COMPLETED");
        assert_eq!(updated["total_amount"], order["total_amount"]);

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/orders/{id}/status"),
            Some(json!({"status": "SHIPPED"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid order status 'SHIPPED'");
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let (app, state) = setup().await;

        let (status, body) = send(&app, "GET", "/api/orders/ORD00000", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "order not found with id ORD00000");

        let (status, _) = send(
            &app,
            "PUT",
            "/api/orders/ORD00000/status",
            Some(json!({"status": "READY"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(state.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn reports_by_phone_and_status() {
        let (app, _) = setup().await;
        let first = place_pizza_order(&app, 1).await;
        place_pizza_order(&app, 3).await;
        let first_id = first["id"].as_str().unwrap();
        send(
            &app,
            "PUT",
            &format!("/api/orders/{first_id}/status"),
            Some(json!({"status": "READY"})),
        )
        .await;

        let (status, orders) = send(&app, "GET", "/api/orders", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders.as_array().unwrap().len(), 2);

        let (_, orders) = send(&app, "GET", &format!("/api/orders/customer/phone/{JOHN}"), None).await;
        assert_eq!(orders.as_array().unwrap().len(), 2);

        let (status, _) = send(
            &app,
            "GET",
            &format!("/api/orders/customer/phone/{JOHN}/latest"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            "GET",
            "/api/orders/customer/phone/098-765-4321/latest",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, ready) = send(&app, "GET", "/api/orders/status/ready", None).await;
        assert_eq!(ready[0]["id"], first["id"]);

        let (_, count) = send(&app, "GET", "/api/orders/status/PENDING/count", None).await;
        assert_eq!(count, json!(1));

        let (status, _) = send(&app, "GET", "/api/orders/status/LOST/count", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod customers {
    use super::*;

    #[tokio::test]
    async fn register_lookup_and_delete() {
        let (app, _) = setup().await;

        let (status, customer) = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({
                "name": "Ana Lima",
                "email": "ana@example.com",
                "phone_number": "555-0100"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = customer["id"].as_i64().unwrap();

        let (_, found) = send(&app, "GET", "/api/customers/email/ana@example.com", None).await;
        assert_eq!(found["id"], id);
        let (_, exists) = send(&app, "GET", "/api/customers/exists/phone/555-0100", None).await;
        assert_eq!(exists, json!(true));

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/api/customers/{id}"),
            Some(json!({
                "name": "Ana Lima Souza",
                "email": "ana@example.com",
                "phone_number": "555-0100"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["created_at"], customer["created_at"]);

        let (status, _) = send(&app, "DELETE", "/api/customers/phone/555-0100", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, "GET", &format!("/api/customers/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn duplicates_and_invalid_payloads() {
        let (app, _) = setup().await;

        let (status, body) = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({
                "name": "Johnny",
                "email": "john@example.com",
                "phone_number": "555-0199"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "email already exists");

        let (status, body) = send(
            &app,
            "POST",
            "/api/customers",
            Some(json!({"name": "No Mail", "phone_number": "555-0111"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "email is required");
    }

    #[tokio::test]
    async fn customers_with_orders_stay() {
        let (app, _) = setup().await;
        place_pizza_order(&app, 1).await;

        let (status, _) = send(&app, "DELETE", &format!("/api/customers/phone/{JOHN}"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}

mod menu {
    use super::*;

    #[tokio::test]
    async fn browse_the_menu() {
        let (app, _) = setup().await;

        let (status, items) = send(&app, "GET", "/api/menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items.as_array().unwrap().len(), 8);

        let (_, categories) = send(&app, "GET", "/api/menu/categories", None).await;
        assert_eq!(categories.as_array().unwrap().len(), 7);

        let (_, pizzas) = send(&app, "GET", "/api/menu/category/Pizza", None).await;
        assert_eq!(pizzas.as_array().unwrap().len(), 2);

        let id = pizzas[0]["id"].as_i64().unwrap();
        let (status, pizza) = send(&app, "GET", &format!("/api/menu/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pizza["price"], "12.99");
    }

    #[tokio::test]
    async fn manage_menu_items() {
        let (app, _) = setup().await;

        let (status, item) = send(
            &app,
            "POST",
            "/api/menu",
            Some(json!({"name": "Lemonade", "price": "3.50", "category": "Beverages"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["available"], true);
        let id = item["id"].as_i64().unwrap();

        let (status, _) = send(
            &app,
            "POST",
            "/api/menu",
            Some(json!({"name": "lemonade", "price": "3.00", "category": "Beverages"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, item) = send(
            &app,
            "PUT",
            &format!("/api/menu/{id}"),
            Some(json!({
                "name": "Lemonade",
                "price": "3.75",
                "category": "Beverages",
                "available": false
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(item["price"], "3.75");

        // Unavailable items are hidden from lookups by id
        let (status, _) = send(&app, "GET", &format!("/api/menu/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, "DELETE", &format!("/api/menu/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;
    place_pizza_order(&app, 1).await;

    let (status, body) = send(&app, "GET", "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("orders_created_total"));
}
