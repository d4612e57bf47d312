//! Integration tests for Copperpot.
//!
//! The harness here stands up an in-process axum mock of the remote
//! catalog/order service on an ephemeral port, then builds an
//! [`AppState`] over in-memory storage pointed at it. Tests drive the
//! state layer exactly the way the CLI does and assert on both sides:
//! client state and what the mock recorded.

// Test-support crate: panicking on broken harness setup is the point.
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use copperpot_client::config::ClientConfig;
use copperpot_client::models::{Category, NewProduct, OrderRequest, Product};
use copperpot_client::storage::MemoryStorage;
use copperpot_client::AppState;
use copperpot_core::{Price, ProductId};

/// Error body used when an order submission is failed on purpose.
pub const ORDER_FAILURE_MESSAGE: &str = "Inventory service unavailable";

/// Recorded and switchable state of the mock service.
#[derive(Default)]
pub struct ShopState {
    products: Mutex<Vec<Product>>,
    categories: Mutex<Vec<Category>>,
    orders: Mutex<Vec<OrderRequest>>,
    /// Fail `POST /orders` with a message.
    pub fail_orders: AtomicBool,
    /// Fail `POST /orders` with an empty body (no message to surface).
    pub fail_orders_silently: AtomicBool,
    /// Delay before answering `POST /orders`.
    pub order_delay_ms: AtomicU64,
    /// `GET /products` requests served (cache-miss counter).
    pub product_list_hits: AtomicUsize,
    /// `POST /orders` requests served.
    pub order_hits: AtomicUsize,
}

impl ShopState {
    /// Orders recorded by the mock so far.
    pub fn recorded_orders(&self) -> Vec<OrderRequest> {
        self.orders.lock().unwrap().clone()
    }
}

/// A running mock of the remote service plus a client state factory.
pub struct MockShop {
    addr: SocketAddr,
    /// Shared with the running router; mutate to steer responses.
    pub state: Arc<ShopState>,
}

impl MockShop {
    /// Start the mock on an ephemeral port.
    pub async fn spawn() -> Self {
        let state = Arc::new(ShopState::default());
        let app = Router::new()
            .route("/api/v1/products", get(list_products).post(create_product))
            .route("/api/v1/products/{id}", get(show_product).put(update_product))
            .route("/api/v1/categories", get(list_categories))
            .route("/api/v1/orders", post(place_order).get(list_orders))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/authenticate", post(authenticate))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    /// Put products in the mock catalog.
    pub fn seed_products(&self, products: Vec<Product>) {
        *self.state.products.lock().unwrap() = products;
    }

    /// Put categories in the mock catalog.
    pub fn seed_categories(&self, categories: Vec<Category>) {
        *self.state.categories.lock().unwrap() = categories;
    }

    /// Build a client state layer over in-memory storage pointed at this
    /// mock.
    pub fn app_state(&self) -> AppState {
        let config = ClientConfig {
            api_base_url: url::Url::parse(&format!("http://{}/", self.addr)).unwrap(),
            storage_path: "unused.json".into(),
            http_timeout: Duration::from_secs(5),
        };
        AppState::with_storage(config, Arc::new(MemoryStorage::new())).unwrap()
    }
}

/// A catalog product for seeding.
#[must_use]
pub fn product(id: i32, name: &str, cents: u32, stock: Option<u32>) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: None,
        price: Price::from_cents(cents),
        image_url: None,
        stock_quantity: stock,
        category_name: Some("General".to_owned()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_products(State(state): State<Arc<ShopState>>) -> impl IntoResponse {
    state.product_list_hits.fetch_add(1, Ordering::SeqCst);
    Json(state.products.lock().unwrap().clone())
}

async fn show_product(
    State(state): State<Arc<ShopState>>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let products = state.products.lock().unwrap();
    products
        .iter()
        .find(|p| p.id == ProductId::new(id))
        .cloned()
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "Product not found"})),
                )
                    .into_response()
            },
            |p| Json(p).into_response(),
        )
}

async fn list_categories(State(state): State<Arc<ShopState>>) -> impl IntoResponse {
    Json(state.categories.lock().unwrap().clone())
}

async fn create_product(
    State(state): State<Arc<ShopState>>,
    Json(body): Json<NewProduct>,
) -> impl IntoResponse {
    let mut products = state.products.lock().unwrap();
    let id = i32::try_from(products.len()).unwrap() + 1;
    let created = Product {
        id: ProductId::new(id),
        name: body.name,
        description: body.description,
        price: body.price,
        image_url: body.image_url,
        stock_quantity: Some(0),
        category_name: None,
    };
    products.push(created.clone());
    Json(created)
}

async fn update_product(
    State(state): State<Arc<ShopState>>,
    Path(id): Path<i32>,
    Json(body): Json<NewProduct>,
) -> impl IntoResponse {
    let mut products = state.products.lock().unwrap();
    let Some(existing) = products.iter_mut().find(|p| p.id == ProductId::new(id)) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Product not found"})),
        )
            .into_response();
    };
    existing.name = body.name;
    existing.price = body.price;
    existing.description = body.description;
    Json(existing.clone()).into_response()
}

async fn place_order(
    State(state): State<Arc<ShopState>>,
    headers: HeaderMap,
    Json(body): Json<OrderRequest>,
) -> impl IntoResponse {
    state.order_hits.fetch_add(1, Ordering::SeqCst);

    let delay = state.order_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if !headers.contains_key("authorization") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Please log in to place an order"})),
        )
            .into_response();
    }

    if state.fail_orders_silently.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if state.fail_orders.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": ORDER_FAILURE_MESSAGE})),
        )
            .into_response();
    }

    let mut orders = state.orders.lock().unwrap();
    orders.push(body);
    let id = i32::try_from(orders.len()).unwrap();
    Json(json!({"id": id})).into_response()
}

async fn list_orders(State(state): State<Arc<ShopState>>) -> impl IntoResponse {
    // History is reconstructed from recorded submissions; prices come
    // from the current catalog snapshot.
    let products = state.products.lock().unwrap().clone();
    let orders: Vec<serde_json::Value> = state
        .orders
        .lock()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(i, order)| {
            let items: Vec<serde_json::Value> = order
                .items
                .iter()
                .map(|item| {
                    let product = products.iter().find(|p| p.id == item.product_id);
                    json!({
                        "productId": item.product_id,
                        "productName": product.map_or("unknown", |p| p.name.as_str()),
                        "quantity": item.quantity,
                        "price": product.map_or(Price::ZERO, |p| p.price),
                    })
                })
                .collect();
            let total: Price = order
                .items
                .iter()
                .filter_map(|item| {
                    products
                        .iter()
                        .find(|p| p.id == item.product_id)
                        .map(|p| p.price.times(item.quantity))
                })
                .sum();
            json!({
                "id": i + 1,
                "createdAt": "2026-01-15T10:30:00",
                "totalAmount": total,
                "items": items,
            })
        })
        .collect();
    Json(orders)
}

async fn register(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    auth_response(
        body["email"].as_str().unwrap_or_default(),
        body["firstname"].as_str().unwrap_or("New"),
        body["lastname"].as_str().unwrap_or("User"),
    )
}

async fn authenticate(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    auth_response(
        body["email"].as_str().unwrap_or_default(),
        "Returning",
        "User",
    )
}

/// Admin emails get the ADMIN role; everyone else gets the legacy `USER`
/// string the real service still emits for customers.
fn auth_response(email: &str, firstname: &str, lastname: &str) -> Json<serde_json::Value> {
    let role = if email.starts_with("admin") { "ADMIN" } else { "USER" };
    Json(json!({
        "token": format!("token-for-{email}"),
        "role": role,
        "firstname": firstname,
        "lastname": lastname,
    }))
}
