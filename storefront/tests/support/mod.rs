//! In-process mock of the storefront backend for integration tests.
//!
//! The mock issues real HS256 tokens, remembers which ones it issued, and
//! rejects any other bearer token on protected endpoints with a 401. Every
//! request is recorded so tests can assert on paths and headers.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use storefront::config::{Config, RefreshStrategy};
use storefront::storage::SessionStorage;
use storefront::ApiClient;
use tokio::task::JoinHandle;

const SECRET: &[u8] = b"mock-backend-secret";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

/// Same claim set the real backend signs: the user id travels as `userId`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IssuedClaims<'a> {
    sub: &'a str,
    user_id: i64,
    role: &'a str,
    iat: i64,
    exp: i64,
    jti: u64,
}

#[derive(Default)]
pub struct MockState {
    issued: Mutex<HashSet<String>>,
    requests: Mutex<Vec<Recorded>>,
    serial: AtomicU64,
    pub ping_calls: AtomicUsize,
    pub ping_fails: AtomicBool,
    pub ping_delay_ms: AtomicU64,
    pub orders_always_unauthorized: AtomicBool,
}

impl MockState {
    fn sign(&self, id: i64, email: &str, role: &str, expires_in: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = IssuedClaims {
            sub: email,
            user_id: id,
            role,
            iat: now,
            exp: now + expires_in,
            jti: self.serial.fetch_add(1, Ordering::SeqCst),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    fn issue(&self, id: i64, email: &str, role: &str) -> String {
        let token = self.sign(id, email, role, 3600);
        self.issued.lock().insert(token.clone());
        token
    }

    fn is_issued(&self, headers: &HeaderMap) -> bool {
        bearer(headers).is_some_and(|token| self.issued.lock().contains(&token))
    }
}

pub struct MockBackend {
    pub state: Arc<MockState>,
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let api = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/logout", post(logout))
            .route("/auth/user", get(current_user))
            .route("/auth/ping", post(ping))
            .route("/users", get(list_users).post(create_user))
            .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
            .route("/products", get(list_products).post(create_product))
            .route("/products/{id}", get(get_product).delete(delete_product))
            .route("/orders", get(list_orders).post(create_order))
            .route("/orders/user", get(list_orders))
            .route("/orders/{id}", get(get_order).put(update_order).delete(delete_order));

        let app = Router::new()
            .nest("/api", api)
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            state,
            base_url: format!("http://{}/api", addr),
            handle,
        }
    }

    pub fn client(&self, storage: Arc<dyn SessionStorage>) -> ApiClient {
        self.client_with(storage, RefreshStrategy::Independent)
    }

    pub fn client_with(
        &self,
        storage: Arc<dyn SessionStorage>,
        strategy: RefreshStrategy,
    ) -> ApiClient {
        let config = Config {
            api_base_url: self.base_url.clone(),
            refresh_strategy: strategy,
            ..Config::default()
        };
        ApiClient::new(&config, storage).expect("build client")
    }

    /// A token the backend accepts on protected endpoints.
    pub fn issue_token(&self, id: i64, email: &str, role: &str) -> String {
        self.state.issue(id, email, role)
    }

    /// A well-formed token the backend does not recognize, expiring in
    /// `expires_in` seconds. The refresh endpoint still exchanges it.
    pub fn stale_token(&self, id: i64, email: &str, role: &str, expires_in: i64) -> String {
        self.state.sign(id, email, role, expires_in)
    }

    /// Signs an arbitrary claim set. The backend does not accept it on
    /// protected endpoints.
    pub fn sign_payload(&self, payload: &Value) -> String {
        encode(&Header::default(), payload, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    pub fn ping_calls(&self) -> usize {
        self.state.ping_calls.load(Ordering::SeqCst)
    }

    pub fn fail_refresh(&self) {
        self.state.ping_fails.store(true, Ordering::SeqCst);
    }

    pub fn delay_refresh(&self, delay: Duration) {
        self.state
            .ping_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn reject_orders(&self) {
        self.state
            .orders_always_unauthorized
            .store(true, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn ok(data: Value) -> Response {
    Json(json!({
        "success": true,
        "message": "ok",
        "data": data,
        "timestamp": Utc::now().timestamp_millis(),
    }))
    .into_response()
}

fn fail(status: StatusCode, message: &str, error_type: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "message": message,
            "errorType": error_type,
        })),
    )
        .into_response()
}

fn unauthorized() -> Response {
    fail(StatusCode::UNAUTHORIZED, "Token expired", "unauthorized")
}

fn user_json(id: i64, email: &str) -> Value {
    let role = if email.starts_with("admin") { "ADMIN" } else { "USER" };
    json!({"id": id, "email": email, "role": role})
}

fn product_json(id: i64) -> Value {
    json!({
        "id": id.to_string(),
        "name": format!("Product {}", id),
        "description": "A product",
        "imageUrl": null,
        "uploaderId": "1",
        "uploadTime": "2024-05-01T10:00:00Z",
        "price": 9.5,
        "tags": "demo",
    })
}

fn order_json(id: i64) -> Value {
    json!({
        "id": id,
        "userId": 1,
        "totalPrice": 19.0,
        "status": "PENDING",
        "createdAt": "2024-05-01T10:15:30",
        "updatedAt": null,
        "items": [{"id": 1, "orderId": id, "productId": 3, "quantity": 2, "price": 9.5}],
    })
}

async fn record(State(state): State<Arc<MockState>>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.requests.lock().push(Recorded {
        method: request.method().to_string(),
        path: request
            .uri()
            .path()
            .trim_start_matches("/api")
            .to_string(),
        authorization,
    });
    next.run(request).await
}

fn authenticate(state: &MockState, body: &Value, id: i64) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != "secret" {
        return fail(StatusCode::UNAUTHORIZED, "Invalid credentials", "unauthorized");
    }
    let user = user_json(id, email);
    let token = state.issue(id, email, user["role"].as_str().unwrap_or("USER"));
    ok(json!({"token": token, "user": user}))
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    authenticate(&state, &body, 1)
}

async fn register(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    authenticate(&state, &body, 2)
}

async fn logout() -> Response {
    ok(Value::Null)
}

async fn current_user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    let claims = storefront::utils::jwt::decode_claims(&bearer(&headers).unwrap_or_default())
        .expect("issued tokens decode");
    let id = claims.id.unwrap_or_default();
    ok(json!({"id": id.to_string(), "email": claims.sub, "role": claims.role}))
}

async fn ping(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.ping_calls.fetch_add(1, Ordering::SeqCst);

    let delay = state.ping_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if state.ping_fails.load(Ordering::SeqCst) {
        return unauthorized();
    }
    let Some(claims) = bearer(&headers)
        .and_then(|token| storefront::utils::jwt::decode_claims(&token).ok())
    else {
        return fail(StatusCode::UNAUTHORIZED, "Missing credentials", "unauthorized");
    };

    let id = claims.id.unwrap_or_default();
    let token = state.issue(id, &claims.sub, &claims.role);
    ok(json!({"token": token, "user": user_json(id, &claims.sub)}))
}

async fn list_users(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(json!([user_json(1, "e@x.com"), user_json(2, "admin@x.com")]))
}

async fn get_user(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(user_json(id, "e@x.com"))
}

async fn create_user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(json!({"message": "User created"}))
}

async fn update_user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(json!({"message": "User updated"}))
}

async fn delete_user(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(json!({"message": "User deleted"}))
}

async fn list_products(Query(params): Query<HashMap<String, String>>) -> Response {
    let current: u64 = params
        .get("current")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let size: u64 = params.get("size").and_then(|v| v.parse().ok()).unwrap_or(10);
    let total = 25u64;
    let first = (current - 1) * size + 1;
    let records: Vec<Value> = (first..=total.min(first + size - 1))
        .map(|id| product_json(id as i64))
        .collect();
    ok(json!({
        "total": total,
        "size": size,
        "current": current,
        "pages": total.div_ceil(size),
        "records": records,
    }))
}

async fn get_product(Path(id): Path<i64>) -> Response {
    if id == 999 {
        return fail(StatusCode::NOT_FOUND, "Product not found", "not_found");
    }
    ok(product_json(id))
}

async fn create_product(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    let mut product = product_json(100);
    product["name"] = body["name"].clone();
    product["price"] = body["price"].clone();
    ok(product)
}

async fn delete_product(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(Value::Null)
}

async fn list_orders(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if state.orders_always_unauthorized.load(Ordering::SeqCst) || !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(json!([order_json(1), order_json(2)]))
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    let mut order = order_json(10);
    order["items"] = body["products"].clone();
    ok(order)
}

async fn get_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(order_json(id))
}

async fn update_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    let mut order = order_json(id);
    if let Some(status) = body.get("status") {
        order["status"] = status.clone();
    }
    ok(order)
}

async fn delete_order(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.is_issued(&headers) {
        return unauthorized();
    }
    ok(json!("Order deleted"))
}
