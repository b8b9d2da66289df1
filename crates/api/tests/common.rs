#![allow(dead_code)]

use api::{create_router, AdminAuthState, AppState};
use axum::http::{HeaderName, HeaderValue};
use axum_test::{TestRequest, TestServer};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use services::subscription::{Clock, FixedClock, LimitResolver, PlanCatalog, SystemClock};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub const EXPERT_PRICE_ID: &str = "price_1RaQ0KDBPJVWy5Mhrf7REir7";
pub const LEGACY_SEASONED_PRICE_ID: &str = "price_1OqYLFDNtZHzJBITXVYfHbXt";

/// Fixed "now" for tests that depend on the billing period
pub const NOW_SECS: i64 = 1_750_000_000;

/// Create a test server over a fresh in-memory store and the built-in catalog
pub fn create_test_server() -> TestServer {
    create_test_server_with_clock(Arc::new(SystemClock))
}

/// Create a test server whose resolver reads the given clock
pub fn create_test_server_with_clock(clock: Arc<dyn Clock>) -> TestServer {
    build_server(clock, AdminAuthState::new(Some(ADMIN_TOKEN)))
}

/// Create a test server with no admin token configured
pub fn create_test_server_without_admin_token() -> TestServer {
    build_server(Arc::new(SystemClock), AdminAuthState::new(None))
}

fn build_server(clock: Arc<dyn Clock>, admin_auth: AdminAuthState) -> TestServer {
    let db = database::Database::new();
    let resolver = LimitResolver::new(Arc::new(PlanCatalog::builtin()), clock);
    let app = create_router(AppState::new(&db, resolver), admin_auth);
    TestServer::new(app).expect("Failed to create test server")
}

/// Clock that starts at `start` and moves one second forward on every read
pub struct SteppingClock(AtomicI64);

impl SteppingClock {
    pub fn starting_at(start: i64) -> Self {
        Self(AtomicI64::new(start))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = self.0.fetch_add(1, Ordering::SeqCst);
        DateTime::from_timestamp(secs, 0).expect("timestamp in range")
    }
}

pub fn with_bearer(request: TestRequest, token: &str) -> TestRequest {
    request.add_header(
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

pub fn as_admin(request: TestRequest) -> TestRequest {
    with_bearer(request, ADMIN_TOKEN)
}

pub fn create_test_server_at_fixed_time() -> TestServer {
    let clock = FixedClock::at_timestamp(NOW_SECS).expect("NOW_SECS is in range");
    create_test_server_with_clock(Arc::new(clock))
}

pub fn new_tenant() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub async fn set_subscription(server: &TestServer, tenant_id: &str, body: Value) -> Value {
    let response = as_admin(
        server
            .put(&format!("/v1/admin/tenants/{tenant_id}/subscription"))
            .json(&body),
    )
    .await;
    assert_eq!(response.status_code(), 200, "{}", response.text());
    response.json::<Value>()
}

pub async fn subscribe_active(server: &TestServer, tenant_id: &str, price_id: &str) -> Value {
    set_subscription(
        server,
        tenant_id,
        json!({ "price_id": price_id, "status": "active" }),
    )
    .await
}

/// Reserve an invoice slot, as the write path does before inserting
pub async fn create_invoice(server: &TestServer, tenant_id: &str) -> axum_test::TestResponse {
    server
        .post(&format!("/v1/tenants/{tenant_id}/reservations/invoice"))
        .await
}
