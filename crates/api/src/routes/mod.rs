pub mod admin;
pub mod entitlements;

use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::{
    middleware::{admin_auth_middleware, AdminAuthState},
    openapi::ApiDoc,
    state::AppState,
};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// API version
    pub version: &'static str,
}

/// Health check endpoint
///
/// Returns the health status of the service for load balancers and orchestrators.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Create the API router
pub fn create_router(app_state: AppState, admin_auth: AdminAuthState) -> Router {
    // Admin routes (require the admin token)
    let admin_routes = admin::create_admin_router()
        .layer(from_fn_with_state(admin_auth, admin_auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(entitlements::create_entitlements_router())
        .merge(admin_routes)
        .with_state(app_state)
}
