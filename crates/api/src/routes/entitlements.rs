use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use services::subscription::ports::{
    PlansOverview, ResourceKind, ResourceQuota, TenantEntitlements,
};
use services::TenantId;

pub(crate) fn parse_tenant_id(raw: &str) -> Result<TenantId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid tenant id: '{}'", raw)))
}

fn parse_kind(raw: &str) -> Result<ResourceKind, ApiError> {
    raw.parse().map_err(ApiError::bad_request)
}

/// List plans
///
/// Returns the active plan catalog: the Free fallback and every paid plan with its price ids.
#[utoipa::path(
    get,
    path = "/v1/plans",
    tag = "Plans",
    responses(
        (status = 200, description = "Plan catalog", body = PlansOverview)
    )
)]
pub async fn list_plans(State(app_state): State<AppState>) -> Json<PlansOverview> {
    Json(app_state.entitlement_service.list_plans())
}

/// Get entitlements
///
/// Resolves the tenant's subscription to a plan and reports usage against every limit.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant_id}/entitlements",
    tag = "Entitlements",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)")
    ),
    responses(
        (status = 200, description = "Current plan, access and quotas", body = TenantEntitlements),
        (status = 400, description = "Invalid tenant id", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_entitlements(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<TenantEntitlements>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    tracing::debug!("Getting entitlements for tenant_id={}", tenant_id);

    let entitlements = app_state
        .entitlement_service
        .get_entitlements(tenant_id)
        .await?;

    Ok(Json(entitlements))
}

/// Get quota
///
/// Usage and limit for one resource kind, including whether one more can be created.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant_id}/entitlements/{kind}",
    tag = "Entitlements",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)"),
        ("kind" = String, Path, description = "Resource kind: invoice or contract")
    ),
    responses(
        (status = 200, description = "Quota for the resource kind", body = ResourceQuota),
        (status = 400, description = "Invalid tenant id or resource kind", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn get_quota(
    State(app_state): State<AppState>,
    Path((tenant_id, kind)): Path<(String, String)>,
) -> Result<Json<ResourceQuota>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let kind = parse_kind(&kind)?;

    let quota = app_state
        .entitlement_service
        .get_quota(tenant_id, kind)
        .await?;

    Ok(Json(quota))
}

/// Reserve capacity
///
/// Called by the write path before it inserts a resource. Claims one unit atomically and
/// refuses with 402 when the tenant is at the plan limit. If the insert then fails, release
/// the unit with `DELETE /v1/tenants/{tenant_id}/usage/{kind}`.
#[utoipa::path(
    post,
    path = "/v1/tenants/{tenant_id}/reservations/{kind}",
    tag = "Usage",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)"),
        ("kind" = String, Path, description = "Resource kind: invoice or contract")
    ),
    responses(
        (status = 200, description = "Unit reserved", body = ResourceQuota),
        (status = 400, description = "Invalid tenant id or resource kind", body = crate::error::ApiErrorResponse),
        (status = 402, description = "Plan limit reached", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn reserve(
    State(app_state): State<AppState>,
    Path((tenant_id, kind)): Path<(String, String)>,
) -> Result<Json<ResourceQuota>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let kind = parse_kind(&kind)?;

    let quota = app_state.entitlement_service.reserve(tenant_id, kind).await?;

    Ok(Json(quota))
}

/// Record a creation
///
/// Called by a write path that checked capacity itself, after the insert has committed.
/// Always counts the row, even when concurrent writers pushed the tenant over the limit.
#[utoipa::path(
    post,
    path = "/v1/tenants/{tenant_id}/usage/{kind}",
    tag = "Usage",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)"),
        ("kind" = String, Path, description = "Resource kind: invoice or contract")
    ),
    responses(
        (status = 200, description = "Creation counted", body = ResourceQuota),
        (status = 400, description = "Invalid tenant id or resource kind", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn record_created(
    State(app_state): State<AppState>,
    Path((tenant_id, kind)): Path<(String, String)>,
) -> Result<Json<ResourceQuota>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let kind = parse_kind(&kind)?;

    let quota = app_state
        .entitlement_service
        .record_created(tenant_id, kind)
        .await?;

    Ok(Json(quota))
}

/// Record a deletion
///
/// Called by the write path after a resource has been deleted, or to release a reservation
/// whose insert failed.
#[utoipa::path(
    delete,
    path = "/v1/tenants/{tenant_id}/usage/{kind}",
    tag = "Usage",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)"),
        ("kind" = String, Path, description = "Resource kind: invoice or contract")
    ),
    responses(
        (status = 200, description = "Deletion counted", body = ResourceQuota),
        (status = 400, description = "Invalid tenant id or resource kind", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    )
)]
pub async fn record_deleted(
    State(app_state): State<AppState>,
    Path((tenant_id, kind)): Path<(String, String)>,
) -> Result<Json<ResourceQuota>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let kind = parse_kind(&kind)?;

    let quota = app_state
        .entitlement_service
        .record_deleted(tenant_id, kind)
        .await?;

    Ok(Json(quota))
}

pub fn create_entitlements_router() -> Router<AppState> {
    Router::new()
        .route("/v1/plans", get(list_plans))
        .route("/v1/tenants/{tenant_id}/entitlements", get(get_entitlements))
        .route("/v1/tenants/{tenant_id}/entitlements/{kind}", get(get_quota))
        .route("/v1/tenants/{tenant_id}/reservations/{kind}", post(reserve))
        .route(
            "/v1/tenants/{tenant_id}/usage/{kind}",
            post(record_created).delete(record_deleted),
        )
}
