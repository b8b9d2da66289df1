use crate::{
    error::ApiError, models::SetSubscriptionRequest, routes::entitlements::parse_tenant_id,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use chrono::DateTime;
use services::subscription::ports::{AccessDecision, SubscriptionRecord, SubscriptionStatus};

impl TryFrom<SetSubscriptionRequest> for SubscriptionRecord {
    type Error = ApiError;

    fn try_from(req: SetSubscriptionRequest) -> Result<Self, Self::Error> {
        let status = req.status.trim();
        if status.is_empty() {
            return Err(ApiError::bad_request("status must not be empty"));
        }

        let current_period_end = match req.current_period_end {
            Some(secs) => Some(DateTime::from_timestamp(secs, 0).ok_or_else(|| {
                ApiError::bad_request(format!("current_period_end out of range: {}", secs))
            })?),
            None => None,
        };

        Ok(SubscriptionRecord {
            price_id: req.price_id.filter(|p| !p.trim().is_empty()),
            status: SubscriptionStatus::from(status),
            current_period_end,
            cancel_at_period_end: req.cancel_at_period_end,
        })
    }
}

/// Set subscription
///
/// Replaces the tenant's subscription record and returns the resulting access decision.
#[utoipa::path(
    put,
    path = "/v1/admin/tenants/{tenant_id}/subscription",
    tag = "Admin",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)")
    ),
    request_body = SetSubscriptionRequest,
    responses(
        (status = 200, description = "Subscription stored", body = AccessDecision),
        (status = 400, description = "Bad request", body = crate::error::ApiErrorResponse),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    ),
    security(
        ("admin_token" = [])
    )
)]
pub async fn set_subscription(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
    Json(request): Json<SetSubscriptionRequest>,
) -> Result<Json<AccessDecision>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    let record = SubscriptionRecord::try_from(request)?;

    tracing::info!(
        "Admin setting subscription for tenant_id={}, status={}",
        tenant_id,
        record.status
    );

    let decision = app_state
        .entitlement_service
        .set_subscription(tenant_id, record)
        .await?;

    Ok(Json(decision))
}

/// Clear subscription
///
/// Removes every subscription record for the tenant, dropping it to the Free plan.
#[utoipa::path(
    delete,
    path = "/v1/admin/tenants/{tenant_id}/subscription",
    tag = "Admin",
    params(
        ("tenant_id" = String, Path, description = "Tenant id (UUID)")
    ),
    responses(
        (status = 200, description = "Subscription cleared", body = AccessDecision),
        (status = 400, description = "Invalid tenant id", body = crate::error::ApiErrorResponse),
        (status = 401, description = "Missing or invalid admin token", body = crate::error::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = crate::error::ApiErrorResponse)
    ),
    security(
        ("admin_token" = [])
    )
)]
pub async fn clear_subscription(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<String>,
) -> Result<Json<AccessDecision>, ApiError> {
    let tenant_id = parse_tenant_id(&tenant_id)?;
    tracing::info!("Admin clearing subscription for tenant_id={}", tenant_id);

    let decision = app_state
        .entitlement_service
        .clear_subscription(tenant_id)
        .await?;

    Ok(Json(decision))
}

pub fn create_admin_router() -> Router<AppState> {
    Router::new().route(
        "/v1/admin/tenants/{tenant_id}/subscription",
        put(set_subscription).delete(clear_subscription),
    )
}
