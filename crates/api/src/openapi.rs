use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Freelancer Entitlements API",
        description = "Resolves a tenant's subscription into plan access and per-resource usage limits.",
        version = "1.0.0",
        license(name = "MIT",)
    ),
    paths(
        crate::routes::health_check,
        // Plan catalog
        crate::routes::entitlements::list_plans,
        // Entitlements
        crate::routes::entitlements::get_entitlements,
        crate::routes::entitlements::get_quota,
        // Usage counters
        crate::routes::entitlements::reserve,
        crate::routes::entitlements::record_created,
        crate::routes::entitlements::record_deleted,
        // Admin endpoints
        crate::routes::admin::set_subscription,
        crate::routes::admin::clear_subscription,
    ),
    components(schemas(
        crate::routes::HealthResponse,
        crate::models::SetSubscriptionRequest,
        crate::error::ApiErrorResponse,
        services::subscription::ports::TenantEntitlements,
        services::subscription::ports::AccessDecision,
        services::subscription::ports::ResourceLimits,
        services::subscription::ports::ResourceQuota,
        services::subscription::ports::ResourceKind,
        services::subscription::ports::PlanSummary,
        services::subscription::ports::PlansOverview,
        services::subscription::PlanDefinition,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness check"),
        (name = "Plans", description = "Plan catalog"),
        (name = "Entitlements", description = "Access decisions and quotas per tenant"),
        (name = "Usage", description = "Creation and deletion counters behind the plan limits"),
        (name = "Admin", description = "Subscription management endpoints")
    )
)]
pub struct ApiDoc;

/// Bearer scheme for the admin token
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "admin_token",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}
