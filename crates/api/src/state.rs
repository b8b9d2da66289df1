use services::subscription::{
    ports::EntitlementService, EntitlementServiceConfig, EntitlementServiceImpl, LimitResolver,
};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub entitlement_service: Arc<dyn EntitlementService>,
}

impl AppState {
    /// Wire the entitlement service over `db` with the given resolver
    pub fn new(db: &database::Database, resolver: LimitResolver) -> Self {
        let entitlement_service = Arc::new(EntitlementServiceImpl::new(EntitlementServiceConfig {
            subscription_repo: db.subscription_repository(),
            usage_counter_repo: db.usage_counter_repository(),
            resolver,
        }));

        Self {
            entitlement_service: entitlement_service as Arc<dyn EntitlementService>,
        }
    }
}
