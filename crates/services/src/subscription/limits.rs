use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::access::evaluate_access;
use super::catalog::PlanCatalog;
use super::clock::{Clock, SystemClock};
use super::ports::{AccessDecision, SubscriptionRecord};

/// Single entry point turning a subscription record into plan limits.
///
/// Access evaluation and catalog lookup are never combined anywhere else, so
/// the grace-period rule applies identically at every call site.
#[derive(Clone)]
pub struct LimitResolver {
    catalog: Arc<PlanCatalog>,
    clock: Arc<dyn Clock>,
}

impl LimitResolver {
    pub fn new(catalog: Arc<PlanCatalog>, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    /// Resolver over `catalog` using the wall clock
    pub fn with_system_clock(catalog: Arc<PlanCatalog>) -> Self {
        Self::new(catalog, Arc::new(SystemClock))
    }

    pub fn catalog(&self) -> &PlanCatalog {
        &self.catalog
    }

    pub fn resolve_limits(&self, record: Option<&SubscriptionRecord>) -> AccessDecision {
        let now = self.clock.now();
        self.resolve_limits_at(record, now)
    }

    pub fn resolve_limits_at(
        &self,
        record: Option<&SubscriptionRecord>,
        now: DateTime<Utc>,
    ) -> AccessDecision {
        let access = evaluate_access(record, now);

        // Denied access always degrades to Free, whatever price id is on file
        let plan = match record {
            Some(record) if access.has_access => self.catalog.lookup(record.price_id.as_deref()),
            _ => self.catalog.free_plan(),
        };

        AccessDecision {
            has_access: access.has_access,
            plan_name: plan.plan_name.clone(),
            resource_limits: plan.limits(),
            status: access.effective_status,
        }
    }
}

impl std::fmt::Debug for LimitResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitResolver")
            .field("catalog_version", &self.catalog.version())
            .finish()
    }
}
