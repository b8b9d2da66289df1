pub mod access;
pub mod catalog;
pub mod clock;
pub mod gate;
pub mod limits;
pub mod ports;
pub mod service;

// Re-export commonly used types
pub use access::{evaluate_access, AccessState};
pub use catalog::{CatalogError, PlanCatalog, PlanDefinition};
pub use clock::{Clock, FixedClock, SystemClock};
pub use gate::{can_create, quota};
pub use limits::LimitResolver;
pub use ports::{
    AccessDecision, EntitlementError, EntitlementService, PlanSummary, PlansOverview,
    ResourceKind, ResourceLimits, ResourceQuota, SubscriptionRecord, SubscriptionRepository,
    SubscriptionStatus, TenantEntitlements, UsageCounterRepository,
};
pub use service::{EntitlementServiceConfig, EntitlementServiceImpl};
