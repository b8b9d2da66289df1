use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::catalog::PlanDefinition;
use crate::TenantId;

/// Billing status reported by the payment provider.
///
/// Statuses the provider may add later are kept verbatim in `Unknown` so they
/// can be echoed back; they never grant access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Canceled,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
    Unknown(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Trialing => "trialing",
            Self::PastDue => "past_due",
            Self::Canceled => "canceled",
            Self::Incomplete => "incomplete",
            Self::IncompleteExpired => "incomplete_expired",
            Self::Unpaid => "unpaid",
            Self::Paused => "paused",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<String> for SubscriptionStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "active" => Self::Active,
            "trialing" => Self::Trialing,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "unpaid" => Self::Unpaid,
            "paused" => Self::Paused,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<SubscriptionStatus> for String {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest subscription row for a tenant, as synced from the payment provider.
/// Absence of a row is `Option::None` at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Provider price id (e.g. Stripe `price_...`)
    #[serde(default)]
    pub price_id: Option<String>,
    pub status: SubscriptionStatus,
    /// End of the paid period, seconds since epoch on the wire
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancel_at_period_end: bool,
}

/// Resource types that are capped per plan
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[serde(alias = "invoices")]
    Invoice,
    #[serde(alias = "contracts")]
    Contract,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Invoice, ResourceKind::Contract];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Contract => "contract",
        }
    }
}

impl std::str::FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "invoice" | "invoices" => Ok(Self::Invoice),
            "contract" | "contracts" => Ok(Self::Contract),
            other => Err(format!(
                "Unknown resource kind '{}'. Supported: invoice, contract",
                other
            )),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource caps of the plan in effect
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub invoices: u64,
    pub contracts: u64,
}

impl ResourceLimits {
    pub fn for_kind(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Invoice => self.invoices,
            ResourceKind::Contract => self.contracts,
        }
    }
}

/// Outcome of resolving a tenant's subscription against the plan catalog.
/// Derived on every call, never stored.
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub has_access: bool,
    pub plan_name: String,
    pub resource_limits: ResourceLimits,
    /// Provider status echoed back, or "free" when there is no subscription
    pub status: String,
}

/// Usage of one resource kind against its plan limit
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuota {
    pub kind: ResourceKind,
    pub current_count: i64,
    pub limit: u64,
    pub can_create: bool,
    pub plan_name: String,
    pub subscription_status: String,
}

/// Paid plan as shown on the pricing page
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub plan_name: String,
    pub invoice_limit: u64,
    pub contract_limit: u64,
    /// Every provider price id billed as this plan (current and legacy)
    pub price_ids: Vec<String>,
}

/// Whole catalog as exposed to clients
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlansOverview {
    pub version: String,
    pub free: PlanDefinition,
    pub plans: Vec<PlanSummary>,
}

/// Access decision with the quota of every capped resource, resolved together
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantEntitlements {
    pub decision: AccessDecision,
    pub quotas: Vec<ResourceQuota>,
}

/// Error types for entitlement operations
#[derive(Debug)]
pub enum EntitlementError {
    /// Tenant is at (or above) the plan limit for this resource
    LimitReached {
        kind: ResourceKind,
        used: i64,
        limit: u64,
        plan: String,
    },
    /// Repository error
    DatabaseError(String),
}

impl fmt::Display for EntitlementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LimitReached {
                kind,
                used,
                limit,
                plan,
            } => write!(
                f,
                "{} limit reached on plan {}: used {} of {}",
                kind, plan, used, limit
            ),
            Self::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for EntitlementError {}

impl From<anyhow::Error> for EntitlementError {
    fn from(err: anyhow::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

/// Repository trait for the tenant's billing subscription
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Most recently created subscription for the tenant, if any
    async fn get_latest_subscription(
        &self,
        tenant_id: TenantId,
    ) -> anyhow::Result<Option<SubscriptionRecord>>;

    /// Store a new latest subscription for the tenant
    async fn upsert_subscription(
        &self,
        tenant_id: TenantId,
        record: SubscriptionRecord,
    ) -> anyhow::Result<SubscriptionRecord>;

    /// Remove every subscription for the tenant. Returns how many were removed.
    async fn delete_subscriptions(&self, tenant_id: TenantId) -> anyhow::Result<u64>;
}

/// Repository trait for per-tenant resource counters.
///
/// Every update must be atomic with respect to concurrent updates of the same
/// tenant and kind.
#[async_trait]
pub trait UsageCounterRepository: Send + Sync {
    /// Current count, `None` when no counter exists yet
    async fn get_count(&self, tenant_id: TenantId, kind: ResourceKind)
        -> anyhow::Result<Option<i64>>;

    /// Increment only while the count is below `limit`.
    /// Returns the new count, or `None` when the counter was already at the limit.
    async fn try_increment(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
        limit: u64,
    ) -> anyhow::Result<Option<i64>>;

    /// Unconditional increment. Returns the new count.
    async fn increment(&self, tenant_id: TenantId, kind: ResourceKind) -> anyhow::Result<i64>;

    /// Decrement, never going below zero. Returns the new count.
    async fn decrement(&self, tenant_id: TenantId, kind: ResourceKind) -> anyhow::Result<i64>;
}

/// Service trait for plan entitlements
#[async_trait]
pub trait EntitlementService: Send + Sync {
    /// Plans in the active catalog
    fn list_plans(&self) -> PlansOverview;

    /// Resolve the tenant's current plan, access and limits
    async fn get_access_decision(
        &self,
        tenant_id: TenantId,
    ) -> Result<AccessDecision, EntitlementError>;

    /// Decision plus the quota of every resource kind, from a single resolution
    async fn get_entitlements(
        &self,
        tenant_id: TenantId,
    ) -> Result<TenantEntitlements, EntitlementError>;

    /// Usage and limit for one resource kind
    async fn get_quota(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError>;

    /// Ok when the tenant may create one more `kind`, `LimitReached` otherwise
    async fn require_capacity(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError>;

    /// Claim one unit of capacity before the write. The counter moves only
    /// while it is below the limit; `LimitReached` otherwise. If the write then
    /// fails, hand the unit back with `record_deleted`.
    async fn reserve(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError>;

    /// Count a creation that has already committed. Never refuses: the row
    /// exists, so the counter must reflect it even when it lands over the limit.
    async fn record_created(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError>;

    /// Count a successful deletion. Call only after the delete has committed.
    async fn record_deleted(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError>;

    /// Admin only: replace the tenant's subscription (as a provider webhook would)
    async fn set_subscription(
        &self,
        tenant_id: TenantId,
        record: SubscriptionRecord,
    ) -> Result<AccessDecision, EntitlementError>;

    /// Admin only: drop every subscription for the tenant
    async fn clear_subscription(&self, tenant_id: TenantId)
        -> Result<AccessDecision, EntitlementError>;
}
