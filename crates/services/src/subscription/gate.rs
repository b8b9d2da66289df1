use super::ports::{AccessDecision, ResourceKind, ResourceQuota};

/// Normalize an externally stored usage count. Missing or negative counts are 0.
pub fn effective_count(current_count: Option<i64>) -> i64 {
    current_count.unwrap_or(0).max(0)
}

/// True while the tenant is strictly below the plan limit for `kind`.
/// A tenant sitting exactly at the limit cannot create another one.
pub fn can_create(current_count: Option<i64>, decision: &AccessDecision, kind: ResourceKind) -> bool {
    let limit = decision.resource_limits.for_kind(kind);
    // effective_count is never negative
    (effective_count(current_count) as u64) < limit
}

pub fn quota(current_count: Option<i64>, decision: &AccessDecision, kind: ResourceKind) -> ResourceQuota {
    ResourceQuota {
        kind,
        current_count: effective_count(current_count),
        limit: decision.resource_limits.for_kind(kind),
        can_create: can_create(current_count, decision, kind),
        plan_name: decision.plan_name.clone(),
        subscription_status: decision.status.clone(),
    }
}
