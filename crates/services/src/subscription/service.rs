use super::gate::{self, effective_count};
use super::limits::LimitResolver;
use super::ports::{
    AccessDecision, EntitlementError, EntitlementService, PlansOverview, ResourceKind,
    ResourceQuota, SubscriptionRecord, SubscriptionRepository, TenantEntitlements,
    UsageCounterRepository,
};
use crate::TenantId;
use async_trait::async_trait;
use std::sync::Arc;

/// Configuration for EntitlementServiceImpl
pub struct EntitlementServiceConfig {
    pub subscription_repo: Arc<dyn SubscriptionRepository>,
    pub usage_counter_repo: Arc<dyn UsageCounterRepository>,
    pub resolver: LimitResolver,
}

pub struct EntitlementServiceImpl {
    subscription_repo: Arc<dyn SubscriptionRepository>,
    usage_counter_repo: Arc<dyn UsageCounterRepository>,
    resolver: LimitResolver,
}

impl EntitlementServiceImpl {
    pub fn new(config: EntitlementServiceConfig) -> Self {
        Self {
            subscription_repo: config.subscription_repo,
            usage_counter_repo: config.usage_counter_repo,
            resolver: config.resolver,
        }
    }

    async fn fetch_subscription(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<SubscriptionRecord>, EntitlementError> {
        self.subscription_repo
            .get_latest_subscription(tenant_id)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to fetch subscription for tenant_id={}", tenant_id);
                EntitlementError::DatabaseError(e.to_string())
            })
    }

    async fn fetch_count(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<Option<i64>, EntitlementError> {
        self.usage_counter_repo
            .get_count(tenant_id, kind)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    "Failed to fetch {} count for tenant_id={}",
                    kind,
                    tenant_id
                );
                EntitlementError::DatabaseError(e.to_string())
            })
    }
}

#[async_trait]
impl EntitlementService for EntitlementServiceImpl {
    fn list_plans(&self) -> PlansOverview {
        self.resolver.catalog().overview()
    }

    async fn get_access_decision(
        &self,
        tenant_id: TenantId,
    ) -> Result<AccessDecision, EntitlementError> {
        let record = self.fetch_subscription(tenant_id).await?;
        let decision = self.resolver.resolve_limits(record.as_ref());

        tracing::debug!(
            "Resolved entitlements for tenant_id={}: plan={}, has_access={}, status={}",
            tenant_id,
            decision.plan_name,
            decision.has_access,
            decision.status
        );

        Ok(decision)
    }

    async fn get_entitlements(
        &self,
        tenant_id: TenantId,
    ) -> Result<TenantEntitlements, EntitlementError> {
        let decision = self.get_access_decision(tenant_id).await?;

        let mut quotas = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in ResourceKind::ALL {
            let count = self.fetch_count(tenant_id, kind).await?;
            quotas.push(gate::quota(count, &decision, kind));
        }

        Ok(TenantEntitlements { decision, quotas })
    }

    async fn get_quota(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError> {
        let decision = self.get_access_decision(tenant_id).await?;
        let count = self.fetch_count(tenant_id, kind).await?;
        Ok(gate::quota(count, &decision, kind))
    }

    async fn require_capacity(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError> {
        let quota = self.get_quota(tenant_id, kind).await?;

        if !quota.can_create {
            tracing::info!(
                "Blocking {} creation for tenant_id={}: limit reached (used {} of {}, plan={})",
                kind,
                tenant_id,
                quota.current_count,
                quota.limit,
                quota.plan_name
            );
            return Err(EntitlementError::LimitReached {
                kind,
                used: quota.current_count,
                limit: quota.limit,
                plan: quota.plan_name,
            });
        }

        Ok(quota)
    }

    async fn reserve(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError> {
        let decision = self.get_access_decision(tenant_id).await?;
        let limit = decision.resource_limits.for_kind(kind);

        // Check and increment happen atomically inside the repository
        let reserved = self
            .usage_counter_repo
            .try_increment(tenant_id, kind, limit)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to reserve {} for tenant_id={}", kind, tenant_id);
                EntitlementError::DatabaseError(e.to_string())
            })?;

        match reserved {
            Some(count) => {
                tracing::info!(
                    "Reserved {} for tenant_id={} ({} of {})",
                    kind,
                    tenant_id,
                    count,
                    limit
                );
                Ok(gate::quota(Some(count), &decision, kind))
            }
            None => {
                let used = effective_count(self.fetch_count(tenant_id, kind).await?);
                tracing::info!(
                    "Rejected {} reservation for tenant_id={}: limit reached (used {} of {}, plan={})",
                    kind,
                    tenant_id,
                    used,
                    limit,
                    decision.plan_name
                );
                Err(EntitlementError::LimitReached {
                    kind,
                    used,
                    limit,
                    plan: decision.plan_name,
                })
            }
        }
    }

    async fn record_created(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError> {
        let count = self
            .usage_counter_repo
            .increment(tenant_id, kind)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to increment {} count for tenant_id={}", kind, tenant_id);
                EntitlementError::DatabaseError(e.to_string())
            })?;

        let decision = self.get_access_decision(tenant_id).await?;
        let limit = decision.resource_limits.for_kind(kind);

        if count as u64 > limit {
            tracing::warn!(
                "Recorded {} creation for tenant_id={} over the limit ({} of {}, plan={})",
                kind,
                tenant_id,
                count,
                limit,
                decision.plan_name
            );
        } else {
            tracing::info!(
                "Recorded {} creation for tenant_id={} ({} of {})",
                kind,
                tenant_id,
                count,
                limit
            );
        }

        Ok(gate::quota(Some(count), &decision, kind))
    }

    async fn record_deleted(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> Result<ResourceQuota, EntitlementError> {
        let count = self
            .usage_counter_repo
            .decrement(tenant_id, kind)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to decrement {} count for tenant_id={}", kind, tenant_id);
                EntitlementError::DatabaseError(e.to_string())
            })?;

        tracing::info!(
            "Recorded {} deletion for tenant_id={} (now {})",
            kind,
            tenant_id,
            count
        );

        let decision = self.get_access_decision(tenant_id).await?;
        Ok(gate::quota(Some(count), &decision, kind))
    }

    async fn set_subscription(
        &self,
        tenant_id: TenantId,
        record: SubscriptionRecord,
    ) -> Result<AccessDecision, EntitlementError> {
        tracing::info!(
            "Admin: Setting subscription for tenant_id={}, price_id={:?}, status={}",
            tenant_id,
            record.price_id,
            record.status
        );

        let stored = self
            .subscription_repo
            .upsert_subscription(tenant_id, record)
            .await?;

        Ok(self.resolver.resolve_limits(Some(&stored)))
    }

    async fn clear_subscription(
        &self,
        tenant_id: TenantId,
    ) -> Result<AccessDecision, EntitlementError> {
        tracing::info!("Admin: Clearing subscriptions for tenant_id={}", tenant_id);

        let removed = self
            .subscription_repo
            .delete_subscriptions(tenant_id)
            .await?;

        tracing::debug!(
            "Removed {} subscription(s) for tenant_id={}",
            removed,
            tenant_id
        );

        Ok(self.resolver.resolve_limits(None))
    }
}
