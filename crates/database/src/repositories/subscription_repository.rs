use async_trait::async_trait;
use services::subscription::ports::{SubscriptionRecord, SubscriptionRepository};
use services::TenantId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Keeps every subscription a tenant ever had, newest last.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    rows: RwLock<HashMap<TenantId, Vec<SubscriptionRecord>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn get_latest_subscription(
        &self,
        tenant_id: TenantId,
    ) -> anyhow::Result<Option<SubscriptionRecord>> {
        tracing::debug!(
            "Repository: Fetching latest subscription for tenant_id={}",
            tenant_id
        );

        let rows = self.rows.read().await;
        Ok(rows
            .get(&tenant_id)
            .and_then(|history| history.last())
            .cloned())
    }

    async fn upsert_subscription(
        &self,
        tenant_id: TenantId,
        record: SubscriptionRecord,
    ) -> anyhow::Result<SubscriptionRecord> {
        tracing::info!(
            "Repository: Upserting subscription - tenant_id={}, price_id={:?}, status={}",
            tenant_id,
            record.price_id,
            record.status
        );

        let mut rows = self.rows.write().await;
        let history = rows.entry(tenant_id).or_default();
        // Same price id is the same subscription: drop the old copy, append as latest
        history.retain(|existing| existing.price_id != record.price_id);
        history.push(record.clone());
        Ok(record)
    }

    async fn delete_subscriptions(&self, tenant_id: TenantId) -> anyhow::Result<u64> {
        tracing::info!(
            "Repository: Deleting subscriptions for tenant_id={}",
            tenant_id
        );

        let mut rows = self.rows.write().await;
        Ok(rows
            .remove(&tenant_id)
            .map_or(0, |history| history.len() as u64))
    }
}
