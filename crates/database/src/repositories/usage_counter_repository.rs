use async_trait::async_trait;
use services::subscription::ports::{ResourceKind, UsageCounterRepository};
use services::TenantId;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Per-tenant resource counters. Every update runs under the write lock, so a
/// limit check and its increment can't interleave with another update.
#[derive(Default)]
pub struct InMemoryUsageCounterRepository {
    counts: RwLock<HashMap<(TenantId, ResourceKind), i64>>,
}

impl InMemoryUsageCounterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageCounterRepository for InMemoryUsageCounterRepository {
    async fn get_count(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
    ) -> anyhow::Result<Option<i64>> {
        let counts = self.counts.read().await;
        Ok(counts.get(&(tenant_id, kind)).copied())
    }

    async fn try_increment(
        &self,
        tenant_id: TenantId,
        kind: ResourceKind,
        limit: u64,
    ) -> anyhow::Result<Option<i64>> {
        let mut counts = self.counts.write().await;
        let count = counts.entry((tenant_id, kind)).or_insert(0);
        let current = (*count).max(0);

        if current as u64 >= limit {
            tracing::debug!(
                "Repository: {} counter for tenant_id={} at limit ({} of {})",
                kind,
                tenant_id,
                current,
                limit
            );
            return Ok(None);
        }

        *count = current + 1;
        Ok(Some(*count))
    }

    async fn increment(&self, tenant_id: TenantId, kind: ResourceKind) -> anyhow::Result<i64> {
        let mut counts = self.counts.write().await;
        let count = counts.entry((tenant_id, kind)).or_insert(0);
        *count = (*count).max(0) + 1;
        Ok(*count)
    }

    async fn decrement(&self, tenant_id: TenantId, kind: ResourceKind) -> anyhow::Result<i64> {
        let mut counts = self.counts.write().await;
        let count = counts.entry((tenant_id, kind)).or_insert(0);
        *count = (*count - 1).max(0);
        Ok(*count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_increment_ignores_limit() {
        let repo = InMemoryUsageCounterRepository::new();
        let tenant = TenantId::new();

        repo.try_increment(tenant, ResourceKind::Invoice, 1).await.unwrap();
        assert_eq!(
            repo.try_increment(tenant, ResourceKind::Invoice, 1).await.unwrap(),
            None
        );
        assert_eq!(repo.increment(tenant, ResourceKind::Invoice).await.unwrap(), 2);
        assert_eq!(
            repo.get_count(tenant, ResourceKind::Invoice).await.unwrap(),
            Some(2)
        );
    }

    #[tokio::test]
    async fn test_try_increment_stops_at_limit() {
        let repo = InMemoryUsageCounterRepository::new();
        let tenant = TenantId::new();
        assert_eq!(repo.get_count(tenant, ResourceKind::Invoice).await.unwrap(), None);

        assert_eq!(
            repo.try_increment(tenant, ResourceKind::Invoice, 2).await.unwrap(),
            Some(1)
        );
        assert_eq!(
            repo.try_increment(tenant, ResourceKind::Invoice, 2).await.unwrap(),
            Some(2)
        );
        assert_eq!(
            repo.try_increment(tenant, ResourceKind::Invoice, 2).await.unwrap(),
            None
        );
        assert_eq!(
            repo.get_count(tenant, ResourceKind::Invoice).await.unwrap(),
            Some(2)
        );
        // Kinds are counted separately
        assert_eq!(repo.get_count(tenant, ResourceKind::Contract).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_decrement_saturates_at_zero() {
        let repo = InMemoryUsageCounterRepository::new();
        let tenant = TenantId::new();
        assert_eq!(repo.decrement(tenant, ResourceKind::Contract).await.unwrap(), 0);
        repo.try_increment(tenant, ResourceKind::Contract, 5)
            .await
            .unwrap();
        assert_eq!(repo.decrement(tenant, ResourceKind::Contract).await.unwrap(), 0);
        assert_eq!(repo.decrement(tenant, ResourceKind::Contract).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_never_exceed_limit() {
        let repo = Arc::new(InMemoryUsageCounterRepository::new());
        let tenant = TenantId::new();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move {
                    repo.try_increment(tenant, ResourceKind::Invoice, 10)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                granted += 1;
            }
        }

        assert_eq!(granted, 10);
        assert_eq!(
            repo.get_count(tenant, ResourceKind::Invoice).await.unwrap(),
            Some(10)
        );
    }
}
