pub mod repositories;

use repositories::{InMemorySubscriptionRepository, InMemoryUsageCounterRepository};
use services::subscription::ports::{SubscriptionRepository, UsageCounterRepository};
use std::sync::Arc;

/// Process-local store combining all repositories.
///
/// State lives for the lifetime of the process. Subscriptions and usage
/// counters start empty on every restart, so limits are not durable across
/// restarts. Durable storage is expected to implement the same ports.
#[derive(Default)]
pub struct Database {
    subscriptions: Arc<InMemorySubscriptionRepository>,
    usage_counters: Arc<InMemoryUsageCounterRepository>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscription_repository(&self) -> Arc<dyn SubscriptionRepository> {
        self.subscriptions.clone()
    }

    pub fn usage_counter_repository(&self) -> Arc<dyn UsageCounterRepository> {
        self.usage_counters.clone()
    }
}
