pub mod subscription_repository;
pub mod usage_counter_repository;

pub use subscription_repository::InMemorySubscriptionRepository;
pub use usage_counter_repository::InMemoryUsageCounterRepository;
