use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subscription record as pushed by an admin or a billing sync job
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetSubscriptionRequest {
    /// Provider price id (e.g. "price_1RaQ0KDBPJVWy5Mhrf7REir7")
    #[serde(default)]
    pub price_id: Option<String>,
    /// Provider status (e.g. "active", "canceled", "past_due")
    pub status: String,
    /// End of the current billing period, seconds since epoch
    #[serde(default)]
    pub current_period_end: Option<i64>,
    /// Subscription terminates at `current_period_end`
    #[serde(default)]
    pub cancel_at_period_end: bool,
}
