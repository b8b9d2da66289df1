use chrono::{DateTime, Utc};

use super::ports::{SubscriptionRecord, SubscriptionStatus};

pub const FREE_STATUS: &str = "free";

/// Whether the subscription currently grants paid access
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessState {
    pub has_access: bool,
    pub effective_status: String,
}

/// Decide access for the tenant's latest subscription at instant `now`.
///
/// Active subscriptions always grant access. A canceled subscription that was
/// set to end at period end keeps access until `current_period_end` (strictly
/// after `now`). Every other status denies, and a missing period end never
/// grants the grace period.
pub fn evaluate_access(record: Option<&SubscriptionRecord>, now: DateTime<Utc>) -> AccessState {
    let Some(record) = record else {
        return AccessState {
            has_access: false,
            effective_status: FREE_STATUS.to_string(),
        };
    };

    let has_access = match record.status {
        SubscriptionStatus::Active => true,
        SubscriptionStatus::Canceled => {
            record.cancel_at_period_end
                && record
                    .current_period_end
                    .is_some_and(|period_end| period_end > now)
        }
        _ => false,
    };

    AccessState {
        has_access,
        effective_status: record.status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_750_000_000, 0).unwrap()
    }

    fn record(
        status: &str,
        period_end: Option<DateTime<Utc>>,
        cancel_at_period_end: bool,
    ) -> SubscriptionRecord {
        SubscriptionRecord {
            price_id: Some("price_1RaQ0KDBPJVWy5Mhrf7REir7".to_string()),
            status: SubscriptionStatus::from(status),
            current_period_end: period_end,
            cancel_at_period_end,
        }
    }

    #[test]
    fn test_absent_record_is_free() {
        let state = evaluate_access(None, now());
        assert!(!state.has_access);
        assert_eq!(state.effective_status, "free");
    }

    #[test]
    fn test_active_ignores_period_and_cancel_flag() {
        for (period_end, cancel) in [
            (None, false),
            (Some(now() - Duration::days(30)), true),
            (Some(now() + Duration::days(30)), false),
        ] {
            let state = evaluate_access(Some(&record("active", period_end, cancel)), now());
            assert!(state.has_access);
            assert_eq!(state.effective_status, "active");
        }
    }

    #[test]
    fn test_canceled_grace_period_boundary() {
        let end = now() + Duration::seconds(1);
        let r = record("canceled", Some(end), true);
        assert!(evaluate_access(Some(&r), now()).has_access);
        // At the exact end instant access is gone
        let at_end = evaluate_access(Some(&r), end);
        assert!(!at_end.has_access);
        assert_eq!(at_end.effective_status, "canceled");
    }

    #[test]
    fn test_canceled_without_flag_or_period_end_denies() {
        let future = Some(now() + Duration::hours(1));
        assert!(!evaluate_access(Some(&record("canceled", future, false)), now()).has_access);
        assert!(!evaluate_access(Some(&record("canceled", None, true)), now()).has_access);
    }

    #[test]
    fn test_unrecognised_cancel_spelling_gets_no_grace() {
        let state = evaluate_access(
            Some(&record("cancelled", Some(now() + Duration::hours(1)), true)),
            now(),
        );
        assert!(!state.has_access);
        assert_eq!(state.effective_status, "cancelled");
    }

    #[test]
    fn test_other_statuses_deny_and_echo() {
        let future = Some(now() + Duration::hours(1));
        for status in ["trialing", "past_due", "incomplete_expired", "unpaid", "something_new"] {
            let state = evaluate_access(Some(&record(status, future, true)), now());
            assert!(!state.has_access, "{status} must not grant access");
            assert_eq!(state.effective_status, status);
        }
    }
}
