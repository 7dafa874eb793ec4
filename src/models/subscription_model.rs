use crate::types::models::pricing::subscription_status::SubscriptionStatus;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subscription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub user_id: ObjectId,

    pub plan_id: ObjectId,

    pub status: SubscriptionStatus,

    pub current_period_start: DateTime<Utc>,

    pub current_period_end: DateTime<Utc>,

    #[serde(default)]
    pub is_trial: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_subscription_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_customer_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Plan dashboards are reachable only while the subscription is live and
    /// the current period has not ended.
    pub fn grants_access(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && now < self.current_period_end
    }

    /// Still flagged active/trialing although the period is over.
    pub fn has_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && now >= self.current_period_end
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use chrono::Duration;

    pub fn subscription(
        user_id: ObjectId,
        plan_id: ObjectId,
        status: SubscriptionStatus,
        ends_in: Duration,
    ) -> Subscription {
        let now = Utc::now();
        Subscription {
            _id: Some(ObjectId::new()),
            user_id,
            plan_id,
            status,
            current_period_start: now - Duration::days(1),
            current_period_end: now + ends_in,
            is_trial: status == SubscriptionStatus::Trialing,
            stripe_subscription_id: None,
            stripe_customer_id: None,
            canceled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::subscription;
    use super::*;
    use chrono::Duration;

    #[test]
    fn live_subscription_grants_access_until_period_end() {
        let now = Utc::now();
        let sub = subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Trialing,
            Duration::days(3),
        );
        assert!(sub.grants_access(now));
        assert!(!sub.grants_access(sub.current_period_end));
        assert!(sub.has_lapsed(sub.current_period_end));
    }

    #[test]
    fn canceled_subscription_never_grants_access() {
        let now = Utc::now();
        let mut sub = subscription(
            ObjectId::new(),
            ObjectId::new(),
            SubscriptionStatus::Active,
            Duration::days(30),
        );
        sub.status = SubscriptionStatus::Canceled;
        assert!(!sub.grants_access(now));
        assert!(!sub.has_lapsed(now + Duration::days(60)));
    }
}
