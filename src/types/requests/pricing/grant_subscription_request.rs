use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::models::pricing::subscription_status::SubscriptionStatus;

/// Manual subscription created by an admin (offline payment, comp access).
#[derive(Debug, Deserialize)]
pub struct GrantSubscriptionRequest {
    pub user_id: String,

    pub plan_id: String,

    #[serde(default)]
    pub status: Option<SubscriptionStatus>,

    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,

    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}
