use crate::types::models::{pricing::billing_cycle::BillingCycle, user::defaults::default_true};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PricingPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price in the currency's minor unit (cents).
    pub price_minor: i64,

    /// ISO 4217, lowercase.
    pub currency: String,

    pub billing_cycle: BillingCycle,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub dashboards: Vec<ObjectId>,

    #[serde(default)]
    pub trial_days: u32,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_price_id: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl PricingPlan {
    pub fn includes(&self, dashboard_id: &ObjectId) -> bool {
        self.dashboards.contains(dashboard_id)
    }

    pub fn offers_trial(&self) -> bool {
        self.is_active && self.trial_days > 0
    }
}
