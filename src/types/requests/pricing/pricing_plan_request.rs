use serde::Deserialize;
use validator::Validate;

use crate::types::models::pricing::billing_cycle::BillingCycle;

#[derive(Debug, Deserialize, Validate)]
pub struct PricingPlanRequest {
    #[validate(length(min = 2, max = 80))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(range(min = 0))]
    pub price_minor: i64,

    pub currency: String,

    pub billing_cycle: BillingCycle,

    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub dashboards: Vec<String>,

    #[serde(default)]
    #[validate(range(max = 365))]
    pub trial_days: u32,

    #[serde(default)]
    pub is_active: Option<bool>,

    #[serde(default)]
    pub stripe_price_id: Option<String>,
}
