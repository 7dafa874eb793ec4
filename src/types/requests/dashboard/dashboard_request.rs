use serde::Deserialize;
use validator::Validate;

/// Body for both creating and replacing a dashboard.
#[derive(Debug, Deserialize, Validate)]
pub struct DashboardRequest {
    #[validate(length(min = 2, max = 120))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(url)]
    pub embed_url: String,

    #[serde(default)]
    pub is_active: Option<bool>,

    #[serde(default)]
    pub is_public: Option<bool>,

    #[serde(default)]
    pub category_id: Option<String>,
}
