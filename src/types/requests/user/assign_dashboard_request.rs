use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AssignDashboardRequest {
    pub dashboard_id: String,

    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}
