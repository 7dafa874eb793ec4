use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::models::dashboard::access_type::AccessType;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardAccess {
    pub dashboard_id: String,
    pub name: String,
    pub description: Option<String>,
    /// Present only when the user currently has access.
    pub embed_url: Option<String>,
    pub access_type: AccessType,
    pub has_access: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryAccess {
    /// `None` for the synthetic "Uncategorized" group.
    pub category_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub dashboards: Vec<DashboardAccess>,
}

#[derive(Debug, Serialize)]
pub struct DashboardViewResponse {
    pub activity_id: String,
    pub dashboard: DashboardAccess,
}
