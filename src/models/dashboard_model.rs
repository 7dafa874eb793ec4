use crate::types::models::user::defaults::default_true;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An embedded Power BI report.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Dashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub embed_url: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_public: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<ObjectId>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}
