use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Every dashboard in a public category is visible to all users.
    #[serde(default)]
    pub is_public: bool,

    #[serde(default)]
    pub dashboards: Vec<ObjectId>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}
