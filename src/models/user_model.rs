use crate::types::models::user::{defaults::default_role, role::Role};
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A grant of one dashboard to one user. `expires_at = None` never expires.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DashboardAssignment {
    pub dashboard_id: ObjectId,

    #[serde(default = "Utc::now")]
    pub assigned_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl DashboardAssignment {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at > now)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    pub name: String,

    pub email: String,

    /// Argon2 PHC string.
    pub password: String,

    #[serde(default = "default_role")]
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub is_verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,

    #[serde(default)]
    pub dashboard_assignments: Vec<DashboardAssignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn assignment_for(&self, dashboard_id: &ObjectId) -> Option<&DashboardAssignment> {
        self.dashboard_assignments
            .iter()
            .find(|assignment| &assignment.dashboard_id == dashboard_id)
    }

    pub fn expired_assignment_count(&self, now: DateTime<Utc>) -> usize {
        self.dashboard_assignments
            .iter()
            .filter(|assignment| !assignment.is_valid_at(now))
            .count()
    }

    pub fn expired_assignments(&self, now: DateTime<Utc>) -> Vec<DashboardAssignment> {
        self.dashboard_assignments
            .iter()
            .filter(|assignment| !assignment.is_valid_at(now))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;

    pub fn user(role: Role) -> User {
        let now = Utc::now();
        User {
            _id: Some(ObjectId::new()),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "hash".to_string(),
            role,
            avatar_url: None,
            phone: None,
            is_verified: true,
            verification_token: None,
            dashboard_assignments: Vec::new(),
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
