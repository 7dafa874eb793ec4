use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    models::user_model::{DashboardAssignment, User},
    types::models::user::role::Role,
};

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub dashboard_id: String,
    pub assigned_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub has_access: bool,
}

impl AssignmentResponse {
    pub fn from_assignment(assignment: &DashboardAssignment, now: DateTime<Utc>) -> Self {
        Self {
            dashboard_id: assignment.dashboard_id.to_hex(),
            assigned_at: assignment.assigned_at,
            expires_at: assignment.expires_at,
            has_access: assignment.is_valid_at(now),
        }
    }
}

/// Client-facing view of a user; never carries the password hash or the
/// verification token.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub dashboard_assignments: Vec<AssignmentResponse>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_user(user: User, now: DateTime<Utc>) -> Self {
        let dashboard_assignments = user
            .dashboard_assignments
            .iter()
            .map(|assignment| AssignmentResponse::from_assignment(assignment, now))
            .collect();

        Self {
            id: user._id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            email: user.email,
            role: user.role,
            avatar_url: user.avatar_url,
            phone: user.phone,
            is_verified: user.is_verified,
            dashboard_assignments,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user_model::fixtures;

    #[test]
    fn response_hides_credentials() {
        let mut user = fixtures::user(Role::User);
        user.verification_token = Some("token-value".to_string());
        let value = serde_json::to_value(UserResponse::from_user(user, Utc::now())).unwrap();

        assert!(value.get("password").is_none());
        assert!(value.get("verification_token").is_none());
        assert_eq!(value["role"], "user");
    }
}
