use serde::Deserialize;

use crate::types::models::user::role::Role;

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,

    pub email: Option<String>,

    pub password: Option<String>,

    pub role: Option<Role>,

    pub phone: Option<String>,

    pub avatar_url: Option<String>,

    pub is_verified: Option<bool>,
}
