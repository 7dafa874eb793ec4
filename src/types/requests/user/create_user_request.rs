use serde::Deserialize;

use crate::types::models::user::role::Role;

/// Admin-side user creation; the account is verified unless stated otherwise.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,

    pub email: String,

    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,

    #[serde(default)]
    pub is_verified: Option<bool>,
}
