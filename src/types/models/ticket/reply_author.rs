use serde::{Deserialize, Serialize};
use strum::Display;

use crate::types::models::user::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReplyAuthor {
    Admin,
    User,
}

impl From<Role> for ReplyAuthor {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => ReplyAuthor::Admin,
            Role::User => ReplyAuthor::User,
        }
    }
}
