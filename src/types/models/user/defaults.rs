use super::role::Role;

pub fn default_role() -> Role {
    Role::User
}

pub fn default_true() -> bool {
    true
}
