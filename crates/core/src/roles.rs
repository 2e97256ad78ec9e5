//! Well-known role name constants.
//!
//! These must match the `ck_users_role` check constraint in
//! `20251113000001_create_users_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Whether the given role grants administrator views.
pub fn is_admin(role: &str) -> bool {
    role == ROLE_ADMIN
}
