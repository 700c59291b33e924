//! Well-known role name constants.
//!
//! These must match the seed data written by the API bootstrap on first run.

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_USER: &str = "User";
