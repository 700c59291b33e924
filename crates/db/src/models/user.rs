//! User entity model and DTOs.

use console_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    /// Resolved role names (e.g. `["Admin"]`), ordered by role id.
    pub roles: Vec<String>,
}

impl UserResponse {
    /// Build a response from a user row and its pre-resolved role names.
    pub fn from_user(user: &User, roles: Vec<String>) -> Self {
        UserResponse {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
            roles,
        }
    }
}

/// DTO for creating a new user. The password is hashed by the caller.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
}

/// DTO for updating an existing user. Only non-`None` fields are applied.
///
/// `role_ids` carries the full-replace semantics for role associations:
/// `None` leaves the association set untouched, `Some(vec![])` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub role_ids: Option<Vec<DbId>>,
}
