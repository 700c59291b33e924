//! Role entity model and DTOs.

use console_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A role row from the `roles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Role {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new role.
#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub name: String,
    pub description: Option<String>,
}

/// DTO for updating an existing role.
///
/// `menu_ids` carries the full-replace semantics for menu grants: `None`
/// leaves the grant set untouched, `Some(vec![])` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub description: Option<String>,
    pub menu_ids: Option<Vec<DbId>>,
}
