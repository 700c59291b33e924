//! Menu entity model and DTOs.

use console_core::menu_tree::TreeItem;
use console_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A menu row from the `menus` table.
///
/// Menus are self-referential: `parent_id` points at another menu row, and
/// the set of rows forms a forest materialized by the core tree builder.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Menu {
    pub id: DbId,
    pub name: String,
    pub code: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<DbId>,
    pub sort_order: i32,
    pub is_visible: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TreeItem for Menu {
    fn id(&self) -> DbId {
        self.id
    }
    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }
    fn sort_order(&self) -> i32 {
        self.sort_order
    }
}

/// DTO for creating a new menu. There is no uniqueness constraint on
/// `name` or `code`; multiple menus may share either.
#[derive(Debug, Deserialize)]
pub struct CreateMenu {
    pub name: String,
    pub code: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<DbId>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

/// DTO for updating a menu. Updates are full-field: every column is written
/// from the DTO, matching the create shape.
pub type UpdateMenu = CreateMenu;
