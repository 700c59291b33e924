//! Repository for the `menus` table.

use console_core::types::DbId;
use sqlx::PgPool;

use crate::models::menu::{CreateMenu, Menu, UpdateMenu};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, code, path, icon, parent_id, sort_order, is_visible, created_at, updated_at";

/// Provides CRUD operations for menus.
pub struct MenuRepo;

impl MenuRepo {
    /// Insert a new menu, returning the created row.
    ///
    /// `parent_id` is passed through as-is; a dangling reference is rejected
    /// by the foreign key, not by this layer.
    pub async fn create(pool: &PgPool, input: &CreateMenu) -> Result<Menu, sqlx::Error> {
        let query = format!(
            "INSERT INTO menus (name, code, path, icon, parent_id, sort_order, is_visible)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.path)
            .bind(&input.icon)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(input.is_visible)
            .fetch_one(pool)
            .await
    }

    /// Find a menu by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Menu>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM menus WHERE id = $1");
        sqlx::query_as::<_, Menu>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all visible menus ordered by sort order, ties broken by ID.
    pub async fn list_visible(pool: &PgPool) -> Result<Vec<Menu>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM menus WHERE is_visible = true
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Menu>(&query).fetch_all(pool).await
    }

    /// List the visible menus reachable by a user through any of their
    /// roles, deduplicated, in one batched query.
    ///
    /// A user with no roles (or roles with no grants) gets an empty list.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Menu>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(
            "SELECT DISTINCT m.id, m.name, m.code, m.path, m.icon, m.parent_id,
                    m.sort_order, m.is_visible, m.created_at, m.updated_at
             FROM menus m
             JOIN role_menus rm ON rm.menu_id = m.id
             JOIN user_roles ur ON ur.role_id = rm.role_id
             WHERE ur.user_id = $1 AND m.is_visible = true
             ORDER BY m.sort_order ASC, m.id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Fetch every `(id, parent_id)` pair. Feeds the core cycle guard when
    /// a menu is re-parented.
    pub async fn parent_links(pool: &PgPool) -> Result<Vec<(DbId, Option<DbId>)>, sqlx::Error> {
        sqlx::query_as("SELECT id, parent_id FROM menus ORDER BY id ASC")
            .fetch_all(pool)
            .await
    }

    /// Update a menu. The update is full-field: every column is written
    /// from the DTO.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMenu,
    ) -> Result<Option<Menu>, sqlx::Error> {
        let query = format!(
            "UPDATE menus SET
                name = $2,
                code = $3,
                path = $4,
                icon = $5,
                parent_id = $6,
                sort_order = $7,
                is_visible = $8,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Menu>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.path)
            .bind(&input.icon)
            .bind(input.parent_id)
            .bind(input.sort_order)
            .bind(input.is_visible)
            .fetch_optional(pool)
            .await
    }

    /// Count the direct children of a menu. Deletion is blocked while this
    /// is non-zero so children are never orphaned.
    pub async fn count_children(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menus WHERE parent_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Hard-delete a menu. Grant rows cascade; child menus are protected by
    /// the `ON DELETE RESTRICT` foreign key.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
