//! Repository for the `roles` table and its `role_menus` grants.

use console_core::types::DbId;
use sqlx::PgPool;

use crate::models::role::{CreateRole, Role, UpdateRole};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, is_active, created_at, updated_at";

/// Provides CRUD operations for roles.
pub struct RoleRepo;

impl RoleRepo {
    /// Insert a new role and grant the requested menus, atomically.
    ///
    /// Menu ids are resolved in one batched query; ids that do not resolve
    /// to an existing menu are silently skipped.
    pub async fn create_with_menus(
        pool: &PgPool,
        input: &CreateRole,
        menu_ids: &[DbId],
    ) -> Result<Role, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO roles (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        let resolved = resolve_menu_ids(&mut tx, menu_ids).await?;
        for menu_id in resolved {
            sqlx::query(
                "INSERT INTO role_menus (role_id, menu_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(role.id)
            .bind(menu_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(role)
    }

    /// Find a role by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE id = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a role by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles WHERE name = $1");
        sqlx::query_as::<_, Role>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// List all roles ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Role>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM roles ORDER BY id ASC");
        sqlx::query_as::<_, Role>(&query).fetch_all(pool).await
    }

    /// List the roles assigned to one user, in a single batched query.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name, r.description, r.is_active, r.created_at, r.updated_at
             FROM roles r
             JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Resolve role names for many users at once as `(user_id, role_name)`
    /// pairs, ordered by user then role id. One query regardless of how many
    /// users are asked for -- callers must not loop per user.
    pub async fn names_for_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as(
            "SELECT ur.user_id, r.name
             FROM user_roles ur
             JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ANY($1)
             ORDER BY ur.user_id ASC, r.id ASC",
        )
        .bind(user_ids)
        .fetch_all(pool)
        .await
    }

    /// List the menu ids granted to a role, ordered by menu sort order.
    pub async fn menu_ids_for_role(
        pool: &PgPool,
        role_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT rm.menu_id
             FROM role_menus rm
             JOIN menus m ON m.id = rm.menu_id
             WHERE rm.role_id = $1
             ORDER BY m.sort_order ASC, m.id ASC",
        )
        .bind(role_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Resolve granted menu ids for many roles at once as
    /// `(role_id, menu_id)` pairs, ordered by role then menu sort order.
    /// One query regardless of how many roles are asked for.
    pub async fn menu_ids_for_roles(
        pool: &PgPool,
        role_ids: &[DbId],
    ) -> Result<Vec<(DbId, DbId)>, sqlx::Error> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as(
            "SELECT rm.role_id, rm.menu_id
             FROM role_menus rm
             JOIN menus m ON m.id = rm.menu_id
             WHERE rm.role_id = ANY($1)
             ORDER BY rm.role_id ASC, m.sort_order ASC, m.id ASC",
        )
        .bind(role_ids)
        .fetch_all(pool)
        .await
    }

    /// Update a role. Only non-`None` fields in `input` are applied.
    ///
    /// When `input.menu_ids` is `Some`, the role's menu grants are fully
    /// replaced (delete-all-then-insert-resolved) in the same transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_with_menus(
        pool: &PgPool,
        id: DbId,
        input: &UpdateRole,
    ) -> Result<Option<Role>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE roles SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let role = sqlx::query_as::<_, Role>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(role) = role else {
            return Ok(None);
        };

        if let Some(menu_ids) = &input.menu_ids {
            sqlx::query("DELETE FROM role_menus WHERE role_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let resolved = resolve_menu_ids(&mut tx, menu_ids).await?;
            // ON CONFLICT: same rationale as the user/role replacement --
            // concurrent identical replacements must not error.
            for menu_id in resolved {
                sqlx::query(
                    "INSERT INTO role_menus (role_id, menu_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(menu_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(role))
    }

    /// Hard-delete a role. Association rows cascade via the foreign keys.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Resolve the subset of `menu_ids` that exist, in one batched query.
async fn resolve_menu_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    menu_ids: &[DbId],
) -> Result<Vec<DbId>, sqlx::Error> {
    if menu_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<(DbId,)> =
        sqlx::query_as("SELECT DISTINCT id FROM menus WHERE id = ANY($1) ORDER BY id")
            .bind(menu_ids)
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
