//! Repository for the `users` table and its `user_roles` associations.

use console_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, username, email, password_hash, phone, is_active, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user and attach the requested roles, atomically.
    ///
    /// Role ids are resolved in one batched query before inserting the
    /// association rows; ids that do not resolve to an existing role are
    /// silently skipped. Either everything lands or nothing does.
    pub async fn create_with_roles(
        pool: &PgPool,
        input: &CreateUser,
        role_ids: &[DbId],
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO users (username, email, password_hash, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .fetch_one(&mut *tx)
            .await?;

        let resolved = resolve_role_ids(&mut tx, role_ids).await?;
        for role_id in resolved {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(user.id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List all users ordered by ID ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users ORDER BY id ASC");
        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// When `input.role_ids` is `Some`, the user's role associations are
    /// fully replaced (delete-all-then-insert-resolved) in the same
    /// transaction -- an empty list clears them. `None` leaves them alone.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_with_roles(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE users SET
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.is_active)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        if let Some(role_ids) = &input.role_ids {
            sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let resolved = resolve_role_ids(&mut tx, role_ids).await?;
            // ON CONFLICT: a concurrent identical replacement may commit its
            // inserts between our delete and ours; the race is last-write-wins,
            // never an error.
            for role_id in resolved {
                sqlx::query(
                    "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)
                     ON CONFLICT DO NOTHING",
                )
                .bind(id)
                .bind(role_id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(user))
    }

    /// Hard-delete a user. Association rows cascade via the foreign keys.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Resolve the subset of `role_ids` that exist, in one batched query.
async fn resolve_role_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    role_ids: &[DbId],
) -> Result<Vec<DbId>, sqlx::Error> {
    if role_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<(DbId,)> =
        sqlx::query_as("SELECT DISTINCT id FROM roles WHERE id = ANY($1) ORDER BY id")
            .bind(role_ids)
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
