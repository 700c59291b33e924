//! First-run seed data.
//!
//! On startup with an empty `users` table, provisions the Admin and User
//! roles, the admin account (credentials from [`AdminSeedConfig`]), and the
//! default menu set with every menu granted to Admin. Runs as a single
//! transaction; a populated `users` table makes this a no-op.

use console_core::roles::{ROLE_ADMIN, ROLE_USER};
use console_core::types::DbId;
use console_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::AdminSeedConfig;

/// Failures during first-run seeding. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    Hash(argon2::password_hash::Error),
}

/// Default menus seeded on first run: (name, code, path, icon, sort_order).
const DEFAULT_MENUS: &[(&str, &str, &str, &str, i32)] = &[
    ("Dashboard", "dashboard", "/dashboard", "HomeFilled", 1),
    ("Users", "users", "/users", "User", 2),
    ("Roles", "roles", "/roles", "UserFilled", 3),
];

/// Seed roles, the admin user, and the default menus when the users table
/// is empty. Returns `true` if seeding ran.
pub async fn seed_if_empty(pool: &DbPool, admin: &AdminSeedConfig) -> Result<bool, BootstrapError> {
    let mut tx = pool.begin().await?;

    let (user_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(&mut *tx)
        .await?;
    if user_count > 0 {
        return Ok(false);
    }

    // Roles.
    let (admin_role_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id",
    )
    .bind(ROLE_ADMIN)
    .bind("Administrator role")
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO roles (name, description) VALUES ($1, $2)")
        .bind(ROLE_USER)
        .bind("Regular user role")
        .execute(&mut *tx)
        .await?;

    // Admin account.
    let password_hash = hash_password(&admin.password).map_err(BootstrapError::Hash)?;
    let (admin_user_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&admin.username)
    .bind(&admin.email)
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(admin_user_id)
        .bind(admin_role_id)
        .execute(&mut *tx)
        .await?;

    // Default menus, all granted to Admin.
    for (name, code, path, icon, sort_order) in DEFAULT_MENUS {
        let (menu_id,): (DbId,) = sqlx::query_as(
            "INSERT INTO menus (name, code, path, icon, sort_order)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(name)
        .bind(code)
        .bind(path)
        .bind(icon)
        .bind(sort_order)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO role_menus (role_id, menu_id) VALUES ($1, $2)")
            .bind(admin_role_id)
            .bind(menu_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    tracing::info!(username = %admin.username, "Seeded first-run roles, admin user, and menus");
    Ok(true)
}
