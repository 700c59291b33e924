//! HTTP-level integration tests for the `/users` resource.
//!
//! Covers admin-gated CRUD, duplicate detection, partial updates, and the
//! full-replace semantics of `role_ids`.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get_auth, post_json, post_json_auth, put_json_auth};
use console_api::auth::password::hash_password;
use console_core::roles::ROLE_ADMIN;
use console_db::models::role::CreateRole;
use console_db::models::user::CreateUser;
use console_db::repositories::{RoleRepo, UserRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_role(pool: &PgPool, name: &str) -> i64 {
    RoleRepo::create_with_menus(
        pool,
        &CreateRole {
            name: name.to_string(),
            description: None,
        },
        &[],
    )
    .await
    .expect("role creation should succeed")
    .id
}

/// Seed a user with the given roles and log them in, returning their token.
async fn login_with_roles(pool: &PgPool, username: &str, role_ids: &[i64]) -> String {
    let password = "test_password_123";
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@test.com"),
        password_hash: hash_password(password).expect("hashing should succeed"),
        phone: None,
    };
    UserRepo::create_with_roles(pool, &input, role_ids)
        .await
        .expect("user creation should succeed");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["token"]
        .as_str()
        .expect("login must return a token")
        .to_string()
}

/// Seed an admin account and return its bearer token.
async fn admin_token(pool: &PgPool) -> String {
    let admin_role = create_role(pool, ROLE_ADMIN).await;
    login_with_roles(pool, "rootadmin", &[admin_role]).await
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Admin creates a user with roles; unknown role ids are silently skipped.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user(pool: PgPool) {
    let token = admin_token(&pool).await;
    let ops_role = create_role(&pool, "Ops").await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "newuser",
        "email": "newuser@test.com",
        "password": "strong_password_123",
        "phone": "555-0100",
        "role_ids": [ops_role, 9999]
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["username"], "newuser");
    assert_eq!(json["email"], "newuser@test.com");
    assert_eq!(json["phone"], "555-0100");
    assert!(json["is_active"].as_bool().unwrap());
    assert_eq!(json["roles"], serde_json::json!(["Ops"]));
}

/// Duplicate usernames are rejected with the Conflict mapping.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_duplicate_username(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "taken",
        "email": "first@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "taken",
        "email": "second@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    common::assert_error(response, StatusCode::BAD_REQUEST, "CONFLICT").await;
}

/// Duplicate emails are rejected the same way.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_duplicate_email(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "first",
        "email": "shared@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "second",
        "email": "shared@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    common::assert_error(response, StatusCode::BAD_REQUEST, "CONFLICT").await;
}

/// Passwords below the minimum length fail validation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_user_short_password(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "shorty",
        "email": "shorty@test.com",
        "password": "abc"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    common::assert_error(response, StatusCode::BAD_REQUEST, "VALIDATION_ERROR").await;
}

// ---------------------------------------------------------------------------
// RBAC enforcement
// ---------------------------------------------------------------------------

/// A non-admin may read the user list but not create users.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_writes_require_admin_role(pool: PgPool) {
    let viewer_role = create_role(&pool, "Viewer").await;
    let token = login_with_roles(&pool, "viewer", &[viewer_role]).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/users", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "username": "sneaky",
        "email": "sneaky@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    common::assert_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Listing resolves role names for every user in the page.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_users_resolves_role_names(pool: PgPool) {
    let token = admin_token(&pool).await;
    let ops_role = create_role(&pool, "Ops").await;
    login_with_roles(&pool, "opsuser", &[ops_role]).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users", &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json.as_array().expect("response body should be an array");
    assert_eq!(users.len(), 2);

    let ops = users
        .iter()
        .find(|u| u["username"] == "opsuser")
        .expect("opsuser should be listed");
    assert_eq!(ops["roles"], serde_json::json!(["Ops"]));
}

/// Fetching a missing user returns 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_missing_user(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/users/424242", &token).await;
    common::assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// A partial update touches only the supplied fields; omitting `role_ids`
/// leaves the assignment set untouched.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update_preserves_roles(pool: PgPool) {
    let token = admin_token(&pool).await;
    let ops_role = create_role(&pool, "Ops").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "partial",
        "email": "partial@test.com",
        "password": "strong_password_123",
        "role_ids": [ops_role]
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "phone": "555-0199" });
    let response = put_json_auth(app, &format!("/api/v1/users/{id}"), body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["phone"], "555-0199");
    assert_eq!(json["email"], "partial@test.com");
    assert_eq!(json["roles"], serde_json::json!(["Ops"]));
}

/// An explicit empty `role_ids` clears every assignment.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_with_empty_role_ids_clears_roles(pool: PgPool) {
    let token = admin_token(&pool).await;
    let ops_role = create_role(&pool, "Ops").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "cleared",
        "email": "cleared@test.com",
        "password": "strong_password_123",
        "role_ids": [ops_role]
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    let id = body_json(response).await["id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "role_ids": [] });
    let response = put_json_auth(app, &format!("/api/v1/users/{id}"), body, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["roles"], serde_json::json!([]));
}

/// Changing an email to one held by another user conflicts; re-submitting a
/// user's own email does not.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_email_conflict_excludes_own_row(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "holder",
        "email": "held@test.com",
        "password": "strong_password_123"
    });
    post_json_auth(app, "/api/v1/users", body, &token).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "mover",
        "email": "mover@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    let mover_id = body_json(response).await["id"].as_i64().unwrap();

    // Taking another user's email conflicts.
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "held@test.com" });
    let response = put_json_auth(app, &format!("/api/v1/users/{mover_id}"), body, &token).await;
    common::assert_error(response, StatusCode::BAD_REQUEST, "CONFLICT").await;

    // Re-submitting one's own email is a no-op, not a conflict.
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "email": "mover@test.com" });
    let response = put_json_auth(app, &format!("/api/v1/users/{mover_id}"), body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Updating a missing user returns 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_missing_user(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "phone": "555-0000" });
    let response = put_json_auth(app, "/api/v1/users/424242", body, &token).await;
    common::assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// Delete returns 204, and a second delete of the same id returns 404.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_user(pool: PgPool) {
    let token = admin_token(&pool).await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "username": "doomed",
        "email": "doomed@test.com",
        "password": "strong_password_123"
    });
    let response = post_json_auth(app, "/api/v1/users", body, &token).await;
    let id = body_json(response).await["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/users/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/users/{id}"), &token).await;
    common::assert_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
}
