//! Handlers for the `/users` resource.
//!
//! Username and email uniqueness are checked here (the `uq_*` constraints
//! are the backstop). Role assignments follow full-replace semantics: a
//! supplied `role_ids` list -- even an empty one -- replaces the user's
//! association set wholesale; omitting it leaves the set untouched.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use console_core::error::CoreError;
use console_core::types::DbId;
use console_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use console_db::repositories::{RoleRepo, UserRepo};
use serde::Deserialize;

use crate::auth::password::{hash_password, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

/// Minimum password length enforced on user creation.
const MIN_PASSWORD_LENGTH: usize = 6;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    /// Roles to assign. Ids that do not resolve are silently skipped.
    #[serde(default)]
    pub role_ids: Vec<DbId>,
}

/// Request body for `PUT /users/{id}`. Partial update: only present fields
/// are applied.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    /// `None` leaves role assignments untouched; `Some(vec![])` clears them.
    pub role_ids: Option<Vec<DbId>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/users
///
/// Create a user: uniqueness checks, password hashing, then the user row and
/// its role associations in one transaction.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    if input.username.is_empty() || input.email.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username and email must not be empty".into(),
        )));
    }
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already exists".into(),
        )));
    }
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Email already exists".into(),
        )));
    }

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.username,
        email: input.email,
        password_hash: hashed,
        phone: input.phone,
    };
    let user = UserRepo::create_with_roles(&state.pool, &create_dto, &input.role_ids).await?;

    let response = user_to_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/users
///
/// List all users with resolved role names. Role names for the whole page
/// are fetched in one batched query -- no per-user lookups.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;

    let user_ids: Vec<DbId> = users.iter().map(|u| u.id).collect();
    let pairs = RoleRepo::names_for_users(&state.pool, &user_ids).await?;

    let mut names_by_user: HashMap<DbId, Vec<String>> = HashMap::new();
    for (user_id, name) in pairs {
        names_by_user.entry(user_id).or_default().push(name);
    }

    let responses = users
        .iter()
        .map(|u| {
            let roles = names_by_user.remove(&u.id).unwrap_or_default();
            UserResponse::from_user(u, roles)
        })
        .collect();

    Ok(Json(responses))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let response = user_to_response(&state, &user).await?;
    Ok(Json(response))
}

/// PUT /api/v1/users/{id}
///
/// Partial update. Changing the email re-checks uniqueness, excluding this
/// user's own row.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    if let Some(email) = &input.email {
        if let Some(existing) = UserRepo::find_by_email(&state.pool, email).await? {
            if existing.id != id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Email already exists".into(),
                )));
            }
        }
    }

    let update_dto = UpdateUser {
        email: input.email,
        phone: input.phone,
        is_active: input.is_active,
        role_ids: input.role_ids,
    };
    let user = UserRepo::update_with_roles(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    let response = user_to_response(&state, &user).await?;
    Ok(Json(response))
}

/// DELETE /api/v1/users/{id}
///
/// Hard delete; `user_roles` rows cascade.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = UserRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "User", id }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Convert a [`User`] row into a [`UserResponse`] with resolved role names.
async fn user_to_response(state: &AppState, user: &User) -> AppResult<UserResponse> {
    let roles = RoleRepo::list_for_user(&state.pool, user.id).await?;
    let names = roles.into_iter().map(|r| r.name).collect();
    Ok(UserResponse::from_user(user, names))
}
