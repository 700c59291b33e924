//! Handlers for the `/auth` resource (login).

use axum::extract::State;
use axum::Json;
use console_core::error::CoreError;
use console_db::models::user::UserResponse;
use console_db::repositories::{RoleRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
    pub roles: Vec<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns a bearer token whose role
/// claims are a snapshot of the user's roles at this moment.
///
/// "User not found", "account inactive", and "wrong password" all collapse
/// into the same 401 so the endpoint cannot be used to enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password must not be empty".into(),
        ));
    }

    // 1. Find the user by exact, case-sensitive username.
    let Some(user) = UserRepo::find_by_username(&state.pool, &input.username).await? else {
        return Err(invalid_credentials());
    };

    // 2. Inactive accounts are deliberately indistinguishable from unknown ones.
    if !user.is_active {
        return Err(invalid_credentials());
    }

    // 3. Verify the password. A malformed stored hash is a server fault,
    //    never a login failure.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(invalid_credentials());
    }

    // 4. Resolve the current role set in one batched fetch.
    let roles = RoleRepo::list_for_user(&state.pool, user.id).await?;
    let role_names: Vec<String> = roles.into_iter().map(|r| r.name).collect();

    // 5. Issue the token with the resolved names.
    let token = generate_access_token(user.id, &user.username, &role_names, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, username = %user.username, "Login succeeded");

    Ok(Json(LoginResponse {
        user: UserResponse::from_user(&user, role_names.clone()),
        roles: role_names,
        token,
    }))
}

/// The single error shape for every authentication failure.
fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid username or password".into()))
}
