//! Handlers for the `/roles` resource.
//!
//! Role name uniqueness is checked here (case-sensitive exact match, with
//! the role's own row excluded on update); the `uq_roles_name` constraint
//! is the backstop. Menu grants follow full-replace semantics: a supplied
//! list -- even an empty one -- replaces the grant set wholesale.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use console_core::error::CoreError;
use console_core::types::DbId;
use console_db::models::role::{CreateRole, Role, UpdateRole};
use console_db::repositories::RoleRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /roles`.
#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    /// Menus to grant. Missing and empty both mean "no grants".
    #[serde(default)]
    pub menu_ids: Vec<DbId>,
}

/// Request body for `PUT /roles/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `None` leaves the grant set untouched; `Some(vec![])` clears it.
    pub menu_ids: Option<Vec<DbId>>,
}

/// Role with its granted menu ids.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: console_core::types::Timestamp,
    /// Granted menu ids, ordered by the menus' sort order.
    pub menu_ids: Vec<DbId>,
}

impl RoleResponse {
    fn from_role(role: Role, menu_ids: Vec<DbId>) -> Self {
        RoleResponse {
            id: role.id,
            name: role.name,
            description: role.description,
            is_active: role.is_active,
            created_at: role.created_at,
            menu_ids,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/roles
pub async fn list_roles(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<Vec<RoleResponse>>> {
    let roles = RoleRepo::list(&state.pool).await?;

    // One batched grant lookup for all roles -- never one query per role.
    let role_ids: Vec<DbId> = roles.iter().map(|r| r.id).collect();
    let pairs = RoleRepo::menu_ids_for_roles(&state.pool, &role_ids).await?;

    let mut menus_by_role: HashMap<DbId, Vec<DbId>> = HashMap::new();
    for (role_id, menu_id) in pairs {
        menus_by_role.entry(role_id).or_default().push(menu_id);
    }

    let responses = roles
        .into_iter()
        .map(|role| {
            let menu_ids = menus_by_role.remove(&role.id).unwrap_or_default();
            RoleResponse::from_role(role, menu_ids)
        })
        .collect();

    Ok(Json(responses))
}

/// GET /api/v1/roles/{id}
pub async fn get_role(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<RoleResponse>> {
    let role = RoleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Role", id }))?;

    let menu_ids = RoleRepo::menu_ids_for_role(&state.pool, id).await?;
    Ok(Json(RoleResponse::from_role(role, menu_ids)))
}

/// POST /api/v1/roles
///
/// Create a role and grant the requested menus atomically. Menu ids that do
/// not resolve to an existing menu are silently skipped.
pub async fn create_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateRoleRequest>,
) -> AppResult<(StatusCode, Json<RoleResponse>)> {
    if input.name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Role name must not be empty".into(),
        )));
    }

    if RoleRepo::find_by_name(&state.pool, &input.name).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Role name already exists".into(),
        )));
    }

    let create_dto = CreateRole {
        name: input.name,
        description: input.description,
    };
    let role = RoleRepo::create_with_menus(&state.pool, &create_dto, &input.menu_ids).await?;

    let menu_ids = RoleRepo::menu_ids_for_role(&state.pool, role.id).await?;
    Ok((StatusCode::CREATED, Json(RoleResponse::from_role(role, menu_ids))))
}

/// PUT /api/v1/roles/{id}
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRoleRequest>,
) -> AppResult<Json<RoleResponse>> {
    // Renaming re-checks uniqueness, excluding this role's own row.
    if let Some(name) = &input.name {
        if let Some(existing) = RoleRepo::find_by_name(&state.pool, name).await? {
            if existing.id != id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Role name already exists".into(),
                )));
            }
        }
    }

    let update_dto = UpdateRole {
        name: input.name,
        description: input.description,
        menu_ids: input.menu_ids,
    };
    let role = RoleRepo::update_with_menus(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Role", id }))?;

    let menu_ids = RoleRepo::menu_ids_for_role(&state.pool, id).await?;
    Ok(Json(RoleResponse::from_role(role, menu_ids)))
}

/// DELETE /api/v1/roles/{id}
///
/// Hard delete; `user_roles` and `role_menus` rows cascade.
pub async fn delete_role(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = RoleRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Role", id }))
    }
}
