//! Handlers for the `/menus` resource.
//!
//! Read paths materialize the menu hierarchy with the core tree builder.
//! The flat set is filtered (visibility, role reachability) *before* tree
//! construction -- filter-then-tree, as the builder requires.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use console_core::error::CoreError;
use console_core::menu_tree::{build_tree, creates_cycle, TreeNode};
use console_core::types::DbId;
use console_db::models::menu::{CreateMenu, Menu, UpdateMenu};
use console_db::repositories::MenuRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A menu with its nested children, as returned by the tree endpoints.
#[derive(Debug, Serialize)]
pub struct MenuTreeNode {
    pub id: DbId,
    pub name: String,
    pub code: Option<String>,
    pub path: Option<String>,
    pub icon: Option<String>,
    pub parent_id: Option<DbId>,
    pub sort_order: i32,
    pub is_visible: bool,
    pub children: Vec<MenuTreeNode>,
}

impl MenuTreeNode {
    fn from_node(node: TreeNode<Menu>) -> Self {
        let TreeNode { item, children } = node;
        MenuTreeNode {
            id: item.id,
            name: item.name,
            code: item.code,
            path: item.path,
            icon: item.icon,
            parent_id: item.parent_id,
            sort_order: item.sort_order,
            is_visible: item.is_visible,
            children: children.into_iter().map(Self::from_node).collect(),
        }
    }
}

/// Materialize a flat, pre-filtered menu set as a response forest.
fn to_tree(menus: Vec<Menu>) -> Vec<MenuTreeNode> {
    build_tree(&menus, None)
        .into_iter()
        .map(MenuTreeNode::from_node)
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/menus/my-menus
///
/// The menu tree visible to the calling user through their roles. A user
/// with no roles (or no granted menus) gets an empty tree, not an error.
pub async fn my_menus(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<Vec<MenuTreeNode>>> {
    let menus = MenuRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(to_tree(menus)))
}

/// GET /api/v1/menus
///
/// The full visible menu tree (admin only).
pub async fn list_menus(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<MenuTreeNode>>> {
    let menus = MenuRepo::list_visible(&state.pool).await?;
    Ok(Json(to_tree(menus)))
}

/// GET /api/v1/menus/{id}
pub async fn get_menu(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<Menu>> {
    let menu = MenuRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Menu", id }))?;
    Ok(Json(menu))
}

/// POST /api/v1/menus
///
/// Create a menu. `parent_id` is trusted as-is; a dangling reference is
/// rejected by the storage layer's foreign key.
pub async fn create_menu(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(input): Json<CreateMenu>,
) -> AppResult<(StatusCode, Json<Menu>)> {
    let menu = MenuRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

/// PUT /api/v1/menus/{id}
///
/// Full-field update. Re-parenting runs the cycle guard: the tree builder
/// recurses without bound on a cyclic parent chain, so cycles must never
/// reach the table.
pub async fn update_menu(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMenu>,
) -> AppResult<Json<Menu>> {
    // Existence first: a missing menu is a 404 even when the payload would
    // also fail the cycle guard.
    if MenuRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Menu", id }));
    }

    let links = MenuRepo::parent_links(&state.pool).await?;
    if creates_cycle(&links, id, input.parent_id) {
        return Err(AppError::Core(CoreError::Validation(
            "Menu parent chain would form a cycle".into(),
        )));
    }

    let menu = MenuRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Menu", id }))?;
    Ok(Json(menu))
}

/// DELETE /api/v1/menus/{id}
///
/// Hard delete. Blocked while the menu still has children so the tree never
/// acquires orphaned parent references; grant rows cascade.
pub async fn delete_menu(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if MenuRepo::count_children(&state.pool, id).await? > 0 {
        return Err(AppError::Core(CoreError::Conflict(
            "Menu has child menus and cannot be deleted".into(),
        )));
    }

    let deleted = MenuRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Menu", id }))
    }
}
