pub mod auth;
pub mod health;
pub mod menus;
pub mod roles;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login               login (public)
///
/// /menus/my-menus           caller's menu tree (any authenticated user)
/// /menus                    full tree, create (admin only)
/// /menus/{id}               get, update, delete (admin only)
///
/// /roles                    list (authenticated), create (admin only)
/// /roles/{id}               get (authenticated), update, delete (admin only)
///
/// /users                    list (authenticated), create (admin only)
/// /users/{id}               get (authenticated), update, delete (admin only)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/menus", menus::router())
        .nest("/roles", roles::router())
        .nest("/users", users::router())
}
