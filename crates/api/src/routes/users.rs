//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /     -> list_users (any authenticated user)
/// POST   /     -> create_user (admin)
/// GET    /{id} -> get_user (any authenticated user)
/// PUT    /{id} -> update_user (admin)
/// DELETE /{id} -> delete_user (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
