//! Route definitions for the `/menus` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::menus;
use crate::state::AppState;

/// Routes mounted at `/menus`.
///
/// ```text
/// GET    /my-menus -> my_menus (any authenticated user)
/// GET    /         -> list_menus (admin)
/// POST   /         -> create_menu (admin)
/// GET    /{id}     -> get_menu (admin)
/// PUT    /{id}     -> update_menu (admin)
/// DELETE /{id}     -> delete_menu (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my-menus", get(menus::my_menus))
        .route("/", get(menus::list_menus).post(menus::create_menu))
        .route(
            "/{id}",
            get(menus::get_menu)
                .put(menus::update_menu)
                .delete(menus::delete_menu),
        )
}
