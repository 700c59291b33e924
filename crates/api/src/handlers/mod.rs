//! HTTP handlers, one module per resource.

pub mod auth;
pub mod menus;
pub mod roles;
pub mod users;
