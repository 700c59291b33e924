//! Domain core for the admin console backend.
//!
//! Pure types and logic with no database or HTTP dependencies: the error
//! taxonomy, well-known role names, and the menu tree builder.

pub mod error;
pub mod menu_tree;
pub mod roles;
pub mod types;
