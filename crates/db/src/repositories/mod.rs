//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Operations that write an
//! entity together with its association rows run inside a single
//! transaction so a failure never leaves a half-applied state.

pub mod menu_repo;
pub mod role_repo;
pub mod user_repo;

pub use menu_repo::MenuRepo;
pub use role_repo::RoleRepo;
pub use user_repo::UserRepo;
