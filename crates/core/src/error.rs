//! Domain error taxonomy.
//!
//! Every failure a service operation can report is one of these variants.
//! The HTTP layer owns the mapping to status codes and response bodies.

use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A user, role, or menu lookup by id came up empty.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    /// The input violates a domain rule (empty name, weak password,
    /// cyclic menu parent chain).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation collides with existing state: a duplicate username,
    /// email, or role name, or a menu delete blocked by children.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller's identity could not be established.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An unexpected failure that must not leak details to the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}
