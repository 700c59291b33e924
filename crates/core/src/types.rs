//! Shared primitive type aliases.

/// Primary key type for users, roles, and menus (BIGSERIAL in PostgreSQL).
pub type DbId = i64;

/// Timestamps are always stored and compared in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
