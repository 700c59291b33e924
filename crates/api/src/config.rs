use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Bootstrap admin account provisioned on first run.
    pub admin: AdminSeedConfig,
}

/// Credentials for the admin account seeded when the users table is empty.
#[derive(Debug, Clone)]
pub struct AdminSeedConfig {
    pub username: String,
    pub password: String,
    pub email: String,
}

impl AdminSeedConfig {
    /// Load seed credentials from environment variables.
    ///
    /// | Env Var          | Default              |
    /// |------------------|----------------------|
    /// | `ADMIN_USERNAME` | `admin`              |
    /// | `ADMIN_PASSWORD` | `admin123`           |
    /// | `ADMIN_EMAIL`    | `admin@example.com`  |
    pub fn from_env() -> Self {
        Self {
            username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            password: std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".into()),
            email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".into()),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();
        let admin = AdminSeedConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            admin,
        }
    }
}
