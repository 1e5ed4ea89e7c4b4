//! Environment-driven process configuration.

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// When unset the process runs on the in-memory store (dev only).
    pub database_url: Option<String>,
    pub token_secret: String,
    pub admin_password: String,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url = std::env::var("DATABASE_URL").ok();

        let token_secret = std::env::var("TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TOKEN_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("ADMIN_PASSWORD not set; using insecure dev default");
            "dev-admin".to_string()
        });

        Self {
            bind_addr,
            database_url,
            token_secret,
            admin_password,
        }
    }
}
