//! Application configuration management

use std::env;

use anyhow::{Context, Result, bail};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address (defaults to all interfaces)
    pub host: Option<String>,

    /// Server port
    pub port: u16,

    /// PostgreSQL connection URL (PGroonga extension required for search)
    pub database_url: String,

    /// Maximum pooled database connections
    pub database_max_connections: u32,

    /// HS256 secret for verifying ID tokens; unset disables authentication
    pub auth_jwt_secret: Option<String>,

    /// Expected `iss` claim
    pub auth_jwt_issuer: Option<String>,

    /// Expected `aud` claim
    pub auth_jwt_audience: Option<String>,

    /// Default tracing filter when RUST_LOG is unset
    pub log_filter: String,

    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => bail!("Invalid LOG_FORMAT: {} (expected json or pretty)", other),
        };

        Ok(Self {
            host: var("HOST").filter(|h| !h.is_empty()),

            port: var("PORT")
                .unwrap_or_else(|| "44000".to_string())
                .parse()
                .context("Invalid PORT")?,

            database_url: var("DATABASE_URL").context("DATABASE_URL is required")?,

            database_max_connections: var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            auth_jwt_secret: var("AUTH_JWT_SECRET").filter(|s| !s.trim().is_empty()),
            auth_jwt_issuer: var("AUTH_JWT_ISSUER"),
            auth_jwt_audience: var("AUTH_JWT_AUDIENCE"),

            log_filter: var("RUST_LOG")
                .unwrap_or_else(|| "meshi_backend=debug,tower_http=info".to_string()),

            log_format,
        })
    }

    /// Socket address to bind the HTTP server to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host.as_deref().unwrap_or("0.0.0.0"), self.port)
    }
}
