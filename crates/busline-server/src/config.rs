//! Configuration management for the busline server

use anyhow::Result;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    pub host: String,

    /// Server port (default: 3000)
    pub port: u16,

    /// Database URL (default: mongodb://localhost:27017)
    pub database_url: String,

    /// Database name (default: BB_bus)
    pub database_name: String,

    /// Session lifetime in days (default: 7)
    pub session_ttl_days: i64,

    /// Whether to set Secure flag on cookies (default: false)
    pub secure_cookies: bool,

    /// CORS allowed origins (comma-separated). If empty, the request origin
    /// is mirrored (dev mode).
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_database_url() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database_name() -> String {
    "BB_bus".to_string()
}

fn default_session_ttl_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_port);
        let database_url = std::env::var("MONGODB_URI")
            .or_else(|_| std::env::var("DATABASE_URL"))
            .unwrap_or_else(|_| default_database_url());
        let database_name = std::env::var("MONGODB_DATABASE")
            .or_else(|_| std::env::var("DATABASE_NAME"))
            .unwrap_or_else(|_| default_database_name());
        let session_ttl_days = std::env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_session_ttl_days);
        if session_ttl_days <= 0 {
            anyhow::bail!("SESSION_TTL_DAYS must be a positive number of days");
        }
        let secure_cookies = std::env::var("SECURE_COOKIES")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS").ok();

        Ok(Self {
            host,
            port,
            database_url,
            database_name,
            session_ttl_days,
            secure_cookies,
            cors_allowed_origins,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            database_name: default_database_name(),
            session_ttl_days: default_session_ttl_days(),
            secure_cookies: false,
            cors_allowed_origins: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url, "mongodb://localhost:27017");
        assert_eq!(config.database_name, "BB_bus");
        assert_eq!(config.session_ttl_days, 7);
        assert!(!config.secure_cookies);
        assert!(config.cors_allowed_origins.is_none());
    }
}
