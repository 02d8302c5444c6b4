//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_MAX_CONNECTIONS, DEFAULT_DATABASE_URL, DEFAULT_FRONTEND_URL,
    DEFAULT_JWT_EXPIRATION_DAYS, DEFAULT_JWT_REFRESH_THRESHOLD_HOURS, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, ENV_PRODUCTION, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub jwt_refresh_threshold_hours: i64,
    pub frontend_url: String,
    pub environment: String,
    pub server_host: String,
    pub server_port: u16,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_days", &self.jwt_expiration_days)
            .field("jwt_refresh_threshold_hours", &self.jwt_refresh_threshold_hours)
            .field("frontend_url", &self.frontend_url)
            .field("environment", &self.environment)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            jwt_secret,
            jwt_expiration_days: parse_var("JWT_EXPIRATION_DAYS", DEFAULT_JWT_EXPIRATION_DAYS),
            jwt_refresh_threshold_hours: parse_var(
                "JWT_REFRESH_THRESHOLD_HOURS",
                DEFAULT_JWT_REFRESH_THRESHOLD_HOURS,
            ),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
        }
    }

    /// Build a configuration for tests and tooling without touching the
    /// process environment.
    pub fn for_testing(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            jwt_secret: jwt_secret.into(),
            jwt_expiration_days: DEFAULT_JWT_EXPIRATION_DAYS,
            jwt_refresh_threshold_hours: DEFAULT_JWT_REFRESH_THRESHOLD_HOURS,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            environment: "test".to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Whether production-only cookie attributes apply.
    pub fn is_production(&self) -> bool {
        self.environment == ENV_PRODUCTION
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::for_testing("super-secret-value-that-is-long-enough");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_production_flag() {
        let mut config = Config::for_testing("x".repeat(32));
        assert!(!config.is_production());
        config.environment = ENV_PRODUCTION.to_string();
        assert!(config.is_production());
    }
}
