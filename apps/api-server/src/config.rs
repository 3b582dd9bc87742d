//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use lexleaks_infra::{DatabaseConfig, JwtConfig, RateLimitConfig};

/// Credentials of the administrator ensured at startup.
#[derive(Clone)]
pub struct AdminBootstrap {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrap")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub run_migrations: bool,
    pub jwt: JwtConfig,
    pub admin: Option<AdminBootstrap>,
    pub auth_rate_limit: RateLimitConfig,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| {
            let defaults = DatabaseConfig::new(url);
            DatabaseConfig {
                max_connections: parsed("DB_MAX_CONNECTIONS", defaults.max_connections),
                min_connections: parsed("DB_MIN_CONNECTIONS", defaults.min_connections),
                ..defaults
            }
        });

        let admin = match (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(AdminBootstrap { username, password }),
            (Ok(_), Err(_)) => {
                tracing::warn!("ADMIN_USERNAME set without ADMIN_PASSWORD, skipping admin bootstrap");
                None
            }
            _ => None,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            run_migrations: flag("RUN_MIGRATIONS", true),
            jwt: JwtConfig::from_env(),
            admin,
            auth_rate_limit: RateLimitConfig::from_env(),
        }
    }
}
