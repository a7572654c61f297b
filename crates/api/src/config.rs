use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Execution-backend connection settings.
///
/// With `url` unset the gateway runs the in-process backend; with it set,
/// every submission and status poll goes to the remote queue service.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Base URL of the remote queue service, e.g. `http://queue:8100`.
    pub url: Option<String>,
    /// Per-call timeout for queue requests in seconds (default: `10`).
    pub request_timeout_secs: u64,
}

impl QueueConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Execution-backend connection settings.
    pub queue: QueueConfig,
    /// Whether newly cataloged scripts are granted to all existing users
    /// (default: `true`, matching the platform's historical behavior).
    pub catalog_grant_on_discovery: bool,
    /// Whether to provision the demo principals at startup (default: `false`).
    pub dev_seed: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `8000`                  |
    /// | `CORS_ORIGINS`               | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                    |
    /// | `QUEUE_URL`                  | unset (local backend)   |
    /// | `QUEUE_TIMEOUT_SECS`         | `10`                    |
    /// | `CATALOG_GRANT_ON_DISCOVERY` | `true`                  |
    /// | `DEV_SEED`                   | `false`                 |
    ///
    /// JWT settings are loaded by [`JwtConfig::from_env`] (which panics if
    /// `JWT_SECRET` is missing).
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let queue_timeout_secs: u64 = std::env::var("QUEUE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("QUEUE_TIMEOUT_SECS must be a valid u64");

        let queue = QueueConfig {
            url: std::env::var("QUEUE_URL").ok().filter(|s| !s.is_empty()),
            request_timeout_secs: queue_timeout_secs,
        };

        let catalog_grant_on_discovery = parse_bool_env("CATALOG_GRANT_ON_DISCOVERY", true);
        let dev_seed = parse_bool_env("DEV_SEED", false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            queue,
            catalog_grant_on_discovery,
            dev_seed,
        }
    }
}

fn parse_bool_env(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            other => panic!("{name} must be a boolean, got '{other}'"),
        },
        Err(_) => default,
    }
}
