use anyhow::{Context, anyhow};
use chrono::Duration;
use std::env;

/// SQLite connection URL. `sqlite::memory:` runs against a throwaway in-memory database.
pub const DB_URL: &str = "DATABASE_URL";
/// Address and port the HTTP server listens on
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
/// Secret used to sign bearer tokens
pub const JWT_SECRET: &str = "JWT_SECRET";
/// How long issued bearer tokens stay valid
pub const TOKEN_TTL_MINUTES: &str = "TOKEN_TTL_MINUTES";
/// Set to "true" to create the demo account with a batch of generated tasks at startup
pub const SEED_DEMO_ACCOUNT: &str = "SEED_DEMO_ACCOUNT";
/// Log level configuration for the application. Accepts [EnvFilter directives](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html#directives)
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

const DEFAULT_DB_URL: &str = "sqlite://data/app.db";
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;
/// Only suitable for local development. Startup warns when it's in use.
pub const DEVELOPMENT_JWT_SECRET: &str = "task-board-development-secret";

/// Everything the service reads from its environment at startup
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: String,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub seed_demo_account: bool,
    /// Both export URLs, present only when both are configured
    pub otel_endpoints: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig, anyhow::Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, so parsing can be tested without touching the process environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, anyhow::Error> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let token_ttl_minutes = match read(TOKEN_TTL_MINUTES) {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| anyhow!("{TOKEN_TTL_MINUTES} must be a positive number of minutes, got {raw:?}"))?,
            None => DEFAULT_TOKEN_TTL_MINUTES,
        };
        let seed_demo_account = match read(SEED_DEMO_ACCOUNT) {
            Some(raw) => raw
                .trim()
                .to_ascii_lowercase()
                .parse::<bool>()
                .with_context(|| format!("{SEED_DEMO_ACCOUNT} must be true or false, got {raw:?}"))?,
            None => false,
        };

        Ok(AppConfig {
            database_url: read(DB_URL).unwrap_or_else(|| DEFAULT_DB_URL.to_owned()),
            bind_address: read(BIND_ADDRESS).unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned()),
            jwt_secret: read(JWT_SECRET).unwrap_or_else(|| DEVELOPMENT_JWT_SECRET.to_owned()),
            token_ttl: Duration::minutes(token_ttl_minutes),
            seed_demo_account,
            otel_endpoints: read(OTEL_SPAN_EXPORT_URL).zip(read(OTEL_METRIC_EXPORT_URL)),
        })
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }
}
