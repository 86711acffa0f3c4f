use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use quotedex_core::flags::parse_flag;
use quotedex_core::pagination::{DEFAULT_PER_PAGE, MAX_PER_PAGE};
use quotedex_db::PoolSettings;
use quotedex_search::SearchConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. `DATABASE_URL` is read separately by the binary.
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
    pub pool: PoolSettings,
    pub search: SearchConfig,
    /// Push every stored entity to the search index at startup.
    pub reindex_on_start: bool,
    pub paging: PagingConfig,
    pub jwt: JwtConfig,
    pub log_format: LogFormat,
}

/// Page size defaults shared by offset, cursor and search listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub per_page: i64,
    pub max_per_page: i64,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PER_PAGE,
            max_per_page: MAX_PER_PAGE,
        }
    }
}

/// Output format of the `fmt` tracing layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected 'pretty' or 'json'")),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `DB_MAX_CONNECTIONS`      | `20`                    |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`                     |
    /// | `MEILI_URL`               | `http://localhost:7700` |
    /// | `MEILI_API_KEY`           | unset                   |
    /// | `SEARCH_TIMEOUT_MS`       | `2000`                  |
    /// | `SEARCH_MAX_RETRIES`      | `2`                     |
    /// | `SEARCH_RETRY_BACKOFF_MS` | `100`                   |
    /// | `SEARCH_REINDEX_ON_START` | `false`                 |
    /// | `PER_PAGE`                | `20`                    |
    /// | `MAX_PER_PAGE`            | `100`                   |
    /// | `LOG_FORMAT`              | `pretty`                |
    ///
    /// # Panics
    ///
    /// Panics on malformed values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = env_or("PORT", 3000);

        let cors_origins = split_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let pool = PoolSettings {
            max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            acquire_timeout: Duration::from_secs(env_or("DB_ACQUIRE_TIMEOUT_SECS", 5)),
        };

        let search = SearchConfig {
            url: std::env::var("MEILI_URL").unwrap_or_else(|_| "http://localhost:7700".into()),
            api_key: std::env::var("MEILI_API_KEY").ok().filter(|k| !k.is_empty()),
            timeout: Duration::from_millis(env_or("SEARCH_TIMEOUT_MS", 2000)),
            max_retries: env_or("SEARCH_MAX_RETRIES", 2),
            retry_backoff: Duration::from_millis(env_or("SEARCH_RETRY_BACKOFF_MS", 100)),
        };

        let reindex_on_start = std::env::var("SEARCH_REINDEX_ON_START")
            .ok()
            .map(|raw| {
                parse_flag("SEARCH_REINDEX_ON_START", Some(&raw))
                    .unwrap_or_else(|e| panic!("{e}"))
            })
            .unwrap_or(false);

        let paging = PagingConfig {
            per_page: env_or("PER_PAGE", DEFAULT_PER_PAGE),
            max_per_page: env_or("MAX_PER_PAGE", MAX_PER_PAGE),
        };
        assert!(
            paging.per_page >= 1 && paging.per_page <= paging.max_per_page,
            "PER_PAGE must be between 1 and MAX_PER_PAGE"
        );

        let log_format: LogFormat = env_or("LOG_FORMAT", LogFormat::Pretty);

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            pool,
            search,
            reindex_on_start,
            paging,
            jwt,
            log_format,
        }
    }
}

/// Read and parse an env var, falling back to `default` when unset.
fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{name} is invalid: {e}")),
        Err(_) => default,
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
