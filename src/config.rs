use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// Longest accepted `TOKEN_TTL_SECONDS` (30 days).
pub const MAX_TOKEN_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub security: SecurityConfig,
    pub cors_origins: Vec<String>,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sled,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Sled => "sled",
            StoreBackend::Memory => "memory",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sled" => Ok(StoreBackend::Sled),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown DB_BACKEND '{}' (expected sled or memory)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub sled_path: String,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &if self.jwt_secret.is_empty() { "<unset>" } else { "<redacted>" })
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

/// Origin check against comma-separated wildcard patterns (`*` matches anything).
pub fn is_origin_allowed(patterns: &[String], origin: &str) -> bool {
    patterns.iter().any(|pattern| origin_matches(pattern, origin))
}

fn origin_matches(pattern: &str, origin: &str) -> bool {
    let re_pat = format!(
        "^{}$",
        pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*")
    );
    Regex::new(&re_pat)
        .map(|re| re.is_match(origin))
        .unwrap_or(false)
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("invalid {} '{}': {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

fn sled_path(db_path: &str, db_name: &str) -> String {
    if db_path.ends_with('/') {
        format!("{}{}", db_path, db_name)
    } else {
        format!("{}/{}", db_path, db_name)
    }
}

impl AppConfig {
    /// Build from the process environment. `JWT_SECRET` is mandatory.
    pub fn from_env() -> Result<Self> {
        let server = ServerConfig {
            host: env_or("HOST", "127.0.0.1"),
            port: parse_env("PORT", 8000u16)?,
            name: env_or("SERVER_NAME", "orders_backend"),
        };

        let store = StoreConfig {
            backend: parse_env("DB_BACKEND", StoreBackend::Sled)?,
            sled_path: sled_path(&env_or("DB_PATH", "data"), &env_or("DB_NAME", "pedidosdb")),
        };

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET must be set to a non-empty value"));
        }
        let token_ttl_seconds = parse_env("TOKEN_TTL_SECONDS", 3600u64)?;
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&token_ttl_seconds) {
            return Err(anyhow!(
                "TOKEN_TTL_SECONDS must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECONDS,
                token_ttl_seconds
            ));
        }
        let security = SecurityConfig {
            jwt_secret,
            token_ttl_seconds,
        };

        let cors_origins = env_or("CORS_ALLOWED_ORIGINS", "")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let logging = LoggingConfig {
            level: env_or("RUST_LOG", "info"),
        };

        Ok(AppConfig {
            server,
            store,
            security,
            cors_origins,
            logging,
        })
    }
}

/// Load an optional env file, then read configuration from the environment.
pub fn load_config_from_file(config_path: &str) -> Result<AppConfig> {
    let abs_config_path = Path::new(config_path)
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from(config_path));

    if Path::new(config_path).exists() {
        match dotenvy::from_filename(config_path) {
            Ok(_) => tracing::info!("✓ Loaded env file from: {}", abs_config_path.display()),
            Err(e) => tracing::warn!(
                "Failed to load env file from {}: {}",
                abs_config_path.display(),
                e
            ),
        }
    } else {
        tracing::debug!(
            "env file not found at: {} (using process environment)",
            abs_config_path.display()
        );
    }

    AppConfig::from_env().context("invalid configuration")
}
