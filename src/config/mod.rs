use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is unset in development. Never accepted elsewhere.
const DEV_JWT_SECRET: &str = "voz-animal-development-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres URL; `None` selects the in-memory record store.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_secs: i64,
    pub cors_origins: Vec<String>,
}

impl SecurityConfig {
    pub fn jwt_expiry(&self) -> Duration {
        Duration::seconds(self.jwt_expiry_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_file_bytes: usize,
}

impl AppConfig {
    /// Builds the configuration from `APP_ENV` presets plus individual overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").or_else(|_| env::var("NODE_ENV")).as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server
        if let Some(v) = env::var("VOZ_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = parse_positive("PORT", v)?;
        }

        // Database
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_positive("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_positive("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // Security
        match env::var("JWT_SECRET") {
            Ok(v) if !v.is_empty() => self.security.jwt_secret = v,
            _ if self.environment == Environment::Development => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                self.security.jwt_secret = DEV_JWT_SECRET.to_string();
            }
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        }
        if let Ok(v) = env::var("JWT_EXPIRE") {
            self.security.jwt_expiry_secs = parse_expiry(&v)
                .ok_or(ConfigError::Invalid { key: "JWT_EXPIRE", value: v })?;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }

        // Uploads
        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.uploads.dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_file_bytes = parse_positive("UPLOAD_MAX_BYTES", v)?;
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_secs: 7 * 24 * 3600,
                cors_origins: vec!["*".to_string()],
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_file_bytes: 5 * 1024 * 1024, // 5MB
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_secs: 24 * 3600,
                cors_origins: vec!["*".to_string()],
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_file_bytes: 5 * 1024 * 1024,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_secs: 24 * 3600,
                cors_origins: vec![],
            },
            uploads: UploadConfig {
                dir: PathBuf::from("uploads"),
                max_file_bytes: 5 * 1024 * 1024,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

/// Longest accepted token lifetime.
pub const MAX_EXPIRY_SECS: i64 = 365 * 24 * 3600;

/// A strictly positive number from an environment variable.
fn parse_positive<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr + Default + PartialOrd,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

/// Parses expiry strings like `7d`, `24h`, `30m`, `45s` or plain seconds,
/// up to [`MAX_EXPIRY_SECS`].
pub fn parse_expiry(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (digits, unit) = match raw.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&raw[..idx], Some(c.to_ascii_lowercase())),
        _ => (raw, None),
    };
    let amount: i64 = digits.trim().parse().ok()?;
    if amount <= 0 {
        return None;
    }
    let multiplier = match unit {
        None | Some('s') => 1,
        Some('m') => 60,
        Some('h') => 3600,
        Some('d') => 24 * 3600,
        Some('w') => 7 * 24 * 3600,
        Some(_) => return None,
    };
    amount.checked_mul(multiplier).filter(|secs| *secs <= MAX_EXPIRY_SECS)
}
