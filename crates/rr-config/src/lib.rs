//! # rr-config
//!
//! Layered runtime settings for Rusty-Reddit.
//!
//! Sources, lowest priority first: built-in defaults, `config/default.toml`,
//! `config/local.toml`, then `RR__SECTION__KEY` environment variables.
//! A `.env` file in the working directory is loaded before anything else.

use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

/// Minimum HS256 key length accepted for the JWT secret.
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub auth: AuthSettings,
    pub media: MediaSettings,
    pub pagination: PaginationSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// sqlx connection string, e.g. `sqlite:rusty_reddit.db`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub session_ttl_secs: i64,
    /// Marks the session cookie `Secure`; disable only for plain-HTTP development.
    pub secure_cookies: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// Filesystem directory for uploaded community images
    pub root: String,
    /// Public URL prefix the root is served under
    pub url_prefix: String,
    pub max_image_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    pub page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive, e.g. `info,sqlx=warn`
    pub filter: String,
    pub json: bool,
}

impl Settings {
    /// Loads `.env`, the config files and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let builder = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("RR")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::from_builder(builder)
    }

    /// Builds settings from an explicit source stack on top of the defaults.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.expose_secret().len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Invalid {
                key: "auth.jwt_secret",
                reason: format!("must be at least {MIN_SECRET_BYTES} bytes"),
            });
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid { key: "server.port", reason: "must be non-zero".into() });
        }
        if self.pagination.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "pagination.page_size",
                reason: "must be at least 1".into(),
            });
        }
        for (key, ttl) in [
            ("auth.access_ttl_secs", self.auth.access_ttl_secs),
            ("auth.refresh_ttl_secs", self.auth.refresh_ttl_secs),
            ("auth.session_ttl_secs", self.auth.session_ttl_secs),
        ] {
            if ttl <= 0 {
                return Err(ConfigError::Invalid { key, reason: "must be positive".into() });
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}

/// Built-in defaults. `auth.jwt_secret` has none and must be supplied.
pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("database.url", "sqlite:rusty_reddit.db")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.access_ttl_secs", 5 * 60)?
        .set_default("auth.refresh_ttl_secs", 24 * 60 * 60)?
        .set_default("auth.session_ttl_secs", 14 * 24 * 60 * 60)?
        .set_default("auth.secure_cookies", true)?
        .set_default("media.root", "./data/media")?
        .set_default("media.url_prefix", "/media")?
        .set_default("media.max_image_bytes", 5 * 1024 * 1024)?
        .set_default("pagination.page_size", 10)?
        .set_default("log.filter", "info")?
        .set_default("log.json", false)?)
}
