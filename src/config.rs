// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! [`AppConfig`] loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SESSION_PASSWORD` | Secret used to seal session cookies (min 32 chars) | **Required** |
//! | `SESSION_COOKIE_NAME` | Name of the session cookie | `siwe-encoteki-beta` |
//! | `APP_ENV` | `production` marks the cookie `Secure` | `development` |
//! | `DATA_DIR` | Directory holding the account database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain (HTTPS when set with key) | Optional |
//! | `TLS_KEY_PATH` | PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Session lifetime in seconds. Fixed for the whole process.
pub const SESSION_TTL_SECS: u64 = 60 * 60;

/// Session lifetime as a [`Duration`].
pub const SESSION_TTL: Duration = Duration::from_secs(SESSION_TTL_SECS);

/// Minimum accepted length of the session password.
pub const MIN_SESSION_PASSWORD_LEN: usize = 32;

pub const SESSION_PASSWORD_ENV: &str = "SESSION_PASSWORD";
pub const SESSION_COOKIE_NAME_ENV: &str = "SESSION_COOKIE_NAME";
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Environment variable name for the account database directory.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_COOKIE_NAME: &str = "siwe-encoteki-beta";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the account database inside `DATA_DIR`.
pub const ACCOUNT_DB_FILE: &str = "accounts.redb";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SESSION_PASSWORD is not set; refusing to start without a session secret")]
    MissingSessionPassword,

    #[error("SESSION_PASSWORD must be at least 32 characters")]
    WeakSessionPassword,

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Session cookie settings.
#[derive(Clone)]
pub struct SessionConfig {
    pub password: String,
    pub cookie_name: String,
    pub secure: bool,
    pub ttl: Duration,
}

impl SessionConfig {
    /// Build a session config, rejecting missing or short passwords.
    pub fn new(password: impl Into<String>) -> Result<Self, ConfigError> {
        let password = password.into();
        if password.is_empty() {
            return Err(ConfigError::MissingSessionPassword);
        }
        if password.chars().count() < MIN_SESSION_PASSWORD_LEN {
            return Err(ConfigError::WeakSessionPassword);
        }
        Ok(Self {
            password,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
            ttl: SESSION_TTL,
        })
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("password", &"<redacted>")
            .field("cookie_name", &self.cookie_name)
            .field("secure", &self.secure)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` selects JSON lines, anything else pretty output.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    /// Read `LOG_FORMAT` directly, before the rest of the config is loaded.
    pub fn from_env() -> Self {
        Self::parse(env::var(LOG_FORMAT_ENV).ok().as_deref())
    }
}

/// Full process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub tls: Option<(PathBuf, PathBuf)>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let password = lookup(SESSION_PASSWORD_ENV).ok_or(ConfigError::MissingSessionPassword)?;

        let production = lookup(APP_ENV_ENV)
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let session = SessionConfig::new(password)?
            .with_cookie_name(
                lookup(SESSION_COOKIE_NAME_ENV).unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
            )
            .with_secure(production);

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                name: PORT_ENV,
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some((PathBuf::from(cert), PathBuf::from(key))),
            _ => None,
        };

        let log_format = LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref());

        Ok(Self {
            session,
            data_dir: PathBuf::from(
                lookup(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            host: lookup(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            tls,
            log_format,
        })
    }

    /// Path to the account database file.
    pub fn account_db_path(&self) -> PathBuf {
        self.data_dir.join(ACCOUNT_DB_FILE)
    }
}
