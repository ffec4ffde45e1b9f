//! Server configuration read from the environment.
//!
//! # Environment Variables
//! - `HOST` (default `0.0.0.0`), `PORT` (default `5000`)
//! - `STORE_MODE`: `redis` (default) | `memory`
//! - `REDIS_URL` (default `redis://redis:6379/0`)
//! - `KEY_NAMESPACE` (default `todo`)
//! - `STORE_TIMEOUT_MS` (default `2000`)

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use todo_core::{Keyspace, DEFAULT_NAMESPACE};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_REDIS_URL: &str = "redis://redis:6379/0";
pub const DEFAULT_STORE_TIMEOUT: Duration = todo_core::store::DEFAULT_TIMEOUT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid PORT {0:?}")]
    InvalidPort(String),

    #[error("invalid STORE_MODE {0:?} (expected `memory` or `redis`)")]
    InvalidStoreMode(String),

    #[error("invalid STORE_TIMEOUT_MS {0:?} (expected a positive number of milliseconds)")]
    InvalidTimeout(String),

    #[error(transparent)]
    InvalidNamespace(#[from] todo_core::NamespaceError),
}

/// Which `KeyValueStore` backs the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// Process-local map. Data is lost on restart and the id counter is not
    /// shared, so only a single instance may run in this mode.
    Memory,
    #[default]
    Redis,
}

impl FromStr for StoreMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::InvalidStoreMode(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store_mode: StoreMode,
    pub redis_url: String,
    pub namespace: String,
    pub store_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_mode: StoreMode::default(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from any variable source. Empty or whitespace-only
    /// values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };
        let store_mode = match var("STORE_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.store_mode,
        };
        let store_timeout = match var("STORE_TIMEOUT_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(ConfigError::InvalidTimeout(raw)),
            },
            None => defaults.store_timeout,
        };

        let config = Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            store_mode,
            redis_url: var("REDIS_URL").unwrap_or(defaults.redis_url),
            namespace: var("KEY_NAMESPACE").unwrap_or(defaults.namespace),
            store_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.keyspace().map(|_| ())
    }

    pub fn keyspace(&self) -> Result<Keyspace, ConfigError> {
        Ok(Keyspace::new(&self.namespace)?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
