//! Application configuration.
//!
//! Loaded once at startup from a TOML file, then overridden by `DEADLIGHT_*` environment
//! variables. Every field has a default so an empty file is a valid configuration. The
//! loaded `Config` is immutable and shared through the [`Env`](../struct.Env.html).

use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

pub const ENV_ENVIRONMENT: &str = "DEADLIGHT_ENVIRONMENT";
pub const ENV_BIND_ADDRESS: &str = "DEADLIGHT_BIND_ADDRESS";
pub const ENV_LOG: &str = "DEADLIGHT_LOG";

/// Deployment environment. Error responses carry details everywhere except `Production`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            other => Err(Error::Config(format!("Unknown environment {:?}", other))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub environment: Environment,

    pub server: ServerConfig,

    pub log: LogConfig,

    /// Named secrets handed to handlers through the environment (e.g. `jwt_secret`).
    pub secrets: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g. "127.0.0.1:8787").
    pub bind_address: String,

    /// Largest request body buffered for a handler. Bigger bodies get `413 Payload Too Large`.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is not set.
    pub filter: String,

    /// Emit JSON lines instead of the human readable format.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Reads and validates a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Couldn't read {}: {}", path.display(), e)))?;

        let config = Config::from_toml_str(content.as_str())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Config> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Couldn't parse config: {}", e)))
    }

    /// Applies `DEADLIGHT_*` overrides from the process environment.
    pub fn apply_env_overrides(mut self) -> crate::Result<Config> {
        self.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(self)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup(ENV_ENVIRONMENT) {
            self.environment = env.parse()?;
        }

        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            self.server.bind_address = addr;
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.log.filter = filter;
        }

        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.bind_address().map(|_| ())
    }

    pub fn bind_address(&self) -> crate::Result<SocketAddr> {
        self.server.bind_address.parse().map_err(|e| {
            Error::Config(format!(
                "Invalid bind address {:?}: {}",
                self.server.bind_address, e
            ))
        })
    }

    pub fn secret(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }
}
