//! Environment configuration.
//!
//! Values come from the process environment, with a `.env` file loaded first
//! when present.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse environment variable '{key}': {details}")]
    Parse { key: String, details: String },
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Root directory for persisted cart records
    pub quote_store_dir: PathBuf,
    /// Optional JSON catalog replacing the built-in one
    pub pricing_catalog_path: Option<PathBuf>,
    pub cart_session_ttl: Duration,
    pub cart_session_capacity: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            quote_store_dir: PathBuf::from("./data/quote-storage"),
            pricing_catalog_path: None,
            cart_session_ttl: Duration::from_secs(24 * 60 * 60),
            cart_session_capacity: 10_000,
        }
    }
}

impl Config {
    /// Load from `.env` (if present) and the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset keys use defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            quote_store_dir: lookup("QUOTE_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.quote_store_dir),
            pricing_catalog_path: lookup("PRICING_CATALOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            cart_session_ttl: Duration::from_secs(parse_or(
                &lookup,
                "CART_SESSION_TTL_SECS",
                defaults.cart_session_ttl.as_secs(),
            )?),
            cart_session_capacity: parse_or(
                &lookup,
                "CART_SESSION_CAPACITY",
                defaults.cart_session_capacity,
            )?,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Parse {
                key: "HOST".to_string(),
                details: e.to_string(),
            })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
            key: key.to_string(),
            details: e.to_string(),
        }),
        None => Ok(default),
    }
}
