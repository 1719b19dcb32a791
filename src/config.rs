//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `STOREFRONT_HOST` - Bind address (default: 0.0.0.0)
//! - `STOREFRONT_PORT` - Listen port (default: 8083)
//! - `STOREFRONT_DATA_DIR` - Directory holding persisted state (default: ./data)
//! - `STOREFRONT_PAYMENT_DELAY_MS` - Simulated gateway delay (default: 1500)
//! - `ORDER_SERVICE_URL` - Remote order service base URL
//! - `ORDER_SERVICE_TOKEN` - Remote identity; remote recording needs both URL and token

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_PAYMENT_DELAY_MS: u64 = 1500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Clone)]
pub struct RemoteConfig {
    pub url: String,
    pub token: String,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig").field("url", &self.url).field("token", &"[REDACTED]").finish()
    }
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    pub payment_delay: Duration,
    pub remote: Option<RemoteConfig>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from("./data"),
            payment_delay: Duration::from_millis(DEFAULT_PAYMENT_DELAY_MS),
            remote: None,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = match var("STOREFRONT_HOST") {
            Some(raw) => parse(&raw, "STOREFRONT_HOST")?,
            None => defaults.host,
        };
        let port = match var("STOREFRONT_PORT") {
            Some(raw) => parse(&raw, "STOREFRONT_PORT")?,
            None => defaults.port,
        };
        let payment_delay = match var("STOREFRONT_PAYMENT_DELAY_MS") {
            Some(raw) => Duration::from_millis(parse(&raw, "STOREFRONT_PAYMENT_DELAY_MS")?),
            None => defaults.payment_delay,
        };
        let data_dir = var("STOREFRONT_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir);

        let remote = match (var("ORDER_SERVICE_URL"), var("ORDER_SERVICE_TOKEN")) {
            (Some(url), Some(token)) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ConfigError::InvalidEnvVar("ORDER_SERVICE_URL".into(), "must be an http(s) URL".into()));
                }
                Some(RemoteConfig { url, token })
            }
            (Some(_), None) => {
                tracing::warn!("ORDER_SERVICE_URL set without ORDER_SERVICE_TOKEN; orders will be recorded locally");
                None
            }
            _ => None,
        };

        Ok(Self { host, port, data_dir, payment_delay, remote })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

fn parse<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
