use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use dotenvy::Error as DotenvError;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8686;
const DEFAULT_PATH: &str = "/call";
const PORT_ENV: &str = "PORT";
const BRIDGE_PORT_ENV: &str = "FUNCBRIDGE_PORT";
const BRIDGE_ADDR_ENV: &str = "FUNCBRIDGE_ADDR";
const BRIDGE_PATH_ENV: &str = "FUNCBRIDGE_PATH";

/// Configuration consumed by the embedded serve loop.
#[derive(Clone, Debug)]
pub struct BridgeConfig {
    pub bind_addr: SocketAddr,
    /// Route the call endpoint is mounted on.
    pub path: String,
}

impl BridgeConfig {
    /// Loads configuration from `FUNCBRIDGE_*` environment variables.
    ///
    /// Values from a local `.env` file (parsed via [`dotenvy::dotenv_override`]) override whatever
    /// is already set in the process environment, which makes local development workflows
    /// predictable. `PORT` is honored as a fallback for hosts that inject it.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_overrides()?;

        let port = env::var(BRIDGE_PORT_ENV)
            .ok()
            .or_else(|| env::var(PORT_ENV).ok())
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let addr = env::var(BRIDGE_ADDR_ENV)
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

        let path = match env::var(BRIDGE_PATH_ENV) {
            Ok(path) => validate_path(path)?,
            Err(_) => DEFAULT_PATH.to_owned(),
        };

        Ok(Self {
            bind_addr: SocketAddr::new(addr, port),
            path,
        })
    }

    /// Returns a builder for programmatic overrides.
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

impl Default for BridgeConfig {
    /// Binds to `0.0.0.0:8686` and mounts the endpoint at `/call`.
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            path: DEFAULT_PATH.to_owned(),
        }
    }
}

/// Builder type for [`BridgeConfig`].
#[derive(Default, Clone, Debug)]
pub struct BridgeConfigBuilder {
    bind_addr: Option<SocketAddr>,
    path: Option<String>,
}

impl BridgeConfigBuilder {
    /// Sets the address for the embedded listener.
    pub fn bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = Some(addr);
        self
    }

    /// Sets the route the call endpoint is mounted on.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Builds the final configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPath`] when the configured path does not
    /// start with `/`.
    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        let defaults = BridgeConfig::default();
        let path = match self.path {
            Some(path) => validate_path(path)?,
            None => defaults.path,
        };

        Ok(BridgeConfig {
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            path,
        })
    }
}

/// Errors that can occur while building [`BridgeConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("endpoint path must start with '/': {0}")]
    InvalidPath(String),
    #[error("failed to load .env overrides: {0}")]
    Dotenv(#[from] DotenvError),
}

fn load_env_overrides() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}

fn validate_path(path: String) -> Result<String, ConfigError> {
    if path.starts_with('/') {
        Ok(path)
    } else {
        Err(ConfigError::InvalidPath(path))
    }
}
