//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Environment variable holding the bearer token clients must send.
pub const AUTH_TOKEN_VAR: &str = "AUTH_TOKEN";

/// Environment variable pointing at the directory with the shard blobs.
pub const DATA_DIR_VAR: &str = "POSTCODES_DATA_DIR";

/// Environment variable with the address to listen on.
pub const BIND_VAR: &str = "POSTCODES_BIND";

/// Port set by hosting platforms; binds on all interfaces when present.
pub const PORT_VAR: &str = "PORT";

/// Default shard directory: the sample blobs shipped with the crate, so the
/// server starts regardless of the working directory.
const DEFAULT_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");

/// Default listen address.
const DEFAULT_BIND: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000);

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No token configured; the server refuses to run unauthenticated
    #[error("you need to define \"AUTH_TOKEN\" as an environment variable")]
    MissingToken,

    /// Listen address or port doesn't parse
    #[error("invalid {var} {value:?}")]
    InvalidBind { var: &'static str, value: String },
}

/// Configuration for the lookup server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Token expected in the `Authorization: Token <token>` header
    pub auth_token: String,
    /// Directory containing the two shard blobs
    pub data_dir: PathBuf,
    /// Address to listen on
    pub bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Create a config with the given token and default locations.
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            bind_addr: DEFAULT_BIND,
        }
    }

    /// Set the shard directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the listen address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(AUTH_TOKEN_VAR)
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;
        let mut config = Self::new(token);

        if let Some(dir) = lookup(DATA_DIR_VAR) {
            config = config.with_data_dir(dir);
        }

        if let Some(port) = lookup(PORT_VAR) {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidBind {
                var: PORT_VAR,
                value: port.clone(),
            })?;
            config = config.with_bind_addr(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
        } else if let Some(bind) = lookup(BIND_VAR) {
            let addr = bind.trim().parse().map_err(|_| ConfigError::InvalidBind {
                var: BIND_VAR,
                value: bind.clone(),
            })?;
            config = config.with_bind_addr(addr);
        }

        Ok(config)
    }
}
