//! Command-line arguments and configuration file handling.
//!
//! The proxy takes exactly one positional argument: the path to a JSON file
//! shaped like
//!
//! ```json
//! { "Location": ":9000", "Workers": ["10.0.0.1:50051", "10.0.0.2:50051"] }
//! ```
//!
//! [`FileConfig`] mirrors the file as written. [`ServerConfig`] is the
//! validated, normalized form the rest of the server consumes.

use anyhow::Context;
use clap::Parser;
use core::time::Duration;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Connect timeout applied to each worker dial at startup.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Host used when the listen address only names a port (`":9000"`).
const UNSPECIFIED_HOST: &str = "0.0.0.0";

/// Reasons a configuration file is rejected at startup.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration is incomplete.
    #[error("Invalid configuration: {reason}")]
    Invalid { reason: String },

    /// A worker address is unusable.
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "mathlb-server",
    version,
    about = "Forwards Math gRPC calls to a fixed pool of workers in round-robin order"
)]
pub struct CliArgs {
    /// Path to the JSON configuration file.
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,
}

/// Configuration file contents, as written on disk.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Address the proxy listens on, `host:port` or `:port`.
    #[serde(rename = "Location")]
    pub location: String,

    /// Worker addresses in `host:port` form, in round-robin order.
    #[serde(rename = "Workers", default)]
    pub workers: Vec<String>,
}

impl FileConfig {
    /// Reads and parses the configuration file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind, with an empty host replaced by `0.0.0.0`.
    pub listen_addr: String,
    /// Worker endpoints as URIs (`http://host:port`), in configured order.
    pub workers: Vec<String>,
    pub connect_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let file = FileConfig::load(&args.config)?;
        Ok(Self::try_from(file)?)
    }
}

impl TryFrom<FileConfig> for ServerConfig {
    type Error = ConfigError;

    fn try_from(file: FileConfig) -> Result<Self, Self::Error> {
        if file.workers.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "expected at least one worker address".to_string(),
            });
        }

        let listen_addr = listen_address(&file.location)?;
        let workers = file
            .workers
            .iter()
            .map(String::as_str)
            .map(worker_uri)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            listen_addr,
            workers,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        })
    }
}

/// Normalizes a listen address. `":9000"` binds every interface.
fn listen_address(location: &str) -> Result<String, ConfigError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(ConfigError::Invalid {
            reason: "missing listen address (Location)".to_string(),
        });
    }
    if location.starts_with(':') {
        return Ok(format!("{UNSPECIFIED_HOST}{location}"));
    }
    Ok(location.to_string())
}

/// Turns a `host:port` worker address into a plaintext gRPC endpoint URI.
fn worker_uri(address: &str) -> Result<String, ConfigError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(ConfigError::InvalidAddress {
            address: address.to_string(),
            reason: "empty worker address".to_string(),
        });
    }
    if address.contains("://") {
        Ok(address.to_string())
    } else {
        Ok(format!("http://{address}"))
    }
}
