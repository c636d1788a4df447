use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Gateway settings, loadable from TOML.
///
/// ```toml
/// bind_addr = "0.0.0.0:8080"
/// snapshot_path = "ledger-state.json"
/// max_body_bytes = 65536
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    /// Where committed state is persisted. `None` keeps state in memory only.
    pub snapshot_path: Option<PathBuf>,
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            snapshot_path: None,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl GatewayConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> GatewayResult<Self> {
        toml::from_str(text).map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> GatewayResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
