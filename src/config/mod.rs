//! Host-managed configuration discovery
//!
//! The host application writes `api.json` into its application-data
//! directory; the plugin reads it once at startup to learn the local API
//! port. The file is read-only to this process and an unreadable or
//! unparseable file is fatal: without the port there is no endpoint to
//! connect to.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::paths;

/// Endpoint configuration discovered from the host, immutable for the
/// process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostConfig {
    pub api_port: u16,
}

/// On-disk shape of `api.json` (host owns the naming)
#[derive(Deserialize)]
struct HostConfigFile {
    #[serde(rename = "apiPort")]
    api_port: u16,
}

impl HostConfig {
    /// Path to the host-managed `api.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path.push(paths::HOST_CONFIG_FILENAME);
        path
    }

    /// Load from the default per-OS location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read host config from {:?}", path))?;

        let file: HostConfigFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;

        info!(port = file.api_port, "Discovered host API port");
        Ok(Self {
            api_port: file.api_port,
        })
    }

    /// WebSocket endpoint URL for the host event channel
    pub fn endpoint_url(&self) -> String {
        format!("ws://localhost:{}", self.api_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"apiPort": 8123}}"#).unwrap();

        let config = HostConfig::load_from(&path).unwrap();
        assert_eq!(config.api_port, 8123);
        assert_eq!(config.endpoint_url(), "ws://localhost:8123");
    }

    #[test]
    fn test_extra_keys_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        fs::write(&path, r#"{"apiPort": 9000, "version": "2.1.0"}"#).unwrap();

        let config = HostConfig::load_from(&path).unwrap();
        assert_eq!(config.api_port, 9000);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");

        assert!(HostConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        fs::write(&path, "{not json").unwrap();

        assert!(HostConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_missing_port_key_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        fs::write(&path, r#"{"host": "localhost"}"#).unwrap();

        assert!(HostConfig::load_from(&path).is_err());
    }
}
