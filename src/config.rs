//! Client configuration (TOML)
//!
//! Every field has a default, so an empty or missing file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::protocol::{DEFAULT_BIND_ADDRESS, DEFAULT_RECV_CHUNK};
use crate::stream_io::StreamConfig;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub recv_chunk_size: usize,   // bytes per read on the data channel
    pub bind_address: String,     // data listener address
    pub download_dir: PathBuf,    // where -g writes files
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            recv_chunk_size: DEFAULT_RECV_CHUNK,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            download_dir: PathBuf::from("."),
            log_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml(data: &str) -> Result<Self> {
        let cfg: ClientConfig = toml::from_str(data).context("parse config")?;
        if cfg.recv_chunk_size == 0 {
            anyhow::bail!("recv_chunk_size must be greater than zero");
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("load config {}", path.display()))
    }

    /// Explicit path if given, else the per-user file if it exists, else defaults
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::load(p);
        }
        let p = default_config_path();
        if p.is_file() {
            Self::load(&p)
        } else {
            Ok(Self::default())
        }
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            recv_chunk_size: self.recv_chunk_size,
        }
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(windows)]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("ftclient");
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join("ftclient");
    }
    PathBuf::from(".ftclient")
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let cfg = ClientConfig::from_toml("").unwrap();
        assert_eq!(cfg, ClientConfig::default());
        assert_eq!(cfg.stream_config().recv_chunk_size, DEFAULT_RECV_CHUNK);
    }

    #[test]
    fn test_partial_config() {
        let cfg = ClientConfig::from_toml(
            "recv_chunk_size = 512\ndownload_dir = \"/tmp/downloads\"\n",
        )
        .unwrap();
        assert_eq!(cfg.recv_chunk_size, 512);
        assert_eq!(cfg.download_dir, PathBuf::from("/tmp/downloads"));
        assert_eq!(cfg.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn test_zero_chunk_rejected() {
        assert!(ClientConfig::from_toml("recv_chunk_size = 0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        std::fs::write(&p, "bind_address = \"127.0.0.1\"\nlog_file = \"ft.log\"\n").unwrap();
        let cfg = ClientConfig::resolve(Some(&p)).unwrap();
        assert_eq!(cfg.bind_address, "127.0.0.1");
        assert_eq!(cfg.log_file, Some(PathBuf::from("ft.log")));
        assert!(ClientConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
