/*============================================================
  Synavera Project: Depsize
  Module: depsize_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration for proxy access and logging
    from an optional TOML file.

  Security / Safety Notes:
    Reads a single operator-owned file; values are never
    echoed back except in parse diagnostics.

  Dependencies:
    serde + toml for decoding, dirs for the XDG config root.

  Operational Scope:
    Consulted once at startup by the binary entry point; the
    resolved values are passed explicitly into the client.

  Revision History:
    2025-11-12 COD  Authored configuration loader.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit defaults for every tunable
    - Missing default file is not an error; missing explicit
      file is
============================================================*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{DepsizeError, Result};

const CONFIG_DIR: &str = "depsize";
const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DepsizeConfig {
    pub proxy: ProxyConfig,
    pub logging: LoggingConfig,
}

/// `[proxy]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    /// GOPROXY-style endpoint list; only the first entry is used.
    pub url: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout: u64,
    pub user_agent: String,
    /// Upper bound on concurrent size lookups for dependencies.
    pub max_parallel_requests: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: 30,
            user_agent: format!(
                "depsize/{} (+{})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            max_parallel_requests: 4,
        }
    }
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// `[logging]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Directory for per-session log files. No file log when unset.
    pub dir: Option<PathBuf>,
}

impl DepsizeConfig {
    /// Load from `path` if given (must exist), otherwise from the default
    /// location if present, otherwise fall back to defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load_from_path(explicit),
            None => match default_config_path() {
                Some(candidate) if candidate.is_file() => Self::load_from_path(&candidate),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load and parse a specific configuration file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            DepsizeError::Config(format!(
                "Failed to read config {}: {err}",
                path.display()
            ))
        })?;
        Self::from_toml(&raw).map_err(|err| match err {
            DepsizeError::Config(msg) => {
                DepsizeError::Config(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Parse a configuration document.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: DepsizeConfig = toml::from_str(raw)
            .map_err(|err| DepsizeError::Config(format!("Invalid configuration: {err}")))?;
        config.proxy.max_parallel_requests = config.proxy.max_parallel_requests.max(1);
        Ok(config)
    }

    /// Log file for a session stamped `stamp`, when a log directory is configured.
    pub fn log_path(&self, stamp: &str) -> Option<PathBuf> {
        self.logging
            .dir
            .as_ref()
            .map(|dir| dir.join(format!("depsize_{stamp}.log")))
    }
}

/// `$XDG_CONFIG_HOME/depsize/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
