use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "PDFSPOOL_CONFIG";
/// Environment override for the job submission program.
pub const LP_ENV: &str = "PDFSPOOL_LP";
/// Environment override for the printer listing program.
pub const LPSTAT_ENV: &str = "PDFSPOOL_LPSTAT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Programs and extra options used to talk to the CUPS spooler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolerConfig {
    pub lp: String,
    pub lpstat: String,
    /// Appended to every `lp` call as `-o <option>`.
    pub extra_options: Vec<String>,
}

impl Default for SpoolerConfig {
    fn default() -> Self {
        Self {
            lp: "lp".to_string(),
            lpstat: "lpstat".to_string(),
            extra_options: Vec::new(),
        }
    }
}

impl SpoolerConfig {
    /// Reads a JSON configuration file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through `lookup`: the file named by
    /// [`CONFIG_ENV`] first, then the program overrides.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_ENV).filter(|value| !value.trim().is_empty()) {
            Some(path) => Self::load(Path::new(path.trim()))?,
            None => Self::default(),
        };
        if let Some(lp) = lookup(LP_ENV).filter(|value| !value.trim().is_empty()) {
            config.lp = lp;
        }
        if let Some(lpstat) = lookup(LPSTAT_ENV).filter(|value| !value.trim().is_empty()) {
            config.lpstat = lpstat;
        }
        log::debug!("spooler configuration: {config:?}");
        Ok(config)
    }
}
