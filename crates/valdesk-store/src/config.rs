//! Store configuration: where the data directory lives.
//!
//! Resolution order: the `VALDESK_DATA_DIR` environment variable, then a
//! TOML config file (an explicit path or `valdesk.toml` in the working
//! directory), then the platform data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "VALDESK_DATA_DIR";

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "valdesk.toml";

const DATA_FILE_NAME: &str = "valdesk.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Resolve the effective configuration. `config_path` forces a specific
    /// TOML file; without it the working-directory file is used when
    /// present.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self, StoreError> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
            return Ok(Self {
                data_dir: PathBuf::from(dir),
            });
        }
        let candidate = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
        if candidate.exists() {
            return Self::from_file(&candidate);
        }
        Ok(Self {
            data_dir: platform_data_dir(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| StoreError::io(path, source))?;
        toml::from_str(&text).map_err(|source| StoreError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The JSON document holding every entity's rows.
    pub fn data_file(&self) -> PathBuf {
        self.data_dir.join(DATA_FILE_NAME)
    }

    pub fn ensure_data_dir(&self) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)
            .map_err(|source| StoreError::io(&self.data_dir, source))
    }
}

fn platform_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "valdesk")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("valdesk-data"))
}
