//! Configuration file support for movesafe.
//!
//! Loads optional `.movesafe/config.toml` from project root.
//!
//! ```toml
//! [vector_pessimization]
//! enabled = true
//! max_depth = 3
//! containers = ["::std::vector", "::llvm::SmallVector"]
//!
//! [vector_initializer_list]
//! enabled = false
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::analyzer::MAX_RECURSION_DEPTH;

/// Directory holding movesafe's per-project files.
pub const CONFIG_DIR: &str = ".movesafe";

pub fn project_config_dir(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize {}: {source}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: toml::ser::Error,
    },
    #[error("{}: vector_pessimization.max_depth must be at least 1", path.display())]
    ZeroDepth { path: PathBuf },
}

/// Root configuration structure
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct MovesafeConfig {
    pub vector_pessimization: PessimizationConfig,
    pub vector_initializer_list: InitListConfig,
}

fn default_containers() -> Vec<String> {
    vec!["::std::vector".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_depth() -> usize {
    MAX_RECURSION_DEPTH
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PessimizationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Levels of causal notes below the element type
    #[serde(default = "default_depth")]
    pub max_depth: usize,
    /// Qualified template names treated as growable containers
    #[serde(default = "default_containers")]
    pub containers: Vec<String>,
}

impl Default for PessimizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: MAX_RECURSION_DEPTH,
            containers: default_containers(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InitListConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_containers")]
    pub containers: Vec<String>,
}

impl Default for InitListConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            containers: default_containers(),
        }
    }
}

/// Template names may be given with or without the leading `::`.
fn same_template(configured: &str, container: &str) -> bool {
    configured.trim_start_matches("::") == container.trim_start_matches("::")
}

impl PessimizationConfig {
    pub fn matches(&self, container: &str) -> bool {
        self.containers.iter().any(|c| same_template(c, container))
    }
}

impl InitListConfig {
    pub fn matches(&self, container: &str) -> bool {
        self.containers.iter().any(|c| same_template(c, container))
    }
}

impl MovesafeConfig {
    /// Load config from `.movesafe/config.toml` in the given root directory.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load(root: &Path) -> Self {
        let config_path = project_config_dir(root).join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path, falling back to defaults.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::try_load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Strict variant of [`MovesafeConfig::load_from_path`].
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.vector_pessimization.max_depth == 0 {
            return Err(ConfigError::ZeroDepth {
                path: path.to_path_buf(),
            });
        }
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}
