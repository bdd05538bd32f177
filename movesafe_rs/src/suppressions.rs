//! Suppression system for reviewed findings.
//!
//! Marks element types as "reviewed and OK" for a check so their warnings
//! stop appearing in subsequent runs.
//!
//! Suppressions are stored in `.movesafe/suppressions.toml`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, project_config_dir};
use crate::diagnostics::{VECTOR_INITIALIZER_LIST, VECTOR_PESSIMIZATION};

/// Check a suppression applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Element type copies on resize
    VectorPessimization,
    /// Initializer list copies its elements
    VectorInitializerList,
}

impl CheckKind {
    /// Diagnostic check name
    pub fn check_name(&self) -> &'static str {
        match self {
            CheckKind::VectorPessimization => VECTOR_PESSIMIZATION,
            CheckKind::VectorInitializerList => VECTOR_INITIALIZER_LIST,
        }
    }
}

impl std::fmt::Display for CheckKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckKind::VectorPessimization => write!(f, "vector_pessimization"),
            CheckKind::VectorInitializerList => write!(f, "vector_initializer_list"),
        }
    }
}

impl std::str::FromStr for CheckKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vector_pessimization" | "vector-pessimization" | "performance-vector-pessimization" => {
                Ok(CheckKind::VectorPessimization)
            }
            "vector_initializer_list"
            | "vector-initializer-list"
            | "performance-vector-initializer-list"
            | "init_list" => Ok(CheckKind::VectorInitializerList),
            _ => Err(format!("Unknown check: {}", s)),
        }
    }
}

/// A single suppression entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suppression {
    pub check: CheckKind,
    /// Element type display name, e.g. `struct MoveConstructorThrows`
    pub symbol: String,
    /// Optional: specific file path (if not set, suppresses all locations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Reason for suppression (for documentation)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// When this suppression was added
    pub added: String,
}

/// Collection of all suppressions
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Suppressions {
    #[serde(default, rename = "suppress")]
    pub items: Vec<Suppression>,
}

/// `struct ::ns::Legacy` -> `ns::Legacy`
fn bare_type_name(symbol: &str) -> &str {
    let symbol = symbol.trim();
    let unkeyed = ["struct ", "class ", "union ", "enum "]
        .iter()
        .find_map(|tag| symbol.strip_prefix(*tag))
        .unwrap_or(symbol);
    unkeyed.trim_start().trim_start_matches("::")
}

fn suppressions_path(root: &Path) -> PathBuf {
    project_config_dir(root).join("suppressions.toml")
}

impl Suppressions {
    /// Load suppressions from `.movesafe/suppressions.toml`
    pub fn load(root: &Path) -> Self {
        Self::load_from_path(&suppressions_path(root))
    }

    /// Load from a specific path; unreadable files count as empty.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|content| {
                toml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            });

        match parsed {
            Ok(suppressions) => suppressions,
            Err(e) => {
                tracing::warn!("{}", e);
                Self::default()
            }
        }
    }

    /// Save suppressions to `.movesafe/suppressions.toml`
    pub fn save(&self, root: &Path) -> Result<(), ConfigError> {
        let dir = project_config_dir(root);
        let path = suppressions_path(root);
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.clone(),
            source,
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let content = toml::to_string_pretty(self).map_err(|source| ConfigError::Serialize {
            path: path.clone(),
            source,
        })?;

        let with_header = format!(
            "# movesafe suppressions - findings marked as reviewed/OK\n\
             # symbol is the element type as printed in the warning\n\n{}",
            content
        );

        std::fs::write(&path, with_header).map_err(io_err)?;
        tracing::info!("Saved suppressions to {}", path.display());
        Ok(())
    }

    /// Add a new suppression
    pub fn add(
        &mut self,
        check: CheckKind,
        symbol: String,
        file: Option<String>,
        reason: Option<String>,
    ) {
        if self.is_suppressed(check, &symbol, file.as_deref()) {
            return;
        }

        self.items.push(Suppression {
            check,
            symbol,
            file,
            reason,
            added: Utc::now().format("%Y-%m-%d").to_string(),
        });
    }

    /// Remove every entry for `symbol` under `check`, whatever file it is
    /// pinned to.
    pub fn remove(&mut self, check: CheckKind, symbol: &str) -> bool {
        let before = self.items.len();
        let target = bare_type_name(symbol);
        self.items
            .retain(|s| s.check != check || bare_type_name(&s.symbol) != target);
        self.items.len() < before
    }

    /// Whether a finding on element type `symbol` is suppressed.
    ///
    /// `symbol` is compared without its tag keyword and leading `::`, so an
    /// entry for `Legacy` covers `struct Legacy`. An entry pinned to a file
    /// never covers a finding reported without one.
    pub fn is_suppressed(&self, check: CheckKind, symbol: &str, file: Option<&str>) -> bool {
        let wanted = bare_type_name(symbol);
        self.items.iter().any(|s| {
            s.check == check
                && bare_type_name(&s.symbol) == wanted
                && s.file.as_deref().is_none_or(|pinned| file == Some(pinned))
        })
    }

    /// Count suppressions by check
    pub fn count_by_check(&self, check: CheckKind) -> usize {
        self.items.iter().filter(|s| s.check == check).count()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total count
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
