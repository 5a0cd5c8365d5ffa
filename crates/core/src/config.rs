use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::paths::Paths;

/// Defaults for hierarchical index listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    /// How many levels below the start node are expanded.
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
}

fn default_depth() -> usize {
    1
}

fn default_max_nodes() -> usize {
    200
}

fn default_text_limit() -> usize {
    80
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            max_nodes: default_max_nodes(),
            text_limit: default_text_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default = "default_search_limit")]
    pub limit: usize,
    /// "fuzzy" (case-insensitive substring) or "regex".
    #[serde(default = "default_search_mode")]
    pub mode: String,
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
}

fn default_search_limit() -> usize {
    20
}

fn default_search_mode() -> String {
    "fuzzy".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
            mode: default_search_mode(),
            text_limit: default_text_limit(),
        }
    }
}

/// Default filters for ref-annotated snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotConfig {
    /// Keep only interactive lines.
    #[serde(default)]
    pub interactive: bool,
    /// Drop unnamed structural lines.
    #[serde(default)]
    pub compact: bool,
    #[serde(default)]
    pub max_depth: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiviewConfig {
    #[serde(default = "default_depth")]
    pub depth: usize,
    #[serde(default = "default_max_nodes")]
    pub max_nodes: usize,
    #[serde(default = "default_text_limit")]
    pub text_limit: usize,
}

impl Default for MultiviewConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            max_nodes: default_max_nodes(),
            text_limit: default_text_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub multiview: MultiviewConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn load_or_default(paths: &Paths) -> Result<Self> {
        let config_path = paths.config_file();
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.max_nodes == 0 || self.multiview.max_nodes == 0 {
            return Err(Error::Config("maxNodes must be at least 1".to_string()));
        }
        if self.search.limit == 0 {
            return Err(Error::Config("search.limit must be at least 1".to_string()));
        }
        if self.index.text_limit == 0 || self.search.text_limit == 0 || self.multiview.text_limit == 0 {
            return Err(Error::Config("textLimit must be at least 1".to_string()));
        }
        match self.search.mode.as_str() {
            "fuzzy" | "regex" => Ok(()),
            other => Err(Error::Config(format!(
                "search.mode must be \"fuzzy\" or \"regex\", got \"{}\"",
                other
            ))),
        }
    }
}
