// Sibling-plugin registry. The bot runtime knows which plugins exist and
// whether each is enabled; the report only needs that listing, so the seam
// is a single trait the host (or a manifest file, for the demo shell)
// implements.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub activated: bool,
}

pub trait PluginDirectory: Send + Sync {
    fn plugins(&self) -> Vec<PluginEntry>;
}

/// In-memory directory, also what a manifest file loads into.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: Vec<PluginEntry>,
}

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default, rename = "plugin")]
    plugins: Vec<PluginEntry>,
}

impl StaticDirectory {
    pub fn new(entries: Vec<PluginEntry>) -> Self {
        Self { entries }
    }

    /// Directory containing only this plugin itself, for running without a
    /// manifest.
    pub fn builtin() -> Self {
        Self::new(vec![PluginEntry {
            name: crate::PLUGIN_NAME.to_string(),
            version: crate::PLUGIN_VERSION.to_string(),
            activated: true,
        }])
    }

    /// Load `[[plugin]]` entries from a TOML manifest.
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plugin manifest {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse plugin manifest {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents)?;
        for entry in &manifest.plugins {
            if entry.name.is_empty() {
                anyhow::bail!("Plugin name cannot be empty");
            }
        }
        Ok(Self::new(manifest.plugins))
    }
}

impl PluginDirectory for StaticDirectory {
    fn plugins(&self) -> Vec<PluginEntry> {
        self.entries.clone()
    }
}
