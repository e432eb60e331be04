use crate::error::StoreError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Approximate rendered height of a node, used when stacking nodes in a column.
pub const NODE_HEIGHT: i64 = 120;

/// Column layout parameters used to position pathway nodes.
///
/// These only affect node positions, never the rule semantics of a pathway.
/// Partial JSON objects merge over the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub column_width: i64,
    pub node_margin: i64,
    pub column_margin: i64,
    pub initial_x: i64,
    pub initial_y: i64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            column_width: 250,
            node_margin: 20,
            column_margin: 50,
            initial_x: 50,
            initial_y: 50,
        }
    }
}

impl LayoutSettings {
    /// The x coordinate of the given layout column.
    pub fn column_x(&self, column: i64) -> i64 {
        self.initial_x + column * (self.column_width + self.column_margin)
    }

    /// Vertical distance between two stacked nodes in the same column.
    pub fn row_step(&self) -> i64 {
        NODE_HEIGHT + self.node_margin
    }
}

/// Application level settings: where rules live and how new pathways are laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub rules_file: PathBuf,
    pub export_dir: PathBuf,
    pub layout: LayoutSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            rules_file: data_dir.join("diagnostic_rules.json"),
            export_dir: data_dir.join("exports"),
            data_dir,
            layout: LayoutSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads the configuration, falling back to defaults if the file is missing or invalid.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file at '{}', using defaults", path.display());
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Error loading config '{}': {}. Using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Loads the configuration, reporting any I/O or JSON error.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Writes the configuration as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Saved config to '{}'", path.display());
        Ok(())
    }
}
