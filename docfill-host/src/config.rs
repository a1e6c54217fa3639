//! On-disk host configuration

use docfill_engine::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Host configuration, persisted as `config.json` in the per-user config
/// directory. Unknown keys in the file are ignored; missing keys take
/// their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HostConfig {
    /// Directory searched for templates
    pub template_path: PathBuf,
    /// Directory generated documents are written to
    pub output_path: PathBuf,
    /// Open generated documents with the platform opener
    pub auto_open: bool,
    /// Template used when a request names none
    pub default_template: String,
    /// Largest template file the pipeline will process, in MiB
    pub max_file_size_mb: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        let documents = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            template_path: documents.join("Templates"),
            output_path: documents.join("Generated"),
            auto_open: true,
            default_template: "template.json".to_string(),
            max_file_size_mb: 50,
        }
    }
}

/// Per-user configuration directory for the host.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docfill")
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.json")
}

impl HostConfig {
    /// Load configuration from `path`. A missing file is created with
    /// defaults; an unreadable or malformed file falls back to defaults
    /// without failing startup.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), %err, "malformed config, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                let config = Self::default();
                if let Err(err) = config.save(path) {
                    warn!(path = %path.display(), %err, "could not write default config");
                }
                config
            }
        }
    }

    /// Persist configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Apply a partial update from a JSON object, honoring only the
    /// recognized keys. Wrong-typed values for a key are ignored.
    pub fn apply_update(&mut self, update: &serde_json::Map<String, Value>) {
        if let Some(value) = update.get("template_path").and_then(Value::as_str) {
            self.template_path = PathBuf::from(value);
        }
        if let Some(value) = update.get("output_path").and_then(Value::as_str) {
            self.output_path = PathBuf::from(value);
        }
        if let Some(value) = update.get("auto_open").and_then(Value::as_bool) {
            self.auto_open = value;
        }
        if let Some(value) = update.get("default_template").and_then(Value::as_str) {
            self.default_template = value.to_string();
        }
        if let Some(value) = update.get("max_file_size_mb").and_then(Value::as_u64) {
            self.max_file_size_mb = value;
        }
    }
}
