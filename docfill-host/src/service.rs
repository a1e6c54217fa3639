//! Request routing and the template-processing pipeline

use crate::config::{default_config_path, HostConfig};
use crate::messaging::{read_message, write_message};
use crate::templates::list_templates;
use chrono::Local;
use docfill_engine::{
    merge_document, resolve, substitute_plain, AssetRenderer, Document, MergeError, MergeStats,
    NullRenderer, Result,
};
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, error, info, warn};

/// Result of one successful template merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Path of the generated document
    pub output_path: PathBuf,
    /// Generated file name
    pub file_name: String,
    /// Substitution counters; `None` for plain-text templates
    pub stats: Option<MergeStats>,
}

/// The native-messaging host: owns the configuration and routes framed
/// requests to the merge pipeline. One request at a time; each request
/// gets its own freshly resolved placeholder map and document instance.
pub struct NativeHost {
    config: HostConfig,
    config_path: PathBuf,
    renderer: Box<dyn AssetRenderer>,
    extra_template_dirs: Vec<PathBuf>,
}

impl NativeHost {
    /// Create a host with configuration loaded from the default location.
    pub fn new() -> Self {
        let path = default_config_path();
        let config = HostConfig::load(&path);
        Self::with_config(config, path)
    }

    /// Create a host with explicit configuration.
    pub fn with_config(config: HostConfig, config_path: PathBuf) -> Self {
        Self {
            config,
            config_path,
            renderer: Box::new(NullRenderer),
            extra_template_dirs: Vec::new(),
        }
    }

    /// Replace the asset renderer (defaults to the always-unavailable
    /// [`NullRenderer`]).
    pub fn with_renderer(mut self, renderer: Box<dyn AssetRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Add a fallback directory searched after the configured template dir.
    pub fn with_template_dir(mut self, dir: PathBuf) -> Self {
        self.extra_template_dirs.push(dir);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Main message loop: read framed requests until EOF, answering each
    /// with a structured success/failure response. Malformed JSON gets an
    /// error response and the loop continues; a broken channel ends it.
    pub fn run<R: Read, W: Write>(&mut self, reader: &mut R, writer: &mut W) -> Result<()> {
        info!("docfill native host started");
        loop {
            match read_message(reader) {
                Ok(None) => break,
                Ok(Some(message)) => {
                    let response = self.handle_message(&message);
                    write_message(writer, &response)?;
                }
                Err(MergeError::Json(err)) => {
                    error!(%err, "discarding malformed message");
                    let response = failure(&format!("Invalid JSON: {err}"));
                    write_message(writer, &response)?;
                }
                Err(err) => {
                    error!(%err, "message channel failed");
                    let _ = write_message(writer, &failure(&err.to_string()));
                    break;
                }
            }
        }
        info!("docfill native host stopped");
        Ok(())
    }

    /// Route one decoded message to its handler and build the response.
    pub fn handle_message(&mut self, message: &Value) -> Value {
        let action = message
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        debug!(action, "handling message");

        let data = message.get("data").unwrap_or(&Value::Null);
        match action {
            "ping" => json!({"success": true, "message": "pong"}),
            "update_template" => self.handle_update_template(data),
            "get_config" => json!({"success": true, "config": self.config}),
            "update_config" => self.handle_update_config(data),
            "list_templates" => self.handle_list_templates(),
            other => failure(&format!("Unknown action: {other}")),
        }
    }

    fn handle_update_template(&self, data: &Value) -> Value {
        match self.process_template(data) {
            Ok(outcome) => json!({
                "success": true,
                "output_path": outcome.output_path,
                "message": format!("Document created successfully: {}", outcome.file_name),
                "stats": outcome.stats,
            }),
            Err(err) => {
                error!(%err, "template processing failed");
                failure(&err.to_string())
            }
        }
    }

    fn handle_update_config(&mut self, data: &Value) -> Value {
        if let Some(update) = data.as_object() {
            self.config.apply_update(update);
        }
        match self.config.save(&self.config_path) {
            Ok(()) => json!({
                "success": true,
                "message": "Configuration updated successfully",
                "config": self.config,
            }),
            Err(err) => failure(&err.to_string()),
        }
    }

    fn handle_list_templates(&self) -> Value {
        let mut dirs = vec![self.config.template_path.clone()];
        dirs.extend(self.extra_template_dirs.iter().cloned());
        match list_templates(&dirs) {
            Ok(templates) => json!({"success": true, "templates": templates}),
            Err(err) => failure(&err.to_string()),
        }
    }

    /// Run one merge: resolve the template path, build the placeholder
    /// map from the request's record and settings, apply it, and write a
    /// timestamped output file. The document is only persisted after the
    /// whole pass succeeds.
    pub fn process_template(&self, data: &Value) -> Result<MergeOutcome> {
        let template_name = data
            .get("template")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.default_template);
        let template_path = self.resolve_template(template_name)?;

        let size = fs::metadata(&template_path)?.len();
        let limit = self.config.max_file_size_mb.saturating_mul(1024 * 1024);
        if size > limit {
            return Err(MergeError::TemplateTooLarge { size, limit });
        }

        let empty = Map::new();
        let record = data
            .get("extractedData")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let settings = record
            .get("settings")
            .map(|value| serde_json::from_value(value.clone()).unwrap_or_default())
            .unwrap_or_default();
        let map = resolve(record, &settings);
        debug!(tokens = map.len(), template = %template_path.display(), "placeholder map resolved");

        fs::create_dir_all(&self.config.output_path)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let stem = template_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("template");
        let extension = template_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let (output_path, stats) = match extension {
            "txt" => {
                let contents = fs::read_to_string(&template_path)?;
                let merged = substitute_plain(&contents, &map);
                let output_path = self.config.output_path.join(format!("{stem}_{timestamp}.txt"));
                fs::write(&output_path, merged)?;
                (output_path, None)
            }
            "json" => {
                let file = fs::File::open(&template_path)?;
                let mut document: Document = serde_json::from_reader(BufReader::new(file))?;
                let stats = merge_document(&mut document, &map, self.renderer.as_ref());
                let output_path = self.config.output_path.join(format!("{stem}_{timestamp}.json"));
                fs::write(&output_path, serde_json::to_string_pretty(&document)?)?;
                (output_path, Some(stats))
            }
            other => {
                return Err(MergeError::UnsupportedTemplate(other.to_string()));
            }
        };

        info!(output = %output_path.display(), "template processed");
        if self.config.auto_open {
            open_document(&output_path);
        }

        let file_name = output_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        Ok(MergeOutcome {
            output_path,
            file_name,
            stats,
        })
    }

    fn resolve_template(&self, name: &str) -> Result<PathBuf> {
        let requested = Path::new(name);
        if requested.is_absolute() {
            if requested.exists() {
                return Ok(requested.to_path_buf());
            }
            return Err(MergeError::TemplateNotFound {
                name: name.to_string(),
            });
        }

        let mut dirs = vec![self.config.template_path.clone()];
        dirs.extend(self.extra_template_dirs.iter().cloned());
        for dir in dirs {
            let candidate = dir.join(requested);
            if candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(MergeError::TemplateNotFound {
            name: name.to_string(),
        })
    }
}

impl Default for NativeHost {
    fn default() -> Self {
        Self::new()
    }
}

fn failure(message: &str) -> Value {
    json!({"success": false, "error": message})
}

fn open_document(path: &Path) {
    if let Err(err) = open_command(path).spawn() {
        warn!(path = %path.display(), %err, "could not auto-open document");
    }
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn open_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
