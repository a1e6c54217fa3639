//! Template discovery

use docfill_engine::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One discovered template file
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TemplateInfo {
    /// File name
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last-modified time, RFC 3339
    pub modified: String,
    /// Template kind: `document` or `text`
    pub kind: &'static str,
}

/// List templates across the given directories, in directory order.
///
/// `.json` files are document-model templates; `.txt` files count only
/// when their name contains "template" (they are mostly test fixtures).
/// Editor temp files (`~` prefix) are skipped. Missing directories are
/// skipped silently.
pub fn list_templates(dirs: &[PathBuf]) -> Result<Vec<TemplateInfo>> {
    let mut templates = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            continue;
        }
        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .collect();
        entries.sort();

        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('~') {
                continue;
            }
            let kind = match template_kind(&path) {
                Some(kind) => kind,
                None => continue,
            };
            let metadata = fs::metadata(&path)?;
            templates.push(TemplateInfo {
                name: name.to_string(),
                path: path.clone(),
                size: metadata.len(),
                modified: modified_stamp(&metadata),
                kind,
            });
        }
    }
    Ok(templates)
}

fn template_kind(path: &Path) -> Option<&'static str> {
    let name = path.file_name()?.to_str()?;
    match path.extension()?.to_str()? {
        "json" => Some("document"),
        "txt" if name.to_lowercase().contains("template") => Some("text"),
        _ => None,
    }
}

fn modified_stamp(metadata: &fs::Metadata) -> String {
    metadata
        .modified()
        .ok()
        .map(|time| chrono::DateTime::<chrono::Local>::from(time).to_rfc3339())
        .unwrap_or_default()
}
