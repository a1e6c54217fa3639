//! Field resolution: data record + mapping rules → placeholder map

use crate::path::FieldPath;
use crate::transform::{apply_transform, Transform};
use crate::value::{format_value, scalar_text, ArrayPolicy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level record keys consumed by the legacy fixed token set. Every
/// other key contributes its own `{{KEY}}` token.
const LEGACY_CONSUMED_KEYS: [&str; 6] = ["title", "date", "amount", "description", "url", "settings"];

/// User-authored binding from a record path to a placeholder token
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMappingRule {
    /// Record path, optionally with an explicit `[index]` suffix
    pub source_field: String,
    /// Placeholder name, used exactly as authored (case not forced)
    pub placeholder: String,
    /// Per-rule transform; `None` defers to the global transform
    pub transform: Transform,
}

/// Settings block controlling resolution for one request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeSettings {
    /// Ordered field-mapping rules; empty selects legacy mode
    pub field_mappings: Vec<FieldMappingRule>,
    /// Global array-collapse policy
    pub array_handling: ArrayPolicy,
    /// Global transform, overridable per rule
    pub text_transform: Transform,
    /// Keep the literal token in the output when a value resolves empty
    pub preserve_empty_placeholders: bool,
}

/// Insertion-ordered token → replacement map.
///
/// Iteration order is insertion order; inserting an existing token updates
/// its replacement in place without moving it, so substitution order stays
/// stable when a later rule overwrites an earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceholderMap {
    entries: Vec<(String, String)>,
}

impl PlaceholderMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a token's replacement
    pub fn insert(&mut self, token: String, replacement: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == token) {
            entry.1 = replacement;
        } else {
            self.entries.push((token, replacement));
        }
    }

    /// Look up a token's replacement
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, r)| r.as_str())
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, r)| (t.as_str(), r.as_str()))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wrap a placeholder name in the double-brace token delimiter.
pub fn wrap_token(name: &str) -> String {
    format!("{{{{{name}}}}}")
}

/// Resolve a data record into a placeholder map.
///
/// Two mutually exclusive modes: rule mode when `field_mappings` is
/// non-empty, legacy mode otherwise. Resolution never fails; every lookup
/// failure degrades to a null value for that single rule and the remaining
/// rules proceed unaffected.
pub fn resolve(record: &Map<String, Value>, settings: &MergeSettings) -> PlaceholderMap {
    if settings.field_mappings.is_empty() {
        resolve_legacy(record, settings)
    } else {
        resolve_rules(record, settings)
    }
}

fn resolve_rules(record: &Map<String, Value>, settings: &MergeSettings) -> PlaceholderMap {
    let mut map = PlaceholderMap::new();

    for rule in &settings.field_mappings {
        if rule.source_field.is_empty() || rule.placeholder.is_empty() {
            continue;
        }

        // Null lookup results contribute nothing, even under preserve-empty.
        let Some(raw) = lookup_field(record, &rule.source_field, settings.array_handling) else {
            continue;
        };

        let value = if raw.is_empty() {
            raw
        } else {
            let effective = if rule.transform != Transform::None {
                rule.transform
            } else {
                settings.text_transform
            };
            apply_transform(&raw, effective)
        };

        let token = wrap_token(&rule.placeholder);
        if !value.is_empty() {
            map.insert(token, value);
        } else if settings.preserve_empty_placeholders {
            // The token replaces itself, making substitution a no-op while
            // keeping the literal marker visible in the output.
            let literal = token.clone();
            map.insert(token, literal);
        }
    }

    map
}

fn resolve_legacy(record: &Map<String, Value>, settings: &MergeSettings) -> PlaceholderMap {
    let now = chrono::Local::now();
    let policy = settings.array_handling;
    let mut map = PlaceholderMap::new();

    let first_present = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|key| record.get(*key))
            .map(|value| format_value(value, policy))
    };

    map.insert(
        wrap_token("TITLE"),
        first_present(&["title", "pageTitle"]).unwrap_or_default(),
    );
    map.insert(
        wrap_token("DATE"),
        first_present(&["date", "extractionDate"])
            .unwrap_or_else(|| now.format("%Y-%m-%d").to_string()),
    );
    map.insert(
        wrap_token("AMOUNT"),
        first_present(&["amount"]).unwrap_or_default(),
    );
    map.insert(
        wrap_token("DESCRIPTION"),
        first_present(&["description"]).unwrap_or_default(),
    );
    map.insert(
        wrap_token("URL"),
        first_present(&["url", "pageUrl"]).unwrap_or_default(),
    );

    // One token per remaining top-level key, upper-cased, no transform.
    for (key, value) in record {
        if LEGACY_CONSUMED_KEYS.contains(&key.as_str()) {
            continue;
        }
        map.insert(wrap_token(&key.to_uppercase()), format_value(value, policy));
    }

    // TIMESTAMP is always the resolution-time clock, never record-derived,
    // so it is written after the per-key pass.
    map.insert(
        wrap_token("TIMESTAMP"),
        now.format("%Y-%m-%d %H:%M:%S").to_string(),
    );

    map
}

/// Fetch and format one field. Returns `None` on any lookup failure:
/// missing key, bad path, non-array under an explicit index, out-of-bounds
/// index, or a null indexed element.
fn lookup_field(record: &Map<String, Value>, raw_path: &str, policy: ArrayPolicy) -> Option<String> {
    let path = FieldPath::parse(raw_path).ok()?;

    match path.index {
        Some(index) => {
            let items = record.get(&path.name)?.as_array()?;
            let element = items.get(index)?;
            if element.is_null() {
                return None;
            }
            Some(scalar_text(element))
        }
        None => record.get(&path.name).map(|value| format_value(value, policy)),
    }
}
