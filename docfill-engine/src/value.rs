//! Value formatting under array-collapse policies

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Policy for collapsing an array value into a single display string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayPolicy {
    /// Take the first element
    #[default]
    First,
    /// Join elements with `", "`
    JoinComma,
    /// Join elements with a single space
    JoinSpace,
    /// Join elements with a newline
    JoinNewline,
    /// Use the decimal element count
    Count,
}

impl ArrayPolicy {
    /// Parse the wire code for a policy. Unrecognized codes fall back to
    /// `First`, matching the behavior callers have always relied on.
    pub fn parse(code: &str) -> Self {
        match code {
            "first" => ArrayPolicy::First,
            "join_comma" => ArrayPolicy::JoinComma,
            "join_space" => ArrayPolicy::JoinSpace,
            "join_newline" => ArrayPolicy::JoinNewline,
            "count" => ArrayPolicy::Count,
            _ => ArrayPolicy::First,
        }
    }

    /// Wire code for this policy
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayPolicy::First => "first",
            ArrayPolicy::JoinComma => "join_comma",
            ArrayPolicy::JoinSpace => "join_space",
            ArrayPolicy::JoinNewline => "join_newline",
            ArrayPolicy::Count => "count",
        }
    }
}

impl Serialize for ArrayPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ArrayPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(ArrayPolicy::parse(&code))
    }
}

/// Format an arbitrary JSON value as a display string under the given
/// array policy.
///
/// Null becomes the empty string; booleans are `true`/`false`; numbers use
/// serde_json's canonical display (no trailing zeros); objects fall back to
/// minified JSON, a last-resort display form not intended for re-parsing.
pub fn format_value(value: &Value, policy: ArrayPolicy) -> String {
    match value {
        Value::Array(items) => format_array(items, policy),
        other => scalar_text(other),
    }
}

/// Canonical string form of a non-array value.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn format_array(items: &[Value], policy: ArrayPolicy) -> String {
    if items.is_empty() {
        return String::new();
    }
    match policy {
        ArrayPolicy::First => scalar_text(&items[0]),
        ArrayPolicy::JoinComma => join_items(items, ", "),
        ArrayPolicy::JoinSpace => join_items(items, " "),
        ArrayPolicy::JoinNewline => join_items(items, "\n"),
        ArrayPolicy::Count => items.len().to_string(),
    }
}

fn join_items(items: &[Value], separator: &str) -> String {
    items
        .iter()
        .map(scalar_text)
        .collect::<Vec<_>>()
        .join(separator)
}
