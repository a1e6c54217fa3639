//! Field-path parsing (`name` or `name[index]`)

use crate::error::MergeError;

/// Parsed field path: a record key plus an optional explicit array index.
///
/// An explicit index (`emails[1]`) bypasses the global array policy during
/// resolution and selects a single element directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// Top-level record key
    pub name: String,
    /// Explicit array index, if the path carried an `[idx]` suffix
    pub index: Option<usize>,
}

impl FieldPath {
    /// Parse a raw field path.
    ///
    /// A `[` without a closing `]` is treated as part of the key itself
    /// rather than an index. A bracketed segment that is not a
    /// non-negative integer is an error; the resolver degrades that error
    /// to a null value rather than surfacing it.
    pub fn parse(raw: &str) -> Result<Self, MergeError> {
        if let Some(open) = raw.find('[') {
            if let Some(rel) = raw[open + 1..].find(']') {
                let index_text = &raw[open + 1..open + 1 + rel];
                let index = index_text
                    .parse::<usize>()
                    .map_err(|_| MergeError::InvalidFieldPath(raw.to_string()))?;
                return Ok(Self {
                    name: raw[..open].to_string(),
                    index: Some(index),
                });
            }
        }
        Ok(Self {
            name: raw.to_string(),
            index: None,
        })
    }
}
