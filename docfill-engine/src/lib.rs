//! docfill engine - Run-aware placeholder substitution
//!
//! This crate provides the core template-merge machinery with no I/O
//! dependencies. It includes:
//!
//! - Value formatting (array-collapse policies, text transforms)
//! - Field-path parsing and field resolution into a placeholder map
//! - A serde-backed document model (paragraphs, runs, tables, sections)
//! - The run-aware substitution engine
//! - Reserved-token (asset) dispatch with a renderer seam
//! - Error types
//!
//! All substitution is performed in place on an owned document instance.
//! The engine never interprets run styles; it only rewrites run text, so
//! formatting survives token replacement even when a token is split across
//! run boundaries by the originating editor.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod asset;
pub mod document;
pub mod error;
pub mod path;
pub mod resolve;
pub mod substitute;
pub mod transform;
pub mod value;

// Re-export commonly used types
pub use asset::{AssetKind, AssetRenderer, NullRenderer, ASSET_TOKEN_PREFIX};
pub use document::{AssetImage, Cell, Document, Paragraph, Row, Run, Section, Table};
pub use error::{MergeError, Result};
pub use path::FieldPath;
pub use resolve::{resolve, FieldMappingRule, MergeSettings, PlaceholderMap};
pub use substitute::{
    merge_document, splice_token, substitute_paragraph, substitute_plain, MergeStats,
};
pub use transform::{apply_transform, Transform};
pub use value::{format_value, ArrayPolicy};
