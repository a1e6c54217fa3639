//! docfill host - Transport and pipeline glue around the engine
//!
//! This crate provides everything outside the pure substitution core:
//!
//! - Length-prefixed JSON message framing (Chrome native-messaging style)
//! - On-disk configuration with defaults
//! - Template discovery
//! - Request routing and the end-to-end template-processing pipeline
//!
//! The host is single-threaded and synchronous: one request at a time,
//! fully materialized before the substitution pass begins.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod messaging;
pub mod service;
pub mod templates;

// Re-export commonly used types
pub use config::HostConfig;
pub use docfill_engine::{MergeError, MergeSettings, MergeStats, Result};
pub use messaging::{read_message, write_message, MAX_MESSAGE_BYTES};
pub use service::{MergeOutcome, NativeHost};
pub use templates::{list_templates, TemplateInfo};
