//! Error types for definition loading and JSON binding sources.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading definition documents or building a
/// binding source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A loaded definition violated a schema rule (e.g. duplicate form
    /// keys at registry construction).
    #[error("schema error: {0}")]
    Schema(#[from] form_schema_core::SchemaError),

    /// File extension is not a supported document format.
    #[error("unsupported document format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// All configured loader sources failed.
    #[error("no definition sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`SourceError`].
pub type Result<T> = std::result::Result<T, SourceError>;
