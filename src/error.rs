//! Error types for the inventory dashboard.

use std::path::PathBuf;
use thiserror::Error;

/// Required columns are missing from a loaded table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Every missing column, in the order the required list supplied them.
    #[error("required columns are missing: {}", format_missing(.missing))]
    MissingColumns { missing: Vec<String> },
}

impl SchemaError {
    /// The missing column names, spelled as in the required list.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        match self {
            Self::MissingColumns { missing } => missing,
        }
    }
}

fn format_missing(missing: &[String]) -> String {
    missing
        .iter()
        .map(|name| format!("\"{name}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur when loading an inventory file.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The inventory file does not exist.
    #[error("file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The file has no header row or no data rows.
    #[error("no data in '{path}'")]
    EmptyData { path: PathBuf },

    /// The file content is not a readable table.
    #[error("failed to parse '{path}': {message}")]
    Parse { path: PathBuf, message: String },

    /// Failed to read the file from disk.
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The table does not carry the inventory columns.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors that can occur when exporting data.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Failed to create the output file.
    #[error("failed to create file '{path}': {source}")]
    FileCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write data to the file.
    #[error("failed to write data: {message}")]
    WriteError { message: String },

    /// Failed to serialize data to JSON.
    #[error("JSON serialization failed: {source}")]
    JsonSerialize {
        #[from]
        source: serde_json::Error,
    },

    /// Failed to write CSV data.
    #[error("CSV write failed: {source}")]
    CsvWrite {
        #[from]
        source: csv::Error,
    },
}

/// Errors raised while reading, writing or editing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode config: {source}")]
    Encode { source: serde_json::Error },

    /// No parameter is registered under this key.
    #[error("parameter '{key}' is not registered")]
    UnknownParam { key: String },

    /// The value's kind does not match the parameter's editor kind.
    #[error("parameter '{key}' expects a {expected} value")]
    KindMismatch { key: String, expected: &'static str },

    #[error("invalid color '{value}'")]
    InvalidColor { value: String },
}
