//! Error types for the generator.
//!
//! Every stage has its own error enum; [`GenError`] composes them so a
//! failure anywhere in the pipeline aborts the run before anything is written.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations.
pub type GenResult<T> = Result<T, GenError>;

/// Main error type for generator operations.
#[derive(Debug, Error)]
pub enum GenError {
    /// Error during source file scanning.
    #[error("Failed to scan sources: {0}")]
    Scan(#[from] ScanError),

    /// Error loading or validating the type registry.
    #[error("Failed to load type registry: {0}")]
    Registry(#[from] RegistryError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error writing the output artifact.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// Validation failed (declarations out of date).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during source file scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Root directory does not exist.
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Invalid declaration pattern.
    #[error("Invalid {pattern} pattern: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// IO error reading a source file.
    #[error("IO error scanning {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from ignore crate walker.
    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Error loading or validating the type registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// IO error reading the registry file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry file is not valid JSON or has the wrong shape.
    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The same type name appears twice in one universe.
    #[error("Type '{name}' is declared more than once in the {universe} universe")]
    DuplicateType { universe: String, name: String },

    /// A class names a base class the registry does not contain.
    #[error("Type '{type_name}' extends unknown base '{base}'")]
    UnknownBase { type_name: String, base: String },

    /// Following base classes leads back to the starting type.
    #[error("Inheritance cycle detected: {}", .cycle.join(" -> "))]
    InheritanceCycle { cycle: Vec<String> },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Create a directory not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::DirectoryNotFound { path }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

impl RegistryError {
    /// Create a duplicate type error.
    pub fn duplicate(universe: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateType {
            universe: universe.into(),
            name: name.into(),
        }
    }

    /// Create an unknown base error.
    pub fn unknown_base(type_name: impl Into<String>, base: impl Into<String>) -> Self {
        Self::UnknownBase {
            type_name: type_name.into(),
            base: base.into(),
        }
    }
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
