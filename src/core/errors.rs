//! PSIM-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for the prisoner simulator.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("[PSIM-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[PSIM-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[PSIM-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[PSIM-1101] invalid input: {details}")]
    InvalidInput { details: String },

    #[error("[PSIM-2001] chart rendering failure for {path}: {details}")]
    Render { path: PathBuf, details: String },

    #[error("[PSIM-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[PSIM-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[PSIM-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl SimError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "PSIM-1001",
            Self::MissingConfig { .. } => "PSIM-1002",
            Self::ConfigParse { .. } => "PSIM-1003",
            Self::InvalidInput { .. } => "PSIM-1101",
            Self::Render { .. } => "PSIM-2001",
            Self::Serialization { .. } => "PSIM-2101",
            Self::Io { .. } => "PSIM-3002",
            Self::Runtime { .. } => "PSIM-3900",
        }
    }

    /// Whether the error stems from what the user typed or configured,
    /// as opposed to the environment failing underneath a valid request.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for rejected user input.
    #[must_use]
    pub fn invalid_input(details: impl Into<String>) -> Self {
        Self::InvalidInput {
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for SimError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for SimError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
