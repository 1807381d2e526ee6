//! Shared error types for structural analysis.
//!
//! Only genuine failures are represented here. Degraded results, such as a
//! PageRank run that exhausts its iteration budget, are still valid results
//! and never surface as an [`Error`].

use thiserror::Error;

/// Main error type for structmap operations
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Snapshot storage collaborator errors
    #[error("Storage error for snapshot '{snapshot_id}': {message}")]
    Storage {
        snapshot_id: String,
        message: String,
    },

    /// A call edge references a caller that is not part of the function set
    #[error("Call edge references unknown function '{function_id}'")]
    UnknownFunction { function_id: String },

    /// Generic errors with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },

    /// Wrapped external errors
    #[error(transparent)]
    External(#[from] anyhow::Error),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl Error {
    /// Create a storage error for a snapshot
    pub fn storage(snapshot_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            snapshot_id: snapshot_id.into(),
            message: message.into(),
        }
    }

    /// Create an unknown function error
    pub fn unknown_function(function_id: impl Into<String>) -> Self {
        Self::UnknownFunction {
            function_id: function_id.into(),
        }
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            message: self.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
