//! Error handling for the envalloc pipeline
//!
//! The calculators never fail on numeric edge cases. Errors only arise at the
//! boundaries: rejected user input, unreadable configuration, and malformed
//! workbooks.

use crate::validation::ValidationError;
use std::fmt;
use thiserror::Error;

/// Error type for envalloc pipeline operations
#[derive(Error, Debug, Clone)]
pub enum EnvallocError {
    /// Input rejected before it reaches the engine
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String>, entry_id: Option<String> },

    /// Configuration loading and parsing errors
    #[error("Configuration error: {message}")]
    Configuration { message: String, setting: Option<String> },

    /// Workbook serialization and deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String, data_type: Option<String> },
}

impl EnvallocError {
    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            EnvallocError::Validation { .. } => "validation",
            EnvallocError::Configuration { .. } => "configuration",
            EnvallocError::Serialization { .. } => "serialization",
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EnvallocError::Validation { .. } => ErrorSeverity::Low,
            EnvallocError::Configuration { .. } => ErrorSeverity::Critical,
            EnvallocError::Serialization { .. } => ErrorSeverity::Medium,
        }
    }

    /// Validation errors can be fixed by editing the input and retrying.
    pub fn is_recoverable(&self) -> bool {
        match self {
            EnvallocError::Validation { .. } => true,
            EnvallocError::Configuration { .. } => false,
            EnvallocError::Serialization { .. } => true,
        }
    }

    pub fn configuration(setting: &str, message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into(), setting: Some(setting.to_string()) }
    }

    pub fn serialization(data_type: &str, message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into(), data_type: Some(data_type.to_string()) }
    }
}

impl From<ValidationError> for EnvallocError {
    fn from(error: ValidationError) -> Self {
        Self::Validation {
            message: error.to_string(),
            field: Some(error.field().to_string()),
            entry_id: error.entry_id().map(str::to_string),
        }
    }
}

/// Error severity levels for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Low => write!(f, "LOW"),
            ErrorSeverity::Medium => write!(f, "MEDIUM"),
            ErrorSeverity::High => write!(f, "HIGH"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Result type alias for pipeline operations
pub type EnvallocResult<T> = Result<T, EnvallocError>;
