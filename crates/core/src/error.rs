//! Error types for avd-provision
//!
//! Centralized error handling using thiserror. Every error is terminal for
//! the run: the step logs it and exits with a non-zero code.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the provisioning step
#[derive(Error, Debug)]
pub enum StepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No SDK tool found at: {}", .0.display())]
    ToolNotFound(PathBuf),

    #[error("Failed to check if path ({}) exists: {source}", path.display())]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install {component}: {cause}")]
    Install { component: String, cause: String },

    #[error("Failed to write hardware profile ({}): {source}", path.display())]
    HardwareProfile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to export {key}: {cause}")]
    Export { key: String, cause: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, StepError>;

impl StepError {
    /// Shorthand for an install failure of a named component
    pub fn install(component: impl Into<String>, cause: impl ToString) -> Self {
        StepError::Install {
            component: component.into(),
            cause: cause.to_string(),
        }
    }

    /// Check if the error was raised before any external call was made
    pub fn is_input_error(&self) -> bool {
        matches!(self, StepError::Config(_))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            StepError::Config(msg) => format!("Issue with input: {}", msg),
            StepError::ToolNotFound(path) => {
                format!("Android SDK tool missing: {}. Is ANDROID_HOME correct?", path.display())
            }
            StepError::Install { component, cause } => {
                format!("Failed to install {}, error: {}", component, cause)
            }
            _ => self.to_string(),
        }
    }
}
