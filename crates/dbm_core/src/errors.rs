//! Error types for the DBM pipeline.
//!
//! Every error is terminal: nothing is retried or recovered. The CLI maps
//! each kind to a user-facing message and a process exit code.

use std::io;

use thiserror::Error;

/// Exit code for validation, configuration, resource, and conflict errors.
///
/// Distinct from external-tool pass-through codes (tools conventionally
/// exit 1 on generic failure).
pub const EXIT_VALIDATION: i32 = 2;

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The source scan is missing or has an unsupported format.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Path options are unresolvable or contradictory.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A required template, mask, library, or intermediate artifact is absent.
    #[error("Missing resource: {0}")]
    MissingResource(String),

    /// The output directory is non-empty and overwrite was not permitted.
    #[error("Output conflict: {0}")]
    OutputConflict(String),

    /// A delegated external tool returned a nonzero exit status.
    #[error("Command `{command}` failed with exit code {exit_code}")]
    ExternalCommandFailure { command: String, exit_code: i32 },

    /// Filesystem failure outside the semantic kinds above.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl PipelineError {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }

    /// Create a missing resource error.
    pub fn missing_resource(message: impl Into<String>) -> Self {
        Self::MissingResource(message.into())
    }

    /// Create an output conflict error.
    pub fn output_conflict(message: impl Into<String>) -> Self {
        Self::OutputConflict(message.into())
    }

    /// Create an external command failure.
    pub fn command_failed(command: impl Into<String>, exit_code: i32) -> Self {
        Self::ExternalCommandFailure {
            command: command.into(),
            exit_code,
        }
    }

    /// Create an I/O error with operation context.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Process exit code for this error.
    ///
    /// External command failures propagate the tool's own exit code,
    /// clamped to 1..=255 (unknown or negative codes map to 1). Every
    /// other kind uses the stable validation code.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ExternalCommandFailure { exit_code, .. } => {
                if (1..=255).contains(exit_code) {
                    *exit_code
                } else {
                    1
                }
            }
            _ => EXIT_VALIDATION,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
