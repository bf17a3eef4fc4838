//! Error types for svcctl.

use thiserror::Error;

/// Main error type for svcctl.
#[derive(Error, Debug)]
pub enum SvcctlError {
    /// Malformed command line.
    #[error("Usage error: {kind}")]
    Usage { kind: UsageErrorKind },

    /// Configuration-related errors.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors.
    #[error("Validation error: {kind}")]
    Validation { kind: ValidationErrorKind },

    /// Subprocess execution errors.
    #[error("Command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Usage error kinds.
#[derive(Error, Debug)]
pub enum UsageErrorKind {
    #[error("expected exactly one argument, got {count}")]
    WrongArgumentCount { count: usize },

    #[error("Invalid action: {action}")]
    InvalidAction { action: String },
}

/// Validation error kinds.
#[derive(Error, Debug)]
pub enum ValidationErrorKind {
    #[error("Unit name cannot be empty")]
    EmptyUnitName,

    #[error("Invalid unit name '{unit}': {message}")]
    InvalidUnitName { unit: String, message: String },
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{program} {}", exit_description(.code))]
    NonZeroExit { program: String, code: Option<i32> },

    #[error("command timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl SvcctlError {
    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
