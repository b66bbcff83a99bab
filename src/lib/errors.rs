use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while loading or validating the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the settings file.
    #[error("Failed to read settings file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Required field is missing.
    #[error("Settings file {path} is missing `{field}`")]
    MissingField { path: PathBuf, field: &'static str },
    /// Field failed validation.
    #[error("Settings file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures of an external session tool invocation.
///
/// None of these reach the display layer; callers log them and fall back to
/// "no active session" or "no environment change".
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("`{program}` was not found on the configured search path")]
    ToolNotFound { program: String },
    #[error("Failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited abnormally (exit={exit_code:?}): {stderr}")]
    CommandFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("`{program}` produced no output")]
    EmptyOutput { program: String },
    #[error("`{program}` produced output that could not be parsed: {message}")]
    MalformedOutput { program: String, message: String },
}

impl SessionError {
    /// The tool ran and succeeded but printed nothing.
    pub fn is_empty_output(&self) -> bool {
        matches!(self, SessionError::EmptyOutput { .. })
    }
}

/// Rejected selection requests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Profile `{name}` is not defined in the AWS config or credentials file")]
    UnknownProfile { name: String },
}

/// Errors reading or writing the persisted selection.
#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("Failed to read selection file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write selection file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Selection file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Structured error metadata printed when the binary exits with a failure.
#[derive(Debug, Clone, Serialize)]
pub struct ExitErrorDescriptor {
    /// Error code.
    pub code: &'static str,
    /// User-facing message.
    pub message: &'static str,
    /// Recommended remediation.
    pub remediation: &'static str,
}

impl ExitErrorDescriptor {
    /// Simple constructor.
    pub const fn new(code: &'static str, message: &'static str, remediation: &'static str) -> Self {
        Self {
            code,
            message,
            remediation,
        }
    }

    /// Render the descriptor plus free-form details as a JSON payload.
    pub fn to_payload(&self, details: &str) -> serde_json::Value {
        serde_json::json!({
            "code": self.code,
            "message": self.message,
            "remediation": self.remediation,
            "details": details,
        })
    }
}

/// Settings could not be loaded.
pub const SETTINGS_INVALID_ERROR: ExitErrorDescriptor = ExitErrorDescriptor::new(
    "settings_invalid",
    "The aws-profile-picker settings file could not be loaded",
    "Fix the reported field in config.toml or remove the file to use defaults.",
);

/// The requested profile does not exist.
pub const UNKNOWN_PROFILE_ERROR: ExitErrorDescriptor = ExitErrorDescriptor::new(
    "unknown_profile",
    "The requested profile is not defined",
    "Run `aws-profile-picker list` to see the available profiles.",
);

/// The wrapped command could not be started.
pub const COMMAND_SPAWN_ERROR: ExitErrorDescriptor = ExitErrorDescriptor::new(
    "command_spawn_failed",
    "The command passed to `run` could not be started",
    "Check that the command exists on PATH and is executable.",
);
