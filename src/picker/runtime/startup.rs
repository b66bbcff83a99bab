use std::{path::PathBuf, process::ExitCode};

use anyhow::Error;

use crate::{
    lib::{errors::ExitErrorDescriptor, paths},
    picker::{config::PickerConfig, selector::ProfileSelector, store::FileSelectionStore},
    profiles::ProfileSources,
    session::{AuthMethod, CommandRunner},
};

/// Bundles a runtime error message with an exit code and optional structured error data.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: ExitCode,
    error_data: Option<serde_json::Value>,
}

impl RuntimeExit {
    pub fn structured(descriptor: ExitErrorDescriptor, details: &str, exit_code: ExitCode) -> Self {
        Self {
            message: descriptor.message.to_string(),
            exit_code,
            error_data: Some(descriptor.to_payload(details)),
        }
    }

    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: ExitCode::FAILURE,
            error_data: None,
        }
    }

    /// Exit with `code` and nothing to report, e.g. a wrapped command's status.
    pub fn silent(exit_code: ExitCode) -> Self {
        Self {
            message: String::new(),
            exit_code,
            error_data: None,
        }
    }

    pub fn report(self) -> ExitCode {
        if let Some(data) = self.error_data {
            if let Ok(serialized) = serde_json::to_string(&data) {
                eprintln!("{serialized}");
            } else {
                eprintln!("{}", self.message);
            }
        } else if !self.message.is_empty() {
            eprintln!("{}", self.message);
        }
        self.exit_code
    }

    pub fn exit_code(&self) -> ExitCode {
        self.exit_code
    }

    pub fn error_data(&self) -> Option<&serde_json::Value> {
        self.error_data.as_ref()
    }
}

/// Everything resolved before the first reconciliation.
#[derive(Debug, Clone)]
pub struct PickerLaunch {
    pub config: PickerConfig,
    pub method: AuthMethod,
    pub sources: ProfileSources,
    pub selection_file: PathBuf,
}

impl PickerLaunch {
    /// Apply overrides on top of the loaded settings.
    pub fn new(config: PickerConfig, method_override: Option<AuthMethod>) -> Self {
        let method = method_override.unwrap_or(config.auth.method);
        let sources = ProfileSources::resolve(
            config.profiles.config_file.clone(),
            config.profiles.credentials_file.clone(),
        );
        let selection_file = config
            .profiles
            .selection_file
            .clone()
            .unwrap_or_else(paths::default_selection_file);
        Self {
            config,
            method,
            sources,
            selection_file,
        }
    }

    /// Selector backed by the selection file, before any profiles are loaded.
    pub fn selector<R: CommandRunner>(&self, runner: R) -> ProfileSelector<R, FileSelectionStore> {
        ProfileSelector::new(
            runner,
            FileSelectionStore::new(self.selection_file.clone()),
            self.method,
            self.config.tools.clone(),
        )
    }
}
