//! Load and validate picker settings.
use std::{env, path::PathBuf};

use serde::Deserialize;
use tracing::{error, info};

use crate::lib::{errors::ConfigError, paths};

pub mod auth;
pub mod profiles;
pub mod telemetry;
pub mod tools;

pub use auth::{parse_auth_section, AuthSection, RawAuthSection};
pub use profiles::{parse_profiles_section, ProfilesSection, RawProfilesSection};
pub use tools::{
    parse_tools_section, RawToolsSection, ToolsSection, DEFAULT_SHELL, DEFAULT_SSO_COMMAND,
    DEFAULT_VAULT_COMMAND,
};

pub const CONFIG_ENV_KEY: &str = "AWS_PROFILE_PICKER_CONFIG";

/// Top-level settings container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerConfig {
    pub auth: AuthSection,
    pub tools: ToolsSection,
    pub profiles: ProfilesSection,
    pub source_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct RawPickerConfig {
    auth: Option<RawAuthSection>,
    tools: Option<RawToolsSection>,
    profiles: Option<RawProfilesSection>,
}

impl PickerConfig {
    /// Settings from `explicit`, else `AWS_PROFILE_PICKER_CONFIG`, else the
    /// default location. Only the default location may be missing.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            telemetry::log_source(&path, "flag");
            return Self::load_from_path(path, true);
        }
        Self::load_from_env_or_default()
    }

    /// Prefer `AWS_PROFILE_PICKER_CONFIG` if set; otherwise the default location.
    pub fn load_from_env_or_default() -> Result<Self, ConfigError> {
        match env::var(CONFIG_ENV_KEY) {
            Ok(value) if !value.trim().is_empty() => {
                let path = PathBuf::from(value);
                telemetry::log_source(&path, "environment");
                Self::load_from_path(path, true)
            }
            _ => {
                let path = paths::default_settings_file();
                telemetry::log_source(&path, "default");
                Self::load_from_path(path, false)
            }
        }
    }

    /// Load settings from a specific path.
    pub fn load_from_path(path: PathBuf, required: bool) -> Result<Self, ConfigError> {
        info!(
            target: "aws_profile_picker::config",
            path = %path.display(),
            required,
            "Starting settings load"
        );

        let builder = config::Config::builder()
            .add_source(config::File::from(path.clone()).required(required));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "aws_profile_picker::config",
                path = %path.display(),
                reason = %error,
                "Failed to read settings file"
            );
            error
        })?;

        let raw: RawPickerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "aws_profile_picker::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse settings file"
            );
            error
        })?;

        let config = Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "aws_profile_picker::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate settings file"
            );
            err
        })?;

        telemetry::log_loaded(&config);
        Ok(config)
    }

    fn from_raw(raw: RawPickerConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let auth = parse_auth_section(raw.auth, &path)?;
        let tools = parse_tools_section(raw.tools, &path)?;
        let profiles = parse_profiles_section(raw.profiles, &path)?;

        Ok(Self {
            auth,
            tools,
            profiles,
            source_path: path,
        })
    }
}
