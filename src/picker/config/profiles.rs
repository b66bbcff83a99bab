use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::lib::{errors::ConfigError, paths::is_nonempty_absolute};

/// Optional overrides for the files the picker reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilesSection {
    pub config_file: Option<PathBuf>,
    pub credentials_file: Option<PathBuf>,
    pub selection_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawProfilesSection {
    pub config_file: Option<PathBuf>,
    pub credentials_file: Option<PathBuf>,
    pub selection_file: Option<PathBuf>,
}

pub fn parse_profiles_section(
    raw: Option<RawProfilesSection>,
    path: &Path,
) -> Result<ProfilesSection, ConfigError> {
    let profiles_raw = raw.unwrap_or_default();
    validate_file(path, "profiles.config_file", profiles_raw.config_file.as_deref())?;
    validate_file(
        path,
        "profiles.credentials_file",
        profiles_raw.credentials_file.as_deref(),
    )?;
    validate_file(
        path,
        "profiles.selection_file",
        profiles_raw.selection_file.as_deref(),
    )?;

    Ok(ProfilesSection {
        config_file: profiles_raw.config_file,
        credentials_file: profiles_raw.credentials_file,
        selection_file: profiles_raw.selection_file,
    })
}

fn validate_file(path: &Path, field: &'static str, file: Option<&Path>) -> Result<(), ConfigError> {
    match file {
        Some(file) if !is_nonempty_absolute(file) => Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Use an absolute path".into(),
        }),
        _ => Ok(()),
    }
}
