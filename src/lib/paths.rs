//! Resolution of the well-known file locations the picker reads and writes.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

const HOME_ENV: &str = "HOME";
const AWS_CONFIG_FILE_ENV: &str = "AWS_CONFIG_FILE";
const AWS_SHARED_CREDENTIALS_FILE_ENV: &str = "AWS_SHARED_CREDENTIALS_FILE";
const XDG_CONFIG_HOME_ENV: &str = "XDG_CONFIG_HOME";
const XDG_CACHE_HOME_ENV: &str = "XDG_CACHE_HOME";
const APP_DIR: &str = "aws-profile-picker";

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Default location of the AWS shared config file.
///
/// Resolution order:
/// 1. `$AWS_CONFIG_FILE` when set.
/// 2. `$HOME/.aws/config` otherwise.
pub fn default_aws_config_file() -> PathBuf {
    aws_file_from(
        env::var_os(AWS_CONFIG_FILE_ENV),
        env::var_os(HOME_ENV),
        "config",
    )
}

/// Default location of the AWS shared credentials file.
pub fn default_aws_credentials_file() -> PathBuf {
    aws_file_from(
        env::var_os(AWS_SHARED_CREDENTIALS_FILE_ENV),
        env::var_os(HOME_ENV),
        "credentials",
    )
}

/// Default location of the picker settings file.
pub fn default_settings_file() -> PathBuf {
    app_dir_from(
        env::var_os(XDG_CONFIG_HOME_ENV),
        env::var_os(HOME_ENV),
        ".config",
    )
    .join("config.toml")
}

/// Default location of the persisted profile selection.
pub fn default_selection_file() -> PathBuf {
    app_dir_from(
        env::var_os(XDG_CACHE_HOME_ENV),
        env::var_os(HOME_ENV),
        ".cache",
    )
    .join("selection.json")
}

fn aws_file_from(explicit: Option<OsString>, home: Option<OsString>, name: &str) -> PathBuf {
    if let Some(explicit) = explicit.filter(|value| !value.is_empty()) {
        return PathBuf::from(explicit);
    }
    home.map(PathBuf::from)
        .unwrap_or_default()
        .join(".aws")
        .join(name)
}

fn app_dir_from(xdg: Option<OsString>, home: Option<OsString>, fallback: &str) -> PathBuf {
    if let Some(xdg) = xdg.filter(|value| !value.is_empty()) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    home.map(PathBuf::from)
        .unwrap_or_default()
        .join(fallback)
        .join(APP_DIR)
}
