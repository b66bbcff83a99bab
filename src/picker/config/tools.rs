use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::lib::{errors::ConfigError, paths::is_nonempty_absolute};

pub const DEFAULT_SEARCH_PATH: &[&str] = &["/opt/homebrew/bin"];
pub const DEFAULT_VAULT_COMMAND: &str = "aws-vault";
pub const DEFAULT_SSO_COMMAND: &str = "aws-sso";
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Where and how the external session tools are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsSection {
    pub search_path: Vec<PathBuf>,
    pub vault_command: String,
    pub sso_command: String,
    pub shell: PathBuf,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            search_path: DEFAULT_SEARCH_PATH.iter().map(PathBuf::from).collect(),
            vault_command: DEFAULT_VAULT_COMMAND.to_string(),
            sso_command: DEFAULT_SSO_COMMAND.to_string(),
            shell: PathBuf::from(DEFAULT_SHELL),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawToolsSection {
    pub search_path: Option<Vec<PathBuf>>,
    pub vault_command: Option<String>,
    pub sso_command: Option<String>,
    pub shell: Option<PathBuf>,
}

pub fn parse_tools_section(
    raw: Option<RawToolsSection>,
    path: &Path,
) -> Result<ToolsSection, ConfigError> {
    let tools_raw = raw.unwrap_or_default();
    let defaults = ToolsSection::default();

    let search_path = tools_raw.search_path.unwrap_or(defaults.search_path);
    validate_search_path(path, &search_path)?;

    let vault_command = tools_raw.vault_command.unwrap_or(defaults.vault_command);
    validate_command(path, "tools.vault_command", &vault_command)?;

    let sso_command = tools_raw.sso_command.unwrap_or(defaults.sso_command);
    validate_command(path, "tools.sso_command", &sso_command)?;

    let shell = tools_raw.shell.unwrap_or(defaults.shell);
    if !is_nonempty_absolute(&shell) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "tools.shell",
            message: "Use an absolute path to a POSIX shell".into(),
        });
    }

    Ok(ToolsSection {
        search_path,
        vault_command,
        sso_command,
        shell,
    })
}

fn validate_search_path(path: &Path, search_path: &[PathBuf]) -> Result<(), ConfigError> {
    if let Some(entry) = search_path.iter().find(|entry| !is_nonempty_absolute(entry)) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "tools.search_path",
            message: format!("`{}` is not an absolute directory", entry.display()),
        });
    }
    Ok(())
}

fn validate_command(path: &Path, field: &'static str, command: &str) -> Result<(), ConfigError> {
    if command.trim().is_empty() || command.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field,
            message: "Use a bare program name or an absolute path without spaces".into(),
        });
    }
    Ok(())
}
