//! `aws-vault` integration: `list` for sessions, `exec <profile> --json` for credentials.
use std::path::PathBuf;

use serde::Deserialize;

use crate::{
    lib::{command::ToolInvocation, errors::SessionError},
    picker::environment::{
        EnvUpdate, AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN, VAULT_MARKER,
    },
};

use super::CommandRunner;

/// Session column prefixes printed by `aws-vault list`.
pub const SESSION_MARKERS: &[&str] = &["sts.AssumeRole:", "sts.GetSessionToken:"];
/// Placeholder printed instead of a session value.
const SENTINEL: &str = "-";

/// `aws-vault exec --json` payload (credential_process format).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct VaultCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultTool {
    command: String,
    search_path: Vec<PathBuf>,
}

impl VaultTool {
    pub fn new(command: impl Into<String>, search_path: Vec<PathBuf>) -> Self {
        Self {
            command: command.into(),
            search_path,
        }
    }

    pub fn list_invocation(&self) -> ToolInvocation {
        ToolInvocation::direct(&self.command, ["list"], &self.search_path)
    }

    pub fn exec_invocation(&self, profile: &str) -> ToolInvocation {
        ToolInvocation::direct(&self.command, ["exec", profile, "--json"], &self.search_path)
    }

    /// Profiles with a live session, as reported by `aws-vault list`.
    pub async fn probe<R: CommandRunner>(&self, runner: &R) -> Result<Vec<String>, SessionError> {
        let output = runner.run(&self.list_invocation()).await?;
        Ok(parse_vault_sessions(&output))
    }

    /// Environment updates for `profile`, or an error with nothing applied.
    pub async fn activate<R: CommandRunner>(
        &self,
        runner: &R,
        profile: &str,
    ) -> Result<Vec<EnvUpdate>, SessionError> {
        let output = runner.run(&self.exec_invocation(profile)).await?;
        let credentials =
            parse_vault_credentials(&output).map_err(|message| SessionError::MalformedOutput {
                program: self.command.clone(),
                message,
            })?;

        let mut updates = vec![
            EnvUpdate::set(AWS_ACCESS_KEY_ID, credentials.access_key_id),
            EnvUpdate::set(AWS_SECRET_ACCESS_KEY, credentials.secret_access_key),
        ];
        updates.push(match credentials.session_token {
            Some(token) => EnvUpdate::set(AWS_SESSION_TOKEN, token),
            None => EnvUpdate::clear(AWS_SESSION_TOKEN),
        });
        updates.push(EnvUpdate::set(VAULT_MARKER, profile));
        Ok(updates)
    }
}

/// Names of profiles whose `aws-vault list` row shows a live session.
pub fn parse_vault_sessions(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| is_active_session_row(line))
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// A row is active when it carries at least one session marker and none of
/// them holds the `-` placeholder.
pub fn is_active_session_row(line: &str) -> bool {
    let mut values = line.split_whitespace().filter_map(|token| {
        SESSION_MARKERS
            .iter()
            .find_map(|marker| token.strip_prefix(*marker))
    });
    let Some(first) = values.next() else {
        return false;
    };
    std::iter::once(first)
        .chain(values)
        .all(|value| !value.is_empty() && value != SENTINEL)
}

pub fn parse_vault_credentials(output: &str) -> Result<VaultCredentials, String> {
    let credentials: VaultCredentials =
        serde_json::from_str(output.trim()).map_err(|err| err.to_string())?;
    if credentials.access_key_id.is_empty() || credentials.secret_access_key.is_empty() {
        return Err("AccessKeyId and SecretAccessKey must not be empty".into());
    }
    Ok(credentials)
}
