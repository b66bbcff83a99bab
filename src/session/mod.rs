//! Probing and activating sessions through the configured external tool.
//!
//! [`SessionTool`] is the single dispatch point: every authentication method
//! offers the same `probe`/`activate` pair, so the selector never branches on
//! the method itself.
use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    picker::{
        config::ToolsSection,
        environment::{EnvUpdate, EnvironmentState, SSO_MARKER, VAULT_MARKER},
    },
    profiles::ProfileDescriptor,
};

pub mod runner;
pub mod sso;
#[cfg(test)]
pub(crate) mod testing;
pub mod vault;

pub use runner::{CommandRunner, SystemCommandRunner};
pub use sso::SsoTool;
pub use vault::VaultTool;

/// Which external tool owns the session credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Vault,
    Sso,
    #[default]
    None,
}

impl AuthMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthMethod::Vault => "vault",
            AuthMethod::Sso => "sso",
            AuthMethod::None => "none",
        }
    }

    /// Marker variable owned by this method.
    pub fn marker(self) -> Option<&'static str> {
        match self {
            AuthMethod::Vault => Some(VAULT_MARKER),
            AuthMethod::Sso => Some(SSO_MARKER),
            AuthMethod::None => None,
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "vault" => Ok(AuthMethod::Vault),
            "sso" => Ok(AuthMethod::Sso),
            "none" => Ok(AuthMethod::None),
            other => Err(format!("unknown method `{other}`; use vault, sso or none")),
        }
    }
}

/// Profiles with a live session after one-hop `source_profile` expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActiveSessionSet {
    names: Vec<String>,
    /// False when the listing tool could not be run at all.
    tool_available: bool,
}

impl ActiveSessionSet {
    pub fn unavailable() -> Self {
        Self {
            names: Vec::new(),
            tool_available: false,
        }
    }

    /// Raw names in tool order, then every profile sourcing one of them.
    pub fn from_raw(raw: Vec<String>, profiles: &[ProfileDescriptor]) -> Self {
        let mut names: Vec<String> = Vec::with_capacity(raw.len());
        for name in raw {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let inherited: Vec<String> = profiles
            .iter()
            .filter(|profile| {
                profile
                    .source_profile
                    .as_ref()
                    .is_some_and(|source| names.contains(source))
            })
            .map(|profile| profile.name.clone())
            .collect();
        for name in inherited {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        Self {
            names,
            tool_available: true,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|candidate| candidate == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn tool_available(&self) -> bool {
        self.tool_available
    }
}

/// Result of one activation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Variables were written and the update callback ran.
    Applied { variables: usize },
    /// The tool failed or produced nothing usable; markers stay cleared.
    Skipped,
    /// No session tool is configured.
    Disabled,
}

/// The configured method, ready to probe and activate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTool {
    Vault(VaultTool),
    Sso(SsoTool),
    Disabled,
}

impl SessionTool {
    pub fn for_method(method: AuthMethod, tools: &ToolsSection) -> Self {
        match method {
            AuthMethod::Vault => SessionTool::Vault(VaultTool::new(
                tools.vault_command.clone(),
                tools.search_path.clone(),
            )),
            AuthMethod::Sso => SessionTool::Sso(SsoTool::new(
                tools.sso_command.clone(),
                tools.search_path.clone(),
                &tools.shell,
            )),
            AuthMethod::None => SessionTool::Disabled,
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            SessionTool::Vault(_) => AuthMethod::Vault,
            SessionTool::Sso(_) => AuthMethod::Sso,
            SessionTool::Disabled => AuthMethod::None,
        }
    }

    /// Active sessions; tool failures are logged and read as "none".
    pub async fn probe<R: CommandRunner>(
        &self,
        runner: &R,
        profiles: &[ProfileDescriptor],
    ) -> ActiveSessionSet {
        let raw = match self {
            SessionTool::Vault(tool) => tool.probe(runner).await,
            SessionTool::Sso(tool) => tool.probe(runner).await,
            SessionTool::Disabled => return ActiveSessionSet::unavailable(),
        };
        match raw {
            Ok(names) => {
                let sessions = ActiveSessionSet::from_raw(names, profiles);
                info!(
                    target: "aws_profile_picker::session",
                    method = self.method().as_str(),
                    active = sessions.names().len(),
                    "Probed active sessions"
                );
                sessions
            }
            Err(err) => {
                warn!(
                    target: "aws_profile_picker::session",
                    method = self.method().as_str(),
                    reason = %err,
                    "Session listing failed; treating as no active sessions"
                );
                if err.is_empty_output() {
                    ActiveSessionSet::from_raw(Vec::new(), profiles)
                } else {
                    ActiveSessionSet::unavailable()
                }
            }
        }
    }

    /// Activate `profile` into `env`.
    ///
    /// Every method marker and the session credentials are cleared first. On
    /// success the updates are applied and `on_update` runs exactly once; on
    /// failure nothing beyond that clearing changes.
    pub async fn activate<R: CommandRunner>(
        &self,
        runner: &R,
        profile: &str,
        env: &mut EnvironmentState,
        on_update: &mut dyn FnMut(),
    ) -> ActivationOutcome {
        env.clear_method_state();
        let updates = match self {
            SessionTool::Vault(tool) => tool.activate(runner, profile).await,
            SessionTool::Sso(tool) => tool.activate(runner, profile).await,
            SessionTool::Disabled => return ActivationOutcome::Disabled,
        };

        match updates {
            Ok(updates) => {
                let variables = updates
                    .iter()
                    .filter(|update| matches!(update, EnvUpdate::Set { .. }))
                    .count();
                for update in updates {
                    env.apply(update);
                }
                info!(
                    target: "aws_profile_picker::session",
                    method = self.method().as_str(),
                    profile,
                    variables,
                    "Activated session credentials"
                );
                on_update();
                ActivationOutcome::Applied { variables }
            }
            Err(err) => {
                warn!(
                    target: "aws_profile_picker::session",
                    method = self.method().as_str(),
                    profile,
                    reason = %err,
                    "Session activation failed; environment left without credentials"
                );
                ActivationOutcome::Skipped
            }
        }
    }
}
