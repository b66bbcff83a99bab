//! The environment variables owned by the picker.
//!
//! Nothing in the core touches the process environment. Reconciliation edits an
//! [`EnvironmentState`] through [`EnvironmentState::apply`]; exporting it to the
//! current process, a child command, or a shell script is an explicit step.

use std::collections::{BTreeMap, BTreeSet};

use tokio::process::Command;
use tracing::debug;

pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";
pub const AWS_PROFILE: &str = "AWS_PROFILE";
pub const AWS_REGION: &str = "AWS_REGION";
pub const AWS_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";
/// Marker set while `aws-vault` credentials own the environment.
pub const VAULT_MARKER: &str = "AWS_VAULT";
/// Marker set while `aws-sso` credentials own the environment.
pub const SSO_MARKER: &str = "AWS_SSO_PROFILE";

/// Markers of every authentication method.
pub const METHOD_MARKERS: &[&str] = &[VAULT_MARKER, SSO_MARKER];

/// Credentials that only make sense while a method marker vouches for them.
pub const SESSION_CREDENTIALS: &[&str] = &[AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN];

/// A single change to the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvUpdate {
    Set { name: String, value: String },
    Clear { name: String },
}

impl EnvUpdate {
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn clear(name: impl Into<String>) -> Self {
        Self::Clear { name: name.into() }
    }
}

/// Variables the picker has set, plus the ones it has explicitly cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentState {
    values: BTreeMap<String, String>,
    cleared: BTreeSet<String>,
}

impl EnvironmentState {
    /// The only mutator.
    pub fn apply(&mut self, update: EnvUpdate) {
        match update {
            EnvUpdate::Set { name, value } => {
                debug!(target: "aws_profile_picker::picker", variable = %name, "set");
                self.cleared.remove(&name);
                self.values.insert(name, value);
            }
            EnvUpdate::Clear { name } => {
                if self.values.remove(&name).is_some() {
                    debug!(target: "aws_profile_picker::picker", variable = %name, "cleared");
                }
                self.cleared.insert(name);
            }
        }
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.apply(EnvUpdate::set(name, value));
    }

    pub fn clear(&mut self, name: &str) {
        self.apply(EnvUpdate::clear(name));
    }

    /// Drop every method marker and the session credentials they vouch for.
    pub fn clear_method_state(&mut self) {
        for name in METHOD_MARKERS.iter().chain(SESSION_CREDENTIALS) {
            self.clear(name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_cleared(&self, name: &str) -> bool {
        self.cleared.contains(name)
    }

    /// Markers currently present; never more than one.
    pub fn active_markers(&self) -> Vec<&'static str> {
        METHOD_MARKERS
            .iter()
            .copied()
            .filter(|name| self.values.contains_key(*name))
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn cleared(&self) -> impl Iterator<Item = &str> {
        self.cleared.iter().map(String::as_str)
    }

    /// Shell statements reproducing this state, for `eval`.
    pub fn render_exports(&self) -> String {
        let mut script = String::new();
        for name in &self.cleared {
            script.push_str(&format!("unset {name}\n"));
        }
        for (name, value) in &self.values {
            script.push_str(&format!("export {name}={}\n", shell_words::quote(value)));
        }
        script
    }

    /// Apply this state to a child command.
    pub fn apply_to_command(&self, command: &mut Command) {
        for name in &self.cleared {
            command.env_remove(name);
        }
        command.envs(&self.values);
    }

    /// Names only; values may be secrets.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "set": self.values.keys().collect::<Vec<_>>(),
            "cleared": self.cleared.iter().collect::<Vec<_>>(),
        })
    }
}
