//! The profile selector: one reconciliation function shared by every trigger.
//!
//! A transition runs on the first reconciliation and afterwards whenever the
//! selected profile, the session set or the method changes. It resolves the
//! region, decides between activating the selected profile and clearing method
//! state, then runs the completion callback exactly once. When the selection
//! is activated, the callback is the activator's own update hook.
use tracing::{info, Instrument};

use crate::{
    lib::{errors::SelectionError, telemetry::ReconcileSpan},
    picker::{
        config::ToolsSection,
        environment::{EnvironmentState, AWS_PROFILE, AWS_REGION},
        store::SelectionStore,
    },
    profiles::ProfileDescriptor,
    session::{ActivationOutcome, ActiveSessionSet, AuthMethod, CommandRunner, SessionTool},
};

/// How a transition left the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Activated { variables: usize },
    ActivationFailed,
    NoSession,
    Disabled,
    NoProfile,
}

impl TransitionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitionOutcome::Activated { .. } => "activated",
            TransitionOutcome::ActivationFailed => "activation_failed",
            TransitionOutcome::NoSession => "no_session",
            TransitionOutcome::Disabled => "disabled",
            TransitionOutcome::NoProfile => "no_profile",
        }
    }

    pub fn activated(self) -> bool {
        matches!(self, TransitionOutcome::Activated { .. })
    }
}

/// Reject names that are not among `profiles`.
pub fn ensure_known(profiles: &[ProfileDescriptor], name: &str) -> Result<(), SelectionError> {
    if profiles.iter().any(|profile| profile.name == name) {
        Ok(())
    } else {
        Err(SelectionError::UnknownProfile {
            name: name.to_string(),
        })
    }
}

pub struct ProfileSelector<R, S> {
    runner: R,
    store: S,
    tools: ToolsSection,
    session_tool: SessionTool,
    profiles: Vec<ProfileDescriptor>,
    selected: Option<String>,
    sessions: ActiveSessionSet,
    env: EnvironmentState,
    on_update: Option<Box<dyn FnMut()>>,
    last_outcome: Option<TransitionOutcome>,
}

impl<R: CommandRunner, S: SelectionStore> ProfileSelector<R, S> {
    /// Selector with no profiles yet; the persisted selection is restored.
    pub fn new(runner: R, store: S, method: AuthMethod, tools: ToolsSection) -> Self {
        let selected = store.load();
        let session_tool = SessionTool::for_method(method, &tools);
        Self {
            runner,
            store,
            tools,
            session_tool,
            profiles: Vec::new(),
            selected,
            sessions: ActiveSessionSet::unavailable(),
            env: EnvironmentState::default(),
            on_update: None,
            last_outcome: None,
        }
    }

    /// Register the completion callback, run once after every transition.
    pub fn on_update(&mut self, callback: impl FnMut() + 'static) {
        self.on_update = Some(Box::new(callback));
    }

    /// Replace the stored selection before the first reconciliation.
    ///
    /// Unknown names are repaired by the next [`Self::set_profiles`].
    pub fn with_selection(mut self, name: &str) -> Self {
        self.update_selection(Some(name.to_string()));
        self
    }

    /// Replace the profile list, repair the selection and re-probe.
    ///
    /// Reconciles on the first call, then only when the selected profile or
    /// the session set changed.
    pub async fn set_profiles(
        &mut self,
        profiles: Vec<ProfileDescriptor>,
    ) -> Option<TransitionOutcome> {
        let previous = self.selected_profile().cloned();
        self.profiles = profiles;
        self.repair_selection();
        let sessions = self.session_tool.probe(&self.runner, &self.profiles).await;

        let changed = self.last_outcome.is_none()
            || sessions != self.sessions
            || self.selected_profile() != previous.as_ref();
        self.sessions = sessions;
        if !changed {
            return None;
        }
        Some(self.transition("profiles").await)
    }

    /// Select `name`; no transition when it is already selected.
    pub async fn select(&mut self, name: &str) -> Result<Option<TransitionOutcome>, SelectionError> {
        ensure_known(&self.profiles, name)?;
        if self.selected.as_deref() == Some(name) {
            return Ok(None);
        }
        self.update_selection(Some(name.to_string()));
        Ok(Some(self.transition("select").await))
    }

    /// Switch methods; the previous method's markers go immediately.
    pub async fn set_method(&mut self, method: AuthMethod) -> Option<TransitionOutcome> {
        if method == self.session_tool.method() {
            return None;
        }
        info!(
            target: "aws_profile_picker::picker",
            from = self.session_tool.method().as_str(),
            to = method.as_str(),
            "Switching authentication method"
        );
        self.env.clear_method_state();
        self.session_tool = SessionTool::for_method(method, &self.tools);
        self.sessions = self.session_tool.probe(&self.runner, &self.profiles).await;
        Some(self.transition("method").await)
    }

    /// Re-probe sessions; reconcile only when the set changed.
    pub async fn refresh_sessions(&mut self) -> Option<TransitionOutcome> {
        let sessions = self.session_tool.probe(&self.runner, &self.profiles).await;
        if sessions == self.sessions {
            return None;
        }
        self.sessions = sessions;
        Some(self.transition("sessions").await)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_profile(&self) -> Option<&ProfileDescriptor> {
        let name = self.selected.as_deref()?;
        self.profiles.iter().find(|profile| profile.name == name)
    }

    pub fn profiles(&self) -> &[ProfileDescriptor] {
        &self.profiles
    }

    pub fn sessions(&self) -> &ActiveSessionSet {
        &self.sessions
    }

    pub fn environment(&self) -> &EnvironmentState {
        &self.env
    }

    pub fn method(&self) -> AuthMethod {
        self.session_tool.method()
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn last_outcome(&self) -> Option<TransitionOutcome> {
        self.last_outcome
    }

    fn repair_selection(&mut self) {
        let valid = self
            .selected
            .as_deref()
            .is_some_and(|name| self.profiles.iter().any(|profile| profile.name == name));
        if valid {
            return;
        }
        let repaired = self.profiles.first().map(|profile| profile.name.clone());
        info!(
            target: "aws_profile_picker::picker",
            previous = self.selected.as_deref().unwrap_or(""),
            repaired = repaired.as_deref().unwrap_or(""),
            "Repaired stale profile selection"
        );
        self.update_selection(repaired);
    }

    fn update_selection(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        self.store.save(selected.as_deref());
        self.selected = selected;
    }

    async fn transition(&mut self, trigger: &'static str) -> TransitionOutcome {
        let span = ReconcileSpan::start(trigger, self.selected.as_deref());
        let profile = self.selected_profile().cloned();

        match profile.as_ref().and_then(|profile| profile.region.as_deref()) {
            Some(region) => self.env.set(AWS_REGION, region),
            None => self.env.clear(AWS_REGION),
        }
        let uses_tool =
            self.session_tool.method() != AuthMethod::None && self.sessions.tool_available();
        match profile.as_ref() {
            Some(profile) if !uses_tool => self.env.set(AWS_PROFILE, &profile.name),
            _ => self.env.clear(AWS_PROFILE),
        }

        let mut notified = false;
        let outcome = match profile {
            None => {
                self.env.clear_method_state();
                TransitionOutcome::NoProfile
            }
            Some(_) if self.session_tool.method() == AuthMethod::None => {
                self.env.clear_method_state();
                TransitionOutcome::Disabled
            }
            Some(profile) if self.sessions.contains(&profile.name) => {
                let callback = &mut self.on_update;
                let mut notify = || {
                    notified = true;
                    if let Some(callback) = callback.as_mut() {
                        callback();
                    }
                };
                let activation = self
                    .session_tool
                    .activate(&self.runner, &profile.name, &mut self.env, &mut notify)
                    .instrument(span.span().clone())
                    .await;
                match activation {
                    ActivationOutcome::Applied { variables } => {
                        TransitionOutcome::Activated { variables }
                    }
                    ActivationOutcome::Skipped => TransitionOutcome::ActivationFailed,
                    ActivationOutcome::Disabled => TransitionOutcome::Disabled,
                }
            }
            Some(_) => {
                self.env.clear_method_state();
                TransitionOutcome::NoSession
            }
        };

        span.finish(outcome.as_str(), outcome.activated());
        self.last_outcome = Some(outcome);
        if !notified {
            if let Some(callback) = self.on_update.as_mut() {
                callback();
            }
        }
        outcome
    }
}
