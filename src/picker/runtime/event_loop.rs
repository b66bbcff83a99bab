//! Event loop driving the selector from a queue of triggers.
//!
//! Events that arrive while a transition is running are drained together and
//! coalesced, so the latest profile list, method and selection win.
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    picker::{
        selector::{ProfileSelector, TransitionOutcome},
        store::SelectionStore,
    },
    profiles::{ProfileDescriptor, ProfileSources},
    session::{AuthMethod, CommandRunner},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
    ProfilesChanged(Vec<ProfileDescriptor>),
    ReloadProfiles,
    Select(String),
    MethodChanged(AuthMethod),
    RefreshSessions,
    Shutdown,
}

impl PickerEvent {
    /// Parse one control line (`select <p>`, `method <m>`, `refresh`,
    /// `reload`, `quit`). Blank lines yield `None`.
    pub fn parse_command(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, argument) = match line.split_once(char::is_whitespace) {
            Some((verb, argument)) => (verb, argument.trim()),
            None => (line, ""),
        };
        let event = match (verb, argument) {
            ("select", "") => return Err("`select` needs a profile name".into()),
            ("select", profile) => PickerEvent::Select(profile.to_string()),
            ("method", method) => PickerEvent::MethodChanged(method.parse()?),
            ("refresh", "") => PickerEvent::RefreshSessions,
            ("reload", "") => PickerEvent::ReloadProfiles,
            ("quit" | "exit", "") => PickerEvent::Shutdown,
            _ => return Err(format!("unrecognised command `{line}`")),
        };
        Ok(Some(event))
    }
}

/// What one drained batch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub events: usize,
    pub transitions: Vec<TransitionOutcome>,
}

#[derive(Debug, Default)]
struct PendingBatch {
    events: usize,
    profiles: Option<Option<Vec<ProfileDescriptor>>>,
    method: Option<AuthMethod>,
    select: Option<String>,
    refresh: bool,
    shutdown: bool,
}

impl PendingBatch {
    fn push(&mut self, event: PickerEvent) {
        self.events += 1;
        match event {
            PickerEvent::ProfilesChanged(profiles) => self.profiles = Some(Some(profiles)),
            PickerEvent::ReloadProfiles => self.profiles = Some(None),
            PickerEvent::Select(name) => self.select = Some(name),
            PickerEvent::MethodChanged(method) => self.method = Some(method),
            PickerEvent::RefreshSessions => self.refresh = true,
            PickerEvent::Shutdown => self.shutdown = true,
        }
    }

    async fn apply<R: CommandRunner, S: SelectionStore>(
        self,
        selector: &mut ProfileSelector<R, S>,
        sources: &ProfileSources,
    ) -> BatchReport {
        let mut transitions = Vec::new();
        let reprobed = self.profiles.is_some() || self.method.is_some();

        if let Some(profiles) = self.profiles {
            let profiles = profiles.unwrap_or_else(|| sources.load());
            transitions.extend(selector.set_profiles(profiles).await);
        }
        if let Some(method) = self.method {
            transitions.extend(selector.set_method(method).await);
        }
        if let Some(name) = self.select {
            match selector.select(&name).await {
                Ok(outcome) => transitions.extend(outcome),
                Err(err) => warn!(
                    target: "aws_profile_picker::runtime",
                    reason = %err,
                    "Ignoring selection request"
                ),
            }
        }
        if self.refresh && !reprobed {
            transitions.extend(selector.refresh_sessions().await);
        }

        BatchReport {
            events: self.events,
            transitions,
        }
    }
}

/// Run until `Shutdown` arrives or every sender is gone.
///
/// `observer` sees the selector after each batch that ran a transition.
/// Returns the number of batches processed.
pub async fn run_event_loop<R, S, F>(
    selector: &mut ProfileSelector<R, S>,
    sources: &ProfileSources,
    mut events: mpsc::Receiver<PickerEvent>,
    mut observer: F,
) -> usize
where
    R: CommandRunner,
    S: SelectionStore,
    F: FnMut(&ProfileSelector<R, S>, &BatchReport),
{
    let mut batches = 0;
    while let Some(first) = events.recv().await {
        let mut batch = PendingBatch::default();
        batch.push(first);
        while let Ok(event) = events.try_recv() {
            batch.push(event);
        }

        let shutdown = batch.shutdown;
        let report = batch.apply(selector, sources).await;
        batches += 1;
        debug!(
            target: "aws_profile_picker::runtime",
            events = report.events,
            transitions = report.transitions.len(),
            "Processed event batch"
        );
        if !report.transitions.is_empty() {
            observer(selector, &report);
        }
        if shutdown {
            break;
        }
    }
    batches
}
