//! Telemetry initialization and reconciliation span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr; stdout is reserved for shell statements and JSON.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper recording the start and finish of one reconciliation pass.
pub struct ReconcileSpan {
    span: Span,
    started_at: Instant,
    pass_id: Uuid,
}

impl ReconcileSpan {
    /// Start a reconciliation span.
    pub fn start(trigger: &'static str, profile: Option<&str>) -> Self {
        let pass_id = Uuid::new_v4();
        let span = info_span!(
            target: "aws_profile_picker::picker",
            "reconcile",
            %pass_id,
            trigger,
            profile = profile.unwrap_or("")
        );
        Self {
            span,
            started_at: Instant::now(),
            pass_id,
        }
    }

    /// Span to attach to the futures awaited during the pass.
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Close the span while recording the outcome.
    pub fn finish(self, outcome: &'static str, activated: bool) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "aws_profile_picker::picker",
            pass_id = %self.pass_id,
            outcome,
            activated,
            elapsed_ms,
            "Completed profile reconciliation"
        );
    }
}

/// Payload for logging the launch state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct LaunchTelemetry<'a> {
    pub command: &'a str,
    pub method: &'a str,
    pub settings_path: &'a str,
    pub config_file: &'a str,
    pub credentials_file: &'a str,
    pub profile_count: usize,
}

/// Emit launch state to `tracing`.
pub fn emit_launch(telemetry: &LaunchTelemetry<'_>) {
    info!(
        target: "aws_profile_picker::runtime",
        command = telemetry.command,
        method = telemetry.method,
        settings_path = telemetry.settings_path,
        config_file = telemetry.config_file,
        credentials_file = telemetry.credentials_file,
        profile_count = telemetry.profile_count,
        "Started aws-profile-picker"
    );
}
