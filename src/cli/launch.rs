//! Turning parsed arguments into a `PickerLaunch`.
use std::process::ExitCode;

use crate::{
    lib::{
        errors::SETTINGS_INVALID_ERROR,
        telemetry::{emit_launch, LaunchTelemetry},
    },
    picker::{config::PickerConfig, runtime::{PickerLaunch, RuntimeExit}},
    profiles::ProfileDescriptor,
};

use super::{CliCommand, PickerArgs};

/// Exit status for unusable settings (`EX_CONFIG`).
pub const SETTINGS_EXIT_CODE: u8 = 78;

/// Load settings and apply the command-line overrides.
pub fn prepare_launch(args: &PickerArgs) -> Result<PickerLaunch, RuntimeExit> {
    let config = PickerConfig::load(args.config_override.clone()).map_err(|err| {
        RuntimeExit::structured(
            SETTINGS_INVALID_ERROR,
            &err.to_string(),
            ExitCode::from(SETTINGS_EXIT_CODE),
        )
    })?;
    Ok(PickerLaunch::new(config, args.method_override))
}

pub fn command_name(command: &CliCommand) -> &'static str {
    match command {
        CliCommand::Env => "env",
        CliCommand::Select(_) => "select",
        CliCommand::List => "list",
        CliCommand::Sessions => "sessions",
        CliCommand::Run(_) => "run",
        CliCommand::Watch => "watch",
    }
}

pub fn log_launch(command: &CliCommand, launch: &PickerLaunch, profiles: &[ProfileDescriptor]) {
    emit_launch(&LaunchTelemetry {
        command: command_name(command),
        method: launch.method.as_str(),
        settings_path: launch.config.source_path.to_string_lossy().as_ref(),
        config_file: launch.sources.config_file.to_string_lossy().as_ref(),
        credentials_file: launch.sources.credentials_file.to_string_lossy().as_ref(),
        profile_count: profiles.len(),
    });
}
