//! CLI commands on top of the profile selector.
use std::process::ExitCode;

use anyhow::Context;
use serde_json::json;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    sync::mpsc,
};
use tracing::warn;

use crate::{
    lib::errors::{COMMAND_SPAWN_ERROR, UNKNOWN_PROFILE_ERROR},
    picker::{
        ensure_known,
        runtime::{run_event_loop, PickerEvent, PickerLaunch, RuntimeExit},
        DropdownView, FileSelectionStore, ProfileSelector, SelectionStore,
    },
    profiles::ProfileDescriptor,
    session::{CommandRunner, SessionTool},
};

pub mod args;
pub mod launch;

pub use args::{CliCommand, PickerArgs, RunArgs, SelectArgs};
pub use launch::{command_name, log_launch, prepare_launch, SETTINGS_EXIT_CODE};

/// Exit status for a rejected profile name.
pub const UNKNOWN_PROFILE_EXIT_CODE: u8 = 2;
/// Exit status when the wrapped command cannot be started, as shells report it.
pub const COMMAND_SPAWN_EXIT_CODE: u8 = 127;
const WATCH_QUEUE_DEPTH: usize = 32;

/// Run `command` against `launch`, printing results to stdout.
pub async fn execute_cli_command<R: CommandRunner>(
    command: CliCommand,
    launch: &PickerLaunch,
    runner: R,
) -> Result<(), RuntimeExit> {
    let profiles = launch.sources.load();
    log_launch(&command, launch, &profiles);

    match command {
        CliCommand::Env => {
            let mut selector = launch.selector(runner);
            selector.set_profiles(profiles).await;
            print!("{}", selector.environment().render_exports());
        }
        CliCommand::Select(args) => {
            ensure_known(&profiles, &args.profile).map_err(|err| {
                RuntimeExit::structured(
                    UNKNOWN_PROFILE_ERROR,
                    &err.to_string(),
                    ExitCode::from(UNKNOWN_PROFILE_EXIT_CODE),
                )
            })?;
            let selector = reconcile_selection(launch, runner, profiles, &args.profile).await;
            print!("{}", selector.environment().render_exports());
        }
        CliCommand::List => {
            let view = render_dropdown(launch, &runner, profiles).await;
            println!("{}", to_pretty(&view)?);
        }
        CliCommand::Sessions => {
            let tool = SessionTool::for_method(launch.method, &launch.config.tools);
            let sessions = tool.probe(&runner, &profiles).await;
            let payload = json!({
                "method": launch.method,
                "tool_available": sessions.tool_available(),
                "sessions": sessions.names(),
            });
            println!("{}", to_pretty(&payload)?);
        }
        CliCommand::Run(args) => {
            let mut selector = launch.selector(runner);
            selector.set_profiles(profiles).await;
            run_with_environment(&selector, &args.command).await?;
        }
        CliCommand::Watch => {
            let mut selector = launch.selector(runner);
            selector.set_profiles(profiles).await;
            println!("{}", snapshot(&selector));

            let (sender, receiver) = mpsc::channel(WATCH_QUEUE_DEPTH);
            tokio::spawn(forward_stdin(sender));
            run_event_loop(&mut selector, &launch.sources, receiver, |selector, _| {
                println!("{}", snapshot(selector));
            })
            .await;
        }
    }
    Ok(())
}

/// Persist `profile` and reconcile onto it; the previously saved profile is
/// never activated on the way.
pub async fn reconcile_selection<R: CommandRunner>(
    launch: &PickerLaunch,
    runner: R,
    profiles: Vec<ProfileDescriptor>,
    profile: &str,
) -> ProfileSelector<R, FileSelectionStore> {
    let mut selector = launch.selector(runner).with_selection(profile);
    selector.set_profiles(profiles).await;
    selector
}

/// Dropdown for the saved selection without activating anything.
pub async fn render_dropdown<R: CommandRunner>(
    launch: &PickerLaunch,
    runner: &R,
    profiles: Vec<ProfileDescriptor>,
) -> DropdownView {
    let store = FileSelectionStore::new(launch.selection_file.clone());
    let selected = store
        .load()
        .filter(|name| ensure_known(&profiles, name).is_ok())
        .or_else(|| profiles.first().map(|profile| profile.name.clone()));
    let tool = SessionTool::for_method(launch.method, &launch.config.tools);
    let sessions = tool.probe(runner, &profiles).await;
    DropdownView::build(&profiles, selected.as_deref(), &sessions, launch.method)
}

/// One-line JSON state of the selector; variable names only.
pub fn snapshot<R: CommandRunner, S: SelectionStore>(
    selector: &ProfileSelector<R, S>,
) -> serde_json::Value {
    let view = DropdownView::build(
        selector.profiles(),
        selector.selected(),
        selector.sessions(),
        selector.method(),
    );
    json!({
        "selected": selector.selected(),
        "method": selector.method(),
        "marker": selector.method().marker(),
        "outcome": selector.last_outcome().map(|outcome| outcome.as_str()),
        "dropdown": view,
        "environment": selector.environment().summary(),
    })
}

async fn run_with_environment<R: CommandRunner, S: SelectionStore>(
    selector: &ProfileSelector<R, S>,
    command_line: &[String],
) -> Result<(), RuntimeExit> {
    let Some((program, args)) = command_line.split_first() else {
        return Ok(());
    };
    let mut command = Command::new(program);
    command.args(args);
    selector.environment().apply_to_command(&mut command);

    let status = command.status().await.map_err(|err| {
        RuntimeExit::structured(
            COMMAND_SPAWN_ERROR,
            &format!("{program}: {err}"),
            ExitCode::from(COMMAND_SPAWN_EXIT_CODE),
        )
    })?;
    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(RuntimeExit::silent(ExitCode::from(
            u8::try_from(code).unwrap_or(1),
        ))),
        None => Err(RuntimeExit::silent(ExitCode::FAILURE)),
    }
}

async fn forward_stdin(sender: mpsc::Sender<PickerEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(
                    target: "aws_profile_picker::runtime",
                    reason = %err,
                    "Failed to read control line"
                );
                break;
            }
        };
        match PickerEvent::parse_command(&line) {
            Ok(Some(event)) => {
                if sender.send(event).await.is_err() {
                    return;
                }
            }
            Ok(None) => {}
            Err(message) => warn!(
                target: "aws_profile_picker::runtime",
                line = %line,
                reason = %message,
                "Ignoring control line"
            ),
        }
    }
    let _ = sender.send(PickerEvent::Shutdown).await;
}

fn to_pretty(value: &impl serde::Serialize) -> Result<String, RuntimeExit> {
    serde_json::to_string_pretty(value)
        .context("failed to serialize output")
        .map_err(RuntimeExit::from_error)
}
