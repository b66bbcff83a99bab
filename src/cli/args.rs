//! CLI argument definitions.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::session::AuthMethod;

/// Top-level commands; `env` when none is given.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Reconcile the saved selection and print shell statements for `eval`.
    Env,
    /// Select a profile, reconcile, and print shell statements for `eval`.
    Select(SelectArgs),
    /// Print the profile dropdown as JSON.
    List,
    /// Print the profiles with an active session as JSON.
    Sessions,
    /// Reconcile, then run a command inside the picker's environment.
    Run(RunArgs),
    /// Read control lines from stdin and print a JSON snapshot after each update.
    #[command(
        long_about = "Read control lines from stdin and print a JSON snapshot after each update.\n\nLines:\n  select <PROFILE>\n  method <vault|sso|none>\n  refresh\n  reload\n  quit"
    )]
    Watch,
}

/// Arguments for `select`.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SelectArgs {
    /// Profile name from the AWS config or credentials file.
    pub profile: String,
}

/// Arguments for `run`.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct RunArgs {
    /// Program and arguments to run.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    author,
    version,
    about = "Pick an AWS profile and activate its session credentials",
    long_about = None,
    after_help = "Hint: use `eval \"$(aws-profile-picker select <PROFILE>)\"` to switch the current shell."
)]
pub struct PickerArgs {
    /// Path to the settings file (overrides AWS_PROFILE_PICKER_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    /// Authentication method for this run (overrides `auth.method`).
    #[arg(long = "method", value_enum)]
    pub method_override: Option<AuthMethod>,
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl PickerArgs {
    pub fn command(&self) -> CliCommand {
        self.command.clone().unwrap_or(CliCommand::Env)
    }
}
