//! Entry point for aws-profile-picker.
use std::process::ExitCode;

use aws_profile_picker::{
    cli::{execute_cli_command, prepare_launch, PickerArgs},
    lib::telemetry,
    picker::runtime::RuntimeExit,
    session::SystemCommandRunner,
};
use clap::Parser;

#[tokio::main]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), RuntimeExit> {
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;
    let args = PickerArgs::parse();
    let launch = prepare_launch(&args)?;
    execute_cli_command(args.command(), &launch, SystemCommandRunner).await
}
