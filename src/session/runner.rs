//! Running external session tools.
use std::io;

use tracing::debug;

use crate::lib::{
    command::{build_tool_command, resolve_program, ToolInvocation},
    errors::SessionError,
};

/// Abstraction over process execution so probes and activations can be faked.
///
/// Implementations return standard output of a successful, non-empty run.
/// A missing program, a non-zero exit, and blank output are all errors.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<String, SessionError>;
}

/// Runner that spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<String, SessionError> {
        let program = invocation.program.clone();
        let resolved = resolve_program(&program, &invocation.search_path).ok_or_else(|| {
            SessionError::ToolNotFound {
                program: program.clone(),
            }
        })?;

        debug!(
            target: "aws_profile_picker::session",
            program = %resolved.display(),
            args = ?invocation.args,
            via_shell = invocation.shell.is_some(),
            "Running session tool"
        );
        let output = build_tool_command(invocation, &resolved)
            .output()
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => SessionError::ToolNotFound {
                    program: program.clone(),
                },
                _ => SessionError::Spawn {
                    program: program.clone(),
                    source,
                },
            })?;

        if !output.status.success() {
            return Err(SessionError::CommandFailed {
                program,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if stdout.trim().is_empty() {
            return Err(SessionError::EmptyOutput { program });
        }
        Ok(stdout)
    }
}
