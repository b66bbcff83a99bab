//! Shared helpers for building external session tool commands.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
    process::Stdio,
};

use tokio::process::Command;

/// Variables the picker owns that must not leak into the tools it runs.
///
/// `aws-vault` refuses to start inside what looks like one of its own
/// subshells, which is what a stale `AWS_VAULT` marker signals.
const SCRUBBED_VARIABLES: &[&str] = &["AWS_VAULT", "AWS_SSO_PROFILE"];

/// One external tool invocation, either direct or through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub search_path: Vec<PathBuf>,
    pub shell: Option<PathBuf>,
}

impl ToolInvocation {
    /// Run `program` directly with `args`.
    pub fn direct<I, S>(program: &str, args: I, search_path: &[PathBuf]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            search_path: search_path.to_vec(),
            shell: None,
        }
    }

    /// Run `program` with `args` as a `sh -c` script.
    pub fn via_shell<I, S>(shell: &Path, program: &str, args: I, search_path: &[PathBuf]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            shell: Some(shell.to_path_buf()),
            ..Self::direct(program, args, search_path)
        }
    }

    /// Quoted command line, as handed to the shell.
    pub fn script(&self) -> String {
        let words = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }

    /// `PATH` value exported to the child.
    pub fn path_value(&self) -> OsString {
        env::join_paths(&self.search_path).unwrap_or_default()
    }
}

/// Locate `program` on the invocation's search path.
///
/// Programs given with a directory component are used as-is when they exist.
pub fn resolve_program(program: &str, search_path: &[PathBuf]) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    search_path
        .iter()
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

/// Build the `tokio` command for an invocation whose program was resolved.
pub fn build_tool_command(invocation: &ToolInvocation, resolved: &Path) -> Command {
    let mut command = match &invocation.shell {
        Some(shell) => {
            let mut command = Command::new(shell);
            command.arg("-c").arg(invocation.script());
            command
        }
        None => {
            let mut command = Command::new(resolved);
            command.args(&invocation.args);
            command
        }
    };
    command.kill_on_drop(true);
    command.env("PATH", invocation.path_value());
    for name in SCRUBBED_VARIABLES {
        command.env_remove(name);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());
    command
}
