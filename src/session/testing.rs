//! Scripted `CommandRunner` used by unit tests.
use std::{collections::HashMap, sync::Mutex};

use crate::lib::{command::ToolInvocation, errors::SessionError};

use super::CommandRunner;

/// Answers invocations by their quoted command line.
///
/// Unscripted command lines behave like a missing program.
#[derive(Default)]
pub struct FakeRunner {
    responses: HashMap<String, String>,
    failures: HashMap<String, i32>,
    calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command_line: &str, stdout: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), stdout.to_string());
        self
    }

    pub fn fail(mut self, command_line: &str, exit_code: i32) -> Self {
        self.failures.insert(command_line.to_string(), exit_code);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_matching(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

impl CommandRunner for FakeRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<String, SessionError> {
        let command_line = invocation.script();
        self.calls
            .lock()
            .expect("calls lock")
            .push(command_line.clone());

        let program = invocation.program.clone();
        if let Some(exit_code) = self.failures.get(&command_line) {
            return Err(SessionError::CommandFailed {
                program,
                exit_code: Some(*exit_code),
                stderr: "scripted failure".into(),
            });
        }
        match self.responses.get(&command_line) {
            Some(stdout) if stdout.trim().is_empty() => Err(SessionError::EmptyOutput { program }),
            Some(stdout) => Ok(stdout.clone()),
            None => Err(SessionError::ToolNotFound { program }),
        }
    }
}
