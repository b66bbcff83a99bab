//! `aws-sso` integration: the role table for sessions, `eval -p <profile>` for credentials.
use std::path::{Path, PathBuf};

use crate::{
    lib::{command::ToolInvocation, errors::SessionError},
    picker::environment::{EnvUpdate, AWS_DEFAULT_REGION, AWS_REGION},
};

use super::CommandRunner;

const EXPORT_PREFIX: &str = "export ";
/// Column of the profile name in the role table.
const PROFILE_COLUMN: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoTool {
    command: String,
    search_path: Vec<PathBuf>,
    shell: PathBuf,
}

impl SsoTool {
    pub fn new(command: impl Into<String>, search_path: Vec<PathBuf>, shell: &Path) -> Self {
        Self {
            command: command.into(),
            search_path,
            shell: shell.to_path_buf(),
        }
    }

    pub fn list_invocation(&self) -> ToolInvocation {
        ToolInvocation::direct(&self.command, Vec::<String>::new(), &self.search_path)
    }

    pub fn eval_invocation(&self, profile: &str) -> ToolInvocation {
        ToolInvocation::via_shell(
            &self.shell,
            &self.command,
            ["eval", "-p", profile],
            &self.search_path,
        )
    }

    pub async fn probe<R: CommandRunner>(&self, runner: &R) -> Result<Vec<String>, SessionError> {
        let output = runner.run(&self.list_invocation()).await?;
        Ok(parse_sso_sessions(&output))
    }

    /// Environment updates for `profile`, or an error with nothing applied.
    ///
    /// Only the pairs the tool exported are returned, plus `AWS_REGION`
    /// mirrored from `AWS_DEFAULT_REGION`.
    pub async fn activate<R: CommandRunner>(
        &self,
        runner: &R,
        profile: &str,
    ) -> Result<Vec<EnvUpdate>, SessionError> {
        let output = runner.run(&self.eval_invocation(profile)).await?;
        let exports = parse_export_lines(&output);
        if exports.is_empty() {
            return Err(SessionError::MalformedOutput {
                program: self.command.clone(),
                message: "no `export KEY=VALUE` statements found".into(),
            });
        }

        let mut updates = Vec::with_capacity(exports.len() + 1);
        for (name, value) in exports {
            if name == AWS_DEFAULT_REGION {
                updates.push(EnvUpdate::set(AWS_REGION, value.clone()));
            }
            updates.push(EnvUpdate::set(name, value));
        }
        Ok(updates)
    }
}

/// Profile names from the `aws-sso` role table.
///
/// Header, banner and separator lines are recognised by `=` or `Expires` and
/// skipped, as are blank lines.
pub fn parse_sso_sessions(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| is_session_row(line))
        .filter_map(|line| {
            pipe_fields(line.trim())
                .get(PROFILE_COLUMN)
                .map(|field| field.trim())
                .filter(|field| !field.is_empty())
                .map(str::to_string)
        })
        .collect()
}

pub fn is_session_row(line: &str) -> bool {
    !(line.contains('=') || line.contains("Expires") || line.trim().is_empty())
}

/// Split on `|` characters that follow whitespace; a leading table border
/// stays part of the first field.
fn pipe_fields(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut whitespace_run: Option<usize> = None;
    for (index, ch) in line.char_indices() {
        if ch.is_whitespace() {
            whitespace_run.get_or_insert(index);
            continue;
        }
        if ch == '|' {
            if let Some(run_start) = whitespace_run {
                fields.push(&line[start..run_start]);
                start = index + 1;
            }
        }
        whitespace_run = None;
    }
    fields.push(&line[start..]);
    fields
}

/// `export KEY=VALUE` pairs; anything else is ignored.
pub fn parse_export_lines(output: &str) -> Vec<(String, String)> {
    output.lines().filter_map(parse_export_line).collect()
}

fn parse_export_line(line: &str) -> Option<(String, String)> {
    let assignment = line.trim_end().strip_prefix(EXPORT_PREFIX)?;
    let (name, value) = assignment.split_once('=')?;
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    if !is_variable_name(name) || value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

fn is_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use crate::session::testing::FakeRunner;

    use super::*;

    #[test]
    fn role_table_yields_fourth_column() {
        let output = "\
List of AWS roles for SSO Instance: Default [Expires in: 7h 54m]

 AccountIdPad | AccountAlias | RoleName | Profile | Expires
==============================================================
x | y | z | profileB |
 123456789012 | corp-dev | Admin | corp-dev:Admin |
";
        assert_eq!(
            parse_sso_sessions(output),
            vec!["profileB".to_string(), "corp-dev:Admin".to_string()]
        );
    }

    #[test]
    fn rows_without_profile_column_are_skipped() {
        assert!(parse_sso_sessions("a | b | c |\n").is_empty());
        assert!(parse_sso_sessions("a | b | c |   |\n").is_empty());
    }

    #[test]
    fn leading_border_does_not_shift_columns() {
        assert_eq!(
            parse_sso_sessions("| 1 | 123 | Role | prof |\n"),
            vec!["prof".to_string()]
        );
    }

    #[test]
    fn export_lines_strip_one_layer_of_quotes() {
        let output = "export FOO=\"bar\"\necho done\nexport URL=https://x?a=b\nexport EMPTY=\"\"\nexport =x\n";
        assert_eq!(
            parse_export_lines(output),
            vec![
                ("FOO".to_string(), "bar".to_string()),
                ("URL".to_string(), "https://x?a=b".to_string()),
            ]
        );
    }

    #[test]
    fn eval_runs_through_the_shell_with_quoted_profile() {
        let tool = SsoTool::new("aws-sso", vec![], Path::new("/bin/sh"));
        let invocation = tool.eval_invocation("corp dev");

        assert_eq!(invocation.shell.as_deref(), Some(Path::new("/bin/sh")));
        assert_eq!(invocation.script(), "aws-sso eval -p 'corp dev'");
    }

    #[tokio::test]
    async fn activate_mirrors_default_region_only() {
        let tool = SsoTool::new("aws-sso", vec![], Path::new("/bin/sh"));
        let runner = FakeRunner::new().respond(
            "aws-sso eval -p dev",
            "export AWS_ACCESS_KEY_ID=\"K\"\nexport AWS_DEFAULT_REGION=\"eu-west-1\"\n",
        );

        let updates = tool
            .activate(&runner, "dev")
            .await
            .expect("activation should succeed");

        assert_eq!(
            updates,
            vec![
                EnvUpdate::set("AWS_ACCESS_KEY_ID", "K"),
                EnvUpdate::set(AWS_REGION, "eu-west-1"),
                EnvUpdate::set(AWS_DEFAULT_REGION, "eu-west-1"),
            ]
        );
    }

    #[tokio::test]
    async fn activate_keeps_the_marker_the_tool_exported() {
        let tool = SsoTool::new("aws-sso", vec![], Path::new("/bin/sh"));
        let runner = FakeRunner::new().respond(
            "aws-sso eval -p dev",
            "export AWS_SSO_PROFILE=\"corp-dev\"\n",
        );

        let updates = tool.activate(&runner, "dev").await.expect("exports");

        assert_eq!(updates, vec![EnvUpdate::set("AWS_SSO_PROFILE", "corp-dev")]);
    }

    #[tokio::test]
    async fn activate_without_exports_is_malformed() {
        let tool = SsoTool::new("aws-sso", vec![], Path::new("/bin/sh"));
        let runner = FakeRunner::new().respond("aws-sso eval -p dev", "Please log in first\n");

        let error = tool
            .activate(&runner, "dev")
            .await
            .expect_err("no exports must fail");
        assert!(matches!(error, SessionError::MalformedOutput { .. }));
    }
}
