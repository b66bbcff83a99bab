use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use anyhow::{Context, Result};
use tempfile::TempDir;

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_aws-profile-picker");

/// Stand-in for `aws-vault`: `dev` has a session, everything else does not.
const FAKE_AWS_VAULT: &str = r#"#!/bin/sh
case "$1" in
  list)
    printf '%s\n' \
      'Profile                  Credentials              Sessions' \
      '=======                  ===========              ========' \
      'default                  default                  -' \
      'dev                      -                        sts.AssumeRole:arn:aws:iam::123456789012:role/dev' \
      'base                     -                        sts.GetSessionToken:-'
    ;;
  exec)
    case "$2" in
      dev|admin)
        printf '{"Version":1,"AccessKeyId":"AKIAFAKE","SecretAccessKey":"vaultsecret","SessionToken":"vaulttoken"}\n'
        ;;
      *)
        echo "aws-vault: no session for $2" >&2
        exit 1
        ;;
    esac
    ;;
  *)
    exit 2
    ;;
esac
"#;

/// Stand-in for `aws-sso`: lists one role for `dev` and evals any profile.
const FAKE_AWS_SSO: &str = r##"#!/bin/sh
if [ "$#" -eq 0 ]; then
  printf '%s\n' \
    'List of AWS roles for SSO Instance: Default [Expires in: 7h 54m]' \
    '' \
    ' AccountIdPad | AccountAlias | RoleName | Profile | Expires' \
    '==============================================================' \
    ' 123456789012 | corp | Admin | dev | '
  exit 0
fi
if [ "$1" = "eval" ] && [ "$2" = "-p" ]; then
  printf 'export AWS_ACCESS_KEY_ID="ASIAFAKE"\n'
  printf 'export AWS_SECRET_ACCESS_KEY="ssosecret"\n'
  printf 'export AWS_DEFAULT_REGION="eu-central-1"\n'
  printf 'export AWS_SSO_PROFILE="%s"\n' "$3"
  echo "# session ready"
  exit 0
fi
exit 2
"##;

/// Temp directory with fake session tools, settings and a selection file.
pub struct PickerSandbox {
    dir: TempDir,
    pub settings: PathBuf,
    pub selection: PathBuf,
}

impl PickerSandbox {
    pub fn new(method: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create sandbox")?;
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin)?;
        write_script(&bin.join("aws-vault"), FAKE_AWS_VAULT)?;
        write_script(&bin.join("aws-sso"), FAKE_AWS_SSO)?;
        Self::with_search_path(dir, method, &bin)
    }

    /// Sandbox whose search path has no session tools at all.
    pub fn without_tools(method: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("failed to create sandbox")?;
        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty)?;
        Self::with_search_path(dir, method, &empty)
    }

    fn with_search_path(dir: TempDir, method: &str, search_path: &Path) -> Result<Self> {
        let settings = dir.path().join("config.toml");
        let selection = dir.path().join("state/selection.json");
        let contents = format!(
            "[auth]\nmethod = \"{method}\"\n\n[tools]\nsearch_path = [\"{bin}\"]\n\n[profiles]\nconfig_file = \"{config}\"\ncredentials_file = \"{credentials}\"\nselection_file = \"{selection}\"\n",
            bin = search_path.display(),
            config = fixture("tests/fixtures/aws_config"),
            credentials = fixture("tests/fixtures/aws_credentials"),
            selection = selection.display(),
        );
        fs::write(&settings, contents)?;
        Ok(Self {
            dir,
            settings,
            selection,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(BINARY_PATH);
        command
            .arg("--config")
            .arg(&self.settings)
            .args(args)
            .env("RUST_LOG", "warn")
            .env_remove("AWS_VAULT")
            .env_remove("AWS_SSO_PROFILE")
            .env_remove("AWS_PROFILE_PICKER_CONFIG")
            .stdin(Stdio::null());
        command
    }

    pub fn run(&self, args: &[&str]) -> Result<Output> {
        self.command(args)
            .output()
            .with_context(|| format!("failed to run aws-profile-picker {args:?}"))
    }
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

fn write_script(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}
