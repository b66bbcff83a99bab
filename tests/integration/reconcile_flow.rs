use std::{io::Write, process::Stdio};

use anyhow::{Context, Result};
use serde_json::Value;

use crate::common::{stderr_of, PickerSandbox};

fn snapshots(stdout: &[u8]) -> Result<Vec<Value>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).with_context(|| format!("bad snapshot: {line}")))
        .collect()
}

fn watch(sandbox: &PickerSandbox, script: &str) -> Result<(Vec<Value>, std::process::Output)> {
    let mut child = sandbox
        .command(&["watch"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to spawn watch")?;
    child
        .stdin
        .take()
        .context("watch stdin")?
        .write_all(script.as_bytes())?;
    let output = child.wait_with_output()?;
    Ok((snapshots(&output.stdout)?, output))
}

#[test]
fn watch_reports_each_reconciliation() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let (snapshots, output) = watch(&sandbox, "select dev\nquit\n")?;

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let first = snapshots.first().context("initial snapshot")?;
    assert_eq!(first["selected"], "default");
    assert_eq!(first["outcome"], "no_session");

    let last = snapshots.last().context("final snapshot")?;
    assert_eq!(last["selected"], "dev");
    assert_eq!(last["outcome"], "activated");
    assert_eq!(last["marker"], "AWS_VAULT");
    let set = last["environment"]["set"].to_string();
    assert!(set.contains("AWS_SECRET_ACCESS_KEY"));
    assert!(!String::from_utf8_lossy(&output.stdout).contains("vaultsecret"));
    Ok(())
}

#[test]
fn switching_to_none_drops_the_vault_marker() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let (snapshots, output) = watch(&sandbox, "select dev\nmethod none\nquit\n")?;

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let last = snapshots.last().context("final snapshot")?;
    assert_eq!(last["method"], "none");
    assert_eq!(last["outcome"], "disabled");
    let cleared = last["environment"]["cleared"].to_string();
    let set = last["environment"]["set"].to_string();
    assert!(cleared.contains("AWS_VAULT"), "{cleared}");
    assert!(set.contains("AWS_PROFILE"), "{set}");
    assert!(!set.contains("AWS_VAULT"), "{set}");
    Ok(())
}

#[test]
fn bad_control_lines_are_ignored() -> Result<()> {
    let sandbox = PickerSandbox::new("none")?;

    let (snapshots, output) = watch(&sandbox, "dance\nselect nobody\nselect base\n")?;

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let last = snapshots.last().context("final snapshot")?;
    assert_eq!(last["selected"], "base");
    assert_eq!(last["method"], "none");
    Ok(())
}
