use std::fs;

use anyhow::Result;
use serde_json::Value;

use crate::common::{stderr_of, stdout_of, PickerSandbox};

#[test]
fn select_with_vault_session_exports_credentials() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let output = sandbox.run(&["select", "dev"])?;
    let stdout = stdout_of(&output);

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stdout.contains("export AWS_VAULT=dev\n"), "{stdout}");
    assert!(stdout.contains("export AWS_ACCESS_KEY_ID=AKIAFAKE\n"), "{stdout}");
    assert!(stdout.contains("export AWS_SESSION_TOKEN=vaulttoken\n"), "{stdout}");
    assert!(stdout.contains("export AWS_REGION=eu-west-1\n"), "{stdout}");
    assert!(stdout.contains("unset AWS_PROFILE\n"), "{stdout}");
    assert!(stdout.contains("unset AWS_SSO_PROFILE\n"), "{stdout}");

    let saved = fs::read_to_string(&sandbox.selection)?;
    let record: Value = serde_json::from_str(&saved)?;
    assert_eq!(record["profile"], "dev");
    assert!(record["updated_at"].is_string());
    Ok(())
}

#[test]
fn source_profile_inherits_the_vault_session() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let stdout = stdout_of(&sandbox.run(&["select", "admin"])?);

    assert!(stdout.contains("export AWS_VAULT=admin\n"), "{stdout}");
    assert!(stdout.contains("export AWS_REGION=ap-southeast-2\n"), "{stdout}");
    Ok(())
}

#[test]
fn profile_without_session_clears_method_state() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let stdout = stdout_of(&sandbox.run(&["select", "base"])?);

    assert!(stdout.contains("unset AWS_VAULT\n"), "{stdout}");
    assert!(stdout.contains("unset AWS_ACCESS_KEY_ID\n"), "{stdout}");
    assert!(!stdout.contains("export AWS_VAULT"), "{stdout}");
    assert!(stdout.contains("export AWS_REGION=ap-southeast-2\n"), "{stdout}");
    Ok(())
}

#[test]
fn env_restores_the_saved_selection() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;
    sandbox.run(&["select", "dev"])?;

    let stdout = stdout_of(&sandbox.run(&[])?);

    assert!(stdout.contains("export AWS_VAULT=dev\n"), "{stdout}");
    Ok(())
}

#[test]
fn unknown_profile_exits_with_structured_error() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let output = sandbox.run(&["select", "staging"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout_of(&output).is_empty());
    let stderr = stderr_of(&output);
    let payload: Value = serde_json::from_str(
        stderr
            .lines()
            .last()
            .expect("stderr should carry the error payload"),
    )?;
    assert_eq!(payload["code"], "unknown_profile");
    assert!(!sandbox.selection.exists());
    Ok(())
}

#[test]
fn method_none_exports_aws_profile() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let stdout = stdout_of(&sandbox.run(&["--method", "none", "env"])?);

    assert!(stdout.contains("export AWS_PROFILE=default\n"), "{stdout}");
    assert!(stdout.contains("export AWS_REGION=us-east-1\n"), "{stdout}");
    assert!(stdout.contains("unset AWS_VAULT\n"), "{stdout}");
    Ok(())
}

#[test]
fn sso_select_applies_eval_exports() -> Result<()> {
    let sandbox = PickerSandbox::new("sso")?;

    let stdout = stdout_of(&sandbox.run(&["select", "dev"])?);

    assert!(stdout.contains("export AWS_SSO_PROFILE=dev\n"), "{stdout}");
    assert!(stdout.contains("export AWS_ACCESS_KEY_ID=ASIAFAKE\n"), "{stdout}");
    assert!(stdout.contains("export AWS_REGION=eu-central-1\n"), "{stdout}");
    assert!(stdout.contains("unset AWS_VAULT\n"), "{stdout}");
    assert!(!stdout.contains("session ready"), "{stdout}");
    Ok(())
}

#[test]
fn list_shows_session_icons_under_vault() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let output = sandbox.run(&["list"])?;
    let view: Value = serde_json::from_str(&stdout_of(&output))?;

    assert_eq!(view["method"], "vault");
    assert_eq!(view["visible"], true);
    assert_eq!(view["selected"], "default");
    let entries = view["entries"].as_array().expect("entries array");
    let icon_of = |name: &str| {
        entries
            .iter()
            .find(|entry| entry["name"] == name)
            .map(|entry| entry["icon"].clone())
    };
    assert_eq!(icon_of("dev"), Some(Value::from("active")));
    assert_eq!(icon_of("admin"), Some(Value::from("active")));
    assert_eq!(icon_of("base"), Some(Value::from("inactive")));
    Ok(())
}

#[test]
fn sessions_lists_expanded_set() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;

    let payload: Value = serde_json::from_str(&stdout_of(&sandbox.run(&["sessions"])?))?;

    assert_eq!(payload["tool_available"], true);
    assert_eq!(payload["sessions"], serde_json::json!(["dev", "admin"]));
    Ok(())
}

#[test]
fn run_applies_environment_and_propagates_exit_code() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;
    sandbox.run(&["select", "dev"])?;

    let ok = sandbox.run(&[
        "run",
        "--",
        "/bin/sh",
        "-c",
        "test \"$AWS_VAULT\" = dev && test \"$AWS_ACCESS_KEY_ID\" = AKIAFAKE",
    ])?;
    assert!(ok.status.success(), "stderr: {}", stderr_of(&ok));

    let failed = sandbox.run(&["run", "--", "/bin/sh", "-c", "exit 3"])?;
    assert_eq!(failed.status.code(), Some(3));
    Ok(())
}

#[test]
fn missing_tools_fall_back_to_aws_profile() -> Result<()> {
    let sandbox = PickerSandbox::without_tools("vault")?;

    let output = sandbox.run(&["select", "dev"])?;
    let stdout = stdout_of(&output);

    assert!(output.status.success());
    assert!(stdout.contains("export AWS_PROFILE=dev\n"), "{stdout}");
    assert!(!stdout.contains("export AWS_VAULT"), "{stdout}");
    Ok(())
}

#[test]
fn invalid_settings_exit_with_settings_error() -> Result<()> {
    let sandbox = PickerSandbox::new("vault")?;
    fs::write(&sandbox.settings, "[auth]\nmethod = \"okta\"\n")?;

    let output = sandbox.run(&["env"])?;

    assert_eq!(output.status.code(), Some(78));
    assert!(stderr_of(&output).contains("settings_invalid"));
    assert!(sandbox.path().join("config.toml").exists());
    Ok(())
}
