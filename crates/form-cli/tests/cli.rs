use assert_cmd::Command;
use assert_fs::prelude::*;
use serde_json::Value;

const PROFILE_FORM: &str = r#"{
    "type": "custom_form",
    "title": "Profile",
    "elements": [
        { "key": "name", "element": { "type": "input", "text": "Your name" } },
        { "key": "age", "element": { "type": "slider", "text": "Your age", "min": 0, "max": 200 } },
        { "key": "color", "element": { "type": "dropdown", "text": "Color", "options": ["Red", "Green", "Blue"] } }
    ]
}"#;

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

fn formctl() -> Command {
    Command::cargo_bin("formctl").expect("formctl binary")
}

#[test]
fn render_command_prints_schema_document() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("profile.json");
    form.write_str(PROFILE_FORM)?;

    let output = formctl().arg("render").arg("--form").arg(form.path()).output()?;
    assert!(output.status.success());
    let schema = stdout_json(&output);
    assert_eq!(schema["type"], "custom_form");
    assert_eq!(schema["content"][2]["options"][1], "Green");
    Ok(())
}

#[test]
fn submit_command_decodes_reply() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("profile.json");
    form.write_str(PROFILE_FORM)?;
    let reply = workspace.child("reply.json");
    reply.write_str(r#"["Pig", 10, 1]"#)?;

    let output = formctl()
        .args(["--compact", "submit", "--form"])
        .arg(form.path())
        .arg("--reply")
        .arg(reply.path())
        .output()?;
    assert!(output.status.success());
    let summary = stdout_json(&output);
    assert_eq!(summary["status"], "submitted");
    assert_eq!(summary["result"]["name"], "Pig");
    assert_eq!(summary["result"]["age"], 10.0);
    assert_eq!(summary["result"]["color"], 1);
    Ok(())
}

#[test]
fn submit_command_rejects_out_of_range_reply() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("profile.json");
    form.write_str(PROFILE_FORM)?;
    let reply = workspace.child("reply.json");
    reply.write_str(r#"["Pig", 250, 1]"#)?;

    let output = formctl()
        .args(["--compact", "submit", "--form"])
        .arg(form.path())
        .arg("--reply")
        .arg(reply.path())
        .output()?;
    assert!(!output.status.success());
    let summary = stdout_json(&output);
    assert_eq!(summary["status"], "error");
    assert!(summary["error"].as_str().unwrap_or_default().contains("age"));
    Ok(())
}

#[test]
fn submit_command_reports_closed_form() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("profile.json");
    form.write_str(PROFILE_FORM)?;

    let output = formctl()
        .args(["submit", "--closed", "--form"])
        .arg(form.path())
        .output()?;
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["status"], "closed");
    Ok(())
}

#[test]
fn submit_command_requires_reply_or_closed() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("profile.json");
    form.write_str(PROFILE_FORM)?;

    formctl()
        .args(["submit", "--form"])
        .arg(form.path())
        .assert()
        .failure();
    Ok(())
}

#[test]
fn check_command_accepts_valid_form() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("profile.json");
    form.write_str(PROFILE_FORM)?;

    formctl()
        .arg("check")
        .arg("--form")
        .arg(form.path())
        .assert()
        .success()
        .stdout("ok\n");
    Ok(())
}

#[test]
fn check_command_flags_empty_dropdown() -> Result<(), Box<dyn std::error::Error>> {
    let workspace = assert_fs::TempDir::new()?;
    let form = workspace.child("broken.json");
    form.write_str(
        r#"{
            "type": "custom_form",
            "title": "Broken",
            "elements": [
                { "key": "color", "element": { "type": "dropdown", "text": "Color" } }
            ]
        }"#,
    )?;

    formctl()
        .arg("check")
        .arg("--form")
        .arg(form.path())
        .assert()
        .failure();
    Ok(())
}

#[test]
fn schema_command_prints_definition_schema() -> Result<(), Box<dyn std::error::Error>> {
    let output = formctl().args(["--compact", "schema"]).output()?;
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout)?;
    assert!(text.contains("custom_form"));
    Ok(())
}
