use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "catan-ledger-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_kinds_writes_output() {
    let exe = env!("CARGO_BIN_EXE_catan-ledger");
    let output_path = temp_path("kinds");
    let status = Command::new(exe)
        .args(["--list-kinds", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Resource kinds"));
    assert!(content.contains("grain"));
}

#[test]
fn cli_replays_jsonl_log_to_markdown() {
    let exe = env!("CARGO_BIN_EXE_catan-ledger");
    let log_path = temp_path("game.jsonl");
    std::fs::write(
        &log_path,
        concat!(
            r#"{"player":"Ann","parts":["Ann got: ",{"icon":"lumber"},{"icon":"brick"}]}"#,
            "\n",
            r#"{"player":"Ben","parts":["Ben got: ",{"icon":"card_ore"}]}"#,
            "\n",
            r#"{"player":"Ann","parts":["Ann stole ",{"icon":"card_rescardback"}," from Ben"]}"#,
            "\n",
        ),
    )
    .expect("write log");
    let output_path = temp_path("report.md");
    let output = Command::new(exe)
        .arg(&log_path)
        .args(["--report", "markdown", "--output"])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("# Catan Ledger Replay"));
    assert!(content.contains("| Ann | 1 | 1 | 0 | 0 | 1 |"));
    assert!(content.contains("| Ben | 0 | 0 | 0 | 0 | 0 |"));
}

#[test]
fn cli_fails_on_missing_log() {
    let exe = env!("CARGO_BIN_EXE_catan-ledger");
    let output = Command::new(exe)
        .arg(temp_path("missing.txt"))
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"));
}
