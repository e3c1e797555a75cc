use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn scratch_path(tag: &str, extension: &str) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_micros();
    std::env::temp_dir().join(format!(
        "gridlife_smoke_{tag}_{}_{}.{extension}",
        std::process::id(),
        timestamp
    ))
}

#[test]
fn terminal_headless_smoke() {
    let bin = env!("CARGO_BIN_EXE_gridlife");
    let mut cmd = Command::new(bin);
    cmd.env("GRIDLIFE_TERMINAL_HEADLESS", "1")
        .env("GRIDLIFE_TERMINAL_HEADLESS_FRAMES", "8")
        .env("RUST_LOG", "off");

    let status = cmd.status().expect("failed to run gridlife binary");
    assert!(status.success(), "terminal headless run failed");
}

#[test]
fn headless_run_with_pattern_writes_a_report() {
    let repository = scratch_path("repo", "json");
    fs::write(
        &repository,
        r####"{ "blinker": { "template": ["###"] } }"####,
    )
    .expect("write repository fixture");
    let report_path = scratch_path("report", "json");

    let bin = env!("CARGO_BIN_EXE_gridlife");
    let status = Command::new(bin)
        .arg(&repository)
        .arg("blinker")
        .args(["--rows", "9", "--columns", "9", "--center"])
        .env("GRIDLIFE_TERMINAL_HEADLESS", "1")
        .env("GRIDLIFE_TERMINAL_HEADLESS_FRAMES", "4")
        .env("GRIDLIFE_TERMINAL_HEADLESS_REPORT", &report_path)
        .env("RUST_LOG", "off")
        .status()
        .expect("failed to run gridlife binary");
    assert!(status.success(), "headless pattern run failed");

    let raw = fs::read_to_string(&report_path).expect("report file written");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("report parses");
    assert_eq!(report["summary"]["frame_count"], 4);
    // A blinker oscillates; it never dies out.
    assert_eq!(report["summary"]["final_population"], 3);
    assert_eq!(report["summary"]["final_generation"], 4);

    let _ = fs::remove_file(&repository);
    let _ = fs::remove_file(&report_path);
}

#[test]
fn missing_pattern_name_fails_loudly() {
    let repository = scratch_path("empty_repo", "json");
    fs::write(&repository, "{}").expect("write repository fixture");

    let bin = env!("CARGO_BIN_EXE_gridlife");
    let status = Command::new(bin)
        .arg(&repository)
        .arg("no-such-pattern")
        .env("GRIDLIFE_TERMINAL_HEADLESS", "1")
        .env("RUST_LOG", "off")
        .status()
        .expect("failed to run gridlife binary");
    assert!(
        !status.success(),
        "loading an unknown pattern must fail, not fall back silently"
    );

    let _ = fs::remove_file(&repository);
}
