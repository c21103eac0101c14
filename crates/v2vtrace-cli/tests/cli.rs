use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use v2vtrace_testing::fixtures::{
    AMAZON_LINUX_INSPECTION, FAILED_CONVERSION, WINDOWS_IN_PLACE, three_tool_sequence,
};
use v2vtrace_testing::{TestWorld, assertions};

#[test]
fn test_parse_emits_json_per_file() {
    let world = TestWorld::new().with_log("seq.log", &three_tool_sequence());

    let result = world.run(&["parse", "seq.log"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json().unwrap();
    assert_eq!(json["path"], "seq.log");
    assertions::assert_run_count(&json, 3).unwrap();
    assertions::assert_tool_sequence(
        &json,
        &["virt-v2v-in-place", "virt-v2v-inspector", "virt-v2v-customize"],
    )
    .unwrap();
    assertions::assert_categories_cover_lines(&json).unwrap();
}

#[test]
fn test_parse_walks_directories() {
    let world = TestWorld::new()
        .with_log("logs/a-windows.log", WINDOWS_IN_PLACE)
        .with_log("logs/nested/b-linux.txt", AMAZON_LINUX_INSPECTION)
        .with_log("logs/disk.qcow2", "not a log");

    let result = world.run(&["parse", "logs"]).unwrap();
    assert!(result.success(), "stderr: {}", result.stderr());

    let docs = result.json_lines().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["tool_runs"][0]["tool"], "virt-v2v-in-place");
    assert_eq!(docs[1]["tool_runs"][0]["guest"]["major_version"], 2023);
}

#[test]
fn test_pretty_parse_is_single_document() {
    let world = TestWorld::new().with_log("failed.log", FAILED_CONVERSION);

    let result = world.run(&["parse", "--pretty", "failed.log"]).unwrap();
    assert!(result.stdout().contains("\n  \"tool_runs\""));
    assert_eq!(result.json().unwrap()["tool_runs"][0]["exit_status"], "error");
}

#[test]
fn test_summary_plain() {
    let world = TestWorld::new().with_log("win.log", WINDOWS_IN_PLACE);

    let mut cmd = cargo_bin_cmd!("v2vtrace");
    world.configure_command(&mut cmd).arg("summary").arg("win.log");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(
            "run 1: virt-v2v-in-place  success  lines 0-63",
        ))
        .stdout(predicate::str::contains(
            "guest: windows 10.0 x86_64 host WIN-DB01 root /dev/sda2",
        ))
        .stdout(predicate::str::contains(
            "disk 0: /var/lib/images/win.img (file, 40.0 GiB)",
        ))
        .stdout(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn test_errors_json_and_exit_code() {
    let world = TestWorld::new().with_log("failed.log", FAILED_CONVERSION);

    let result = world.run(&["errors", "--format", "json", "failed.log"]).unwrap();
    assert!(result.success());

    let json = result.json().unwrap();
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["level"], "error");
    assert_eq!(diagnostics[0]["source"], "virt-v2v");
    assert_eq!(diagnostics[0]["line"], 8);
}

#[test]
fn test_errors_only_drops_warnings() {
    let world = TestWorld::new().with_log("win.log", WINDOWS_IN_PLACE);

    let all = world.run(&["errors", "win.log"]).unwrap();
    assert!(all.stdout().contains("warning  virt-v2v-in-place: /usr/share/virt-tools/pnp_wait.exe"));

    let only = world.run(&["errors", "--errors-only", "win.log"]).unwrap();
    assert!(only.stdout().contains("no errors or warnings"));
}

#[test]
fn test_config_file_sets_default_format() {
    let world = TestWorld::new()
        .with_log("seq.log", &three_tool_sequence())
        .with_config("[output]\nformat = \"json\"\n");

    let result = world.run(&["categories", "seq.log"]).unwrap();
    let json = result.json().unwrap();

    let runs = json["runs"].as_array().unwrap();
    assert_eq!(runs.len(), 3);
    assert_eq!(runs[0]["counts"]["command"], 1);
    assert_eq!(runs[0]["counts"]["stage"], 3);

    // an explicit flag still wins
    let plain = world
        .run(&["categories", "--format", "plain", "seq.log"])
        .unwrap();
    assert!(plain.stdout().starts_with("== seq.log (10 lines) =="));
}

#[test]
fn test_parser_options_from_config() {
    let log = format!("{}\n/usr/bin/virt-v2v-inspector -i disk x.img", "noise\n".repeat(5));
    let world = TestWorld::new()
        .with_log("late-marker.log", &log)
        .with_config("[parser]\nimplicit_probe_lines = 2\n");

    let shallow = world.run(&["parse", "late-marker.log"]).unwrap().json().unwrap();
    assert_eq!(shallow["tool_runs"][0]["tool"], "virt-v2v");

    std::fs::remove_file(world.config_path()).unwrap();
    let deep = world.run(&["parse", "late-marker.log"]).unwrap().json().unwrap();
    assert_eq!(deep["tool_runs"][0]["tool"], "virt-v2v-inspector");
}

#[test]
fn test_invalid_config_is_reported() {
    let world = TestWorld::new()
        .with_log("seq.log", &three_tool_sequence())
        .with_config("[parser\n");

    let mut cmd = cargo_bin_cmd!("v2vtrace");
    world.configure_command(&mut cmd).arg("summary").arg("seq.log");

    cmd.assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: Configuration error"));
}

#[test]
fn test_missing_input_fails() {
    let world = TestWorld::new();

    let mut cmd = cargo_bin_cmd!("v2vtrace");
    world.configure_command(&mut cmd).arg("parse").arg("nope.log");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("nope.log"));
}

#[test]
fn test_empty_directory_fails() {
    let world = TestWorld::new().with_log("logs/readme.md", "# notes");

    let result = world.run(&["summary", "logs"]).unwrap();
    assert!(!result.success());
    assert!(result.stderr().contains("No log files found"));
}
