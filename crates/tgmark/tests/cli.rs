//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn short_help_flag_shows_usage() {
    cmd()
        .arg("-h")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn short_version_flag_shows_version() {
    cmd()
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_outputs_valid_json() {
    let output = cmd().arg("info").arg("--json").assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("info --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn info_json_contains_expected_fields() {
    cmd()
        .arg("info")
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\""))
        .stdout(predicate::str::contains("\"version\""));
}

#[test]
fn info_help_shows_command_options() {
    cmd()
        .args(["info", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--json"));
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn quiet_flag_accepted() {
    cmd().args(["--quiet", "info"]).assert().success();
}

#[test]
fn short_quiet_flag_accepted() {
    cmd().args(["-q", "info"]).assert().success();
}

#[test]
fn verbose_flag_accepted() {
    cmd().args(["--verbose", "info"]).assert().success();
}

#[test]
fn short_verbose_flag_accepted() {
    cmd().args(["-v", "info"]).assert().success();
}

#[test]
fn multiple_verbose_flags_accepted() {
    cmd().args(["-vv", "info"]).assert().success();
}

#[test]
fn color_auto_accepted() {
    cmd().args(["--color", "auto", "info"]).assert().success();
}

#[test]
fn color_always_accepted() {
    cmd().args(["--color", "always", "info"]).assert().success();
}

#[test]
fn color_never_accepted() {
    cmd().args(["--color", "never", "info"]).assert().success();
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn no_subcommand_shows_help() {
    // arg_required_else_help makes clap print help to stderr and exit 2
    cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn invalid_subcommand_shows_error() {
    cmd()
        .arg("not-a-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn invalid_flag_shows_error() {
    cmd()
        .arg("--not-a-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// =============================================================================
// Chdir Flag
// =============================================================================

#[test]
fn chdir_flag_changes_directory() {
    // The -C flag should be accepted and work without error
    // We use a path that definitely exists
    cmd().args(["-C", "/tmp", "info"]).assert().success();
}

#[test]
fn chdir_nonexistent_fails() {
    cmd()
        .args(["-C", "/nonexistent/path/that/does/not/exist", "info"])
        .assert()
        .failure();
}

// =============================================================================
// Sanitize Command
// =============================================================================

#[test]
fn sanitize_reads_stdin() {
    cmd()
        .arg("sanitize")
        .write_stdin("*bold* costs 1.5!")
        .assert()
        .success()
        .stdout(predicate::str::diff("*bold* costs 1\\.5\\!"));
}

#[test]
fn sanitize_reads_file() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(tmp.path(), "[link](https://example.com/path_(1))").unwrap();
    cmd()
        .args(["sanitize", tmp.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "[link](https://example.com/path_\\(1\\))",
        ));
}

#[test]
fn sanitize_is_idempotent_end_to_end() {
    let first = cmd()
        .arg("sanitize")
        .write_stdin("a_b *c ~d~ ||e|| `f` > g [h](i) #1")
        .output()
        .unwrap();
    assert!(first.status.success());
    cmd()
        .arg("sanitize")
        .write_stdin(first.stdout.clone())
        .assert()
        .success()
        .stdout(first.stdout);
}

#[test]
fn sanitize_json_reports_change() {
    let output = cmd()
        .args(["sanitize", "--json"])
        .write_stdin("1.5")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["text"], "1\\.5");
    assert_eq!(json["changed"], true);
    assert_eq!(json["length"], 4);
}

#[test]
fn sanitize_missing_file_fails() {
    cmd()
        .args(["sanitize", "/nonexistent/input.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// =============================================================================
// Escape-url Command
// =============================================================================

#[test]
fn escape_url_escapes_parens_and_backslash() {
    cmd()
        .args(["escape-url", "https://example.com/a(b)\\c"])
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "https://example.com/a\\(b\\)\\\\c\n",
        ));
}

// =============================================================================
// Crop Command
// =============================================================================

#[test]
fn crop_escapes_dangling_marker() {
    cmd()
        .args(["crop", "--max", "12"])
        .write_stdin("*bold text* trailing")
        .assert()
        .success()
        .stdout(predicate::str::diff("\\*bold\\.\\.\\."));
}

#[test]
fn crop_leaves_short_text_alone() {
    cmd()
        .args(["crop", "--max", "100", "--json"])
        .write_stdin("short")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"changed\": false"));
}

#[test]
fn crop_with_sanitize_runs_the_full_chain() {
    let output = cmd()
        .args(["crop", "--max", "100", "--sanitize", "--json"])
        .write_stdin("a".repeat(5000) + "*")
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["changed"], true);
    assert!(json["length"].as_u64().unwrap() <= 100);
    assert!(!json["text"].as_str().unwrap().contains('*'));
}

#[test]
fn crop_with_sanitize_fits_when_code_span_is_cut() {
    let input = format!("`{}` tail", "a.b ".repeat(30));
    let output = cmd()
        .args(["crop", "--max", "60", "--sanitize", "--json"])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["changed"], true);
    assert_eq!(json["max"], 60);
    assert!(json["length"].as_u64().unwrap() <= 60);
}

#[test]
fn crop_requires_max() {
    cmd()
        .arg("crop")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--max"));
}

// =============================================================================
// Render Command
// =============================================================================

#[test]
fn render_appends_source_footer() {
    cmd()
        .args(["render", "--source-url", "https://example.com/a(b)"])
        .write_stdin("1 + 1 = 2")
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "1 \\+ 1 \\= 2\n\n[src](https://example.com/a\\(b\\))\n",
        ));
}

#[test]
fn render_crops_to_limit() {
    let output = cmd()
        .args([
            "render",
            "--source-url",
            "https://example.com",
            "--label",
            "source",
            "--limit",
            "200",
            "--json",
        ])
        .write_stdin("word ".repeat(500))
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["cropped"], true);
    assert_eq!(json["limit"], 200);
    assert!(json["length"].as_u64().unwrap() <= 200);
    let text = json["text"].as_str().unwrap();
    assert!(text.ends_with("\\.\\.\\.\n\n[source](https://example.com)"));
}

#[test]
fn render_rejects_footer_longer_than_limit() {
    cmd()
        .args([
            "render",
            "--source-url",
            "https://example.com/some/long/path",
            "--limit",
            "20",
        ])
        .write_stdin("body")
        .assert()
        .failure()
        .stderr(predicate::str::contains("footer"));
}

// =============================================================================
// Check Command
// =============================================================================

#[test]
fn check_passes_sanitized_text() {
    cmd()
        .args(["--color", "never", "check"])
        .write_stdin("*bold* and 1\\.5")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS:"));
}

#[test]
fn check_fails_raw_text() {
    cmd()
        .args(["--color", "never", "check"])
        .write_stdin("*bold and 1.5")
        .assert()
        .failure()
        .stdout(predicate::str::contains("FAIL:"));
}

#[test]
fn check_json_lists_unbalanced_markers() {
    let output = cmd()
        .args(["check", "--json"])
        .write_stdin("\\*a _b")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["pass"], false);
    assert_eq!(json["unbalanced"][0]["marker"], "_");
}
