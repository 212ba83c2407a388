//! Smoke tests for the `termline` binary.
#![expect(clippy::expect_used, reason = "tests assert on process output")]

use std::io::Write;
use std::str;

use assert_cmd::Command;
use clap::Parser;
use rstest::rstest;
use termline_cli::cli::{Args, Command as Operation};

fn termline() -> Command {
    let mut cmd = Command::cargo_bin("termline").expect("binary exists");
    cmd.env_remove("TERMLINE_LOG_LEVEL")
        .env_remove("TERMLINE_DEFAULT_STYLE");
    cmd
}

fn stdout_of(output: &std::process::Output) -> &str {
    str::from_utf8(&output.stdout).expect("utf8")
}

#[test]
fn parses_global_flags_and_command() {
    let args = Args::try_parse_from([
        "termline",
        "--grammar",
        r"cd\s(?P<dir>\w*)",
        "--words",
        "dir=home,tmp",
        "complete",
        "cd t",
        "--cursor",
        "4",
    ])
    .expect("arguments parse");
    assert_eq!(args.words, ["dir=home,tmp"]);
    assert_eq!(
        args.command,
        Operation::Complete {
            input: "cd t".to_owned(),
            cursor: Some(4),
        }
    );
}

#[test]
fn requires_a_grammar() {
    assert!(Args::try_parse_from(["termline", "match", "x"]).is_err());
}

#[test]
fn match_exits_zero_and_prints_variables() {
    let output = termline()
        .args(["--grammar", r"(?P<a>\d+)\+(?P<b>\d+)", "match", "12+34"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    assert_eq!(
        stdout_of(&output),
        "var\ta\t0..2\t\"12\"\nvar\tb\t3..5\t\"34\"\n"
    );
}

#[test]
fn no_match_exits_one() {
    let output = termline()
        .args(["--grammar", "hello", "match", "hello world"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(1));
}

#[rstest]
#[case(&["--grammar", "a{2,4}", "match", "aa"])]
#[case(&["--grammar", "(?=x)", "prefix", "x"])]
#[case(&["--grammar", "a", "--words", "nonsense", "complete", "a"])]
fn configuration_errors_exit_two(#[case] args: &[&str]) {
    let output = termline().args(args).output().expect("runs");
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}

#[test]
fn invalid_log_level_in_environment_exits_two() {
    let output = termline()
        .env("TERMLINE_LOG_LEVEL", "loud")
        .args(["--grammar", "a", "match", "a"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn reads_the_grammar_from_a_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, r"cd \s+      # command").expect("write grammar");
    writeln!(file, r"(?P<dir>\w*) # target").expect("write grammar");

    let output = termline()
        .arg("--grammar-file")
        .arg(file.path())
        .args(["--words", "dir=home,tmp,var", "complete", "cd "])
        .output()
        .expect("runs");
    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "home\t0\ntmp\t0\nvar\t0\n");
}

#[test]
fn validate_reports_the_error_position() {
    let output = termline()
        .args(["--json", "--grammar", "hello", "validate", "hello world"])
        .output()
        .expect("runs");
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value =
        serde_json::from_str(stdout_of(&output)).expect("valid JSON");
    assert_eq!(value["valid"], false);
    assert_eq!(value["error"]["cursor_position"], 11);
    assert_eq!(value["error"]["message"], "Invalid command");
}
