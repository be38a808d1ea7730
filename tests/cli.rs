// Tests for the `bfrun` binary: exit codes, stderr and `--dump`

use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

/// Writes `source` to a file only this test uses.
fn source_file(name: &str, source: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("bfrun-{}-{name}.bf", std::process::id()));
    fs::write(&path, source).expect("Failed to write source file");
    path
}

fn bfrun(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bfrun"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run bfrun")
}

fn run_source(name: &str, source: &str, flags: &[&str]) -> Output {
    let path = source_file(name, source);
    let path = path.to_str().expect("Non UTF-8 temp path");

    let mut args = flags.to_vec();
    args.push(path);
    bfrun(&args)
}

#[test]
fn test_prints_output() {
    let source = format!("{}.", "+".repeat(65));
    let out = run_source("output", &source, &[]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"A");
    assert!(out.stderr.is_empty(), "Unexpected stderr: {:?}", out.stderr);
}

#[test]
fn test_no_arguments_is_usage_error() {
    let out = bfrun(&[]);

    assert_eq!(out.status.code(), Some(64));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_two_arguments_is_usage_error() {
    let path = source_file("two-args", "+");
    let path = path.to_str().expect("Non UTF-8 temp path");
    let out = bfrun(&[path, path]);

    assert_eq!(out.status.code(), Some(64));
}

#[test]
fn test_help_succeeds() {
    let out = bfrun(&["--help"]);

    assert_eq!(out.status.code(), Some(0));
}

#[test]
fn test_missing_file() {
    let out = bfrun(&["/nonexistent/bfrun/program.bf"]);

    assert_eq!(out.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&out.stderr).starts_with("error: failed to read"));
}

#[test]
fn test_unmatched_bracket_is_compile_error() {
    let out = run_source("unmatched", "+.]", &[]);

    assert_eq!(out.status.code(), Some(65));
    assert!(out.stdout.is_empty());
    assert_eq!(
        String::from_utf8_lossy(&out.stderr),
        "error: compile error: unmatched `]` at instruction 2\n"
    );
}

#[test]
fn test_underflow_is_runtime_error() {
    let out = run_source("underflow", "<", &[]);

    assert_eq!(out.status.code(), Some(70));
    assert_eq!(
        String::from_utf8_lossy(&out.stderr),
        "error: runtime error: memory underflow at instruction 0: cannot move 1 left of cell 0\n"
    );
}

#[test]
fn test_errors_ignore_log_filter() {
    let path = source_file("log-off", "<");
    let out = Command::new(env!("CARGO_BIN_EXE_bfrun"))
        .arg(&path)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run bfrun");

    assert_eq!(out.status.code(), Some(70));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.starts_with("error: runtime error: memory underflow"));
}

#[test]
fn test_input_is_runtime_error() {
    let out = run_source("input", "+.,", &[]);

    assert_eq!(out.status.code(), Some(70));
    // Output produced before the failure is kept
    assert_eq!(out.stdout, [1]);
}

#[test]
fn test_dump_comes_before_output() {
    let source = format!("++[-]{}.", "+".repeat(65));
    let out = run_source("dump", &source, &["--dump"]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "0: + (2)\n1: [ (4)\n2: - (1)\n3: ] (2)\n4: + (65)\n5: . (1)\nA"
    );
}

#[test]
fn test_dump_short_flag() {
    let out = run_source("dump-short", "++[-].", &["-d"]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        out.stdout,
        b"0: + (2)\n1: [ (4)\n2: - (1)\n3: ] (2)\n4: . (1)\n\0"
    );
}
