//! Integration tests for the docsearch binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn docsearch() -> Command {
    let mut cmd = Command::cargo_bin("docsearch").unwrap();
    cmd.env_remove("RUST_LOG").arg("--no-color");
    cmd
}

// ==================== Validate ====================

#[test]
fn test_validate_accepts_allowed_extensions() {
    docsearch()
        .args(["validate", "report.PDF", "minutes.docx", "notes.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report.PDF"));
}

#[test]
fn test_validate_rejects_unknown_extensions() {
    docsearch()
        .args(["validate", "report.pdf", "archive.zip", "notes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 of 3 filenames rejected"));
}

#[test]
fn test_validate_json_output() {
    let output = docsearch()
        .args(["--format", "json", "validate", "a.txt", "b.exe"])
        .output()
        .unwrap();

    let verdicts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdicts[0]["valid"], true);
    assert_eq!(verdicts[1]["valid"], false);
}

// ==================== Process ====================

#[test]
fn test_process_text_file_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("greeting.txt");
    fs::write(&path, "Hello world. ".repeat(100)).unwrap();

    let output = docsearch()
        .args(["--format", "json", "process"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["chunks"].as_array().unwrap().len(), 2);
    assert_eq!(result["metadata"]["file_type"], "txt");
    assert_eq!(result["metadata"]["file_size"], 1300);
}

#[test]
fn test_process_with_explicit_type() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("README");
    fs::write(&path, "Plain notes without an extension.").unwrap();

    docsearch()
        .args(["process", "--type", "txt"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Chunks: 1"));
}

#[test]
fn test_process_missing_file_fails() {
    docsearch()
        .args(["process", "/nonexistent/missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process"));
}

#[test]
fn test_process_unsupported_type_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("setup.exe");
    fs::write(&path, b"MZ").unwrap();

    docsearch()
        .arg("process")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to process"));
}

#[test]
fn test_process_verbose_logs_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "Short notes.").unwrap();

    docsearch()
        .args(["--verbose", "--format", "json", "process"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing document"))
        .stdout(predicate::str::contains("Processing document").not());
}

// ==================== Chunk ====================

#[test]
fn test_chunk_from_stdin() {
    docsearch()
        .args(["chunk", "--chunk-size", "10", "--chunk-overlap", "3"])
        .write_stdin("abcdefghijklmnopqrstuvwxyz")
        .assert()
        .success()
        .stdout(predicate::str::contains("hijklmnopq"))
        .stdout(predicate::str::contains("vwxyz"));
}

#[test]
fn test_chunk_rejects_invalid_overlap() {
    docsearch()
        .args(["chunk", "--chunk-size", "10", "--chunk-overlap", "10"])
        .write_stdin("text")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid chunking options"));
}
