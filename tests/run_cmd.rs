use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfc").unwrap();
    cmd.env("BFC_CONFIG", "/nonexistent/bfc.toml").env_remove("BFC_MAX_STEPS").env_remove("BFC_TIMEOUT_MS");
    cmd
}

fn read_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn numeric_output_by_default() {
    cargo_bin()
        .args(["run", "++."])
        .assert()
        .success()
        .stdout("2\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn ascii_output_prints_characters() {
    let program = format!("{}.", "+".repeat(65));
    cargo_bin()
        .args(["run", "--ascii", &program])
        .assert()
        .success()
        .stdout("A\n");
}

#[test]
fn every_argument_is_a_source_line() {
    cargo_bin()
        .args(["run", "+++", "[>++<-]", ">."])
        .assert()
        .success()
        .stdout("6\n");
}

#[test]
fn file_with_several_lines() {
    let tf = read_to_tempfile("++++\r\n[>+++<-]\n>.\n");
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("12\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn input_is_echoed_with_byte_truncation() {
    cargo_bin()
        .args(["run", ",.,."])
        .write_stdin("300\n7\n")
        .assert()
        .success()
        .stdout("44\n7\n");
}

#[test]
fn no_newline_joins_values() {
    cargo_bin()
        .args(["run", "--no-newline", "++.++."])
        .assert()
        .success()
        .stdout("24");
}

#[test]
fn empty_program_does_nothing() {
    cargo_bin()
        .args(["run", ""])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn comments_are_ignored() {
    cargo_bin()
        .args(["run", "--comment", "#", "+;+#+."])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn debug_prints_table_instead_of_output() {
    cargo_bin()
        .args(["run", "--debug", ">+."])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("STEP | IP")
                .and(predicate::str::contains("Moved pointer head to index 1"))
                .and(predicate::str::contains("Output value 1")),
        );
}

#[test]
fn settings_file_supplies_defaults() {
    let cfg = read_to_tempfile("[run]\nascii = true\nnewline = false\n");
    let program = format!("{}..", "+".repeat(66));
    Command::cargo_bin("bfc")
        .unwrap()
        .env("BFC_CONFIG", cfg.path())
        .args(["run", &program])
        .assert()
        .success()
        .stdout("BB");
}

#[test]
fn missing_code_prints_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn file_and_positional_code_conflict() {
    let tf = read_to_tempfile("+.");
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path()).arg("+")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}
