use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfc").unwrap();
    cmd.env("BFC_CONFIG", "/nonexistent/bfc.toml")
        .env_remove("BFC_MAX_STEPS")
        .env_remove("BFC_TIMEOUT_MS")
        .timeout(Duration::from_secs(5));
    cmd
}

#[test]
fn invalid_character_reports_line_and_never_runs() {
    cargo_bin()
        .args(["run", "+.", "+a+", "b"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Parse error").and(predicate::str::contains("line 2")).and(predicate::str::contains("'a'")));
}

#[test]
fn pointer_below_zero() {
    cargo_bin()
        .args(["run", "+<"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pointer out of range").and(predicate::str::contains("at instruction 1")));
}

#[test]
fn overflow_guard_stops_at_255() {
    cargo_bin()
        .args(["run", "--overflow-guard", ",.+."])
        .write_stdin("255\n")
        .assert()
        .code(1)
        .stdout("255\n")
        .stderr(predicate::str::contains("stack overflow").and(predicate::str::contains("value=255")));
}

#[test]
fn overflow_wraps_without_guard() {
    cargo_bin()
        .args(["run", ",+."])
        .write_stdin("255\n")
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn stray_close_is_reported() {
    cargo_bin()
        .args(["run", "]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unbalanced loop"));
}

#[test]
fn non_integer_input_is_reported() {
    cargo_bin()
        .args(["run", ",."])
        .write_stdin("abc\n")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not an integer"));
}

#[test]
fn step_limit_aborts_infinite_loop() {
    cargo_bin()
        .args(["run", "--max-steps", "50", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn step_limit_from_environment() {
    cargo_bin()
        .env("BFC_MAX_STEPS", "20")
        .args(["run", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("step limit exceeded (20)"));
}

#[test]
fn timeout_aborts_infinite_loop() {
    cargo_bin()
        .args(["run", "--timeout", "100", "+[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("timeout"))
        .stdout(predicate::str::contains("Execution aborted").not());
}
