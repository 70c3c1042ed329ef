use assert_cmd::Command;
use predicates::prelude::*;
use std::process::{self, Stdio};
use std::thread;
use std::time::{Duration, Instant};

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfc").unwrap();
    cmd.env("BFC_CONFIG", "/nonexistent/bfc.toml");
    cmd
}

#[test]
fn dump_appends_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.txt");

    for _ in 0..2 {
        cargo_bin()
            .arg("run").arg("--ascii").arg("--dump-file").arg(&path).arg("+++:>++:")
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    assert_eq!(std::fs::read(&path).unwrap(), vec![3, 2, 3, 2]);
}

#[test]
fn dump_written_before_a_fault_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.txt");

    cargo_bin()
        .arg("run").arg("--ascii").arg("--dump-file").arg(&path).arg("+:<")
        .assert()
        .code(1);

    assert_eq!(std::fs::read(&path).unwrap(), vec![1]);
}

#[test]
fn dump_is_ignored_outside_ascii_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.txt");

    cargo_bin()
        .arg("run").arg("--dump-file").arg(&path).arg("+:")
        .assert()
        .success();

    assert!(!path.exists());
}

#[test]
fn timeout_while_waiting_for_input_keeps_the_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.txt");

    let mut child = process::Command::new(assert_cmd::cargo::cargo_bin("bfc"))
        .env("BFC_CONFIG", "/nonexistent/bfc.toml")
        .args(["run", "--timeout", "200", "--ascii", "--dump-file"])
        .arg(&path)
        .arg("+++:,")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    // Keep stdin open so `,` blocks until the timeout fires.
    let _stdin = child.stdin.take().unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("bfc did not exit after its timeout");
        }
        thread::sleep(Duration::from_millis(20));
    };

    assert_eq!(status.code(), Some(1));
    assert_eq!(std::fs::read(&path).unwrap(), vec![3]);
}
