use assert_cmd::Command;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::{contains, is_match};

const BINARY_NAME: &str = "caissa";

#[test]
fn uci_setup() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("binary should be built");

    drop(
        cmd.write_stdin("uci\n")
            .assert()
            .success()
            .stdout(contains("id name").and(contains("id author")).and(contains("uciok"))),
    );
}

#[test]
fn go_depth_reports_a_bestmove() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("binary should be built");

    drop(
        cmd.write_stdin("uci\ngo depth 3\n")
            .assert()
            .success()
            .stdout(contains("uciok").and(contains("bestmove"))),
    );
}

#[test]
fn openbench_output() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).expect("binary should be built");
    let _ = cmd.arg("bench");

    drop(cmd.assert().stdout(is_match(r"\d+ nodes").unwrap()).success());
}
