use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

fn ricochet(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ricochet"))
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start the ricochet binary");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write session input");
    child.wait_with_output().expect("ricochet exits")
}

#[test]
fn scripted_session_selects_and_moves_a_robot() {
    let output = ricochet(&["--seed", "7"], "select red\nright\nquit\n");
    let stdout = String::from_utf8(output.stdout).expect("utf8 output");

    assert!(output.status.success(), "session failed: {stdout}");
    assert!(stdout.starts_with("Welcome to Ricochet Robots.\n"));
    assert!(stdout.contains("red #c82a36 (selected)"));
    assert!(!stdout.contains("unknown command"));
}

#[test]
fn closing_input_ends_the_session() {
    let output = ricochet(&["--seed", "7"], "next\n");
    let stdout = String::from_utf8(output.stdout).expect("utf8 output");

    assert!(output.status.success());
    assert!(stdout.contains("(selected)"));
}

#[test]
fn missing_settings_file_is_reported() {
    let output = ricochet(&["--config", "/nonexistent/ricochet.toml"], "");
    let stderr = String::from_utf8(output.stderr).expect("utf8 output");

    assert!(!output.status.success());
    assert!(stderr.contains("failed to read settings at /nonexistent/ricochet.toml"));
}
