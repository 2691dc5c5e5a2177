use std::process::Command;

fn tradepro(data_dir: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tradepro"))
        .arg("--quiet")
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .output()
        .expect("invoke tradepro")
}

#[test]
fn help_displays_overview() {
    let binary = env!("CARGO_BIN_EXE_tradepro");
    let output = Command::new(binary)
        .arg("--help")
        .output()
        .expect("invoke tradepro --help");

    assert!(output.status.success(), "help command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Simulated equity price feed with per-user watchlists"),
        "expected overview text in help output"
    );
}

#[test]
fn watchlist_survives_between_invocations() {
    let dir = tempfile::tempdir().expect("tempdir");

    assert!(tradepro(dir.path(), &["login", "a@x.com"]).status.success());
    let toggled = tradepro(dir.path(), &["toggle", "tsla"]);
    assert!(toggled.status.success());
    assert!(String::from_utf8_lossy(&toggled.stdout).contains("Watching TSLA"));

    let listed = tradepro(dir.path(), &["watchlist"]);
    let stdout = String::from_utf8_lossy(&listed.stdout);
    assert!(stdout.contains("TSLA"), "watchlist output: {stdout}");
    assert!(stdout.contains("Tesla, Inc."));

    let whoami = tradepro(dir.path(), &["whoami"]);
    assert_eq!(String::from_utf8_lossy(&whoami.stdout).trim(), "a@x.com");
}

#[test]
fn tail_prints_a_bounded_number_of_ticks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = tradepro(
        dir.path(),
        &["tail", "--all", "--limit", "2", "--tick-ms", "5", "--seed", "1"],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows = stdout.lines().filter(|line| line.contains("GOOG")).count();
    assert_eq!(rows, 3, "resting snapshot plus two ticks: {stdout}");
}

#[test]
fn unknown_ticker_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = tradepro(dir.path(), &["toggle", "IBM"]);
    assert!(!output.status.success());
}
