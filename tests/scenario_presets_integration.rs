use std::process::Command;

#[derive(Debug)]
struct Report {
    charges_applied: f64,
    peak_master_reading: f64,
    net_margin: f64,
    final_balance: f64,
}

#[test]
fn scenario_files_run_via_cli_and_bill_every_cycle() {
    let baseline = run_and_parse_report(&["--scenario", "scenarios/baseline.toml"]);
    let spiky = run_and_parse_report(&["--scenario", "scenarios/spiky.toml"]);
    let single = run_and_parse_report(&["--scenario", "scenarios/single_client.toml"]);

    for report in [&baseline, &spiky, &single] {
        assert_eq!(report.charges_applied, 4.0, "unexpected charge count: {report:?}");
    }

    assert!(
        spiky.peak_master_reading > baseline.peak_master_reading,
        "expected spiky peak above baseline: baseline={}, spiky={}",
        baseline.peak_master_reading,
        spiky.peak_master_reading
    );

    assert!(
        (baseline.final_balance - (100.0 + baseline.net_margin)).abs() < 0.02,
        "balance does not match margin: {baseline:?}"
    );

    // Opening balance is zero, so the final balance is the margin itself.
    assert!(
        (single.final_balance - single.net_margin).abs() < 0.02,
        "balance does not match margin: {single:?}"
    );
}

#[test]
fn preset_with_days_override_matches_scenario_file() {
    let from_file = run_stdout(&["--scenario", "scenarios/baseline.toml", "--quiet"]);
    let from_preset = run_stdout(&["--preset", "baseline", "--days", "120", "--quiet"]);
    assert_eq!(from_file, from_preset);
}

#[test]
fn invalid_invocations_exit_with_failure() {
    for args in [
        &["--preset", "nonexistent"][..],
        &["--days", "0"][..],
        &["--seed", "minus-one"][..],
        &["--bogus"][..],
    ] {
        let output = Command::new(env!("CARGO_BIN_EXE_utility-metering"))
            .args(args)
            .output()
            .expect("utility-metering process should run");
        assert!(!output.status.success(), "expected failure for {args:?}");
    }
}

fn run_stdout(args: &[&str]) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_utility-metering"))
        .args(args)
        .output()
        .expect("utility-metering process should run");

    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={} ",
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn run_and_parse_report(args: &[&str]) -> Report {
    let mut with_quiet = args.to_vec();
    with_quiet.push("--quiet");
    let stdout = run_stdout(&with_quiet);

    Report {
        charges_applied: parse_metric(&stdout, "Charges applied:"),
        peak_master_reading: parse_metric(&stdout, "Peak master reading:"),
        net_margin: parse_metric(&stdout, "Net margin:"),
        final_balance: parse_metric(&stdout, "Final balance:"),
    }
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    raw.parse::<f64>()
        .unwrap_or_else(|_| panic!("failed to parse value `{raw}` from line `{line}`"))
}
