//! Metering simulator entry point: CLI wiring and config-driven engine construction.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process;

use utility_metering::config::ScenarioConfig;
use utility_metering::error::SimError;
use utility_metering::io::export::export_csv;
use utility_metering::io::snapshot::{Snapshot, write_snapshot_json};
use utility_metering::observability;
use utility_metering::sim::engine::Engine;
use utility_metering::sim::kpi::BillingReport;
use utility_metering::sim::types::{DayResult, SimConfig};
use utility_metering::sources::RandomWalk;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    days_override: Option<usize>,
    csv_out: Option<String>,
    snapshot_out: Option<String>,
    quiet: bool,
}

fn print_help() {
    eprintln!("utility-metering: demand-ratchet billing simulator");
    eprintln!();
    eprintln!("Usage: utility-metering [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, spiky, single_client)");
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --days <n>               Override number of billed days");
    eprintln!("  --csv-out <path>         Export day results to CSV");
    eprintln!("  --snapshot-out <path>    Write final meter state as JSON");
    eprintln!("  --quiet                  Print only the billing report");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

/// Returns the value following flag `args[*i]`, advancing `i`.
fn flag_value<'a>(args: &'a [String], i: &mut usize, what: &str) -> &'a str {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i) {
        Some(v) => v.as_str(),
        None => {
            eprintln!("error: {flag} requires {what}");
            process::exit(1);
        }
    }
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str, what: &str) -> T {
    raw.parse::<T>().unwrap_or_else(|_| {
        eprintln!("error: {flag} value \"{raw}\" is not a valid {what}");
        process::exit(1);
    })
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        days_override: None,
        csv_out: None,
        snapshot_out: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                cli.scenario_path = Some(flag_value(&args, &mut i, "a path argument").to_string());
            }
            "--preset" => {
                cli.preset = Some(flag_value(&args, &mut i, "a name argument").to_string());
            }
            "--seed" => {
                let raw = flag_value(&args, &mut i, "a u64 argument");
                cli.seed_override = Some(parse_number("--seed", raw, "u64"));
            }
            "--days" => {
                let raw = flag_value(&args, &mut i, "a day count");
                cli.days_override = Some(parse_number("--days", raw, "day count"));
            }
            "--csv-out" => {
                cli.csv_out = Some(flag_value(&args, &mut i, "a path argument").to_string());
            }
            "--snapshot-out" => {
                cli.snapshot_out = Some(flag_value(&args, &mut i, "a path argument").to_string());
            }
            "--quiet" | "-q" => {
                cli.quiet = true;
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Runs the scenario and returns the day results and the final snapshot.
fn run_simulation(cfg: &ScenarioConfig) -> Result<(Vec<DayResult>, Snapshot), SimError> {
    let sim_config = SimConfig::from_scenario(cfg);
    let source = RandomWalk::new(&cfg.random_walk, cfg.clients.count, cfg.simulation.seed);
    let mut engine = Engine::new(sim_config, cfg.clients.count, source);

    let mut results = Vec::with_capacity(cfg.simulation.days);
    engine.run(&mut results)?;
    let snapshot = Snapshot::capture(engine.master(), engine.clients(), engine.accounts());
    Ok((results, snapshot))
}

fn main() {
    let cli = parse_args();
    observability::init_tracing();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(days) = cli.days_override {
        scenario.simulation.days = days;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    tracing::info!(
        clients = scenario.clients.count,
        days = scenario.simulation.days,
        window = scenario.billing.window,
        seed = scenario.simulation.seed,
        "starting simulation"
    );
    let (results, snapshot) = match run_simulation(&scenario) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if !cli.quiet {
        for r in &results {
            println!("{r}");
        }
        println!();
    }

    let report = BillingReport::from_results(&results, scenario.billing.opening_balance);
    println!("{report}");

    if let Some(ref path) = cli.csv_out {
        if let Err(e) = export_csv(&results, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Day results written to {path}");
    }

    if let Some(ref path) = cli.snapshot_out {
        let written = File::create(path)
            .and_then(|file| write_snapshot_json(&snapshot, BufWriter::new(file)));
        if let Err(e) = written {
            eprintln!("error: failed to write snapshot: {e}");
            process::exit(1);
        }
        eprintln!("Snapshot written to {path}");
    }
}
