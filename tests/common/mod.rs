//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use time::macros::date;
use time::{Date, Duration};
use utility_metering::config::RandomWalkConfig;
use utility_metering::meter::{ClientMeter, MasterMeter};
use utility_metering::sim::engine::Engine;
use utility_metering::sim::types::SimConfig;
use utility_metering::sources::{RandomWalk, ScriptedSource};

/// First reading date used by fixtures that do not care about month ends.
pub const START: Date = date!(2024 - 01 - 10);

/// Date of the `i`-th reading counted from `START`.
pub fn day(i: usize) -> Date {
    START + Duration::days(i as i64)
}

/// A client meter holding `values` on consecutive days from `START`.
pub fn client_with(values: &[i64]) -> ClientMeter {
    let mut meter = ClientMeter::new("fixture");
    for (i, v) in values.iter().enumerate() {
        meter.add_point(day(i), *v);
    }
    meter
}

/// Runs the daily cycle by hand over per-client value vectors starting at
/// `start`, returning the meters after the last day.
pub fn run_cycle(
    start: Date,
    values: &[Vec<i64>],
    window: usize,
) -> (Vec<ClientMeter>, MasterMeter) {
    let mut clients: Vec<ClientMeter> = (0..values.len())
        .map(|i| ClientMeter::new(format!("client-{i}")))
        .collect();
    let mut master = MasterMeter::new("master");
    let days = values.first().map_or(0, Vec::len);
    for d in 0..days {
        let ts = start + Duration::days(d as i64);
        for (client, series) in clients.iter_mut().zip(values) {
            client.add_point(ts, series[d]);
            client.update_totals(window).expect("client update");
        }
        master.record_aggregate(&clients).expect("aggregate");
        master.update_totals(window, &clients).expect("master update");
    }
    (clients, master)
}

/// Default random-walk engine: 3 clients, 20-day window, 30 warm-up days,
/// 120 billed days from 2024-01-01.
pub fn default_engine(seed: u64) -> Engine<RandomWalk> {
    let mut config = SimConfig::new(date!(2024 - 01 - 01), 30, 120, 20);
    config.opening_balance = 100.0;
    let source = RandomWalk::new(&RandomWalkConfig::default(), 3, seed);
    Engine::new(config, 3, source)
}

/// Engine replaying `streams` with no warm-up and window 1.
pub fn scripted_engine(start: Date, streams: Vec<Vec<i64>>) -> Engine<ScriptedSource> {
    let days = streams.first().map_or(1, Vec::len);
    let config = SimConfig::new(start, 0, days, 1);
    let clients = streams.len();
    Engine::new(config, clients, ScriptedSource::new(streams))
}
