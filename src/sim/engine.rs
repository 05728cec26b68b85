//! Simulation engine that drives the daily metering and monthly billing cycles.

use time::Date;

use crate::account::AccountManager;
use crate::error::{MeterError, SimError};
use crate::meter::{ClientMeter, MasterMeter};
use crate::sources::ReadingSource;

use super::clock::Calendar;
use super::sink::DaySink;
use super::types::{DayResult, SimConfig};

/// Simulation engine owning the meters, the account manager, and the
/// reading source.
///
/// Generic over `S: ReadingSource` for static dispatch. Each billed day runs
/// three phases in a fixed order: every client reads and updates its totals,
/// then the master aggregates and updates (including expense factors), then
/// accounts are charged if it is the charge day.
pub struct Engine<S: ReadingSource> {
    config: SimConfig,
    source: S,
    clients: Vec<ClientMeter>,
    master: MasterMeter,
    accounts: AccountManager,
    calendar: Calendar,
    warmup_left: usize,
    day: usize,
}

impl<S: ReadingSource> Engine<S> {
    /// Creates an engine with `clients` freshly allocated client meters.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulation configuration
    /// * `clients` - Number of client meters behind the master
    /// * `source` - Supplier of daily client readings
    pub fn new(config: SimConfig, clients: usize, source: S) -> Self {
        let tariff = config.tariff;
        let meters = (0..clients)
            .map(|i| ClientMeter::with_tariff(format!("client-{i}"), tariff))
            .collect();
        Self {
            calendar: Calendar::new(config.start_date, config.total_days()),
            warmup_left: config.warmup_days,
            accounts: AccountManager::new(config.opening_balance),
            master: MasterMeter::with_tariff("master", tariff),
            clients: meters,
            source,
            config,
            day: 0,
        }
    }

    /// Appends one reading per client for `date`.
    fn read_clients(&mut self, date: Date) -> Result<Vec<i64>, SimError> {
        let mut readings = Vec::with_capacity(self.clients.len());
        for (i, client) in self.clients.iter_mut().enumerate() {
            let previous = client.series().last().map(|r| r.value);
            let value = self
                .source
                .next_value(i, previous)
                .ok_or(SimError::SourceExhausted { client: i })?;
            client.add_point(date, value);
            readings.push(value);
        }
        Ok(readings)
    }

    /// Records the warm-up days: readings and master aggregates only, with
    /// no totals, costs, or charges.
    ///
    /// Called automatically by the first [`step`](Self::step); calling it
    /// again is a no-op.
    pub fn warm_up(&mut self) -> Result<(), SimError> {
        while self.warmup_left > 0 {
            let Some(date) = self.calendar.tick() else {
                break;
            };
            self.read_clients(date)?;
            self.master.record_aggregate(&self.clients)?;
            self.warmup_left -= 1;
        }
        Ok(())
    }

    /// Executes one billed day and returns its result, or `None` once the
    /// calendar is exhausted.
    pub fn step(&mut self) -> Result<Option<DayResult>, SimError> {
        self.warm_up()?;
        let Some(date) = self.calendar.tick() else {
            return Ok(None);
        };
        let window = self.config.window;

        // 1. Clients
        let client_readings = self.read_clients(date)?;
        for client in &mut self.clients {
            client.update_totals(window)?;
        }

        // 2. Master, after every client holds today's reading
        let cycles_before = self.master.meter().total_costs().len();
        let master_reading = self.master.record_aggregate(&self.clients)?;
        self.master.update_totals(window, &self.clients)?;
        if self.master.meter().ratchet_moved() {
            tracing::debug!(%date, ratchet = ?self.master.ratchet(), "master ratchet moved");
        }
        let accrued = self.master.meter().total_costs().len() > cycles_before;
        if accrued {
            tracing::info!(%date, cycle = cycles_before + 1, "billing cycle accrued");
        }

        // 3. Accounts, one or more days after accrual
        let charge = if date.day() == self.config.charge_day {
            if self.master.meter().total_costs().is_empty() {
                tracing::warn!(%date, "charge day before first billing cycle, skipping");
                None
            } else {
                Some(self.accounts.charge_accounts(&self.master, &self.clients)?)
            }
        } else {
            None
        };

        let meter = self.master.meter();
        let ratchet = meter.ratchet().ok_or(MeterError::InsufficientHistory)?;
        let result = DayResult {
            day: self.day,
            date,
            client_readings,
            master_reading: master_reading.value,
            window_total: meter.window_total(),
            ratchet,
            accrued,
            charge,
            expense_factors: self.master.expense_factors().to_vec(),
            company_balance: self.accounts.company_balance(),
        };
        tracing::debug!(
            %date,
            master = result.master_reading,
            window_total = result.window_total,
            ratchet = ratchet.value,
            "day complete"
        );
        self.day += 1;
        Ok(Some(result))
    }

    /// Executes all remaining days, streaming each result into `sink`.
    pub fn run(&mut self, sink: &mut impl DaySink) -> Result<(), SimError> {
        while let Some(result) = self.step()? {
            sink.record(&result)?;
        }
        Ok(())
    }

    pub fn clients(&self) -> &[ClientMeter] {
        &self.clients
    }

    pub fn master(&self) -> &MasterMeter {
        &self.master
    }

    pub fn accounts(&self) -> &AccountManager {
        &self.accounts
    }

    /// Returns a reference to the simulation configuration.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ScriptedSource;
    use time::macros::date;

    fn engine(start: Date, warmup: usize, streams: Vec<Vec<i64>>) -> Engine<ScriptedSource> {
        let days = streams[0].len() - warmup;
        let mut cfg = SimConfig::new(start, warmup, days, 1);
        cfg.opening_balance = 100.0;
        let clients = streams.len();
        Engine::new(cfg, clients, ScriptedSource::new(streams))
    }

    #[test]
    fn warm_up_records_history_without_totals() {
        let mut e = engine(date!(2024 - 01 - 01), 2, vec![vec![1, 2, 3], vec![4, 5, 6]]);
        e.warm_up().unwrap();

        assert_eq!(e.master().series().len(), 2);
        assert_eq!(e.clients()[0].series().len(), 2);
        assert!(e.master().ratchet().is_none());

        let first = e.step().unwrap().unwrap();
        assert_eq!(first.date, date!(2024 - 01 - 03));
        assert_eq!(first.master_reading, 9);
        assert!(e.step().unwrap().is_none());
    }

    #[test]
    fn charge_lands_one_day_after_accrual() {
        let mut e = engine(
            date!(2024 - 01 - 31),
            0,
            vec![vec![1, 1, 1, 1], vec![1, 1, 1, 1], vec![1, 1, 1, 1]],
        );
        let mut results: Vec<DayResult> = Vec::new();
        e.run(&mut results).unwrap();

        let accrued: Vec<Date> = results.iter().filter(|r| r.accrued).map(|r| r.date).collect();
        let charged: Vec<Date> = results
            .iter()
            .filter(|r| r.charge.is_some())
            .map(|r| r.date)
            .collect();
        assert_eq!(accrued, vec![date!(2024 - 02 - 01)]);
        assert_eq!(charged, vec![date!(2024 - 02 - 02)]);
        assert!((e.accounts().company_balance() - (100.0 - 0.036)).abs() < 1e-9);
    }

    #[test]
    fn charge_day_before_any_accrual_is_skipped() {
        let mut e = engine(date!(2024 - 03 - 02), 0, vec![vec![5, 6]]);
        let first = e.step().unwrap().unwrap();
        assert!(first.charge.is_none());
        assert_eq!(first.company_balance, 100.0);
        assert_eq!(e.accounts().charges_applied(), 0);
    }

    #[test]
    fn exhausted_source_stops_the_run() {
        let mut cfg = SimConfig::new(date!(2024 - 01 - 01), 0, 5, 1);
        cfg.opening_balance = 0.0;
        let mut e = Engine::new(cfg, 2, ScriptedSource::new(vec![vec![1, 1], vec![1]]));
        let mut results: Vec<DayResult> = Vec::new();

        let err = e.run(&mut results);
        assert!(matches!(err, Err(SimError::SourceExhausted { client: 1 })));
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn zero_peak_surfaces_division_by_zero() {
        let mut e = engine(date!(2024 - 01 - 05), 0, vec![vec![0, 0], vec![0, 0]]);
        let err = e.step();
        assert!(matches!(
            err,
            Err(SimError::Meter(MeterError::DivisionByZero))
        ));
    }
}
