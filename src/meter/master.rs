use time::Date;

use super::client::{ClientMeter, Tariff};
use super::series::{MeterSeries, Reading};
use crate::error::MeterError;

/// Aggregating meter that sits upstream of a fixed set of client meters.
///
/// The master keeps its own [`ClientMeter`] state (window total, ratchet,
/// cost history) over the summed client readings. It never owns the clients:
/// each call that needs them borrows the client slice from the caller, which
/// must pass the same clients in the same order every time.
///
/// Alongside the ratchet the master keeps one expense factor per client:
/// that client's reading on the master's peak day divided by the peak.
#[derive(Debug, Clone)]
pub struct MasterMeter {
    meter: ClientMeter,
    expense_factors: Vec<f64>,
    /// Ratchet date the current factors were computed for.
    factors_at: Option<Date>,
}

impl MasterMeter {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_tariff(name, Tariff::default())
    }

    pub fn with_tariff(name: impl Into<String>, tariff: Tariff) -> Self {
        Self {
            meter: ClientMeter::with_tariff(name, tariff),
            expense_factors: Vec::new(),
            factors_at: None,
        }
    }

    pub fn add_point(&mut self, timestamp: Date, value: i64) {
        self.meter.add_point(timestamp, value);
    }

    /// Appends the sum of every client's latest reading, stamped with the
    /// first client's latest date, and returns the new reading.
    ///
    /// # Errors
    ///
    /// Returns [`MeterError::InsufficientHistory`] if there are no clients or
    /// any client has no readings, and [`MeterError::ReadingOverflow`] if the
    /// sum does not fit in `i64`.
    pub fn record_aggregate(&mut self, clients: &[ClientMeter]) -> Result<Reading, MeterError> {
        let first = clients
            .first()
            .and_then(|c| c.series().last())
            .ok_or(MeterError::InsufficientHistory)?;

        let mut total = 0_i64;
        for client in clients {
            let latest = client
                .series()
                .last()
                .ok_or(MeterError::InsufficientHistory)?;
            total = total
                .checked_add(latest.value)
                .ok_or(MeterError::ReadingOverflow)?;
        }

        let reading = Reading::new(first.timestamp, total);
        self.meter.add_point(reading.timestamp, reading.value);
        Ok(reading)
    }

    /// Runs the client-meter update on the master's own series and then
    /// refreshes the expense factors.
    ///
    /// Every client must already hold the reading the master aggregated for
    /// the current day.
    pub fn update_totals(
        &mut self,
        window: usize,
        clients: &[ClientMeter],
    ) -> Result<(), MeterError> {
        self.meter.update_totals(window)?;
        self.refresh_expense_factors(clients)
    }

    /// Recomputes expense factors when the ratchet sits on a day the current
    /// factors were not computed for.
    ///
    /// Factors are left untouched when an error is returned, and the failed
    /// ratchet day is retried (and fails again) on the next update.
    ///
    /// # Errors
    ///
    /// * [`MeterError::InsufficientHistory`] if the master has never been updated.
    /// * [`MeterError::RatchetIndexNotFound`] if the ratchet date is missing
    ///   from the first client's series, or another client has no reading at
    ///   that position.
    /// * [`MeterError::DivisionByZero`] if the ratchet value is zero.
    pub fn refresh_expense_factors(&mut self, clients: &[ClientMeter]) -> Result<(), MeterError> {
        let ratchet = self
            .meter
            .ratchet()
            .ok_or(MeterError::InsufficientHistory)?;
        if self.factors_at == Some(ratchet.timestamp) {
            return Ok(());
        }
        let not_found = MeterError::RatchetIndexNotFound {
            timestamp: ratchet.timestamp,
        };

        let idx = clients
            .first()
            .and_then(|c| c.series().position_of(ratchet.timestamp))
            .ok_or_else(|| not_found.clone())?;

        if ratchet.value == 0 {
            return Err(MeterError::DivisionByZero);
        }

        let peak = ratchet.value as f64;
        let mut factors = Vec::with_capacity(clients.len());
        for client in clients {
            let reading = client
                .series()
                .readings()
                .get(idx)
                .ok_or_else(|| not_found.clone())?;
            factors.push(round_to_cents(reading.value as f64 / peak));
        }

        tracing::debug!(
            ratchet_date = %ratchet.timestamp,
            ratchet_value = ratchet.value,
            ?factors,
            "expense factors refreshed"
        );
        self.expense_factors = factors;
        self.factors_at = Some(ratchet.timestamp);
        Ok(())
    }

    /// Expense factor per client, indexed like the client slice.
    pub fn expense_factors(&self) -> &[f64] {
        &self.expense_factors
    }

    /// The master's own meter state.
    pub fn meter(&self) -> &ClientMeter {
        &self.meter
    }

    pub fn series(&self) -> &MeterSeries {
        self.meter.series()
    }

    pub fn ratchet(&self) -> Option<Reading> {
        self.meter.ratchet()
    }
}

/// Rounds to two decimal places, half away from zero.
fn round_to_cents(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
