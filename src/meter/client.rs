use serde::Serialize;
use time::Date;

use super::series::{MeterSeries, Reading};
use crate::error::MeterError;

/// Default price per unit of windowed consumption.
pub const ENERGY_RATE: f64 = 0.8;
/// Default price per unit of ratchet (peak) demand.
pub const DEMAND_RATE: f64 = 1.2;
/// Default day of month on which cost entries accrue.
pub const ACCRUAL_DAY: u8 = 1;

/// Rates and billing-day convention a meter accrues costs with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tariff {
    /// Price per unit of `window_total`.
    pub energy_rate: f64,
    /// Price per unit of ratchet value.
    pub demand_rate: f64,
    /// Day of month whose reading triggers a cost entry.
    pub accrual_day: u8,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            energy_rate: ENERGY_RATE,
            demand_rate: DEMAND_RATE,
            accrual_day: ACCRUAL_DAY,
        }
    }
}

/// A client meter: a reading series plus trailing totals and accrued costs.
///
/// After each [`update_totals`](Self::update_totals) the meter holds the sum
/// of the last `window` readings and the ratchet, which is the peak reading
/// over the last `3 × window` readings.
///
/// # Examples
///
/// ```
/// use time::macros::date;
/// use utility_metering::meter::ClientMeter;
///
/// let mut meter = ClientMeter::new("client-0");
/// for (day, value) in [1, 2, 3, 4, 5].into_iter().enumerate() {
///     let ts = date!(2024 - 01 - 10) + time::Duration::days(day as i64);
///     meter.add_point(ts, value);
/// }
/// meter.update_totals(3).unwrap();
///
/// assert_eq!(meter.window_total(), 12);
/// assert_eq!(meter.ratchet().map(|r| r.value), Some(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientMeter {
    name: String,
    series: MeterSeries,
    tariff: Tariff,
    window_total: i64,
    ratchet: Option<Reading>,
    previous_ratchet: Option<Reading>,
    energy_costs: Vec<f64>,
    demand_costs: Vec<f64>,
    total_costs: Vec<f64>,
}

impl ClientMeter {
    /// Creates a meter billed with the default tariff.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_tariff(name, Tariff::default())
    }

    pub fn with_tariff(name: impl Into<String>, tariff: Tariff) -> Self {
        Self {
            name: name.into(),
            series: MeterSeries::new(),
            tariff,
            window_total: 0,
            ratchet: None,
            previous_ratchet: None,
            energy_costs: Vec::new(),
            demand_costs: Vec::new(),
            total_costs: Vec::new(),
        }
    }

    pub fn add_point(&mut self, timestamp: Date, value: i64) {
        self.series.add_point(timestamp, value);
    }

    /// Recomputes the window total and ratchet, accruing costs on the
    /// accrual day.
    ///
    /// # Errors
    ///
    /// * [`MeterError::InvalidWindow`] if `window` is zero.
    /// * [`MeterError::InsufficientHistory`] if the meter has no readings.
    /// * [`MeterError::ReadingOverflow`] if the window total overflows `i64`.
    pub fn update_totals(&mut self, window: usize) -> Result<(), MeterError> {
        if window == 0 {
            return Err(MeterError::InvalidWindow);
        }
        let latest = *self.series.last().ok_or(MeterError::InsufficientHistory)?;

        self.window_total = self
            .series
            .tail(window)
            .iter()
            .try_fold(0_i64, |acc, r| acc.checked_add(r.value))
            .ok_or(MeterError::ReadingOverflow)?;

        // Strict `>` keeps the earliest reading when several share the peak.
        let peak = self
            .series
            .tail(window.saturating_mul(3))
            .iter()
            .copied()
            .reduce(|best, r| if r.value > best.value { r } else { best })
            .unwrap_or(latest);
        self.previous_ratchet = self.ratchet;
        self.ratchet = Some(peak);

        if latest.timestamp.day() == self.tariff.accrual_day {
            self.accrue_costs(peak.value);
        }
        Ok(())
    }

    fn accrue_costs(&mut self, ratchet_value: i64) {
        let energy = self.window_total as f64 * self.tariff.energy_rate;
        let demand = ratchet_value as f64 * self.tariff.demand_rate;
        self.energy_costs.push(energy);
        self.demand_costs.push(demand);
        self.total_costs.push(energy + demand);
    }

    /// True when the last update moved the ratchet to a different day.
    pub fn ratchet_moved(&self) -> bool {
        match (self.previous_ratchet, self.ratchet) {
            (Some(prev), Some(cur)) => prev.timestamp != cur.timestamp,
            (None, Some(_)) => true,
            (_, None) => false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn series(&self) -> &MeterSeries {
        &self.series
    }

    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    pub fn window_total(&self) -> i64 {
        self.window_total
    }

    pub fn ratchet(&self) -> Option<Reading> {
        self.ratchet
    }

    pub fn previous_ratchet(&self) -> Option<Reading> {
        self.previous_ratchet
    }

    pub fn energy_costs(&self) -> &[f64] {
        &self.energy_costs
    }

    pub fn demand_costs(&self) -> &[f64] {
        &self.demand_costs
    }

    pub fn total_costs(&self) -> &[f64] {
        &self.total_costs
    }
}
