//! Core simulation types: run configuration and per-day results.

use std::fmt;

use serde::Serialize;
use time::Date;

use crate::account::Charge;
use crate::config::ScenarioConfig;
use crate::meter::{Reading, Tariff};

/// Centralized simulation configuration.
///
/// The engine reads its calendar span, window, billing days, and tariff
/// from this struct.
///
/// # Examples
///
/// ```
/// use time::macros::date;
/// use utility_metering::sim::types::SimConfig;
///
/// let cfg = SimConfig::new(date!(2024 - 01 - 01), 5, 60, 20);
/// assert_eq!(cfg.total_days(), 65);
/// assert_eq!(cfg.charge_day, 2);
/// ```
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Date of the first warm-up reading.
    pub start_date: Date,
    /// History-only days before billing starts.
    pub warmup_days: usize,
    /// Number of billed days.
    pub days: usize,
    /// Trailing window in days.
    pub window: usize,
    /// Rates and accrual day shared by every meter.
    pub tariff: Tariff,
    /// Day of month on which accounts are charged.
    pub charge_day: u8,
    /// Company balance before the first charge.
    pub opening_balance: f64,
}

impl SimConfig {
    /// Creates a configuration with the default tariff, charge day 2, and a
    /// zero opening balance.
    ///
    /// # Panics
    ///
    /// Panics if `days` or `window` is zero.
    pub fn new(start_date: Date, warmup_days: usize, days: usize, window: usize) -> Self {
        assert!(days > 0, "days must be > 0");
        assert!(window > 0, "window must be > 0");
        Self {
            start_date,
            warmup_days,
            days,
            window,
            tariff: Tariff::default(),
            charge_day: 2,
            opening_balance: 0.0,
        }
    }

    /// Builds the run configuration from a validated scenario.
    pub fn from_scenario(cfg: &ScenarioConfig) -> Self {
        let s = &cfg.simulation;
        let mut sim = Self::new(s.start_date, s.warmup_days, s.days, cfg.billing.window);
        sim.tariff = cfg.billing.tariff();
        sim.charge_day = cfg.billing.charge_day;
        sim.opening_balance = cfg.billing.opening_balance;
        sim
    }

    /// Warm-up plus billed days.
    pub fn total_days(&self) -> usize {
        self.warmup_days + self.days
    }
}

/// Complete record of one billed simulation day.
#[derive(Debug, Clone, Serialize)]
pub struct DayResult {
    /// Zero-based index of the billed day.
    pub day: usize,
    /// Calendar date of the readings.
    pub date: Date,
    /// Each client's reading for the day.
    pub client_readings: Vec<i64>,
    /// Master reading (sum of client readings).
    pub master_reading: i64,
    /// Master window total after the update.
    pub window_total: i64,
    /// Master ratchet after the update.
    pub ratchet: Reading,
    /// Whether cost entries accrued today.
    pub accrued: bool,
    /// The charge applied today, if this was a charge day.
    pub charge: Option<Charge>,
    /// Master expense factors after the update.
    pub expense_factors: Vec<f64>,
    /// Company balance at the end of the day.
    pub company_balance: f64,
}

impl fmt::Display for DayResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | master={:>3} window={:>4} ratchet={:>3}@{} | balance={:>8.2}",
            self.date,
            self.master_reading,
            self.window_total,
            self.ratchet.value,
            self.ratchet.timestamp,
            self.company_balance,
        )?;
        if self.accrued {
            write!(f, " | accrued")?;
        }
        if let Some(c) = &self.charge {
            write!(
                f,
                " | charged energy={:.2} demand={:.2} master={:.2} margin={:+.2}",
                c.energy_bill,
                c.demand_bill,
                c.master_cost,
                c.margin()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn sim_config_basic() {
        let cfg = SimConfig::new(date!(2024 - 01 - 01), 30, 365, 20);
        assert_eq!(cfg.total_days(), 395);
        assert_eq!(cfg.tariff, Tariff::default());
        assert_eq!(cfg.opening_balance, 0.0);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_days_panics() {
        SimConfig::new(date!(2024 - 01 - 01), 0, 0, 20);
    }

    #[test]
    #[should_panic]
    fn sim_config_zero_window_panics() {
        SimConfig::new(date!(2024 - 01 - 01), 0, 10, 0);
    }

    #[test]
    fn from_scenario_copies_billing_settings() {
        let mut scenario = ScenarioConfig::baseline();
        scenario.billing.charge_day = 5;
        scenario.billing.opening_balance = 12.5;
        let cfg = SimConfig::from_scenario(&scenario);
        assert_eq!(cfg.charge_day, 5);
        assert_eq!(cfg.opening_balance, 12.5);
        assert_eq!(cfg.window, 20);
        assert_eq!(cfg.total_days(), 395);
    }

    #[test]
    fn day_result_display_mentions_charge() {
        let r = DayResult {
            day: 0,
            date: date!(2024 - 02 - 02),
            client_readings: vec![1, 2],
            master_reading: 3,
            window_total: 30,
            ratchet: Reading::new(date!(2024 - 01 - 20), 9),
            accrued: false,
            charge: Some(Charge {
                energy_bill: 24.0,
                demand_bill: 10.8,
                master_cost: 34.8,
                individual_cost: 36.0,
            }),
            expense_factors: vec![0.33, 0.67],
            company_balance: 100.0,
        };
        let s = format!("{r}");
        assert!(s.starts_with("2024-02-02"));
        assert!(s.contains("charged"));
    }
}
