//! Post-hoc billing report computed from simulation results.

use std::fmt;

use super::types::DayResult;

/// Aggregate billing indicators derived from a complete simulation run.
///
/// Computed post-hoc from `Vec<DayResult>` to ensure consistency between
/// day data and reported figures.
#[derive(Debug, Clone)]
pub struct BillingReport {
    /// Number of billed days.
    pub days: usize,
    /// Number of days on which costs accrued.
    pub billing_cycles: usize,
    /// Number of days on which accounts were charged.
    pub charges_applied: usize,
    /// Sum of energy bills across all charges.
    pub total_energy_billed: f64,
    /// Sum of redistributed demand bills across all charges.
    pub total_demand_billed: f64,
    /// Sum of master meter costs across all charges.
    pub total_master_cost: f64,
    /// What clients would have paid under their own ratchets.
    pub total_individual_cost: f64,
    /// Highest master reading seen.
    pub peak_master_reading: i64,
    /// Company balance before the first day.
    pub opening_balance: f64,
    /// Company balance after the last day.
    pub final_balance: f64,
}

impl BillingReport {
    /// Computes all figures from the complete day record vector.
    ///
    /// # Arguments
    ///
    /// * `results` - Complete simulation day results
    /// * `opening_balance` - Company balance before the first day
    pub fn from_results(results: &[DayResult], opening_balance: f64) -> Self {
        let mut report = Self {
            days: results.len(),
            billing_cycles: 0,
            charges_applied: 0,
            total_energy_billed: 0.0,
            total_demand_billed: 0.0,
            total_master_cost: 0.0,
            total_individual_cost: 0.0,
            peak_master_reading: 0,
            opening_balance,
            final_balance: results.last().map_or(opening_balance, |r| r.company_balance),
        };

        for r in results {
            if r.accrued {
                report.billing_cycles += 1;
            }
            if let Some(c) = &r.charge {
                report.charges_applied += 1;
                report.total_energy_billed += c.energy_bill;
                report.total_demand_billed += c.demand_bill;
                report.total_master_cost += c.master_cost;
                report.total_individual_cost += c.individual_cost;
            }
            report.peak_master_reading = report.peak_master_reading.max(r.master_reading);
        }
        report
    }

    /// Billed to clients minus master cost, summed over every charge.
    pub fn net_margin(&self) -> f64 {
        self.total_energy_billed + self.total_demand_billed - self.total_master_cost
    }
}

impl fmt::Display for BillingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Billing Report ---")?;
        writeln!(f, "Days simulated:        {}", self.days)?;
        writeln!(f, "Billing cycles:        {}", self.billing_cycles)?;
        writeln!(f, "Charges applied:       {}", self.charges_applied)?;
        writeln!(f, "Energy billed:         {:.2}", self.total_energy_billed)?;
        writeln!(f, "Demand billed:         {:.2}", self.total_demand_billed)?;
        writeln!(f, "Master cost:           {:.2}", self.total_master_cost)?;
        writeln!(
            f,
            "Tenant cost:           {:.2} (individual ratchets) vs {:.2} (redistributed)",
            self.total_individual_cost,
            self.total_energy_billed + self.total_demand_billed
        )?;
        writeln!(f, "Net margin:            {:.2}", self.net_margin())?;
        writeln!(f, "Peak master reading:   {}", self.peak_master_reading)?;
        writeln!(f, "Opening balance:       {:.2}", self.opening_balance)?;
        write!(f, "Final balance:         {:.2}", self.final_balance)
    }
}
