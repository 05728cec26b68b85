//! Company balance and the periodic charge that redistributes demand cost.

use serde::Serialize;

use crate::error::MeterError;
use crate::meter::{ClientMeter, MasterMeter};

/// Outcome of one [`AccountManager::charge_accounts`] call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Charge {
    /// Sum of every client's latest energy cost.
    pub energy_bill: f64,
    /// Master peak demand cost split across clients by expense factor.
    pub demand_bill: f64,
    /// The master meter's latest total cost.
    pub master_cost: f64,
    /// What clients would have paid under their own ratchets.
    pub individual_cost: f64,
}

impl Charge {
    /// Amount the balance moved by: billed to clients minus master cost.
    pub fn margin(&self) -> f64 {
        self.energy_bill + self.demand_bill - self.master_cost
    }
}

/// Holds the company balance and the most recent bills to clients.
///
/// # Examples
///
/// ```
/// use utility_metering::account::AccountManager;
///
/// let accounts = AccountManager::new(100.0);
/// assert_eq!(accounts.company_balance(), 100.0);
/// assert_eq!(accounts.charges_applied(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct AccountManager {
    company_balance: f64,
    last_energy_bill: f64,
    last_demand_bill: f64,
    charges_applied: usize,
}

impl AccountManager {
    pub fn new(opening_balance: f64) -> Self {
        Self {
            company_balance: opening_balance,
            last_energy_bill: 0.0,
            last_demand_bill: 0.0,
            charges_applied: 0,
        }
    }

    /// Bills clients for the latest cycle and moves the company balance.
    ///
    /// Energy is billed from each client's own accrued energy cost. Demand is
    /// billed from the master's ratchet, split by expense factor, rather than
    /// from each client's individual peak. The balance then moves by the
    /// total billed minus the master's own latest total cost.
    ///
    /// # Errors
    ///
    /// Returns [`MeterError::PrematureCharge`] if any client or the master has
    /// no accrued cost yet, or the master lacks an expense factor for a client.
    pub fn charge_accounts(
        &mut self,
        master: &MasterMeter,
        clients: &[ClientMeter],
    ) -> Result<Charge, MeterError> {
        let master_meter = master.meter();
        let master_cost = *master_meter
            .total_costs()
            .last()
            .ok_or(MeterError::PrematureCharge {
                reason: "master meter has no billing cycle",
            })?;
        let ratchet = master.ratchet().ok_or(MeterError::PrematureCharge {
            reason: "master meter has no ratchet",
        })?;
        if master.expense_factors().len() < clients.len() {
            return Err(MeterError::PrematureCharge {
                reason: "expense factors missing for some clients",
            });
        }

        let mut energy_bill = 0.0;
        let mut individual_cost = 0.0;
        for client in clients {
            let (Some(energy), Some(total)) =
                (client.energy_costs().last(), client.total_costs().last())
            else {
                return Err(MeterError::PrematureCharge {
                    reason: "client has no billing cycle",
                });
            };
            energy_bill += energy;
            individual_cost += total;
        }

        let demand_rate = master_meter.tariff().demand_rate;
        let demand_bill: f64 = master.expense_factors()[..clients.len()]
            .iter()
            .map(|factor| ratchet.value as f64 * factor * demand_rate)
            .sum();

        let charge = Charge {
            energy_bill,
            demand_bill,
            master_cost,
            individual_cost,
        };
        self.last_energy_bill = energy_bill;
        self.last_demand_bill = demand_bill;
        self.company_balance += charge.margin();
        self.charges_applied += 1;

        tracing::info!(
            energy_bill,
            demand_bill,
            master_cost,
            balance = self.company_balance,
            "accounts charged"
        );
        Ok(charge)
    }

    pub fn company_balance(&self) -> f64 {
        self.company_balance
    }

    pub fn last_energy_bill(&self) -> f64 {
        self.last_energy_bill
    }

    pub fn last_demand_bill(&self) -> f64 {
        self.last_demand_bill
    }

    pub fn charges_applied(&self) -> usize {
        self.charges_applied
    }
}
