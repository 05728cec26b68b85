//! Read-only snapshot of meter and account state, serializable as JSON.

use std::io::{self, Write};

use serde::Serialize;

use crate::account::AccountManager;
use crate::meter::{ClientMeter, MasterMeter, Reading};

/// State of one meter after its most recent update.
#[derive(Debug, Clone, Serialize)]
pub struct MeterSnapshot {
    pub name: String,
    pub readings: usize,
    pub window_total: i64,
    pub ratchet: Option<Reading>,
    pub energy_costs: Vec<f64>,
    pub demand_costs: Vec<f64>,
    pub total_costs: Vec<f64>,
}

impl From<&ClientMeter> for MeterSnapshot {
    fn from(meter: &ClientMeter) -> Self {
        Self {
            name: meter.name().to_string(),
            readings: meter.series().len(),
            window_total: meter.window_total(),
            ratchet: meter.ratchet(),
            energy_costs: meter.energy_costs().to_vec(),
            demand_costs: meter.demand_costs().to_vec(),
            total_costs: meter.total_costs().to_vec(),
        }
    }
}

/// Everything a presentation layer needs: per-client and master meter
/// state, expense factors, and the company balance.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub clients: Vec<MeterSnapshot>,
    pub master: MeterSnapshot,
    pub expense_factors: Vec<f64>,
    pub company_balance: f64,
    pub last_energy_bill: f64,
    pub last_demand_bill: f64,
}

impl Snapshot {
    pub fn capture(master: &MasterMeter, clients: &[ClientMeter], accounts: &AccountManager) -> Self {
        Self {
            clients: clients.iter().map(MeterSnapshot::from).collect(),
            master: MeterSnapshot::from(master.meter()),
            expense_factors: master.expense_factors().to_vec(),
            company_balance: accounts.company_balance(),
            last_energy_bill: accounts.last_energy_bill(),
            last_demand_bill: accounts.last_demand_bill(),
        }
    }
}

/// Writes `snapshot` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an `io::Error` if serialization or writing fails.
pub fn write_snapshot_json(snapshot: &Snapshot, mut writer: impl Write) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, snapshot)?;
    writeln!(writer)?;
    writer.flush()
}
