//! Meter state: reading series, client meters, and the aggregating master.

/// Client meter with window totals, ratchet tracking, and cost accrual.
pub mod client;
/// Master meter aggregating clients and deriving expense factors.
pub mod master;
pub mod series;

pub use client::{ClientMeter, Tariff};
pub use master::MasterMeter;
pub use series::{MeterSeries, Reading};
