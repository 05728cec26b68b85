//! Utility metering with demand-ratchet billing and proportional
//! redistribution of demand cost across client meters.

/// Company balance and periodic client charges.
pub mod account;
pub mod config;
pub mod error;
pub mod io;
pub mod meter;
pub mod observability;
/// Simulation engine, calendar, sinks, and reporting.
pub mod sim;
pub mod sources;
