//! Destinations for per-day simulation results.

use std::io;

use super::types::DayResult;

/// Consumer of day results as the engine produces them.
pub trait DaySink {
    /// Records one billed day.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the destination cannot accept the record;
    /// the engine stops and surfaces it.
    fn record(&mut self, day: &DayResult) -> io::Result<()>;
}

/// Collects every day in memory for post-hoc reporting.
impl DaySink for Vec<DayResult> {
    fn record(&mut self, day: &DayResult) -> io::Result<()> {
        self.push(day.clone());
        Ok(())
    }
}
