use serde::{Deserialize, Serialize};
use time::Date;

/// One daily meter reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// Calendar day the reading belongs to.
    pub timestamp: Date,
    /// Metered consumption for that day.
    pub value: i64,
}

impl Reading {
    pub fn new(timestamp: Date, value: i64) -> Self {
        Self { timestamp, value }
    }
}

/// Append-only, time-ordered history of readings for a single meter.
///
/// Callers are expected to append readings in non-decreasing timestamp
/// order; the series does not check this.
///
/// # Examples
///
/// ```
/// use time::macros::date;
/// use utility_metering::meter::MeterSeries;
///
/// let mut series = MeterSeries::new();
/// series.add_point(date!(2024 - 01 - 01), 4);
/// series.add_point(date!(2024 - 01 - 02), 6);
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.last().map(|r| r.value), Some(6));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeterSeries {
    readings: Vec<Reading>,
}

impl MeterSeries {
    /// Creates an empty series with its own backing storage.
    pub fn new() -> Self {
        Self {
            readings: Vec::new(),
        }
    }

    /// Appends a reading to the end of the series.
    pub fn add_point(&mut self, timestamp: Date, value: i64) {
        self.readings.push(Reading::new(timestamp, value));
    }

    /// All readings, oldest first.
    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// The most recent reading, if any.
    pub fn last(&self) -> Option<&Reading> {
        self.readings.last()
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Returns the last `min(n, len)` readings, oldest first.
    pub fn tail(&self, n: usize) -> &[Reading] {
        let start = self.readings.len().saturating_sub(n);
        &self.readings[start..]
    }

    /// Index of the first reading stamped with `timestamp`.
    pub fn position_of(&self, timestamp: Date) -> Option<usize> {
        self.readings.iter().position(|r| r.timestamp == timestamp)
    }
}
