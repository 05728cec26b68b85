//! CSV export for simulation day results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::sink::DaySink;
use crate::sim::types::DayResult;

/// Schema v1 column header for CSV day export.
const HEADER: &str = "day,date,master_reading,window_total,ratchet_date,ratchet_value,\
                       accrued,energy_bill,demand_bill,master_cost,company_balance";

/// Streams day results as CSV rows into any writer.
///
/// The header is written on construction, so an empty run still yields a
/// valid one-line file.
pub struct CsvSink<W: Write> {
    wtr: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    /// Creates a sink and writes the schema v1 header.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if the header cannot be written.
    pub fn new(writer: W) -> io::Result<Self> {
        let mut wtr = csv::WriterBuilder::new().from_writer(writer);
        wtr.write_record(HEADER.split(',').map(str::trim))?;
        Ok(Self { wtr })
    }

    /// Flushes buffered rows and returns the underlying writer.
    pub fn into_inner(self) -> io::Result<W> {
        self.wtr.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> DaySink for CsvSink<W> {
    fn record(&mut self, r: &DayResult) -> io::Result<()> {
        let (energy, demand, master) = match &r.charge {
            Some(c) => (
                format!("{:.4}", c.energy_bill),
                format!("{:.4}", c.demand_bill),
                format!("{:.4}", c.master_cost),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        self.wtr.write_record(&[
            r.day.to_string(),
            r.date.to_string(),
            r.master_reading.to_string(),
            r.window_total.to_string(),
            r.ratchet.timestamp.to_string(),
            r.ratchet.value.to_string(),
            r.accrued.to_string(),
            energy,
            demand,
            master,
            format!("{:.4}", r.company_balance),
        ])?;
        Ok(())
    }
}

/// Exports simulation results to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[DayResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes simulation results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[DayResult], writer: impl Write) -> io::Result<()> {
    let mut sink = CsvSink::new(writer)?;
    for r in results {
        sink.record(r)?;
    }
    sink.into_inner()?.flush()
}
