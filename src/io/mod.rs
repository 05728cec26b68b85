//! Output sinks: CSV day export and JSON state snapshots.

pub mod export;
pub mod snapshot;
