/// Calendar clock handing out simulation dates.
pub mod clock;
pub mod engine;
/// Post-hoc billing report.
pub mod kpi;
pub mod sink;
pub mod types;
