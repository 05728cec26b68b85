//! Reading sources that feed daily consumption values into client meters.

/// Seeded bounded random walk with occasional spikes.
pub mod random_walk;
pub mod scripted;

pub use random_walk::RandomWalk;
pub use scripted::ScriptedSource;

/// Producer of daily integer readings, one stream per client.
///
/// The engine owns the calendar, so sources only supply values. Each call
/// yields the next value for `client` given that client's previous value.
pub trait ReadingSource {
    /// Returns the next value for `client`, or `None` once the stream for
    /// that client is exhausted.
    fn next_value(&mut self, client: usize, previous: Option<i64>) -> Option<i64>;
}
