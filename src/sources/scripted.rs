use super::ReadingSource;

/// Replays fixed per-client value sequences.
///
/// Useful for deterministic runs and tests; each client stream ends when its
/// vector is used up.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    streams: Vec<Vec<i64>>,
    cursors: Vec<usize>,
}

impl ScriptedSource {
    pub fn new(streams: Vec<Vec<i64>>) -> Self {
        let cursors = vec![0; streams.len()];
        Self { streams, cursors }
    }
}

impl ReadingSource for ScriptedSource {
    fn next_value(&mut self, client: usize, _previous: Option<i64>) -> Option<i64> {
        let pos = self.cursors.get_mut(client)?;
        let value = *self.streams.get(client)?.get(*pos)?;
        *pos += 1;
        Some(value)
    }
}
