use rand::{Rng, SeedableRng, rngs::StdRng};

use super::ReadingSource;
use crate::config::RandomWalkConfig;

/// Bounded random walk producing daily consumption for many clients.
///
/// Each client draws from its own RNG seeded with `seed + client index`, so a
/// client's stream does not depend on how many other clients exist.
///
/// Per call, in order:
/// - with probability `1 / spike_one_in`, emit a spike in `[spike_min, spike_max]`;
/// - with no previous value, start in `[initial_min, initial_max]`;
/// - at `ceiling`, step down by 0 or 1;
/// - at 0, step up by 0 or 1;
/// - below `ceiling`, move by -1, 0, or +1;
/// - above `ceiling` (after a spike), settle back into `[settle_min, settle_max]`.
///
/// # Examples
///
/// ```
/// use utility_metering::config::RandomWalkConfig;
/// use utility_metering::sources::{RandomWalk, ReadingSource};
///
/// let mut walk = RandomWalk::new(&RandomWalkConfig::default(), 2, 42);
/// let first = walk.next_value(0, None);
/// assert!(first.is_some());
/// assert_eq!(walk.next_value(5, None), None);
/// ```
#[derive(Debug, Clone)]
pub struct RandomWalk {
    params: RandomWalkConfig,
    rngs: Vec<StdRng>,
}

impl RandomWalk {
    /// Creates a walk for `clients` independent streams.
    ///
    /// # Arguments
    ///
    /// * `params` - Walk bounds and spike frequency
    /// * `clients` - Number of client streams
    /// * `seed` - Master seed; client `i` uses `seed + i`
    ///
    /// # Panics
    ///
    /// Panics if any configured range has `min > max`.
    /// `ScenarioConfig::validate` rejects such configs.
    pub fn new(params: &RandomWalkConfig, clients: usize, seed: u64) -> Self {
        assert!(params.spike_min <= params.spike_max, "spike range is empty");
        assert!(params.initial_min <= params.initial_max, "initial range is empty");
        assert!(params.settle_min <= params.settle_max, "settle range is empty");
        let rngs = (0..clients)
            .map(|i| StdRng::seed_from_u64(seed.wrapping_add(i as u64)))
            .collect();
        Self {
            params: params.clone(),
            rngs,
        }
    }

    fn step(params: &RandomWalkConfig, rng: &mut StdRng, previous: Option<i64>) -> i64 {
        let p = params;
        if rng.random_range(0..p.spike_one_in.max(1)) == 0 {
            return rng.random_range(p.spike_min..=p.spike_max);
        }
        let Some(current) = previous else {
            return rng.random_range(p.initial_min..=p.initial_max);
        };

        if current == p.ceiling {
            current - rng.random_range(0..=1)
        } else if current == 0 {
            current + rng.random_range(0..=1)
        } else if current < p.ceiling {
            current + rng.random_range(-1..=1)
        } else {
            rng.random_range(p.settle_min..=p.settle_max)
        }
    }
}

impl ReadingSource for RandomWalk {
    fn next_value(&mut self, client: usize, previous: Option<i64>) -> Option<i64> {
        let rng = self.rngs.get_mut(client)?;
        Some(Self::step(&self.params, rng, previous))
    }
}
