//! Proxy selection strategies
//!
//! A selector only chooses a position in the loaded list. Parsing the chosen
//! entry is left to the pool, so any source of randomness can be plugged in.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Trait for proxy selection strategies
pub trait ProxySelector: Send + Sync {
    /// Choose an index in `0..len`
    ///
    /// Returns `None` when there is nothing to choose from
    fn select(&self, len: usize) -> Option<usize>;

    /// Get the strategy name
    fn strategy_name(&self) -> &'static str;
}

/// Uniformly random selection backed by an owned RNG
pub struct RandomSelector {
    rng: Mutex<StdRng>,
}

impl RandomSelector {
    /// Selector seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic selector, mainly for tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProxySelector for RandomSelector {
    fn select(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        Some(self.rng.lock().gen_range(0..len))
    }

    fn strategy_name(&self) -> &'static str {
        "random"
    }
}
