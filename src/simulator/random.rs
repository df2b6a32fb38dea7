//! Injectable randomness for the telemetry simulator.
//!
//! Distribution parameters are plain data ([`UniformRange`], weight tables) and
//! are sampled through a [`RandomSource`], so a seeded or scripted source
//! reproduces exact telemetry and byte sequences.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Source of the two kinds of draws the simulator needs.
pub trait RandomSource: Send {
    /// Uniform integer in `min..=max`.
    fn uniform(&mut self, min: i32, max: i32) -> i32;

    /// Index into `weights`, chosen with probability proportional to its weight.
    fn weighted_index(&mut self, weights: &[u32]) -> usize;
}

/// Inclusive uniform integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniformRange {
    /// Smallest value that can be drawn
    pub min: i32,
    /// Largest value that can be drawn
    pub max: i32,
}

impl UniformRange {
    /// Create a range covering `min..=max`.
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`.
    pub const fn fixed(value: i32) -> Self {
        Self::new(value, value)
    }

    /// Symmetric jitter range `-amplitude..=amplitude`.
    pub const fn jitter(amplitude: i32) -> Self {
        Self::new(-amplitude, amplitude)
    }

    /// Whether the range contains at least one value.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Draw a value from this range.
    pub fn sample(&self, rng: &mut dyn RandomSource) -> i32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.uniform(self.min, self.max)
    }
}

/// Pick an index from a weight table.
///
/// Falls back to index 0 when the table is empty or all weights are zero;
/// profiles reject such tables before they reach the simulator.
pub fn sample_weighted(rng: &mut dyn RandomSource, weights: &[u32]) -> usize {
    if weights.iter().all(|&w| w == 0) {
        return 0;
    }
    rng.weighted_index(weights).min(weights.len() - 1)
}

/// [`RandomSource`] backed by the standard seedable generator.
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// Generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic generator.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self, min: i32, max: i32) -> i32 {
        self.rng.gen_range(min..=max)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> usize {
        match WeightedIndex::new(weights) {
            Ok(dist) => dist.sample(&mut self.rng),
            Err(_) => 0,
        }
    }
}

/// Scripted [`RandomSource`] replaying fixed answers, for golden tests.
///
/// Uniform draws pop from `uniforms` (clamped into the requested range) and
/// weighted draws pop from `indices`. An exhausted script answers with the
/// lower bound and index 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    uniforms: std::collections::VecDeque<i32>,
    indices: std::collections::VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(uniforms: impl IntoIterator<Item = i32>, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            uniforms: uniforms.into_iter().collect(),
            indices: indices.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self, min: i32, max: i32) -> i32 {
        self.uniforms.pop_front().unwrap_or(min).clamp(min, max)
    }

    fn weighted_index(&mut self, weights: &[u32]) -> usize {
        self.indices
            .pop_front()
            .unwrap_or(0)
            .min(weights.len().saturating_sub(1))
    }
}
