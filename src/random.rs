//! Injectable random sources.
//!
//! Solvers never touch a global RNG: every stochastic choice goes through a
//! [`RandomSource`], so a run is a deterministic function of its inputs and
//! the sequence of draws. Production runs use [`SeededRandom`] (ChaCha8);
//! tests can script the draws with [`SequenceRandom`].

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource {
    /// Next uniform draw in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Roulette-wheel choice of an index with probability proportional to
    /// its weight. Returns `None` when the weights do not form a usable
    /// distribution (empty, all zero, or a non-finite sum).
    fn weighted_choice(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().sum();
        if weights.is_empty() || !total.is_finite() || total <= 0.0 {
            return None;
        }

        let mut pick = self.next_f64() * total;
        for (idx, &weight) in weights.iter().enumerate() {
            pick -= weight;
            if pick < 0.0 {
                return Some(idx);
            }
        }

        // rounding left a sliver past the last bucket
        weights.iter().rposition(|&w| w > 0.0)
    }

    /// Uniform index in `0..len`
    fn index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// ChaCha8-backed random source
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Seeded when `seed` is given, otherwise from OS entropy
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        SeededRandom { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(Some(seed))
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    position: usize,
    draws: usize,
}

impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.0] } else { values };
        SequenceRandom {
            values,
            position: 0,
            draws: 0,
        }
    }

    /// Number of values handed out so far
    pub fn draws(&self) -> usize {
        self.draws
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        let value = self.values[self.position];
        self.position = (self.position + 1) % self.values.len();
        self.draws += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
