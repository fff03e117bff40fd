//! Pheromone matrix.

use crate::error::{AcoError, AcoResult};

/// Smallest value a pheromone entry may take. Keeping entries strictly
/// positive means no edge ever gets a permanent zero selection probability.
pub const PHEROMONE_FLOOR: f64 = 1e-12;

/// Square matrix of edge attractiveness values
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    values: Vec<Vec<f64>>,
}

impl PheromoneMatrix {
    /// Uniform `n x n` matrix
    pub fn new(n: usize, initial: f64) -> AcoResult<Self> {
        if !initial.is_finite() || initial <= 0.0 {
            return Err(AcoError::config(format!(
                "initial pheromone must be finite and > 0, got {}",
                initial
            )));
        }

        Ok(PheromoneMatrix {
            values: vec![vec![initial.max(PHEROMONE_FLOOR); n]; n],
        })
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Multiply every entry by `1 - rate`, clamped at [`PHEROMONE_FLOOR`]
    pub fn evaporate(&mut self, rate: f64) -> AcoResult<()> {
        if !(0.0..1.0).contains(&rate) {
            return Err(AcoError::config(format!(
                "evaporation rate must lie in [0, 1), got {}",
                rate
            )));
        }

        let keep = 1.0 - rate;
        for row in &mut self.values {
            for value in row.iter_mut() {
                *value = (*value * keep).max(PHEROMONE_FLOOR);
            }
        }
        Ok(())
    }

    /// Add `amount` to the `(from, to)` entry. The matrix is left untouched
    /// if the amount is negative or non-finite, or the sum would overflow.
    pub fn deposit(&mut self, from: usize, to: usize, amount: f64) -> AcoResult<()> {
        self.values[from][to] = self.checked_sum(from, to, amount)?;
        Ok(())
    }

    /// Deposit on both directions of an edge; all or nothing
    pub fn deposit_symmetric(&mut self, i: usize, j: usize, amount: f64) -> AcoResult<()> {
        if i == j {
            return self.deposit(i, j, amount);
        }
        let forward = self.checked_sum(i, j, amount)?;
        let backward = self.checked_sum(j, i, amount)?;
        self.values[i][j] = forward;
        self.values[j][i] = backward;
        Ok(())
    }

    /// Deposit `amount` on both directions of every edge; all or nothing.
    /// Every resulting entry is checked before any is written, so a
    /// rejected tour leaves the matrix unchanged.
    pub fn deposit_edges<I>(&mut self, edges: I, amount: f64) -> AcoResult<()>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut staged: Vec<(usize, usize, f64)> = Vec::new();

        for (i, j) in edges {
            let reverse = (i != j).then_some((j, i));
            for (from, to) in std::iter::once((i, j)).chain(reverse) {
                match staged.iter_mut().find(|(f, t, _)| *f == from && *t == to) {
                    Some(entry) => {
                        let updated = entry.2 + amount;
                        if !updated.is_finite() {
                            return Err(AcoError::numeric(format!(
                                "pheromone on edge ({}, {}) would overflow",
                                from, to
                            )));
                        }
                        entry.2 = updated;
                    }
                    None => staged.push((from, to, self.checked_sum(from, to, amount)?)),
                }
            }
        }

        for (from, to, value) in staged {
            self.values[from][to] = value;
        }
        Ok(())
    }

    fn checked_sum(&self, from: usize, to: usize, amount: f64) -> AcoResult<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AcoError::numeric(format!(
                "deposit amount must be finite and >= 0, got {}",
                amount
            )));
        }

        let updated = self.values[from][to] + amount;
        if !updated.is_finite() {
            return Err(AcoError::numeric(format!(
                "pheromone on edge ({}, {}) would overflow",
                from, to
            )));
        }
        Ok(updated)
    }

    /// Smallest entry
    pub fn min_value(&self) -> f64 {
        self.values
            .iter()
            .flat_map(|row| row.iter())
            .cloned()
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest entry
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flat_map(|row| row.iter())
            .cloned()
            .fold(0.0, f64::max)
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}
