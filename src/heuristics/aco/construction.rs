//! Probabilistic tour construction for a single ant.

use super::pheromone::PheromoneMatrix;
use super::visibility::VisibilityMatrix;
use crate::error::{AcoError, AcoResult};
use crate::random::RandomSource;
use crate::solution::{Tour, ORIGIN};

/// Builds tours from a read-only snapshot of the pheromone and visibility
/// matrices. Holding shared borrows guarantees no ant sees a pheromone
/// matrix that is being updated.
#[derive(Debug, Clone, Copy)]
pub struct TourConstructor<'a> {
    pheromone: &'a PheromoneMatrix,
    visibility: &'a VisibilityMatrix,
    alpha: f64,
    beta: f64,
}

impl<'a> TourConstructor<'a> {
    pub fn new(
        pheromone: &'a PheromoneMatrix,
        visibility: &'a VisibilityMatrix,
        alpha: f64,
        beta: f64,
    ) -> AcoResult<Self> {
        if !alpha.is_finite() || alpha < 0.0 {
            return Err(AcoError::config(format!("alpha must be finite and >= 0, got {}", alpha)));
        }
        if !beta.is_finite() || beta < 0.0 {
            return Err(AcoError::config(format!("beta must be finite and >= 0, got {}", beta)));
        }
        if pheromone.dimension() != visibility.dimension() {
            return Err(AcoError::logic(format!(
                "pheromone matrix is {}x{} but visibility matrix is {}x{}",
                pheromone.dimension(),
                pheromone.dimension(),
                visibility.dimension(),
                visibility.dimension()
            )));
        }

        Ok(TourConstructor {
            pheromone,
            visibility,
            alpha,
            beta,
        })
    }

    /// Unnormalized attractiveness of moving from `i` to `j`:
    /// `pheromone^alpha * visibility^beta`
    #[inline]
    pub fn edge_weight(&self, i: usize, j: usize) -> f64 {
        let tau = weighted_factor(self.pheromone.get(i, j), self.alpha);
        let eta = weighted_factor(self.visibility.get(i, j), self.beta);
        tau * eta
    }

    /// Walk one ant from the origin through every point and back
    pub fn construct<R: RandomSource + ?Sized>(&self, rng: &mut R) -> AcoResult<Tour> {
        let n = self.pheromone.dimension();
        let mut nodes = Vec::with_capacity(n + 1);
        nodes.push(ORIGIN);

        let mut visited = vec![false; n];
        visited[ORIGIN] = true;

        let mut current = ORIGIN;
        let mut candidates: Vec<usize> = Vec::with_capacity(n);

        while nodes.len() < n {
            candidates.clear();
            candidates.extend((0..n).filter(|&j| !visited[j]));

            let next = self.select_next(current, &candidates, rng)?;
            nodes.push(next);
            visited[next] = true;
            current = next;
        }

        nodes.push(ORIGIN);
        Tour::closed(nodes, n)
    }

    /// Draw the next node among the unvisited `candidates`.
    ///
    /// A single candidate is returned without consuming a draw. If the
    /// weights cannot be normalized (sum is zero, NaN or infinite) the draw
    /// falls back to a uniform choice among the infinite-weight candidates,
    /// or among all candidates when none is infinite.
    pub fn select_next<R: RandomSource + ?Sized>(
        &self,
        current: usize,
        candidates: &[usize],
        rng: &mut R,
    ) -> AcoResult<usize> {
        match candidates {
            [] => Err(AcoError::logic(format!(
                "no unvisited node left to select from node {}",
                current
            ))),
            [only] => Ok(*only),
            _ => {
                let weights: Vec<f64> = candidates
                    .iter()
                    .map(|&j| self.edge_weight(current, j))
                    .collect();

                if let Some(idx) = rng.weighted_choice(&weights) {
                    return Ok(candidates[idx]);
                }

                let saturated: Vec<usize> = candidates
                    .iter()
                    .zip(&weights)
                    .filter(|(_, w)| w.is_infinite())
                    .map(|(&j, _)| j)
                    .collect();
                let pool: &[usize] = if saturated.is_empty() {
                    candidates
                } else {
                    &saturated
                };

                log::debug!(
                    "degenerate weights {:?} at node {}, drawing uniformly from {:?}",
                    weights,
                    current,
                    pool
                );
                Ok(pool[rng.index(pool.len())])
            }
        }
    }
}

/// `base^exponent`, with a zero exponent giving exactly 1
#[inline]
fn weighted_factor(base: f64, exponent: f64) -> f64 {
    if exponent == 0.0 {
        1.0
    } else {
        base.powf(exponent)
    }
}
