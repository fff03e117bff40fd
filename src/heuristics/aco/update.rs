//! Colony bookkeeping and the evaporation/deposit update rule.

use super::pheromone::PheromoneMatrix;
use crate::error::{AcoError, AcoResult};
use crate::solution::Tour;

/// One ant's tour and its length
#[derive(Debug, Clone)]
pub struct AntTour {
    pub tour: Tour,
    pub length: f64,
}

/// Tours produced by all ants in one iteration
#[derive(Debug, Clone, Default)]
pub struct Colony {
    ants: Vec<AntTour>,
}

impl Colony {
    pub fn with_capacity(num_ants: usize) -> Self {
        Colony {
            ants: Vec::with_capacity(num_ants),
        }
    }

    pub fn push(&mut self, tour: Tour, length: f64) {
        self.ants.push(AntTour { tour, length });
    }

    pub fn ants(&self) -> &[AntTour] {
        &self.ants
    }

    pub fn len(&self) -> usize {
        self.ants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ants.is_empty()
    }

    /// Shortest finite tour of the iteration (first one on ties)
    pub fn iteration_best(&self) -> Option<&AntTour> {
        self.ants
            .iter()
            .filter(|ant| ant.length.is_finite())
            .fold(None, |best: Option<&AntTour>, ant| match best {
                Some(b) if b.length <= ant.length => Some(b),
                _ => Some(ant),
            })
    }
}

/// What an update did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Ants whose deposit was applied
    pub deposited: usize,
    /// Ants skipped because of a numeric anomaly
    pub skipped: usize,
}

/// Evaporation followed by a `Q / length` deposit on every edge an ant used
#[derive(Debug, Clone, Copy)]
pub struct PheromoneUpdateRule {
    evaporation_rate: f64,
    deposit_constant: f64,
}

impl PheromoneUpdateRule {
    pub fn new(evaporation_rate: f64, deposit_constant: f64) -> AcoResult<Self> {
        if !(0.0..1.0).contains(&evaporation_rate) {
            return Err(AcoError::config(format!(
                "evaporation rate must lie in [0, 1), got {}",
                evaporation_rate
            )));
        }
        if !deposit_constant.is_finite() || deposit_constant <= 0.0 {
            return Err(AcoError::config(format!(
                "deposit constant Q must be finite and > 0, got {}",
                deposit_constant
            )));
        }

        Ok(PheromoneUpdateRule {
            evaporation_rate,
            deposit_constant,
        })
    }

    /// Amount an ant with a tour of `length` lays on each of its edges
    pub fn deposit_amount(&self, length: f64) -> AcoResult<f64> {
        if !length.is_finite() || length <= 0.0 {
            return Err(AcoError::numeric(format!(
                "tour length {} cannot receive a deposit",
                length
            )));
        }
        let amount = self.deposit_constant / length;
        if !amount.is_finite() {
            return Err(AcoError::numeric(format!(
                "deposit Q / {} is not finite",
                length
            )));
        }
        Ok(amount)
    }

    /// Apply one iteration's update. Must only be called once every ant of
    /// the iteration has finished building its tour.
    ///
    /// Anomalous ants (zero or non-finite length, overflowing deposit) are
    /// logged and skipped; the rest of the colony still deposits.
    pub fn apply(&self, pheromone: &mut PheromoneMatrix, colony: &Colony) -> AcoResult<UpdateOutcome> {
        pheromone.evaporate(self.evaporation_rate)?;

        let mut outcome = UpdateOutcome::default();
        for (ant_idx, ant) in colony.ants().iter().enumerate() {
            match self.deposit_tour(pheromone, ant) {
                Ok(()) => outcome.deposited += 1,
                Err(err) if err.is_recoverable() => {
                    log::warn!("skipping deposit for ant {}: {}", ant_idx, err);
                    outcome.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(outcome)
    }

    fn deposit_tour(&self, pheromone: &mut PheromoneMatrix, ant: &AntTour) -> AcoResult<()> {
        let amount = self.deposit_amount(ant.length)?;
        pheromone.deposit_edges(ant.tour.edges(), amount)
    }

    pub fn evaporation_rate(&self) -> f64 {
        self.evaporation_rate
    }

    pub fn deposit_constant(&self) -> f64 {
        self.deposit_constant
    }
}
