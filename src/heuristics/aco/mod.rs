//! Ant Colony Optimization for small delivery routes.
//!
//! This module implements the classic Ant System: every ant builds a tour
//! with pheromone+visibility weighted random choices, then the whole matrix
//! evaporates and each ant deposits `Q / length` on the edges it walked.
//!
//! Each iteration runs in two strictly ordered phases. During construction
//! the ants share an immutable borrow of the pheromone matrix; the update
//! phase takes the only mutable borrow after the colony is complete.

pub mod construction;
pub mod pheromone;
pub mod update;
pub mod visibility;

pub use construction::TourConstructor;
pub use pheromone::{PheromoneMatrix, PHEROMONE_FLOOR};
pub use update::{AntTour, Colony, PheromoneUpdateRule, UpdateOutcome};
pub use visibility::{VisibilityMatrix, COINCIDENT_VISIBILITY};

use crate::distance::{DistanceMatrix, DistanceMetric};
use crate::error::{AcoError, AcoResult};
use crate::instance::RouteInstance;
use crate::random::{RandomSource, SeededRandom};
use crate::solution::{BestTracker, RouteSolution};

/// ACO configuration parameters
#[derive(Debug, Clone)]
pub struct AcoConfig {
    /// Number of ants per iteration
    pub num_ants: usize,
    /// Number of iterations
    pub num_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Visibility importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho), in [0, 1)
    pub evaporation_rate: f64,
    /// Pheromone deposit factor (Q)
    pub deposit_constant: f64,
    /// Initial pheromone level
    pub initial_pheromone: f64,
    /// Metric used for distances and visibility
    pub distance_metric: DistanceMetric,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        AcoConfig {
            num_ants: 10,
            num_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.5,
            deposit_constant: 100.0,
            initial_pheromone: 1.0,
            distance_metric: DistanceMetric::Manhattan,
            seed: None,
        }
    }
}

impl AcoConfig {
    /// Check every parameter range
    pub fn validate(&self) -> AcoResult<()> {
        if self.num_ants == 0 {
            return Err(AcoError::config("num_ants must be > 0"));
        }
        if self.num_iterations == 0 {
            return Err(AcoError::config("num_iterations must be > 0"));
        }
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(AcoError::config(format!("alpha must be finite and >= 0, got {}", self.alpha)));
        }
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(AcoError::config(format!("beta must be finite and >= 0, got {}", self.beta)));
        }
        if !(0.0..1.0).contains(&self.evaporation_rate) {
            return Err(AcoError::config(format!(
                "evaporation rate must lie in [0, 1), got {}",
                self.evaporation_rate
            )));
        }
        if !self.deposit_constant.is_finite() || self.deposit_constant <= 0.0 {
            return Err(AcoError::config(format!(
                "deposit constant Q must be finite and > 0, got {}",
                self.deposit_constant
            )));
        }
        if !self.initial_pheromone.is_finite() || self.initial_pheromone <= 0.0 {
            return Err(AcoError::config(format!(
                "initial pheromone must be finite and > 0, got {}",
                self.initial_pheromone
            )));
        }
        Ok(())
    }
}

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Matrices initialized, no iteration run yet
    Idle,
    /// At least one iteration done, more to go
    Iterating,
    /// Iteration bound reached
    Done,
}

/// Ant colony solver
pub struct AntColony<R: RandomSource = SeededRandom> {
    config: AcoConfig,
    distances: DistanceMatrix,
    visibility: VisibilityMatrix,
    pheromone: PheromoneMatrix,
    update_rule: PheromoneUpdateRule,
    best: BestTracker,
    rng: R,
    iteration: usize,
    state: RunState,
    elapsed: f64,
}

impl AntColony<SeededRandom> {
    /// Build a colony seeded from `config.seed`
    pub fn new(instance: &RouteInstance, config: AcoConfig) -> AcoResult<Self> {
        let rng = SeededRandom::new(config.seed);
        Self::with_random_source(instance, config, rng)
    }
}

impl<R: RandomSource> AntColony<R> {
    /// Build a colony drawing from the given random source. Fails before
    /// any iteration if the configuration or the point set is invalid.
    pub fn with_random_source(instance: &RouteInstance, config: AcoConfig, rng: R) -> AcoResult<Self> {
        config.validate()?;

        let distances = instance.distance_matrix(config.distance_metric)?;
        let visibility = VisibilityMatrix::new(&distances);
        let pheromone = PheromoneMatrix::new(distances.dimension(), config.initial_pheromone)?;
        let update_rule = PheromoneUpdateRule::new(config.evaporation_rate, config.deposit_constant)?;

        Ok(AntColony {
            config,
            distances,
            visibility,
            pheromone,
            update_rule,
            best: BestTracker::new(),
            rng,
            iteration: 0,
            state: RunState::Idle,
            elapsed: 0.0,
        })
    }

    /// Run one iteration: build every ant's tour, update the best tour,
    /// then evaporate and deposit. Returns the iteration's colony.
    pub fn step(&mut self) -> AcoResult<Colony> {
        if self.state == RunState::Done {
            return Err(AcoError::logic(format!(
                "run already finished after {} iterations",
                self.iteration
            )));
        }

        let colony = self.construct_colony()?;

        for ant in colony.ants() {
            if self.best.offer(&ant.tour, ant.length) {
                log::debug!(
                    "iteration {}: new best {:.4} {:?}",
                    self.iteration,
                    ant.length,
                    ant.tour.route()
                );
            }
        }

        let outcome = self.update_rule.apply(&mut self.pheromone, &colony)?;
        if outcome.skipped > 0 {
            log::warn!(
                "iteration {}: {} of {} deposits skipped",
                self.iteration,
                outcome.skipped,
                colony.len()
            );
        }

        self.iteration += 1;
        self.state = if self.iteration >= self.config.num_iterations {
            RunState::Done
        } else {
            RunState::Iterating
        };

        Ok(colony)
    }

    /// Construction phase: one tour per ant from the current snapshot
    fn construct_colony(&mut self) -> AcoResult<Colony> {
        let constructor = TourConstructor::new(
            &self.pheromone,
            &self.visibility,
            self.config.alpha,
            self.config.beta,
        )?;

        let mut colony = Colony::with_capacity(self.config.num_ants);
        for _ in 0..self.config.num_ants {
            let tour = constructor.construct(&mut self.rng)?;
            let length = tour.length(&self.distances);
            colony.push(tour, length);
        }
        Ok(colony)
    }

    /// Run the remaining iterations and return the best route found
    pub fn run(&mut self) -> AcoResult<RouteSolution> {
        let start = std::time::Instant::now();

        if self.state == RunState::Idle {
            log::info!(
                "ACO: {} points, {} ants, {} iterations, alpha={}, beta={}, rho={}, Q={}, metric={}",
                self.distances.dimension(),
                self.config.num_ants,
                self.config.num_iterations,
                self.config.alpha,
                self.config.beta,
                self.config.evaporation_rate,
                self.config.deposit_constant,
                self.distances.metric()
            );
        }

        while self.state != RunState::Done {
            self.step()?;
        }
        self.elapsed += start.elapsed().as_secs_f64();

        let solution = self.best_solution()?;
        log::info!("ACO finished: cost {:.4}, route {:?}", solution.cost, solution.route);
        Ok(solution)
    }

    /// Best route found so far
    pub fn best_solution(&self) -> AcoResult<RouteSolution> {
        let mut solution = self
            .best
            .to_solution("ACO")
            .ok_or_else(|| AcoError::logic("no tour has been constructed yet"))?;
        solution.computation_time = self.elapsed;
        solution.iterations = Some(self.iteration);
        Ok(solution)
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    pub fn visibility(&self) -> &VisibilityMatrix {
        &self.visibility
    }

    pub fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn best_cost(&self) -> f64 {
        self.best.cost()
    }
}
