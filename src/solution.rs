//! Tours, route solutions and best-solution tracking.
//!
//! A [`Tour`] is the closed node sequence an ant walks (origin at both
//! ends). A [`RouteSolution`] is what solvers hand back to callers: the
//! delivery order with the origin stripped, plus its cost.

use crate::distance::DistanceMatrix;
use crate::error::{AcoError, AcoResult};
use serde::{Deserialize, Serialize};

/// Index of the origin point
pub const ORIGIN: usize = 0;

/// Closed tour starting and ending at the origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour {
    nodes: Vec<usize>,
}

impl Tour {
    /// Wrap a closed node sequence, checking that it starts and ends at the
    /// origin and visits each of the `dimension` points exactly once.
    pub fn closed(nodes: Vec<usize>, dimension: usize) -> AcoResult<Self> {
        let tour = Tour { nodes };
        if !tour.is_valid(dimension) {
            return Err(AcoError::logic(format!(
                "tour {:?} is not a closed cycle over {} points",
                tour.nodes, dimension
            )));
        }
        Ok(tour)
    }

    /// Close a route of delivery points with the origin at both ends
    pub fn from_route(route: &[usize], dimension: usize) -> AcoResult<Self> {
        let mut nodes = Vec::with_capacity(route.len() + 2);
        nodes.push(ORIGIN);
        nodes.extend_from_slice(route);
        nodes.push(ORIGIN);
        Self::closed(nodes, dimension)
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    /// Delivery order, origin stripped from both ends
    pub fn route(&self) -> &[usize] {
        &self.nodes[1..self.nodes.len() - 1]
    }

    /// Consecutive `(from, to)` pairs, closing edge included
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn length(&self, distances: &DistanceMatrix) -> f64 {
        distances.tour_length(&self.nodes)
    }

    /// Check the closed-cycle invariant
    pub fn is_valid(&self, dimension: usize) -> bool {
        if dimension < 2 || self.nodes.len() != dimension + 1 {
            return false;
        }
        if self.nodes[0] != ORIGIN || self.nodes[dimension] != ORIGIN {
            return false;
        }

        let mut seen = vec![false; dimension];
        seen[ORIGIN] = true;
        for &node in self.route() {
            if node >= dimension || seen[node] {
                return false;
            }
            seen[node] = true;
        }
        true
    }
}

/// Result of a solver run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSolution {
    /// Delivery order (origin implied at both ends)
    pub route: Vec<usize>,
    /// Total closed-tour cost
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl RouteSolution {
    pub fn from_tour(tour: &Tour, cost: f64, algorithm: &str) -> Self {
        RouteSolution {
            route: tour.route().to_vec(),
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Route is a permutation of all delivery indices
    pub fn is_complete(&self, dimension: usize) -> bool {
        Tour::from_route(&self.route, dimension).is_ok()
    }

    /// Recompute the cost from scratch
    pub fn recomputed_cost(&self, distances: &DistanceMatrix) -> f64 {
        distances.route_cost(&self.route)
    }

    /// Route as a space-separated key, used for frequency tallies
    pub fn route_key(&self) -> String {
        self.route
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl std::fmt::Display for RouteSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.4}", self.cost)?;
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Route: {:?}", self.route)
    }
}

/// Best tour seen during a run; the cost never increases.
#[derive(Debug, Clone, Default)]
pub struct BestTracker {
    best: Option<(Tour, f64)>,
}

impl BestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `tour` if it is strictly cheaper than the current best.
    /// Non-finite costs are never kept.
    pub fn offer(&mut self, tour: &Tour, cost: f64) -> bool {
        if !cost.is_finite() || cost < 0.0 {
            return false;
        }
        let improves = match &self.best {
            Some((_, best_cost)) => cost < *best_cost,
            None => true,
        };
        if improves {
            self.best = Some((tour.clone(), cost));
        }
        improves
    }

    pub fn cost(&self) -> f64 {
        self.best.as_ref().map_or(f64::INFINITY, |(_, c)| *c)
    }

    pub fn tour(&self) -> Option<&Tour> {
        self.best.as_ref().map(|(t, _)| t)
    }

    pub fn to_solution(&self, algorithm: &str) -> Option<RouteSolution> {
        self.best
            .as_ref()
            .map(|(tour, cost)| RouteSolution::from_tour(tour, *cost, algorithm))
    }
}
