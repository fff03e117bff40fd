//! ACO Route Solver Library
//!
//! Ant Colony Optimization for short delivery routes: a drone leaves an
//! origin, visits every delivery point exactly once and comes back.
//!
//! # Features
//!
//! - Grid-map and TSPLIB instance loading
//! - Manhattan or Euclidean distances
//! - Ant System with seeded, reproducible runs
//! - Repeated-run harness with route frequency tallies
//! - Brute-force and Genetic Algorithm solvers for comparison
//!
//! # Example
//!
//! ```no_run
//! use aco_route_solver::instance::RouteInstance;
//! use aco_route_solver::heuristics::aco::{AcoConfig, AntColony};
//!
//! // Load instance
//! let instance = RouteInstance::from_grid_file("map.txt").unwrap();
//!
//! // Run the colony with a fixed seed
//! let config = AcoConfig { seed: Some(42), ..Default::default() };
//! let mut colony = AntColony::new(&instance, config).unwrap();
//! let solution = colony.run().unwrap();
//!
//! println!("{} (cost {:.2})", instance.route_labels(&solution.route), solution.cost);
//! ```

pub mod distance;
pub mod error;
pub mod instance;
pub mod random;
pub mod solution;
pub mod heuristics;
pub mod benchmark;

pub use error::{AcoError, AcoResult};
pub use instance::RouteInstance;
pub use solution::RouteSolution;
