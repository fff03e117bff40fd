//! Solvers for the delivery routing problem.
//! 
//! This module exports the ant colony solver along with the exhaustive
//! and genetic solvers used for comparison.

pub mod aco;
pub mod brute_force;
pub mod genetic;

pub use aco::*;
pub use brute_force::*;
pub use genetic::*;
