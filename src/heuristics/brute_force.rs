//! Exhaustive search over every delivery order.
//!
//! Only practical for a handful of points, but gives the true optimum that
//! the stochastic solvers can be checked against.

use crate::distance::{DistanceMatrix, DistanceMetric};
use crate::error::{AcoError, AcoResult};
use crate::instance::RouteInstance;
use crate::solution::RouteSolution;

/// Largest instance (origin included) the enumeration accepts
pub const MAX_BRUTE_FORCE_POINTS: usize = 11;

/// Brute-force solver
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForce {
    pub distance_metric: DistanceMetric,
}

impl BruteForce {
    pub fn new(distance_metric: DistanceMetric) -> Self {
        BruteForce { distance_metric }
    }

    /// Cheapest route over all `(n-1)!` orders. Ties keep the route that
    /// comes first in lexicographic order.
    pub fn solve(&self, instance: &RouteInstance) -> AcoResult<RouteSolution> {
        let n = instance.dimension();
        if n > MAX_BRUTE_FORCE_POINTS {
            return Err(AcoError::input(format!(
                "brute force is limited to {} points, instance has {}",
                MAX_BRUTE_FORCE_POINTS, n
            )));
        }

        let start = std::time::Instant::now();
        let distances = instance.distance_matrix(self.distance_metric)?;
        let (route, cost, evaluated) = enumerate(&distances);

        log::info!(
            "brute force: {} routes evaluated, best cost {:.4}",
            evaluated,
            cost
        );

        Ok(RouteSolution {
            route,
            cost,
            algorithm: "BruteForce".to_string(),
            computation_time: start.elapsed().as_secs_f64(),
            iterations: Some(evaluated),
        })
    }
}

fn enumerate(distances: &DistanceMatrix) -> (Vec<usize>, f64, usize) {
    let mut route: Vec<usize> = (1..distances.dimension()).collect();
    let mut best_route = route.clone();
    let mut best_cost = distances.route_cost(&route);
    let mut evaluated = 1;

    while next_permutation(&mut route) {
        let cost = distances.route_cost(&route);
        evaluated += 1;
        if cost < best_cost {
            best_cost = cost;
            best_route.copy_from_slice(&route);
        }
    }

    (best_route, best_cost, evaluated)
}

/// Rearrange into the next lexicographic permutation; false once the
/// sequence is back at its last (descending) order.
fn next_permutation(items: &mut [usize]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    #[test]
    fn test_next_permutation_order() {
        let mut items = vec![1, 2, 3];
        let mut seen = vec![items.clone()];
        while next_permutation(&mut items) {
            seen.push(items.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 3, 1],
                vec![3, 1, 2],
                vec![3, 2, 1],
            ]
        );
    }

    #[test]
    fn test_square_optimum() {
        let instance = RouteInstance::from_points(
            "square",
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
            ],
        )
        .unwrap();
        let solution = BruteForce::new(DistanceMetric::Manhattan).solve(&instance).unwrap();

        assert!((solution.cost - 4.0).abs() < 1e-12);
        assert_eq!(solution.route, vec![2, 1, 3]);
        assert_eq!(solution.iterations, Some(6));
    }

    #[test]
    fn test_rejects_large_instances() {
        let points = (0..12).map(|i| Point::new(i as f64, 0.0)).collect();
        let instance = RouteInstance::from_points("line", points).unwrap();
        let err = BruteForce::default().solve(&instance).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput { .. }));
    }
}
