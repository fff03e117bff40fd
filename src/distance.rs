//! Distance model over 2D points.
//!
//! Distances are computed once into an immutable, symmetric matrix with a
//! zero diagonal. Both metrics used by the drone-route instances are
//! supported: Manhattan for grid maps, Euclidean for coordinate files.

use crate::error::{AcoError, AcoResult};
use crate::instance::Point;
use serde::{Deserialize, Serialize};

/// Distance metric between two points
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Straight-line distance
    Euclidean,
    /// Sum of absolute coordinate differences
    #[default]
    Manhattan,
}

impl DistanceMetric {
    /// Distance between two points under this metric
    #[inline]
    pub fn distance(&self, p: &Point, q: &Point) -> f64 {
        let dx = p.x - q.x;
        let dy = p.y - q.y;
        match self {
            DistanceMetric::Euclidean => (dx * dx + dy * dy).sqrt(),
            DistanceMetric::Manhattan => dx.abs() + dy.abs(),
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistanceMetric::Euclidean => write!(f, "euclidean"),
            DistanceMetric::Manhattan => write!(f, "manhattan"),
        }
    }
}

/// Precomputed pairwise distances
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    metric: DistanceMetric,
    matrix: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Compute all pairwise distances. Fails if there are fewer than two
    /// points or any coordinate is not finite.
    pub fn new(points: &[Point], metric: DistanceMetric) -> AcoResult<Self> {
        let n = points.len();
        if n < 2 {
            return Err(AcoError::input(format!(
                "at least 2 points are required, got {}",
                n
            )));
        }
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(AcoError::input(format!(
                "point {} has a non-finite coordinate",
                idx
            )));
        }

        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = metric.distance(&points[i], &points[j]);
                matrix[i][j] = d;
                matrix[j][i] = d;
            }
        }

        Ok(DistanceMatrix { metric, matrix })
    }

    /// Get the distance between two points
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.matrix[i][j]
    }

    /// Number of points
    pub fn dimension(&self) -> usize {
        self.matrix.len()
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Length of a tour given as an explicit node sequence (closing edge
    /// included only if the sequence repeats its first node at the end).
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour.windows(2).map(|w| self.distance(w[0], w[1])).sum()
    }

    /// Cost of a route of delivery points with the origin implied at both ends
    pub fn route_cost(&self, route: &[usize]) -> f64 {
        if route.is_empty() {
            return 0.0;
        }

        let mut cost = self.distance(0, route[0]);
        cost += self.tour_length(route);
        cost += self.distance(route[route.len() - 1], 0);
        cost
    }

    /// All distances for i < j
    pub fn pairwise(&self) -> Vec<f64> {
        let n = self.dimension();
        let mut distances = Vec::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                distances.push(self.matrix[i][j]);
            }
        }
        distances
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_distance_calculation() {
        let points = vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)];

        let euclid = DistanceMatrix::new(&points, DistanceMetric::Euclidean).unwrap();
        assert!((euclid.distance(0, 1) - 5.0).abs() < 1e-10);
        assert!((euclid.distance(1, 0) - 5.0).abs() < 1e-10);

        let manhattan = DistanceMatrix::new(&points, DistanceMetric::Manhattan).unwrap();
        assert!((manhattan.distance(0, 1) - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_matrix_contract() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(-2.5, 7.0),
            Point::new(4.0, -1.0),
            Point::new(10.0, 3.5),
        ];
        for metric in [DistanceMetric::Euclidean, DistanceMetric::Manhattan] {
            let m = DistanceMatrix::new(&points, metric).unwrap();
            assert_eq!(m.metric(), metric);
            for i in 0..points.len() {
                assert_eq!(m.distance(i, i), 0.0);
                for j in 0..points.len() {
                    assert_eq!(m.distance(i, j), m.distance(j, i));
                    assert!(m.distance(i, j) >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_rejects_too_few_points() {
        let err = DistanceMatrix::new(&[Point::new(1.0, 1.0)], DistanceMetric::Manhattan)
            .unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput { .. }));

        let err = DistanceMatrix::new(&[], DistanceMetric::Euclidean).unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_non_finite_coordinates() {
        let points = vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)];
        assert!(DistanceMatrix::new(&points, DistanceMetric::Euclidean).is_err());
    }

    #[test]
    fn test_route_cost_on_square() {
        let m = DistanceMatrix::new(&square(), DistanceMetric::Manhattan).unwrap();
        assert!((m.route_cost(&[1, 2, 3]) - 4.0).abs() < 1e-12);
        // crossing the square diagonally twice
        assert!((m.route_cost(&[2, 1, 3]) - 6.0).abs() < 1e-12);
        assert!((m.tour_length(&[0, 1, 2, 3, 0]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_pairwise_count() {
        let m = DistanceMatrix::new(&square(), DistanceMetric::Euclidean).unwrap();
        assert_eq!(m.pairwise().len(), 6);
    }
}
