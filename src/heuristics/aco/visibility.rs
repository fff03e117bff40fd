//! Static visibility (inverse distance) matrix.

use crate::distance::DistanceMatrix;

/// Visibility used for distinct points that share a location
pub const COINCIDENT_VISIBILITY: f64 = 1e6;

/// `1 / distance(i, j)` for every `i != j`, computed once per run.
/// The diagonal is stored as zero and never read during construction.
#[derive(Debug, Clone)]
pub struct VisibilityMatrix {
    values: Vec<Vec<f64>>,
}

impl VisibilityMatrix {
    pub fn new(distances: &DistanceMatrix) -> Self {
        let n = distances.dimension();
        let mut values = vec![vec![0.0; n]; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dist = distances.distance(i, j);
                    values[i][j] = if dist > 0.0 {
                        1.0 / dist
                    } else {
                        COINCIDENT_VISIBILITY
                    };
                }
            }
        }

        VisibilityMatrix { values }
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMetric;
    use crate::instance::Point;

    #[test]
    fn test_reciprocal_distances() {
        let points = vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(2.0, 2.0),
        ];
        let distances = DistanceMatrix::new(&points, DistanceMetric::Manhattan).unwrap();
        let visibility = VisibilityMatrix::new(&distances);

        assert_eq!(visibility.dimension(), 4);
        assert!((visibility.get(0, 1) - 0.5).abs() < 1e-12);
        assert!((visibility.get(0, 2) - 0.25).abs() < 1e-12);
        assert_eq!(visibility.get(1, 0), visibility.get(0, 1));
        assert_eq!(visibility.get(2, 3), COINCIDENT_VISIBILITY);
        assert_eq!(visibility.get(1, 1), 0.0);
    }
}
