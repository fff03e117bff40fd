//! Module for parsing and representing delivery-route instances.
//!
//! An instance is an ordered list of 2D points where index 0 is the origin
//! (the drone base) and every other index is a delivery point. Two file
//! formats are supported: the grid map used for the hand-made scenarios, and
//! the TSPLIB `NODE_COORD_SECTION` format used for the larger benchmarks.

use crate::distance::{DistanceMatrix, DistanceMetric};
use crate::error::{AcoError, AcoResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Grid token marking the origin
pub const ORIGIN_TOKEN: &str = "R";
/// Grid token marking an empty cell
pub const EMPTY_TOKEN: &str = "0";

/// A 2D point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Both coordinates are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A delivery-route instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteInstance {
    /// Name of the instance
    pub name: String,
    /// Display label per point (origin first)
    pub labels: Vec<String>,
    /// Point coordinates (origin first)
    pub points: Vec<Point>,
}

impl RouteInstance {
    /// Build an instance from raw points; labels are the point indices.
    pub fn from_points(name: &str, points: Vec<Point>) -> AcoResult<Self> {
        let labels = (0..points.len()).map(|i| i.to_string()).collect();
        Self::with_labels(name, labels, points)
    }

    /// Build an instance with explicit labels
    pub fn with_labels(name: &str, labels: Vec<String>, points: Vec<Point>) -> AcoResult<Self> {
        if points.len() < 2 {
            return Err(AcoError::input(format!(
                "instance '{}' needs an origin and at least one delivery point, got {} points",
                name,
                points.len()
            )));
        }
        if labels.len() != points.len() {
            return Err(AcoError::input(format!(
                "{} labels for {} points",
                labels.len(),
                points.len()
            )));
        }
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(AcoError::input(format!(
                "point {} ('{}') has a non-finite coordinate",
                idx, labels[idx]
            )));
        }

        Ok(RouteInstance {
            name: name.to_string(),
            labels,
            points,
        })
    }

    /// Parse a grid map file.
    pub fn from_grid_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let text = fs::read_to_string(&path)?;
        Self::parse_grid(&file_stem(path.as_ref()), &text)
    }

    /// Parse a grid map.
    ///
    /// The first line holds `rows cols`, followed by `rows` lines of `cols`
    /// whitespace-separated tokens. `0` is an empty cell, `R` the origin and
    /// any other token a delivery point named by that token. Point coordinates
    /// are `(row, col)`. Delivery points are ordered by label, numeric labels
    /// first in numeric order (`2` before `10`), then the rest alphabetically.
    pub fn parse_grid(name: &str, text: &str) -> AcoResult<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = lines
            .next()
            .ok_or_else(|| AcoError::input("empty grid file"))?;
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(|t| t.parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| AcoError::input(format!("invalid grid header '{}'", header.trim())))?;
        let (rows, cols) = match dims.as_slice() {
            [rows, cols] => (*rows, *cols),
            _ => {
                return Err(AcoError::input(format!(
                    "grid header must be 'rows cols', got '{}'",
                    header.trim()
                )))
            }
        };

        let mut origin: Option<Point> = None;
        let mut deliveries: BTreeMap<LabelKey, Point> = BTreeMap::new();

        for row in 0..rows {
            let line = lines
                .next()
                .ok_or_else(|| AcoError::input(format!("grid has {} rows, expected {}", row, rows)))?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < cols {
                return Err(AcoError::input(format!(
                    "grid row {} has {} cells, expected {}",
                    row,
                    tokens.len(),
                    cols
                )));
            }

            for (col, &token) in tokens.iter().take(cols).enumerate() {
                let point = Point::new(row as f64, col as f64);
                match token {
                    EMPTY_TOKEN => {}
                    ORIGIN_TOKEN => {
                        if origin.replace(point).is_some() {
                            return Err(AcoError::input("grid contains more than one origin"));
                        }
                    }
                    label => {
                        if deliveries.insert(LabelKey::new(label), point).is_some() {
                            return Err(AcoError::input(format!(
                                "delivery point '{}' appears more than once",
                                label
                            )));
                        }
                    }
                }
            }
        }

        let origin = origin.ok_or_else(|| AcoError::input("grid has no origin 'R'"))?;

        let mut labels = vec![ORIGIN_TOKEN.to_string()];
        let mut points = vec![origin];
        for (key, point) in deliveries {
            labels.push(key.into_label());
            points.push(point);
        }

        Self::with_labels(name, labels, points)
    }

    /// Parse a TSPLIB coordinate file.
    pub fn from_tsplib_file<P: AsRef<Path>>(path: P) -> AcoResult<Self> {
        let text = fs::read_to_string(&path)?;
        Self::parse_tsplib(&file_stem(path.as_ref()), &text)
    }

    /// Parse TSPLIB text. Only `NAME` and `NODE_COORD_SECTION` are used; node
    /// ids are 1-based in the file and re-indexed from 0 in id order.
    pub fn parse_tsplib(default_name: &str, text: &str) -> AcoResult<Self> {
        let mut name = default_name.to_string();
        let mut in_coords = false;
        let mut coords: BTreeMap<usize, Point> = BTreeMap::new();

        for line in text.lines() {
            let line = line.trim();

            if line.is_empty() {
                continue;
            }
            if line == "EOF" {
                break;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                in_coords = true;
                continue;
            }

            if !in_coords {
                if let Some((key, value)) = line.split_once(':') {
                    if key.trim() == "NAME" {
                        name = value.trim().to_string();
                    }
                }
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(AcoError::input(format!("invalid coordinate line '{}'", line)));
            }
            let id: usize = parts[0]
                .parse()
                .map_err(|_| AcoError::input(format!("invalid node id '{}'", parts[0])))?;
            let x: f64 = parts[1]
                .parse()
                .map_err(|_| AcoError::input(format!("invalid x coordinate '{}'", parts[1])))?;
            let y: f64 = parts[2]
                .parse()
                .map_err(|_| AcoError::input(format!("invalid y coordinate '{}'", parts[2])))?;
            if id == 0 {
                return Err(AcoError::input("TSPLIB node ids start at 1"));
            }
            if coords.insert(id, Point::new(x, y)).is_some() {
                return Err(AcoError::input(format!("node {} is listed twice", id)));
            }
        }

        if coords.is_empty() {
            return Err(AcoError::input("no NODE_COORD_SECTION entries found"));
        }

        let labels = coords.keys().map(|id| (id - 1).to_string()).collect();
        let points = coords.into_values().collect();

        Self::with_labels(&name, labels, points)
    }

    /// Number of points, origin included
    pub fn dimension(&self) -> usize {
        self.points.len()
    }

    /// Number of delivery points
    pub fn num_deliveries(&self) -> usize {
        self.points.len() - 1
    }

    /// Distance matrix under the given metric
    pub fn distance_matrix(&self, metric: DistanceMetric) -> AcoResult<DistanceMatrix> {
        DistanceMatrix::new(&self.points, metric)
    }

    /// Render a route (origin implied) using point labels
    pub fn route_labels(&self, route: &[usize]) -> String {
        route
            .iter()
            .map(|&i| self.labels.get(i).map(String::as_str).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Get statistics about the instance
    pub fn statistics(&self, metric: DistanceMetric) -> AcoResult<InstanceStatistics> {
        let distances = self.distance_matrix(metric)?.pairwise();
        let avg_distance = distances.iter().sum::<f64>() / distances.len() as f64;
        let min_distance = distances.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        Ok(InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension(),
            metric,
            avg_distance,
            min_distance,
            max_distance,
        })
    }
}

/// Sort key for grid labels
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LabelKey {
    Number(u64, String),
    Text(String),
}

impl LabelKey {
    fn new(label: &str) -> Self {
        match label.parse::<u64>() {
            Ok(n) => LabelKey::Number(n, label.to_string()),
            Err(_) => LabelKey::Text(label.to_string()),
        }
    }

    fn into_label(self) -> String {
        match self {
            LabelKey::Number(_, label) | LabelKey::Text(label) => label,
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "instance".to_string())
}

/// Statistics about an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Points: {} (1 origin + {} deliveries)", self.dimension, self.dimension - 1)?;
        writeln!(f, "  Metric: {}", self.metric)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Min distance: {:.2}", self.min_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = "4 5\n\
        0 0 0 0 D\n\
        0 A 0 0 0\n\
        0 0 0 0 C\n\
        R 0 B 0 0\n";

    #[test]
    fn test_parse_grid() {
        let instance = RouteInstance::parse_grid("drone", GRID).unwrap();

        assert_eq!(instance.dimension(), 5);
        assert_eq!(instance.labels, vec!["R", "A", "B", "C", "D"]);
        assert_eq!(instance.points[0], Point::new(3.0, 0.0));
        assert_eq!(instance.points[1], Point::new(1.0, 1.0));
        assert_eq!(instance.points[4], Point::new(0.0, 4.0));
        assert_eq!(instance.route_labels(&[2, 1, 4, 3]), "B A D C");
    }

    #[test]
    fn test_grid_numeric_labels_in_numeric_order() {
        let grid = "3 4\n\
            R 1 0 10\n\
            2 0 11 0\n\
            0 B 0 A\n";
        let instance = RouteInstance::parse_grid("numbers", grid).unwrap();

        assert_eq!(instance.labels, vec!["R", "1", "2", "10", "11", "A", "B"]);
        assert_eq!(instance.points[2], Point::new(1.0, 0.0));
        assert_eq!(instance.points[3], Point::new(0.0, 3.0));
    }

    #[test]
    fn test_grid_requires_origin() {
        let err = RouteInstance::parse_grid("g", "1 3\nA 0 B\n").unwrap_err();
        assert!(err.to_string().contains("origin"));
    }

    #[test]
    fn test_grid_rejects_duplicates_and_short_rows() {
        assert!(RouteInstance::parse_grid("g", "1 3\nA R A\n").is_err());
        assert!(RouteInstance::parse_grid("g", "1 3\nR R A\n").is_err());
        assert!(RouteInstance::parse_grid("g", "2 3\nR 0 A\n0 0\n").is_err());
        assert!(RouteInstance::parse_grid("g", "2 3\nR 0 A\n").is_err());
        assert!(RouteInstance::parse_grid("g", "x y\nR A\n").is_err());
    }

    #[test]
    fn test_grid_without_deliveries_is_rejected() {
        let err = RouteInstance::parse_grid("g", "1 2\nR 0\n").unwrap_err();
        assert!(matches!(err, AcoError::InvalidInput { .. }));
    }

    #[test]
    fn test_parse_tsplib() {
        let text = "NAME : tiny3\n\
            COMMENT : three cities\n\
            TYPE : TSP\n\
            DIMENSION : 3\n\
            EDGE_WEIGHT_TYPE : EUC_2D\n\
            NODE_COORD_SECTION\n\
            2 3.0 0.0\n\
            1 0.0 0.0\n\
            3 3.0 4.0\n\
            EOF\n";
        let instance = RouteInstance::parse_tsplib("fallback", text).unwrap();

        assert_eq!(instance.name, "tiny3");
        assert_eq!(instance.dimension(), 3);
        assert_eq!(instance.points[0], Point::new(0.0, 0.0));
        assert_eq!(instance.points[1], Point::new(3.0, 0.0));
        assert_eq!(instance.labels, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_tsplib_rejects_bad_lines() {
        assert!(RouteInstance::parse_tsplib("t", "NODE_COORD_SECTION\n1 a 2\nEOF\n").is_err());
        assert!(RouteInstance::parse_tsplib("t", "NAME: t\nEOF\n").is_err());
        assert!(RouteInstance::parse_tsplib("t", "NODE_COORD_SECTION\n1 0 0\n1 1 1\n").is_err());
    }

    #[test]
    fn test_from_points_validation() {
        assert!(RouteInstance::from_points("one", vec![Point::new(0.0, 0.0)]).is_err());
        assert!(RouteInstance::from_points(
            "nan",
            vec![Point::new(0.0, 0.0), Point::new(f64::INFINITY, 0.0)]
        )
        .is_err());

        let ok = RouteInstance::from_points("two", vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)])
            .unwrap();
        assert_eq!(ok.num_deliveries(), 1);
    }

    #[test]
    fn test_statistics() {
        let instance = RouteInstance::parse_grid("drone", GRID).unwrap();
        let stats = instance.statistics(DistanceMetric::Manhattan).unwrap();

        assert_eq!(stats.dimension, 5);
        assert!(stats.min_distance > 0.0);
        assert!(stats.max_distance >= stats.avg_distance);
        assert!(stats.to_string().contains("1 origin + 4 deliveries"));
    }
}
