//! Repeated-run experiments for the ACO solver.
//!
//! Runs the colony many times on the same instance, collects the route
//! found by each run and tallies how often each route shows up.

use crate::error::{AcoError, AcoResult};
use crate::heuristics::aco::{AcoConfig, AntColony};
use crate::instance::RouteInstance;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::path::Path;

/// Result of a single ACO run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run number, starting at 1
    pub run: usize,
    /// Delivery order found by the run
    #[serde(skip)]
    pub route: Vec<usize>,
    /// Space-separated node indices
    pub route_key: String,
    /// Route rendered with point labels
    pub labels: String,
    /// Closed-tour cost
    pub cost: f64,
    /// Computation time in seconds
    pub time: f64,
}

/// How often a route was returned across all runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFrequency {
    pub route_key: String,
    pub labels: String,
    pub count: usize,
    pub cost: f64,
}

/// Aggregated cost statistics over all runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostStatistics {
    pub runs: usize,
    pub best: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub worst: f64,
}

/// Repeated-run configuration
#[derive(Debug, Clone)]
pub struct RepeatConfig {
    /// Number of independent runs
    pub runs: usize,
    /// Run `k` is seeded with `base_seed + k - 1`; `None` seeds every run
    /// from the OS
    pub base_seed: Option<u64>,
}

impl Default for RepeatConfig {
    fn default() -> Self {
        RepeatConfig {
            runs: 30,
            base_seed: None,
        }
    }
}

impl RepeatConfig {
    pub fn validate(&self) -> AcoResult<()> {
        if self.runs == 0 {
            return Err(AcoError::config("runs must be > 0"));
        }
        Ok(())
    }

    fn seed_for(&self, run: usize) -> Option<u64> {
        self.base_seed.map(|seed| seed.wrapping_add(run as u64 - 1))
    }
}

/// Repeated-run engine
pub struct RepeatedRuns {
    aco_config: AcoConfig,
    config: RepeatConfig,
    records: Vec<RunRecord>,
}

impl RepeatedRuns {
    pub fn new(aco_config: AcoConfig, config: RepeatConfig) -> AcoResult<Self> {
        aco_config.validate()?;
        config.validate()?;

        Ok(RepeatedRuns {
            aco_config,
            config,
            records: Vec::new(),
        })
    }

    /// Run the colony `runs` times on `instance`
    pub fn run(&mut self, instance: &RouteInstance) -> AcoResult<&[RunRecord]> {
        self.run_with(instance, |_| {})
    }

    /// Same as [`run`](Self::run), calling `on_run` after every finished run
    pub fn run_with<F>(&mut self, instance: &RouteInstance, mut on_run: F) -> AcoResult<&[RunRecord]>
    where
        F: FnMut(&RunRecord),
    {
        log::info!(
            "Running ACO {} times on instance: {}",
            self.config.runs,
            instance.name
        );

        self.records.clear();
        for run in 1..=self.config.runs {
            let config = AcoConfig {
                seed: self.config.seed_for(run),
                ..self.aco_config.clone()
            };

            let mut colony = AntColony::new(instance, config)?;
            let solution = colony.run()?;

            let record = RunRecord {
                run,
                route_key: solution.route_key(),
                labels: instance.route_labels(&solution.route),
                route: solution.route,
                cost: solution.cost,
                time: solution.computation_time,
            };
            log::debug!("run {}: {} (cost {:.4})", run, record.labels, record.cost);

            on_run(&record);
            self.records.push(record);
        }

        Ok(&self.records)
    }

    /// Get all run records
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Route frequencies, most frequent first
    pub fn frequencies(&self) -> Vec<RouteFrequency> {
        tally(&self.records)
    }

    /// Route returned most often; ties go to the route seen first
    pub fn most_frequent(&self) -> Option<RouteFrequency> {
        self.frequencies().into_iter().next()
    }

    /// Cost statistics, `None` before any run
    pub fn cost_statistics(&self) -> Option<CostStatistics> {
        if self.records.is_empty() {
            return None;
        }

        let costs: Vec<f64> = self.records.iter().map(|r| r.cost).collect();
        let std_dev = if costs.len() > 1 {
            costs.iter().std_dev()
        } else {
            0.0
        };

        Some(CostStatistics {
            runs: costs.len(),
            best: Statistics::min(costs.iter()),
            mean: costs.iter().mean(),
            std_dev,
            worst: Statistics::max(costs.iter()),
        })
    }

    /// Export run records to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let mut writer = csv::Writer::from_path(path)?;

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export route frequencies to CSV
    pub fn export_frequencies_csv<P: AsRef<Path>>(&self, path: P) -> AcoResult<()> {
        let mut writer = csv::Writer::from_path(path)?;

        for frequency in self.frequencies() {
            writer.serialize(frequency)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self, instance: &RouteInstance) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("      ACO Repeated-Run Report\n");
        report.push_str("========================================\n\n");
        report.push_str(&format!(
            "Instance: {} ({} points)\n",
            instance.name,
            instance.dimension()
        ));
        report.push_str(&format!(
            "Generated: {}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        if let Some(stats) = self.cost_statistics() {
            report.push_str(&format!(
                "Runs: {}  Best: {:.4}  Mean: {:.4}  Std: {:.4}  Worst: {:.4}\n\n",
                stats.runs, stats.best, stats.mean, stats.std_dev, stats.worst
            ));
        }

        report.push_str("Route Frequencies:\n");
        report.push_str("-".repeat(60).as_str());
        report.push('\n');
        report.push_str(&format!("{:<36} {:>8} {:>12}\n", "Route", "Count", "Cost"));
        report.push_str("-".repeat(60).as_str());
        report.push('\n');

        for frequency in self.frequencies() {
            report.push_str(&format!(
                "{:<36} {:>8} {:>12.4}\n",
                frequency.labels, frequency.count, frequency.cost
            ));
        }

        report.push_str("-".repeat(60).as_str());
        report.push('\n');

        if let Some(best) = self.most_frequent() {
            report.push_str(&format!(
                "\nMost frequent route: {} ({}/{} runs, cost {:.4})\n",
                best.labels,
                best.count,
                self.records.len(),
                best.cost
            ));
        }

        report
    }
}

/// Count identical routes, sorted by count (descending) and then by first
/// appearance
pub fn tally(records: &[RunRecord]) -> Vec<RouteFrequency> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut frequencies: Vec<RouteFrequency> = Vec::new();

    for record in records {
        match index.get(record.route_key.as_str()) {
            Some(&i) => frequencies[i].count += 1,
            None => {
                index.insert(&record.route_key, frequencies.len());
                frequencies.push(RouteFrequency {
                    route_key: record.route_key.clone(),
                    labels: record.labels.clone(),
                    count: 1,
                    cost: record.cost,
                });
            }
        }
    }

    // stable sort keeps first-appearance order among equal counts
    frequencies.sort_by(|a, b| b.count.cmp(&a.count));
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn record(run: usize, route: &[usize], cost: f64) -> RunRecord {
        let route_key = route
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        RunRecord {
            run,
            route: route.to_vec(),
            labels: route_key.clone(),
            route_key,
            cost,
            time: 0.0,
        }
    }

    fn square() -> RouteInstance {
        RouteInstance::from_points(
            "square",
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(0.0, 1.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_repeat_config() {
        let config = RepeatConfig::default();
        assert_eq!(config.runs, 30);
        assert!(config.validate().is_ok());
        assert!(RepeatConfig { runs: 0, ..Default::default() }.validate().is_err());

        let seeded = RepeatConfig { runs: 3, base_seed: Some(10) };
        assert_eq!(seeded.seed_for(1), Some(10));
        assert_eq!(seeded.seed_for(3), Some(12));
    }

    #[test]
    fn test_tally_orders_by_count_then_first_seen() {
        let records = vec![
            record(1, &[1, 2, 3], 4.0),
            record(2, &[3, 2, 1], 4.0),
            record(3, &[3, 2, 1], 4.0),
            record(4, &[2, 1, 3], 6.0),
            record(5, &[1, 2, 3], 4.0),
            record(6, &[2, 1, 3], 6.0),
            record(7, &[3, 2, 1], 4.0),
        ];

        let frequencies = tally(&records);
        let keys: Vec<&str> = frequencies.iter().map(|f| f.route_key.as_str()).collect();
        assert_eq!(keys, vec!["3 2 1", "1 2 3", "2 1 3"]);
        assert_eq!(frequencies[0].count, 3);
        assert_eq!(frequencies.iter().map(|f| f.count).sum::<usize>(), 7);
        assert_eq!(frequencies[2].cost, 6.0);
    }

    #[test]
    fn test_repeated_runs() {
        let aco = AcoConfig {
            num_iterations: 20,
            ..Default::default()
        };
        let config = RepeatConfig { runs: 5, base_seed: Some(42) };
        let mut runs = RepeatedRuns::new(aco, config).unwrap();

        let mut seen = Vec::new();
        let records = runs.run_with(&square(), |r| seen.push(r.run)).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);

        for r in runs.records() {
            assert_eq!(r.route.len(), 3);
            assert!(r.cost >= 4.0 - 1e-12);
        }

        let total: usize = runs.frequencies().iter().map(|f| f.count).sum();
        assert_eq!(total, 5);
        assert!(runs.most_frequent().is_some());

        let stats = runs.cost_statistics().unwrap();
        assert_eq!(stats.runs, 5);
        assert!(stats.best <= stats.mean && stats.mean <= stats.worst);

        let report = runs.generate_report(&square());
        assert!(report.contains("Most frequent route"));
    }

    #[test]
    fn test_base_seed_reproducible() {
        let aco = AcoConfig {
            num_iterations: 10,
            ..Default::default()
        };
        let config = RepeatConfig { runs: 3, base_seed: Some(7) };

        let mut a = RepeatedRuns::new(aco.clone(), config.clone()).unwrap();
        let mut b = RepeatedRuns::new(aco, config).unwrap();
        a.run(&square()).unwrap();
        b.run(&square()).unwrap();

        let keys_a: Vec<_> = a.records().iter().map(|r| r.route_key.clone()).collect();
        let keys_b: Vec<_> = b.records().iter().map(|r| r.route_key.clone()).collect();
        assert_eq!(keys_a, keys_b);
    }

    #[test]
    fn test_single_run_statistics() {
        let aco = AcoConfig {
            num_iterations: 5,
            seed: None,
            ..Default::default()
        };
        let config = RepeatConfig { runs: 1, base_seed: Some(1) };
        let mut runs = RepeatedRuns::new(aco, config).unwrap();
        assert!(runs.cost_statistics().is_none());

        runs.run(&square()).unwrap();
        let stats = runs.cost_statistics().unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.best, stats.worst);
    }
}
