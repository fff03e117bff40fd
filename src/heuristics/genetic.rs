//! Genetic Algorithm for delivery routes.
//!
//! A steady, elitist GA kept apart from the ant colony: it shares the
//! distance model and the random-source abstraction but no search state.
//! - Tournament selection over distinct competitors
//! - Partially Mapped Crossover (PMX)
//! - Swap mutation
//! - Elitist survival of parents and offspring

use crate::distance::{DistanceMatrix, DistanceMetric};
use crate::error::{AcoError, AcoResult};
use crate::instance::RouteInstance;
use crate::random::{RandomSource, SeededRandom};
use crate::solution::RouteSolution;
use ordered_float::OrderedFloat;

/// Individual in the genetic algorithm population
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// Delivery order (origin implied at both ends)
    pub route: Vec<usize>,
    /// Closed-tour cost
    pub cost: f64,
}

impl Individual {
    pub fn new(route: Vec<usize>, distances: &DistanceMatrix) -> Self {
        let cost = distances.route_cost(&route);
        Individual { route, cost }
    }
}

/// Genetic Algorithm configuration
#[derive(Debug, Clone)]
pub struct GaConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations
    pub num_generations: usize,
    /// Crossover probability
    pub crossover_rate: f64,
    /// Mutation probability per offspring
    pub mutation_rate: f64,
    /// Competitors per tournament
    pub tournament_size: usize,
    /// Metric used for route costs
    pub distance_metric: DistanceMetric,
    /// Random seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        GaConfig {
            population_size: 20,
            num_generations: 10_000,
            crossover_rate: 0.8,
            mutation_rate: 0.01,
            tournament_size: 4,
            distance_metric: DistanceMetric::Euclidean,
            seed: None,
        }
    }
}

impl GaConfig {
    pub fn validate(&self) -> AcoResult<()> {
        if self.population_size < 2 {
            return Err(AcoError::config("population_size must be >= 2"));
        }
        if self.num_generations == 0 {
            return Err(AcoError::config("num_generations must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(AcoError::config(format!(
                "crossover rate must lie in [0, 1], got {}",
                self.crossover_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(AcoError::config(format!(
                "mutation rate must lie in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.tournament_size == 0 || self.tournament_size > self.population_size {
            return Err(AcoError::config(format!(
                "tournament size must lie in 1..={}, got {}",
                self.population_size, self.tournament_size
            )));
        }
        Ok(())
    }
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm<R: RandomSource = SeededRandom> {
    config: GaConfig,
    distances: DistanceMatrix,
    population: Vec<Individual>,
    rng: R,
    generation: usize,
}

impl GeneticAlgorithm<SeededRandom> {
    pub fn new(instance: &RouteInstance, config: GaConfig) -> AcoResult<Self> {
        let rng = SeededRandom::new(config.seed);
        Self::with_random_source(instance, config, rng)
    }
}

impl<R: RandomSource> GeneticAlgorithm<R> {
    pub fn with_random_source(instance: &RouteInstance, config: GaConfig, rng: R) -> AcoResult<Self> {
        config.validate()?;
        let distances = instance.distance_matrix(config.distance_metric)?;

        Ok(GeneticAlgorithm {
            config,
            distances,
            population: Vec::new(),
            rng,
            generation: 0,
        })
    }

    /// Random initial population
    fn initialize_population(&mut self) {
        self.population.clear();
        for _ in 0..self.config.population_size {
            let route = self.random_route();
            self.population.push(Individual::new(route, &self.distances));
        }
        self.sort_population();
    }

    /// Uniformly shuffled delivery order
    fn random_route(&mut self) -> Vec<usize> {
        let mut route: Vec<usize> = (1..self.distances.dimension()).collect();
        for i in (1..route.len()).rev() {
            let j = self.rng.index(i + 1);
            route.swap(i, j);
        }
        route
    }

    /// Tournament selection among distinct competitors
    fn tournament_select(&mut self) -> &Individual {
        let mut indices: Vec<usize> = (0..self.population.len()).collect();
        let mut best_idx: Option<usize> = None;

        for k in 0..self.config.tournament_size {
            let pick = k + self.rng.index(indices.len() - k);
            indices.swap(k, pick);
            let idx = indices[k];
            let better = match best_idx {
                Some(b) => self.population[idx].cost < self.population[b].cost,
                None => true,
            };
            if better {
                best_idx = Some(idx);
            }
        }

        &self.population[best_idx.unwrap_or(0)]
    }

    /// Partially Mapped Crossover (PMX)
    fn pmx_crossover(&mut self, parent1: &[usize], parent2: &[usize]) -> Vec<usize> {
        let n = parent1.len();
        if n < 2 {
            return parent1.to_vec();
        }

        let a = self.rng.index(n);
        let b = self.rng.index(n);
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        pmx(parent1, parent2, start, end)
    }

    /// Swap mutation
    fn mutate_swap(&mut self, route: &mut [usize]) {
        let n = route.len();
        if n < 2 || self.rng.next_f64() >= self.config.mutation_rate {
            return;
        }

        let i = self.rng.index(n);
        let mut j = self.rng.index(n - 1);
        if j >= i {
            j += 1;
        }
        route.swap(i, j);
    }

    /// Create new generation
    fn evolve(&mut self) {
        let pairs = self.config.population_size / 2;
        let mut offspring = Vec::with_capacity(pairs * 2);

        for _ in 0..pairs {
            let parent1 = self.tournament_select().route.clone();
            let parent2 = self.tournament_select().route.clone();

            let mut children = if self.rng.next_f64() < self.config.crossover_rate {
                [
                    self.pmx_crossover(&parent1, &parent2),
                    self.pmx_crossover(&parent2, &parent1),
                ]
            } else {
                [parent1, parent2]
            };

            for child in children.iter_mut() {
                self.mutate_swap(child);
            }
            for child in children {
                offspring.push(Individual::new(child, &self.distances));
            }
        }

        self.population.extend(offspring);
        self.sort_population();
        self.population.truncate(self.config.population_size);
        self.generation += 1;
    }

    fn sort_population(&mut self) {
        self.population.sort_by_key(|ind| OrderedFloat(ind.cost));
    }

    /// Run the genetic algorithm
    pub fn run(&mut self) -> AcoResult<RouteSolution> {
        let start = std::time::Instant::now();

        self.initialize_population();
        while self.generation < self.config.num_generations {
            self.evolve();

            if self.generation % 1000 == 0 {
                log::debug!(
                    "GA gen {}: best cost {:.4}, diversity {:.2}",
                    self.generation,
                    self.best_cost(),
                    self.population_diversity()
                );
            }
        }

        let best = self
            .population
            .first()
            .ok_or_else(|| AcoError::logic("empty population"))?;
        log::info!("GA finished: cost {:.4}, route {:?}", best.cost, best.route);

        Ok(RouteSolution {
            route: best.route.clone(),
            cost: best.cost,
            algorithm: "GeneticAlgorithm".to_string(),
            computation_time: start.elapsed().as_secs_f64(),
            iterations: Some(self.generation),
        })
    }

    /// Cost of the current best individual
    pub fn best_cost(&self) -> f64 {
        self.population.first().map_or(f64::INFINITY, |ind| ind.cost)
    }

    pub fn current_generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Average number of differing positions between individuals
    pub fn population_diversity(&self) -> f64 {
        if self.population.len() < 2 {
            return 0.0;
        }

        let mut total_diff = 0.0;
        let mut count = 0;

        for i in 0..self.population.len().min(20) {
            for j in i + 1..self.population.len().min(20) {
                let diff = self.population[i]
                    .route
                    .iter()
                    .zip(self.population[j].route.iter())
                    .filter(|(a, b)| a != b)
                    .count();
                total_diff += diff as f64;
                count += 1;
            }
        }

        total_diff / count as f64
    }
}

/// PMX with the crossover segment `start..=end` taken from `parent1`
fn pmx(parent1: &[usize], parent2: &[usize], start: usize, end: usize) -> Vec<usize> {
    let n = parent1.len();
    let max_node = parent1.iter().chain(parent2.iter()).copied().max().unwrap_or(0);

    // position of each node inside parent1's segment
    let mut in_segment = vec![None; max_node + 1];
    for i in start..=end {
        in_segment[parent1[i]] = Some(i);
    }

    let mut child = vec![0; n];
    child[start..=end].copy_from_slice(&parent1[start..=end]);

    for i in (0..start).chain(end + 1..n) {
        let mut gene = parent2[i];
        while let Some(pos) = in_segment[gene] {
            gene = parent2[pos];
        }
        child[i] = gene;
    }

    child
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::brute_force::BruteForce;
    use crate::instance::Point;

    fn create_test_instance() -> RouteInstance {
        RouteInstance::from_points(
            "test",
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(1.0, 1.0),
                Point::new(2.0, 1.0),
                Point::new(0.0, 2.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_pmx_known_example() {
        let p1 = [1, 2, 3, 4, 5, 6, 7, 8];
        let p2 = [3, 7, 5, 1, 6, 8, 2, 4];
        let child = pmx(&p1, &p2, 3, 5);
        assert_eq!(child, vec![3, 7, 8, 4, 5, 6, 2, 1]);
    }

    #[test]
    fn test_pmx_always_permutation() {
        let p1 = [4, 1, 6, 2, 5, 3];
        let p2 = [1, 2, 3, 4, 5, 6];
        for start in 0..6 {
            for end in start..6 {
                let mut child = pmx(&p1, &p2, start, end);
                child.sort_unstable();
                assert_eq!(child, vec![1, 2, 3, 4, 5, 6]);
            }
        }
    }

    #[test]
    fn test_config_validation() {
        assert!(GaConfig::default().validate().is_ok());
        assert!(GaConfig { population_size: 1, ..Default::default() }.validate().is_err());
        assert!(GaConfig { num_generations: 0, ..Default::default() }.validate().is_err());
        assert!(GaConfig { crossover_rate: 1.5, ..Default::default() }.validate().is_err());
        assert!(GaConfig { mutation_rate: -0.1, ..Default::default() }.validate().is_err());
        assert!(GaConfig { tournament_size: 21, ..Default::default() }.validate().is_err());
        assert!(GaConfig { tournament_size: 0, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_genetic_algorithm() {
        let instance = create_test_instance();
        let config = GaConfig {
            num_generations: 300,
            mutation_rate: 0.2,
            seed: Some(42),
            ..Default::default()
        };

        let mut ga = GeneticAlgorithm::new(&instance, config).unwrap();
        let solution = ga.run().unwrap();

        assert!(solution.is_complete(6));
        assert_eq!(solution.iterations, Some(300));
        assert_eq!(ga.population().len(), 20);

        let optimum = BruteForce::new(DistanceMetric::Euclidean)
            .solve(&instance)
            .unwrap();
        assert!(solution.cost >= optimum.cost - 1e-9);

        let distances = instance.distance_matrix(DistanceMetric::Euclidean).unwrap();
        assert!(solution.cost <= distances.route_cost(&[1, 2, 3, 4, 5]) + 1e-9);
        assert!((solution.recomputed_cost(&distances) - solution.cost).abs() < 1e-9);
    }

    #[test]
    fn test_best_never_worsens() {
        let instance = create_test_instance();
        let config = GaConfig {
            num_generations: 1,
            seed: Some(11),
            ..Default::default()
        };
        let mut ga = GeneticAlgorithm::new(&instance, config).unwrap();
        ga.initialize_population();

        let mut previous = ga.best_cost();
        for _ in 0..100 {
            ga.evolve();
            assert!(ga.best_cost() <= previous);
            previous = ga.best_cost();
        }
        assert_eq!(ga.current_generation(), 100);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let instance = create_test_instance();
        let config = GaConfig {
            num_generations: 50,
            seed: Some(7),
            ..Default::default()
        };

        let a = GeneticAlgorithm::new(&instance, config.clone()).unwrap().run().unwrap();
        let b = GeneticAlgorithm::new(&instance, config).unwrap().run().unwrap();
        assert_eq!(a.route, b.route);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_two_point_instance() {
        let instance =
            RouteInstance::from_points("pair", vec![Point::new(0.0, 0.0), Point::new(0.0, 3.0)])
                .unwrap();
        let config = GaConfig {
            num_generations: 5,
            seed: Some(1),
            ..Default::default()
        };
        let solution = GeneticAlgorithm::new(&instance, config).unwrap().run().unwrap();
        assert_eq!(solution.route, vec![1]);
        assert!((solution.cost - 6.0).abs() < 1e-12);
    }
}
