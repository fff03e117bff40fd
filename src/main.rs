//! ACO Route Solver - Command Line Interface
//!
//! Solves small delivery-route problems with Ant Colony Optimization.

use aco_route_solver::benchmark::{RepeatConfig, RepeatedRuns};
use aco_route_solver::distance::DistanceMetric;
use aco_route_solver::error::AcoResult;
use aco_route_solver::heuristics::aco::{AcoConfig, AntColony};
use aco_route_solver::heuristics::brute_force::BruteForce;
use aco_route_solver::heuristics::genetic::{GaConfig, GeneticAlgorithm};
use aco_route_solver::instance::RouteInstance;
use aco_route_solver::solution::RouteSolution;

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "aco-route-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Ant Colony Optimization for small delivery routes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance once
    Solve {
        #[command(flatten)]
        input: InputArgs,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "aco")]
        algorithm: Algorithm,

        #[command(flatten)]
        aco: AcoArgs,

        /// GA population size
        #[arg(long, default_value = "20")]
        population: usize,

        /// GA generations
        #[arg(long, default_value = "10000")]
        generations: usize,

        /// GA crossover probability
        #[arg(long, default_value = "0.8")]
        crossover_rate: f64,

        /// GA mutation probability
        #[arg(long, default_value = "0.01")]
        mutation_rate: f64,

        /// Random seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the solution as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the colony many times and tally the routes it returns
    Repeat {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        aco: AcoArgs,

        /// Number of runs
        #[arg(short, long, default_value = "30")]
        runs: usize,

        /// Base seed; run k uses seed + k - 1
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output CSV file for the run records
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze an instance
    Analyze {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to the instance file
    #[arg(short, long)]
    instance: PathBuf,

    /// Instance file format
    #[arg(short, long, value_enum, default_value = "grid")]
    format: InstanceFormat,

    /// Distance metric
    #[arg(short, long, value_enum, default_value = "manhattan")]
    metric: Metric,
}

#[derive(Args)]
struct AcoArgs {
    /// Ants per iteration
    #[arg(long, default_value = "10")]
    ants: usize,

    /// Iterations
    #[arg(long, default_value = "100")]
    iterations: usize,

    /// Pheromone importance
    #[arg(long, default_value = "1.0")]
    alpha: f64,

    /// Visibility importance
    #[arg(long, default_value = "2.0")]
    beta: f64,

    /// Evaporation rate in [0, 1)
    #[arg(long, default_value = "0.5")]
    evaporation: f64,

    /// Pheromone deposit factor Q
    #[arg(long, default_value = "100.0")]
    deposit: f64,
}

impl AcoArgs {
    fn to_config(&self, metric: DistanceMetric, seed: Option<u64>) -> AcoConfig {
        AcoConfig {
            num_ants: self.ants,
            num_iterations: self.iterations,
            alpha: self.alpha,
            beta: self.beta,
            evaporation_rate: self.evaporation,
            deposit_constant: self.deposit,
            distance_metric: metric,
            seed,
            ..Default::default()
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Ant Colony Optimization
    Aco,
    /// Genetic Algorithm
    Genetic,
    /// Exhaustive enumeration (small instances only)
    BruteForce,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum InstanceFormat {
    /// Character grid with an `R` origin
    Grid,
    /// TSPLIB NODE_COORD_SECTION
    Tsplib,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Metric {
    Manhattan,
    Euclidean,
}

impl From<Metric> for DistanceMetric {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Manhattan => DistanceMetric::Manhattan,
            Metric::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Solve {
            input,
            algorithm,
            aco,
            population,
            generations,
            crossover_rate,
            mutation_rate,
            seed,
            output,
            verbose,
        } => {
            let ga = GaConfig {
                population_size: population,
                num_generations: generations,
                crossover_rate,
                mutation_rate,
                distance_metric: input.metric.into(),
                seed,
                ..Default::default()
            };
            solve_instance(&input, algorithm, &aco, ga, seed, output, verbose)
        }

        Commands::Repeat {
            input,
            aco,
            runs,
            seed,
            output,
        } => repeat_runs(&input, &aco, runs, seed, output),

        Commands::Analyze { input } => analyze_instance(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_instance(input: &InputArgs) -> AcoResult<RouteInstance> {
    println!("Loading instance from {:?}...", input.instance);
    match input.format {
        InstanceFormat::Grid => RouteInstance::from_grid_file(&input.instance),
        InstanceFormat::Tsplib => RouteInstance::from_tsplib_file(&input.instance),
    }
}

fn solve_instance(
    input: &InputArgs,
    algorithm: Algorithm,
    aco: &AcoArgs,
    ga: GaConfig,
    seed: Option<u64>,
    output: Option<PathBuf>,
    verbose: bool,
) -> AcoResult<()> {
    let instance = load_instance(input)?;
    let metric: DistanceMetric = input.metric.into();

    if verbose {
        println!("{}", instance.statistics(metric)?);
    }

    println!("Solving with {:?} algorithm...", algorithm);

    let solution = match algorithm {
        Algorithm::Aco => {
            let mut colony = AntColony::new(&instance, aco.to_config(metric, seed))?;
            colony.run()?
        }

        Algorithm::Genetic => {
            let mut ga = GeneticAlgorithm::new(&instance, ga)?;
            ga.run()?
        }

        Algorithm::BruteForce => BruteForce::new(metric).solve(&instance)?,
    };

    print_solution(&instance, &solution);

    if let Some(out_path) = output {
        write_solution(&out_path, &solution)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    Ok(())
}

fn print_solution(instance: &RouteInstance, solution: &RouteSolution) {
    println!("\n========== Solution ==========");
    println!("Algorithm: {}", solution.algorithm);
    println!("Route: {}", instance.route_labels(&solution.route));
    println!("Cost: {:.4}", solution.cost);
    println!("Time: {:.4}s", solution.computation_time);
    if let Some(iterations) = solution.iterations {
        println!("Iterations: {}", iterations);
    }
}

fn write_solution(path: &Path, solution: &RouteSolution) -> AcoResult<()> {
    let json = serde_json::to_string_pretty(solution)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn repeat_runs(
    input: &InputArgs,
    aco: &AcoArgs,
    runs: usize,
    seed: Option<u64>,
    output: Option<PathBuf>,
) -> AcoResult<()> {
    let instance = load_instance(input)?;
    let config = RepeatConfig {
        runs,
        base_seed: seed,
    };
    let mut harness = RepeatedRuns::new(aco.to_config(input.metric.into(), None), config)?;

    let pb = ProgressBar::new(runs as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40} {pos}/{len} runs [{elapsed_precise}]") {
        pb.set_style(style);
    }

    harness.run_with(&instance, |record| {
        pb.println(format!(
            "Run {:>3}: {} (cost {:.4})",
            record.run, record.labels, record.cost
        ));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    println!("\n{}", harness.generate_report(&instance));

    if let Some(out_path) = output {
        harness.export_to_csv(&out_path)?;
        let freq_path = out_path.with_extension("frequencies.csv");
        harness.export_frequencies_csv(&freq_path)?;
        println!("Results saved to {:?} and {:?}", out_path, freq_path);
    }

    Ok(())
}

fn analyze_instance(input: &InputArgs) -> AcoResult<()> {
    let instance = load_instance(input)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics(input.metric.into())?);

    println!("Points:");
    for (label, point) in instance.labels.iter().zip(&instance.points) {
        println!("  {:>4}: ({}, {})", label, point.x, point.y);
    }

    Ok(())
}
