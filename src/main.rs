//! Lattice Life CLI - Run simulations, searches, and benchmarks.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use lattice_life::{
    compute::{Simulation, evolution::SearchEngine},
    schema::{SearchConfig, SearchOptions, SimulationConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "search" => cmd_search(&args[2..]),
        "bench" => cmd_bench(&args[2..]),
        "--example" => print_example_configs(),
        "--help" | "-h" => print_usage(&args[0]),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Lattice Life - Cellular Automata and Methuselah Search");
    eprintln!();
    eprintln!("Usage: {} <command> [options]", program);
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <config.json> [steps] [density]   Run a headless simulation");
    eprintln!("  search <search.json>                  Run a genetic methuselah search");
    eprintln!("  bench <config.json> [ms]              Measure stepping throughput");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --example                             Print example configurations");
    eprintln!("  --help, -h                            Show this help message");
}

/// Run spec: a simulation config plus optional initial state.
#[derive(Debug, Deserialize)]
struct RunSpec {
    config: SimulationConfig,
    /// Explicit seed cells (non-zero = live), truncated to the grid.
    #[serde(default)]
    seed: Option<Vec<u8>>,
    /// Random fill density used when no seed is given.
    #[serde(default)]
    density: Option<f32>,
    /// RNG seed for random fills.
    #[serde(default)]
    random_seed: Option<u64>,
}

/// Search spec: GA config plus run options.
#[derive(Debug, Deserialize)]
struct SearchSpec {
    config: SearchConfig,
    #[serde(default)]
    options: SearchOptions,
}

fn cmd_run(args: &[String]) {
    if args.is_empty() {
        eprintln!("Usage: lattice-life run <config.json> [steps] [density]");
        std::process::exit(1);
    }

    let spec: RunSpec = load_json(&PathBuf::from(&args[0]));
    let steps: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let density = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .or(spec.density)
        .unwrap_or(0.3);

    let mut sim = match Simulation::new(spec.config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    match &spec.seed {
        Some(seed) => sim.apply_seed(seed),
        None => sim.randomize(density, spec.random_seed.unwrap_or(42)),
    }

    println!("Lattice Life Simulation");
    println!("=======================");
    println!(
        "Grid: {}x{} ({:?}, {})",
        sim.config().width,
        sim.config().height,
        sim.config().lattice,
        if sim.config().toroidal {
            "toroidal"
        } else {
            "bounded"
        }
    );
    println!("Rule: {}", sim.config().rule);
    println!("Steps: {steps}");
    println!();

    let report_every = (steps / 10).max(1);
    for _ in 0..steps {
        let stats = sim.step_stats();
        if stats.generation % report_every == 0 || stats.terminated {
            println!(
                "generation {:>6}  population {:>6}  hash {:08x}",
                stats.generation, stats.population, stats.hash
            );
        }
        if stats.terminated {
            match (stats.reason, stats.period) {
                (Some(reason), Some(period)) => {
                    println!("Terminated: {reason:?} (period {period})")
                }
                (Some(reason), None) => println!("Terminated: {reason:?}"),
                _ => {}
            }
            break;
        }
    }

    let final_stats = sim.stats();
    println!();
    println!(
        "Final: generation {}, population {}",
        final_stats.generation, final_stats.population
    );
}

fn cmd_search(args: &[String]) {
    if args.is_empty() {
        eprintln!("Usage: lattice-life search <search.json>");
        std::process::exit(1);
    }

    let spec: SearchSpec = load_json(&PathBuf::from(&args[0]));

    let mut engine = match SearchEngine::new(spec.config, spec.options) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid search configuration: {e}");
            std::process::exit(1);
        }
    };

    println!("Methuselah Search");
    println!("=================");

    let result = engine.run_with_callback(|progress| {
        println!(
            "generation {:>4}  best fitness {:>8.1}  ({} cells in {})",
            progress.generation,
            progress.best_fitness,
            progress.best_genome.cells.len(),
            progress.best_genome.id,
        );
    });

    println!();
    println!(
        "Best genome after {} generations ({} evaluations): fitness {:.1}",
        result.stats.generations, result.stats.total_evaluations, result.best_fitness
    );
    match serde_json::to_string_pretty(&result.best_genome) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize genome: {e}"),
    }
}

fn cmd_bench(args: &[String]) {
    if args.is_empty() {
        eprintln!("Usage: lattice-life bench <config.json> [ms]");
        std::process::exit(1);
    }

    let spec: RunSpec = load_json(&PathBuf::from(&args[0]));
    let duration_ms: u64 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(2000);

    let mut sim = match Simulation::new(spec.config) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };
    sim.randomize(spec.density.unwrap_or(0.3), spec.random_seed.unwrap_or(42));

    println!(
        "Benchmarking {}x{} {:?} grid for {duration_ms} ms...",
        sim.config().width,
        sim.config().height,
        sim.config().lattice
    );

    let rate = sim.benchmark(Duration::from_millis(duration_ms));
    println!("{rate:.0} generations/second");
}

fn load_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> T {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Failed to read {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Failed to parse {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn print_example_configs() {
    println!("Example run spec (lattice-life run):");
    println!(
        r#"{{
  "config": {{
    "lattice": "square",
    "width": 128,
    "height": 128,
    "rule": "B3/S23",
    "toroidal": true,
    "max_period": 50
  }},
  "density": 0.3
}}"#
    );
    println!();
    println!("Example search spec (lattice-life search):");
    println!(
        r#"{{
  "config": {{
    "population_size": 32,
    "mutation_rate": 0.2,
    "elite_count": 2,
    "max_generations": 200,
    "grid_size": 40,
    "lattice": "square",
    "rule": "B3/S23",
    "toroidal": false,
    "border_penalty": 10.0,
    "random_seed": 42
  }},
  "options": {{ "iterations": 50, "seed_window": 8 }}
}}"#
    );
}
