//! Genetic search over seed patterns.
//!
//! Evolves small genomes inside a centred window of a larger grid, scoring
//! each by how many generations it survives without terminating and without
//! touching the border.
//!
//! # Overview
//!
//! - **Genome Operations** (`genome`): random generation, crossover, mutation
//! - **Fitness** (`fitness`): genome embedding and survival-based scoring
//! - **Search Loop** (`search`): elitist GA with progress and cancellation
//!
//! # Example
//!
//! ```rust,no_run
//! use lattice_life::compute::evolution::SearchEngine;
//! use lattice_life::schema::{SearchConfig, SearchOptions};
//!
//! let mut engine = SearchEngine::new(
//!     SearchConfig::default(),
//!     SearchOptions { iterations: 10, seed_window: 6 },
//! )
//! .unwrap();
//!
//! let result = engine.run_with_callback(|progress| {
//!     println!(
//!         "generation {}: best fitness {:.1}",
//!         progress.generation, progress.best_fitness
//!     );
//! });
//! println!("best genome survives {:.1} generations", result.best_fitness);
//! ```

mod fitness;
mod genome;
mod search;

pub use fitness::{FitnessEvaluator, embed};
pub use genome::SearchRng;
pub use search::SearchEngine;
