//! Lattice Life - Cellular automata on square and hex lattices with a
//! genetic methuselah search.
//!
//! This crate provides a deterministic B/S-rule stepper over square
//! (8-neighbor) and hexagonal (6-neighbor, odd-row offset) grids with
//! bounded or toroidal boundaries, Zobrist-hash cycle detection that
//! classifies termination as extinction, periodic, or steady, and a
//! genetic search over seed patterns that rewards long-lived,
//! border-avoiding configurations.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, rule, and search types
//! - `compute`: Stepping kernel, hashing, cycle tracking, and the search
//!
//! # Example
//!
//! ```rust,no_run
//! use lattice_life::{
//!     compute::Simulation,
//!     schema::{Lattice, Rule, SimulationConfig},
//! };
//!
//! let config = SimulationConfig {
//!     lattice: Lattice::Square,
//!     width: 64,
//!     height: 64,
//!     rule: Rule::parse("B3/S23")?,
//!     toroidal: true,
//!     max_period: 50,
//! };
//!
//! let mut sim = Simulation::new(config)?;
//! sim.randomize(0.3, 42);
//!
//! let frame = sim.run(1000);
//! println!(
//!     "generation {}: population {}",
//!     frame.stats.generation, frame.stats.population
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{Simulation, SimulationFrame, SimulationStats, Termination};
pub use schema::{Lattice, Rule, SimulationConfig};
