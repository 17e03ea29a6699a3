//! Genetic search types for methuselah discovery.
//!
//! This module provides the genome representation, search configuration, and
//! the progress/result records emitted by the search engine in
//! [`crate::compute::evolution`].

use serde::{Deserialize, Serialize};

use super::Lattice;

/// A seed genome: live cells inside the seed window.
///
/// Coordinates live in `[0, seed_window)²`. Duplicate coordinates are
/// permitted; embedding collapses them to a single live cell, so genome
/// semantics depend only on the coordinate set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genome {
    /// Opaque unique identifier. Exists so collaborators can deduplicate
    /// log lines; it plays no part in fitness, equality, or selection.
    pub id: String,
    /// Live-cell coordinates within the seed window.
    pub cells: Vec<(usize, usize)>,
}

/// Configuration for a genetic search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of genomes per GA generation.
    pub population_size: usize,
    /// Per-gene mutation probability (0.0-1.0).
    pub mutation_rate: f32,
    /// Number of best genomes carried over unchanged each generation.
    pub elite_count: usize,
    /// Simulation step cap per fitness evaluation.
    pub max_generations: u64,
    /// Edge length of the square evaluation grid.
    pub grid_size: usize,
    /// Lattice topology for evaluation runs.
    pub lattice: Lattice,
    /// B/S rule string; a malformed string falls back to the lattice default.
    pub rule: String,
    /// Boundary policy for evaluation runs.
    pub toroidal: bool,
    /// Fitness penalty for touching the border early (bounded grids only).
    pub border_penalty: f32,
    /// RNG seed for reproducible searches.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 32,
            mutation_rate: 0.2,
            elite_count: 2,
            max_generations: 200,
            grid_size: 40,
            lattice: Lattice::Square,
            rule: "B3/S23".to_string(),
            toroidal: false,
            border_penalty: 10.0,
            random_seed: None,
        }
    }
}

fn default_iterations() -> usize {
    50
}

fn default_seed_window() -> usize {
    8
}

/// Per-run options for a genetic search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Number of GA generations to run.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Edge length of the centred sub-grid genomes live in.
    #[serde(default = "default_seed_window")]
    pub seed_window: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed_window: default_seed_window(),
        }
    }
}

impl SearchConfig {
    /// Validate configuration parameters against run options.
    pub fn validate(&self, options: &SearchOptions) -> Result<(), SearchError> {
        if self.population_size < 2 {
            return Err(SearchError::PopulationTooSmall);
        }
        if !self.mutation_rate.is_finite() || !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SearchError::MutationRateOutOfRange);
        }
        if self.elite_count == 0 || self.elite_count > self.population_size {
            return Err(SearchError::EliteCountOutOfRange);
        }
        if self.max_generations == 0 {
            return Err(SearchError::ZeroMaxGenerations);
        }
        if !self.border_penalty.is_finite() || self.border_penalty < 0.0 {
            return Err(SearchError::NegativeBorderPenalty);
        }
        if options.iterations == 0 {
            return Err(SearchError::ZeroIterations);
        }
        if options.seed_window == 0 {
            return Err(SearchError::ZeroSeedWindow);
        }
        if self.grid_size < options.seed_window {
            return Err(SearchError::GridSmallerThanWindow {
                grid: self.grid_size,
                window: options.seed_window,
            });
        }
        Ok(())
    }
}

/// Progress record emitted once per GA generation.
///
/// `best_fitness` and `best_genome` describe the best genome observed so
/// far in the run, not necessarily one from the current generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProgress {
    /// GA generation index, strictly increasing within a run.
    pub generation: usize,
    /// Best fitness observed so far; monotone non-decreasing.
    pub best_fitness: f32,
    /// Population size.
    pub population: usize,
    /// Best genome observed so far.
    pub best_genome: Genome,
}

/// Per-generation fitness history of a search run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHistory {
    /// Best fitness per GA generation.
    pub best_fitness: Vec<f32>,
    /// Mean population fitness per GA generation.
    pub mean_fitness: Vec<f32>,
}

/// Why a search run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    /// All requested GA generations completed.
    Completed,
    /// The cancellation flag was observed before the next generation.
    Cancelled,
}

/// Aggregate statistics of a search run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchStats {
    /// GA generations completed.
    pub generations: usize,
    /// Total fitness evaluations performed.
    pub total_evaluations: u64,
    /// Why the run stopped.
    pub stop_reason: StopReason,
}

/// Final outcome of a search run.
///
/// The control surface forwards this to its collaborator only when
/// `stats.stop_reason` is [`StopReason::Completed`]; a cancelled run emits
/// no result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Best genome found across the whole run.
    pub best_genome: Genome,
    /// Fitness of the best genome.
    pub best_fitness: f32,
    /// Run statistics.
    pub stats: SearchStats,
    /// Per-generation fitness history.
    pub history: SearchHistory,
}

/// Search configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Mutation rate must be within [0, 1]")]
    MutationRateOutOfRange,
    #[error("Elite count must be within [1, population size]")]
    EliteCountOutOfRange,
    #[error("Simulation generation cap must be non-zero")]
    ZeroMaxGenerations,
    #[error("Border penalty must be non-negative")]
    NegativeBorderPenalty,
    #[error("Iteration count must be non-zero")]
    ZeroIterations,
    #[error("Seed window must be non-zero")]
    ZeroSeedWindow,
    #[error("Grid size {grid} is smaller than seed window {window}")]
    GridSmallerThanWindow { grid: usize, window: usize },
}
