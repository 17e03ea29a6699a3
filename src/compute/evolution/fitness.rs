//! Fitness evaluation: how long a seed survives inside its arena.
//!
//! A genome scores the number of generations its embedded pattern runs
//! before the engine terminates, minus a penalty for reaching the border
//! early on bounded grids. Evaluation never fails; zero is a valid score.

use crate::compute::Simulation;
use crate::schema::{Genome, Rule, SearchConfig, SimulationConfig};

/// Cycle-classification bound used during evaluation runs.
const EVAL_MAX_PERIOD: u64 = 50;

/// Every this many generations of border clearance cancels one penalty point.
const BORDER_GRACE_DIVISOR: f32 = 20.0;

/// Embed a genome into a zeroed `grid_size²` buffer, centred.
///
/// Cells whose target lands outside the grid are silently dropped;
/// duplicate coordinates collapse to a single live cell.
pub fn embed(genome: &Genome, grid_size: usize, seed_window: usize) -> Vec<u8> {
    let mut cells = vec![0u8; grid_size * grid_size];
    let offset = grid_size.saturating_sub(seed_window) / 2;

    for &(x, y) in &genome.cells {
        let tx = offset + x;
        let ty = offset + y;
        if tx < grid_size && ty < grid_size {
            cells[ty * grid_size + tx] = 1;
        }
    }

    cells
}

/// Evaluates genomes by running them through the simulation engine.
pub struct FitnessEvaluator {
    sim_config: SimulationConfig,
    seed_window: usize,
    max_generations: u64,
    border_penalty: f32,
    check_border: bool,
}

impl FitnessEvaluator {
    /// Build an evaluator for the given search configuration.
    ///
    /// A malformed rule string falls back to the lattice default so that
    /// evaluation itself stays infallible.
    pub fn new(config: &SearchConfig, seed_window: usize) -> Self {
        let rule = Rule::parse(&config.rule).unwrap_or_else(|_| Rule::default_for(config.lattice));

        Self {
            sim_config: SimulationConfig {
                lattice: config.lattice,
                width: config.grid_size,
                height: config.grid_size,
                rule,
                toroidal: config.toroidal,
                max_period: EVAL_MAX_PERIOD,
            },
            seed_window,
            max_generations: config.max_generations,
            border_penalty: config.border_penalty,
            check_border: !config.toroidal,
        }
    }

    /// The resolved rule used for evaluation runs.
    pub fn rule(&self) -> Rule {
        self.sim_config.rule
    }

    /// Score a genome: generations survived, border-penalized, floored at 0.
    pub fn evaluate(&self, genome: &Genome) -> f32 {
        let grid_size = self.sim_config.width;
        let seed = embed(genome, grid_size, self.seed_window);

        let Ok(mut sim) = Simulation::new(self.sim_config.clone()) else {
            // Config was validated at the control boundary; an invalid one
            // here still scores rather than fails.
            return 0.0;
        };
        sim.apply_seed(&seed);

        let mut best = 0u64;
        let mut border_at = None;
        if self.check_border && touches_border(sim.cells(), grid_size) {
            border_at = Some(0);
        }

        for _ in 0..self.max_generations {
            let stats = sim.step_stats();
            if stats.terminated {
                break;
            }
            best = stats.generation;
            if self.check_border
                && border_at.is_none()
                && touches_border(sim.cells(), grid_size)
            {
                border_at = Some(stats.generation);
            }
        }

        let mut score = best as f32;
        if let Some(first) = border_at {
            score -= (self.border_penalty - first as f32 / BORDER_GRACE_DIVISOR).max(0.0);
        }
        score.max(0.0)
    }
}

/// Whether any live cell lies on an edge row or column.
fn touches_border(cells: &[u8], size: usize) -> bool {
    let last = size - 1;
    for i in 0..size {
        if cells[i] != 0
            || cells[last * size + i] != 0
            || cells[i * size] != 0
            || cells[i * size + last] != 0
        {
            return true;
        }
    }
    false
}
