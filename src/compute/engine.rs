//! Simulation engine - double-buffered stepping, statistics, termination.
//!
//! The engine owns two cell buffers (`current` and `scratch`), the Zobrist
//! key table, and the cycle tracker. Both buffers are allocated at creation
//! and swapped every step; neither is ever reallocated during a run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::schema::{ConfigError, SimulationConfig};

use super::neighborhood::count_neighbors;
use super::tracker::HashTracker;
use super::zobrist::ZobristTable;

/// Why a simulation stopped advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// The population reached zero.
    Extinction,
    /// A previously seen state recurred within `max_period` steps.
    Periodic,
    /// A previously seen state recurred beyond `max_period` steps.
    Steady,
}

/// Per-step statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Generations advanced since the last reset.
    pub generation: u64,
    /// Live cells after the step.
    pub population: usize,
    /// Zobrist hash of the post-step grid.
    pub hash: u32,
    /// Whether the simulation has terminated.
    pub terminated: bool,
    /// Termination classification, present once terminated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Termination>,
    /// Cycle length, present for periodic termination.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<u64>,
}

/// Statistics plus an owned copy of the post-step cell buffer.
///
/// The buffer is disjoint from the engine's internal buffers and safe to
/// hand to another thread or collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationFrame {
    #[serde(flatten)]
    pub stats: SimulationStats,
    pub cells: Vec<u8>,
}

/// A lattice cellular automaton run.
pub struct Simulation {
    config: SimulationConfig,
    current: Vec<u8>,
    scratch: Vec<u8>,
    table: ZobristTable,
    tracker: HashTracker,
    generation: u64,
    population: usize,
    hash: u32,
    termination: Option<Termination>,
    period: Option<u64>,
}

impl Simulation {
    /// Create a simulation with both buffers zeroed.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let cell_count = config.cell_count();
        let tracker = HashTracker::new(config.max_period);
        let mut sim = Self {
            current: vec![0u8; cell_count],
            scratch: vec![0u8; cell_count],
            table: ZobristTable::new(cell_count),
            tracker,
            generation: 0,
            population: 0,
            hash: 0,
            termination: None,
            period: None,
            config,
        };
        sim.reset_tracking();
        Ok(sim)
    }

    /// Create a simulation and seed it through `initializer`, which is
    /// invoked exactly once with the current buffer. Non-zero bytes are
    /// treated as live.
    pub fn with_initializer(
        config: SimulationConfig,
        initializer: impl FnOnce(&mut [u8]),
    ) -> Result<Self, ConfigError> {
        let mut sim = Self::new(config)?;
        initializer(&mut sim.current);
        for cell in &mut sim.current {
            *cell = (*cell != 0) as u8;
        }
        sim.reset_tracking();
        Ok(sim)
    }

    /// Grid configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The current cell buffer.
    pub fn cells(&self) -> &[u8] {
        &self.current
    }

    /// Statistics for the current state.
    pub fn stats(&self) -> SimulationStats {
        SimulationStats {
            generation: self.generation,
            population: self.population,
            hash: self.hash,
            terminated: self.termination.is_some(),
            reason: self.termination,
            period: self.period,
        }
    }

    /// Current statistics plus an owned copy of the grid.
    pub fn frame(&self) -> SimulationFrame {
        SimulationFrame {
            stats: self.stats(),
            cells: self.current.clone(),
        }
    }

    /// Flip the live bit at `(x, y)` without stepping.
    ///
    /// The cached hash is updated incrementally; the cycle tracker is left
    /// untouched (interactive edits are a collaborator concern).
    pub fn toggle(&mut self, x: usize, y: usize) {
        assert!(
            x < self.config.width && y < self.config.height,
            "toggle out of range: ({x},{y}) on {}x{}",
            self.config.width,
            self.config.height
        );
        let index = y * self.config.width + x;
        self.current[index] ^= 1;
        self.hash ^= self.table.key(index);
        if self.current[index] != 0 {
            self.population += 1;
        } else {
            self.population -= 1;
        }
    }

    /// Fill the grid with independent uniform draws below `density`.
    ///
    /// Deterministic for a given `seed`; resets generation, tracker, and
    /// termination.
    pub fn randomize(&mut self, density: f32, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for cell in &mut self.current {
            *cell = (rng.r#gen::<f32>() < density) as u8;
        }
        self.scratch.fill(0);
        self.reset_tracking();
    }

    /// Replace the grid with `seed`, truncated to the cell count; any
    /// non-zero byte is a live cell. Resets generation, tracker, and
    /// termination.
    pub fn apply_seed(&mut self, seed: &[u8]) {
        self.current.fill(0);
        let take = seed.len().min(self.current.len());
        for (cell, &byte) in self.current[..take].iter_mut().zip(&seed[..take]) {
            *cell = (byte != 0) as u8;
        }
        self.scratch.fill(0);
        self.reset_tracking();
    }

    /// Advance one generation and return the resulting frame.
    ///
    /// Once terminated, the engine is frozen: further calls re-emit the
    /// terminal state without stepping, and `generation` never regresses.
    pub fn step(&mut self) -> SimulationFrame {
        self.step_stats();
        self.frame()
    }

    /// Advance one generation and return statistics only, without copying
    /// the grid. Useful for tight evaluation loops that inspect the buffer
    /// through [`Simulation::cells`].
    pub fn step_stats(&mut self) -> SimulationStats {
        if self.termination.is_some() {
            return self.stats();
        }

        let (population, hash) = self.advance();
        let generation = self.generation + 1;

        if population == 0 {
            self.termination = Some(Termination::Extinction);
        } else if let Some(period) = self.tracker.period(hash, generation) {
            if period <= self.config.max_period {
                self.termination = Some(Termination::Periodic);
                self.period = Some(period);
            } else {
                self.termination = Some(Termination::Steady);
            }
        }

        self.tracker.insert(hash, generation);
        self.generation = generation;
        self.population = population;
        self.hash = hash;
        self.stats()
    }

    /// Step up to `steps` generations, stopping early on termination, and
    /// return the final frame.
    pub fn run(&mut self, steps: u64) -> SimulationFrame {
        for _ in 0..steps {
            if self.step_stats().terminated {
                break;
            }
        }
        self.frame()
    }

    /// Measure raw stepping throughput for `duration` and return generations
    /// per second. Runs the buffer-update kernel directly so termination
    /// freezing cannot stall the measurement; the grid state is consumed.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn benchmark(&mut self, duration: std::time::Duration) -> f64 {
        let start = std::time::Instant::now();
        let mut generations = 0u64;
        while start.elapsed() < duration {
            self.advance();
            generations += 1;
        }

        let elapsed = start.elapsed().as_secs_f64();
        // Leave the engine consistent: wherever the kernel landed becomes a
        // fresh generation-zero state.
        self.reset_tracking();

        if elapsed <= 0.0 {
            return 0.0;
        }
        generations as f64 / elapsed
    }

    /// Write the successor of `current` into `scratch`, swap the buffers,
    /// and return the new population and hash. Termination bookkeeping is
    /// the caller's job.
    pub(crate) fn advance(&mut self) -> (usize, u32) {
        let width = self.config.width;
        let height = self.config.height;
        let rule = self.config.rule;
        let mut population = 0usize;

        for y in 0..height {
            for x in 0..width {
                let index = y * width + x;
                let neighbors = count_neighbors(
                    &self.current,
                    width,
                    height,
                    x,
                    y,
                    self.config.lattice,
                    self.config.toroidal,
                );
                let alive = self.current[index] != 0;
                let next = if alive {
                    rule.survives(neighbors)
                } else {
                    rule.born(neighbors)
                };
                self.scratch[index] = next as u8;
                population += next as usize;
            }
        }

        let hash = self.table.hash(&self.scratch);
        std::mem::swap(&mut self.current, &mut self.scratch);
        (population, hash)
    }

    /// Re-derive population and hash from `current` and restart cycle
    /// tracking with the state-zero hash recorded (the tracker bound is
    /// inclusive of this entry).
    fn reset_tracking(&mut self) {
        self.generation = 0;
        self.termination = None;
        self.period = None;
        self.population = self.current.iter().filter(|&&c| c != 0).count();
        self.hash = self.table.hash(&self.current);
        self.tracker.clear();
        self.tracker.insert(self.hash, 0);
    }
}
