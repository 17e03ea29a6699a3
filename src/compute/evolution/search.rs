//! Genetic search loop for long-lived seed patterns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{
    Genome, SearchConfig, SearchError, SearchHistory, SearchOptions, SearchProgress, SearchResult,
    SearchStats, StopReason,
};

use super::fitness::FitnessEvaluator;
use super::genome::SearchRng;

/// A scored member of the population.
#[derive(Debug, Clone)]
struct Candidate {
    genome: Genome,
    fitness: f32,
}

/// Genetic search engine.
///
/// Can be driven to completion with [`SearchEngine::run`] /
/// [`SearchEngine::run_with_callback`], or one GA generation at a time with
/// [`SearchEngine::step`] (the mode the wasm control surface uses).
pub struct SearchEngine {
    config: SearchConfig,
    options: SearchOptions,
    rng: SearchRng,
    evaluator: FitnessEvaluator,
    population: Vec<Candidate>,
    history: SearchHistory,
    generation: usize,
    best: Option<Candidate>,
    cancelled: Arc<AtomicBool>,
}

impl SearchEngine {
    /// Create a new engine after validating the configuration.
    pub fn new(config: SearchConfig, options: SearchOptions) -> Result<Self, SearchError> {
        config.validate(&options)?;

        let seed = config.random_seed.unwrap_or_else(rand::random);
        let evaluator = FitnessEvaluator::new(&config, options.seed_window);

        Ok(Self {
            rng: SearchRng::new(seed),
            evaluator,
            population: Vec::new(),
            history: SearchHistory::default(),
            generation: 0,
            best: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            config,
            options,
        })
    }

    /// Get a cancellation handle; polled once per GA generation.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// GA generations completed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Whether the run is over, by iteration count or cancellation.
    pub fn is_complete(&self) -> bool {
        self.generation >= self.options.iterations || self.cancelled.load(Ordering::Relaxed)
    }

    /// Run one GA generation and return its progress record.
    ///
    /// The first call seeds a random population; later calls breed the next
    /// generation from the previous ranking first.
    pub fn step(&mut self) -> SearchProgress {
        if self.population.is_empty() {
            self.initialize();
        } else {
            self.breed_next_generation();
        }

        self.evaluate_population();
        self.rank_and_record();

        let progress = self.progress();
        self.generation += 1;
        debug!(
            "search generation {} best fitness {:.1}",
            progress.generation, progress.best_fitness
        );
        progress
    }

    /// Run until complete, invoking `callback` once per GA generation.
    pub fn run_with_callback<F>(&mut self, mut callback: F) -> SearchResult
    where
        F: FnMut(&SearchProgress),
    {
        while !self.is_complete() {
            let progress = self.step();
            callback(&progress);
        }
        self.result()
    }

    /// Run until complete without progress reporting.
    pub fn run(&mut self) -> SearchResult {
        self.run_with_callback(|_| {})
    }

    /// Final outcome of the run so far.
    ///
    /// Control surfaces must forward this to collaborators only when
    /// `stats.stop_reason` is [`StopReason::Completed`].
    pub fn result(&self) -> SearchResult {
        let best = self
            .best
            .as_ref()
            .or_else(|| self.population.first())
            .expect("search ran no generations");

        let stop_reason = if self.generation >= self.options.iterations {
            StopReason::Completed
        } else {
            StopReason::Cancelled
        };

        SearchResult {
            best_genome: best.genome.clone(),
            best_fitness: best.fitness,
            stats: SearchStats {
                generations: self.generation,
                total_evaluations: (self.generation as u64)
                    * (self.config.population_size as u64),
                stop_reason,
            },
            history: self.history.clone(),
        }
    }

    /// Progress snapshot: the best genome observed so far in the run.
    fn progress(&self) -> SearchProgress {
        let best = self
            .best
            .as_ref()
            .or_else(|| self.population.first())
            .expect("progress requested before any evaluation");

        SearchProgress {
            generation: self.generation,
            best_fitness: best.fitness,
            population: self.population.len(),
            best_genome: best.genome.clone(),
        }
    }

    fn initialize(&mut self) {
        self.population = (0..self.config.population_size)
            .map(|_| Candidate {
                genome: self.rng.random_genome(self.options.seed_window),
                fitness: 0.0,
            })
            .collect();
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn evaluate_population(&mut self) {
        let evaluator = &self.evaluator;
        self.population.par_iter_mut().for_each(|candidate| {
            candidate.fitness = evaluator.evaluate(&candidate.genome);
        });
    }

    #[cfg(target_arch = "wasm32")]
    fn evaluate_population(&mut self) {
        let evaluator = &self.evaluator;
        for candidate in &mut self.population {
            candidate.fitness = evaluator.evaluate(&candidate.genome);
        }
    }

    /// Sort descending by fitness, update the best-ever genome, and record
    /// this generation's history row.
    fn rank_and_record(&mut self) {
        self.population
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let top = &self.population[0];
        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| top.fitness > best.fitness);
        if improved {
            self.best = Some(top.clone());
        }

        let mean = self.population.iter().map(|c| c.fitness).sum::<f32>()
            / self.population.len() as f32;
        self.history.best_fitness.push(top.fitness);
        self.history.mean_fitness.push(mean);
    }

    /// Carry the elites over unchanged and fill the remainder with mutated
    /// crossover children of uniformly sampled elite parents.
    fn breed_next_generation(&mut self) {
        let elite_count = self.config.elite_count.min(self.population.len());
        let mut next: Vec<Candidate> = self.population[..elite_count].to_vec();

        while next.len() < self.config.population_size {
            let a = self.rng.pick(elite_count);
            let b = self.rng.pick(elite_count);
            let mut child = self
                .rng
                .crossover(&self.population[a].genome, &self.population[b].genome);
            self.rng
                .mutate(&mut child, self.config.mutation_rate, self.options.seed_window);
            next.push(Candidate {
                genome: child,
                fitness: 0.0,
            });
        }

        self.population = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Lattice;

    fn toy_config() -> (SearchConfig, SearchOptions) {
        // The literal GA toy run parameters.
        (
            SearchConfig {
                population_size: 8,
                mutation_rate: 0.2,
                elite_count: 2,
                max_generations: 50,
                grid_size: 20,
                lattice: Lattice::Square,
                rule: "B3/S23".to_string(),
                toroidal: false,
                border_penalty: 10.0,
                random_seed: Some(42),
            },
            SearchOptions {
                iterations: 4,
                seed_window: 5,
            },
        )
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let (mut config, options) = toy_config();
        config.population_size = 1;
        assert!(SearchEngine::new(config, options).is_err());
    }

    #[test]
    fn test_toy_run_completes_with_monotone_best_fitness() {
        let (config, options) = toy_config();
        let mut engine = SearchEngine::new(config, options).unwrap();

        let mut progress_log = Vec::new();
        let result = engine.run_with_callback(|p| progress_log.push(p.clone()));

        assert_eq!(progress_log.len(), 4);
        for pair in progress_log.windows(2) {
            assert!(pair[1].generation > pair[0].generation);
            assert!(pair[1].best_fitness >= pair[0].best_fitness);
        }

        assert_eq!(result.stats.stop_reason, StopReason::Completed);
        assert_eq!(result.stats.generations, 4);
        assert_eq!(result.stats.total_evaluations, 32);
        assert!(result.best_fitness >= progress_log[0].best_fitness);
        assert_eq!(result.history.best_fitness.len(), 4);
    }

    #[test]
    fn test_result_genome_embeds_without_loss() {
        let (config, options) = toy_config();
        let grid_size = config.grid_size;
        let window = options.seed_window;
        let mut engine = SearchEngine::new(config, options).unwrap();
        let result = engine.run();

        let distinct: std::collections::HashSet<_> =
            result.best_genome.cells.iter().collect();
        let embedded = super::super::fitness::embed(&result.best_genome, grid_size, window);
        let live = embedded.iter().filter(|&&c| c != 0).count();
        assert_eq!(live, distinct.len(), "no out-of-range cell loss");
    }

    #[test]
    fn test_cancelled_run_reports_cancelled() {
        let (config, mut options) = toy_config();
        options.iterations = 100;
        let mut engine = SearchEngine::new(config, options).unwrap();

        let cancel = engine.cancel_handle();
        let mut generations_seen = 0;
        let result = engine.run_with_callback(|_| {
            generations_seen += 1;
            if generations_seen == 2 {
                cancel.store(true, Ordering::Relaxed);
            }
        });

        assert_eq!(generations_seen, 2);
        assert_eq!(result.stats.stop_reason, StopReason::Cancelled);
        assert_eq!(result.stats.generations, 2);
    }

    #[test]
    fn test_cancel_after_final_generation_still_completes() {
        let (config, options) = toy_config();
        let mut engine = SearchEngine::new(config, options).unwrap();
        let cancel = engine.cancel_handle();

        let result = engine.run_with_callback(|p| {
            if p.generation == 3 {
                // Arrives after the final generation's progress event.
                cancel.store(true, Ordering::Relaxed);
            }
        });

        assert_eq!(result.stats.stop_reason, StopReason::Completed);
    }

    #[test]
    fn test_fixed_seed_makes_runs_reproducible() {
        let (config, options) = toy_config();
        let a = SearchEngine::new(config.clone(), options).unwrap().run();
        let b = SearchEngine::new(config, options).unwrap().run();

        assert_eq!(a.best_fitness, b.best_fitness);
        assert_eq!(a.best_genome.cells, b.best_genome.cells);
        assert_eq!(a.history.best_fitness, b.history.best_fitness);
    }

    #[test]
    fn test_stepwise_driving_matches_iteration_count() {
        let (config, options) = toy_config();
        let mut engine = SearchEngine::new(config, options).unwrap();

        let mut steps = 0;
        while !engine.is_complete() {
            let progress = engine.step();
            assert_eq!(progress.population, 8);
            steps += 1;
        }
        assert_eq!(steps, 4);
        assert_eq!(engine.generation(), 4);
    }

    #[test]
    fn test_elites_survive_unchanged() {
        let (config, options) = toy_config();
        let mut engine = SearchEngine::new(config, options).unwrap();

        let first = engine.step();
        let best_id = first.best_genome.id.clone();
        let second = engine.step();

        // With elitism the previous best genome is still in the pool, so
        // the best-ever record can only improve or repeat.
        assert!(second.best_fitness >= first.best_fitness);
        if second.best_fitness == first.best_fitness {
            assert_eq!(second.best_genome.id, best_id);
        }
    }

    #[test]
    fn test_hex_search_runs() {
        let (mut config, mut options) = toy_config();
        config.lattice = Lattice::Hex;
        config.rule = "B2/S34".to_string();
        config.toroidal = true;
        options.iterations = 2;

        let result = SearchEngine::new(config, options).unwrap().run();
        assert_eq!(result.stats.stop_reason, StopReason::Completed);
        assert!(result.best_fitness >= 0.0);
    }
}
