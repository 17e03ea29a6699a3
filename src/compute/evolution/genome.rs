//! Genome operators for the methuselah search.
//!
//! Provides random generation, crossover, and mutation of seed genomes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::schema::Genome;

/// Random number generator wrapper for genome operations.
///
/// Also mints the opaque genome ids; ids are unique within one search run.
pub struct SearchRng {
    rng: StdRng,
    next_id: u64,
}

impl SearchRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
        }
    }

    fn fresh_id(&mut self) -> String {
        let id = self.next_id;
        self.next_id += 1;
        format!("g{id:06}")
    }

    /// Generate a random genome inside a `seed_window` square.
    ///
    /// Samples `max(8, ⌊seed_window² / 10⌋)` distinct coordinates without
    /// replacement (capped at the window cell count for tiny windows).
    pub fn random_genome(&mut self, seed_window: usize) -> Genome {
        let cell_count = seed_window * seed_window;
        let target = (cell_count / 10).max(8).min(cell_count);

        let cells = rand::seq::index::sample(&mut self.rng, cell_count, target)
            .into_iter()
            .map(|i| (i % seed_window, i / seed_window))
            .collect();

        Genome {
            id: self.fresh_id(),
            cells,
        }
    }

    /// Mutate a genome in place: point jitter, insertion, and deletion.
    ///
    /// Each existing cell is, with probability `rate`, shifted by ±1 in both
    /// axes (signs drawn independently) and clamped into the window. With
    /// probability `rate` a fresh uniform cell is appended, and with
    /// probability `rate` a uniformly chosen cell is deleted as long as more
    /// than one remains. Duplicates introduced here are not deduplicated;
    /// the embedding collapses them.
    pub fn mutate(&mut self, genome: &mut Genome, rate: f32, seed_window: usize) {
        let max = seed_window - 1;

        for cell in &mut genome.cells {
            if self.rng.r#gen::<f32>() < rate {
                cell.0 = shift_clamped(cell.0, self.rng.gen_bool(0.5), max);
                cell.1 = shift_clamped(cell.1, self.rng.gen_bool(0.5), max);
            }
        }

        if self.rng.r#gen::<f32>() < rate {
            genome.cells.push((
                self.rng.gen_range(0..seed_window),
                self.rng.gen_range(0..seed_window),
            ));
        }

        if self.rng.r#gen::<f32>() < rate && genome.cells.len() > 1 {
            let index = self.rng.gen_range(0..genome.cells.len());
            genome.cells.remove(index);
        }
    }

    /// Perform crossover between two genomes.
    ///
    /// The child has `max(|a|, |b|)` cells; even indices come from `a`, odd
    /// indices from `b`, both read modulo the parent length. Deterministic
    /// given the parent ordering.
    pub fn crossover(&mut self, a: &Genome, b: &Genome) -> Genome {
        debug_assert!(!a.cells.is_empty() && !b.cells.is_empty());

        let len = a.cells.len().max(b.cells.len());
        let cells = (0..len)
            .map(|i| {
                if i % 2 == 0 {
                    a.cells[i % a.cells.len()]
                } else {
                    b.cells[i % b.cells.len()]
                }
            })
            .collect();

        Genome {
            id: self.fresh_id(),
            cells,
        }
    }

    /// Uniform index below `bound`.
    pub fn pick(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}

fn shift_clamped(value: usize, up: bool, max: usize) -> usize {
    if up {
        (value + 1).min(max)
    } else {
        value.saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_genome_has_distinct_in_range_cells() {
        let mut rng = SearchRng::new(42);
        let genome = rng.random_genome(5);

        assert_eq!(genome.cells.len(), 8); // max(8, 25/10)
        let distinct: std::collections::HashSet<_> = genome.cells.iter().collect();
        assert_eq!(distinct.len(), genome.cells.len());
        for &(x, y) in &genome.cells {
            assert!(x < 5 && y < 5);
        }
    }

    #[test]
    fn test_random_genome_scales_with_window() {
        let mut rng = SearchRng::new(42);
        assert_eq!(rng.random_genome(16).cells.len(), 25); // 256 / 10
        assert_eq!(rng.random_genome(2).cells.len(), 4); // capped at cell count
    }

    #[test]
    fn test_genome_ids_are_unique() {
        let mut rng = SearchRng::new(7);
        let a = rng.random_genome(5);
        let b = rng.random_genome(5);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_mutation_keeps_cells_in_range() {
        let mut rng = SearchRng::new(11);
        let mut genome = rng.random_genome(6);

        for _ in 0..100 {
            rng.mutate(&mut genome, 1.0, 6);
            assert!(!genome.cells.is_empty());
            for &(x, y) in &genome.cells {
                assert!(x < 6 && y < 6, "({x},{y}) escaped the window");
            }
        }
    }

    #[test]
    fn test_zero_rate_mutation_is_identity() {
        let mut rng = SearchRng::new(13);
        let mut genome = rng.random_genome(5);
        let before = genome.cells.clone();
        rng.mutate(&mut genome, 0.0, 5);
        assert_eq!(genome.cells, before);
    }

    #[test]
    fn test_deletion_never_empties_genome() {
        let mut rng = SearchRng::new(17);
        let mut genome = Genome {
            id: "g000000".to_string(),
            cells: vec![(1, 1)],
        };
        // Point mutation may move the single cell; deletion must not fire.
        for _ in 0..50 {
            rng.mutate(&mut genome, 1.0, 4);
        }
        assert!(!genome.cells.is_empty());
    }

    #[test]
    fn test_crossover_alternates_parents() {
        let mut rng = SearchRng::new(1);
        let a = Genome {
            id: "a".to_string(),
            cells: vec![(0, 0), (1, 1), (2, 2)],
        };
        let b = Genome {
            id: "b".to_string(),
            cells: vec![(4, 4), (5, 5)],
        };

        let child = rng.crossover(&a, &b);
        assert_eq!(child.cells, vec![(0, 0), (5, 5), (2, 2)]);

        // Deterministic given parent ordering.
        let again = rng.crossover(&a, &b);
        assert_eq!(again.cells, child.cells);

        // Reversed parents give the mirrored splice.
        let mirrored = rng.crossover(&b, &a);
        assert_eq!(mirrored.cells, vec![(4, 4), (1, 1), (4, 4)]);
    }
}
