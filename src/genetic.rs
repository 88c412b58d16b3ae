//! Genetic operators: tournament selection, order crossover, swap mutation.

use rand::Rng;
use std::cmp::Ordering;

use crate::encoding::Chromosome;
use crate::individual::Individual;

/// Implements the variation operators of the search.
///
/// All randomness comes from the generator passed in, so a seeded
/// generator replays the same choices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Genetic;

impl Genetic {
    /// Binary tournament on rank, then crowding distance, then a coin flip.
    pub fn tournament<'a, R: Rng>(
        &self,
        population: &'a [Individual],
        rng: &mut R,
    ) -> &'a Individual {
        let first = &population[rng.gen_range(0..population.len())];
        let second = &population[rng.gen_range(0..population.len())];

        match first.crowded_cmp(second) {
            Ordering::Less => first,
            Ordering::Greater => second,
            Ordering::Equal => {
                if rng.gen_bool(0.5) {
                    first
                } else {
                    second
                }
            }
        }
    }

    /// Recombine two parents with probability `crossover_rate`, otherwise copy them.
    pub fn crossover<R: Rng>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        crossover_rate: f64,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        if parent1.len() < 2 || rng.gen::<f64>() >= crossover_rate {
            return (parent1.to_vec(), parent2.to_vec());
        }
        self.order_crossover(parent1, parent2, rng)
    }

    /// Perform ordered crossover (OX), producing one child per parent.
    ///
    /// Each child keeps a segment of one parent in place and fills the
    /// remaining positions, starting after the segment and wrapping around,
    /// with the missing genes in the order they appear in the other parent.
    pub fn order_crossover<R: Rng>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        let size = parent1.len();
        if size == 0 {
            return (Vec::new(), Vec::new());
        }

        let cut1 = rng.gen_range(0..size);
        let cut2 = rng.gen_range(0..size);
        let (start, end) = if cut1 <= cut2 { (cut1, cut2) } else { (cut2, cut1) };

        (
            Self::order_child(parent1, parent2, start, end),
            Self::order_child(parent2, parent1, start, end),
        )
    }

    fn order_child(keep: &[usize], fill: &[usize], start: usize, end: usize) -> Chromosome {
        let size = keep.len();
        let mut child = vec![0; size];
        let mut used = vec![false; size];

        for i in start..=end {
            child[i] = keep[i];
            used[keep[i]] = true;
        }

        let mut position = (end + 1) % size;
        for offset in 0..size {
            let gene = fill[(end + 1 + offset) % size];
            if used[gene] {
                continue;
            }
            child[position] = gene;
            used[gene] = true;
            position = (position + 1) % size;
        }

        child
    }

    /// With probability `mutation_rate`, swap two distinct positions.
    ///
    /// Returns whether the chromosome changed.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut [usize],
        mutation_rate: f64,
        rng: &mut R,
    ) -> bool {
        let size = chromosome.len();
        if size < 2 || rng.gen::<f64>() >= mutation_rate {
            return false;
        }

        let i = rng.gen_range(0..size);
        let mut j = rng.gen_range(0..size - 1);
        if j >= i {
            j += 1;
        }
        chromosome.swap(i, j);
        true
    }
}
