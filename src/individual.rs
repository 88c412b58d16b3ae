//! Individual representation for the genetic algorithm population.

use std::cmp::Ordering;

use crate::encoding::Chromosome;
use crate::objective::{Evaluation, ObjectiveVector};

/// An evaluated candidate route in the population.
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// The route as a permutation of gene indices
    pub chromosome: Chromosome,
    /// Objectives computed for the chromosome
    pub objectives: ObjectiveVector,
    /// Number of legs priced by the distance fallback policy
    pub estimated_legs: usize,
    /// Index of the non-dominated front, 0 is the best
    pub rank: usize,
    /// Crowding distance within the individual's front
    pub crowding_distance: f64,
}

impl Individual {
    /// Create an unranked individual from a chromosome and its evaluation.
    pub fn new(chromosome: Chromosome, evaluation: Evaluation) -> Self {
        Individual {
            chromosome,
            objectives: evaluation.objectives,
            estimated_legs: evaluation.estimated_legs,
            rank: usize::MAX,
            crowding_distance: 0.0,
        }
    }

    /// Crowded-comparison order: lower rank first, then larger crowding distance.
    pub fn crowded_cmp(&self, other: &Individual) -> Ordering {
        self.rank.cmp(&other.rank).then_with(|| {
            other
                .crowding_distance
                .partial_cmp(&self.crowding_distance)
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Check if this individual visits the zones in the same order as another.
    pub fn is_clone_of(&self, other: &Individual) -> bool {
        self.chromosome == other.chromosome
    }

    pub fn is_on_front(&self) -> bool {
        self.rank == 0
    }
}
