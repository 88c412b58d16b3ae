//! Objective evaluation of routes.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::distance::{DistanceIndex, EdgeSource};
use crate::encoding::RouteEncoder;
use crate::error::{OptimizerError, Result};
use crate::problem::{Problem, ZoneId};

/// Objectives of a route. Both are minimized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveVector {
    /// Sum of leg distances
    pub distance_km: f64,
    /// Sum of leg times plus the penalty of every visited zone
    pub time_min: f64,
}

impl ObjectiveVector {
    pub const COUNT: usize = 2;

    pub fn new(distance_km: f64, time_min: f64) -> Self {
        ObjectiveVector {
            distance_km,
            time_min,
        }
    }

    /// Value of the objective with the given index (0 = distance, 1 = time).
    pub fn get(&self, objective: usize) -> f64 {
        match objective {
            0 => self.distance_km,
            1 => self.time_min,
            _ => unreachable!("objective index {} out of range", objective),
        }
    }

    /// True if `self` is no worse in every objective and strictly better in one.
    pub fn dominates(&self, other: &ObjectiveVector) -> bool {
        self.distance_km <= other.distance_km
            && self.time_min <= other.time_min
            && (self.distance_km < other.distance_km || self.time_min < other.time_min)
    }
}

/// Result of evaluating one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub objectives: ObjectiveVector,
    /// Legs whose values came from the distance fallback policy
    pub estimated_legs: usize,
}

/// Computes objective vectors for chromosomes of a fixed route scope.
///
/// Pure and side-effect free; a shared reference can be used from many
/// threads at once.
#[derive(Debug, Clone)]
pub struct Evaluator {
    index: DistanceIndex,
    encoder: RouteEncoder,
    penalties: Vec<f64>,
    closed_tour: bool,
}

impl Evaluator {
    /// Create an evaluator for the zones of `encoder`.
    pub fn new(
        problem: &Problem,
        index: DistanceIndex,
        encoder: RouteEncoder,
        closed_tour: bool,
    ) -> Result<Self> {
        let penalties = encoder
            .zone_ids()
            .iter()
            .map(|&id| {
                problem
                    .zone(id)
                    .map(|zone| zone.penalty_min)
                    .ok_or_else(|| OptimizerError::unknown_zone("route scope", id))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Evaluator {
            index,
            encoder,
            penalties,
            closed_tour,
        })
    }

    pub fn encoder(&self) -> &RouteEncoder {
        &self.encoder
    }

    pub fn index(&self) -> &DistanceIndex {
        &self.index
    }

    pub fn closed_tour(&self) -> bool {
        self.closed_tour
    }

    /// Evaluate a chromosome.
    ///
    /// Distance sums consecutive legs, plus the leg back to the first zone
    /// when the tour is closed. Time sums the same legs and adds each visited
    /// zone's penalty once.
    pub fn evaluate(&self, chromosome: &[usize]) -> Result<Evaluation> {
        self.encoder
            .check(chromosome)
            .map_err(|err| OptimizerError::evaluation(err.to_string()))?;

        let zone = |gene: usize| self.encoder.zone_ids()[gene];
        let mut distance_km = 0.0;
        let mut time_min = 0.0;
        let mut estimated_legs = 0;

        let closing = match (self.closed_tour, chromosome.first(), chromosome.last()) {
            (true, Some(&first), Some(&last)) if chromosome.len() > 1 => Some((last, first)),
            _ => None,
        };
        let legs = chromosome
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
            .chain(closing);

        for (from, to) in legs {
            let leg = self.index.lookup(zone(from), zone(to))?;
            distance_km += leg.distance_km;
            time_min += leg.time_min;
            if leg.source == EdgeSource::Estimated {
                estimated_legs += 1;
            }
        }

        time_min += chromosome
            .iter()
            .map(|&gene| self.penalties[gene])
            .sum::<f64>();

        Ok(Evaluation {
            objectives: ObjectiveVector::new(distance_km, time_min),
            estimated_legs,
        })
    }

    /// Evaluate a route given as zone ids.
    pub fn evaluate_route(&self, route: &[ZoneId]) -> Result<Evaluation> {
        let chromosome = self
            .encoder
            .encode(route)
            .map_err(|err| OptimizerError::evaluation(err.to_string()))?;
        self.evaluate(&chromosome)
    }

    /// Evaluate many chromosomes in parallel; results keep the input order.
    pub fn evaluate_all(&self, chromosomes: &[Vec<usize>]) -> Result<Vec<Evaluation>> {
        chromosomes
            .par_iter()
            .map(|chromosome| self.evaluate(chromosome))
            .collect()
    }
}
