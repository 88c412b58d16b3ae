//! Population management: initialization, reproduction and elitist survival.

use itertools::{Either, Itertools};
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;

use crate::encoding::Chromosome;
use crate::error::{OptimizerError, Result};
use crate::genetic::Genetic;
use crate::individual::Individual;
use crate::objective::Evaluator;
use crate::ranking::rank_population;

/// A ranked population of fixed size.
#[derive(Debug, Clone)]
pub struct Population {
    /// Current members, ranked and with crowding distances assigned
    pub individuals: Vec<Individual>,
    /// Configured size N
    pub size: usize,
    /// Distinct rank-0 routes of the last ranked population, taken before
    /// environmental selection so none is lost to a crowding split
    pub front: Vec<Individual>,
}

impl Population {
    /// Create `size` uniformly shuffled routes, evaluate and rank them.
    pub fn initialize<R: Rng>(size: usize, evaluator: &Evaluator, rng: &mut R) -> Result<Self> {
        let genes = evaluator.encoder().len();
        let chromosomes: Vec<Chromosome> = (0..size)
            .map(|_| {
                let mut chromosome: Chromosome = (0..genes).collect();
                chromosome.shuffle(rng);
                chromosome
            })
            .collect();

        let mut individuals = evaluate(chromosomes, evaluator)?;
        rank_population(&mut individuals);
        let front = distinct_front(&individuals);

        Ok(Population {
            individuals,
            size,
            front,
        })
    }

    /// Breed `size` evaluated offspring with tournament selection,
    /// crossover and mutation.
    pub fn reproduce<R: Rng>(
        &self,
        evaluator: &Evaluator,
        genetic: &Genetic,
        crossover_rate: f64,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Result<Vec<Individual>> {
        let mut chromosomes = Vec::with_capacity(self.size + 1);

        while chromosomes.len() < self.size {
            let parent1 = genetic.tournament(&self.individuals, rng);
            let parent2 = genetic.tournament(&self.individuals, rng);

            let (mut child1, mut child2) = genetic.crossover(
                &parent1.chromosome,
                &parent2.chromosome,
                crossover_rate,
                rng,
            );
            genetic.mutate(&mut child1, mutation_rate, rng);
            genetic.mutate(&mut child2, mutation_rate, rng);

            chromosomes.push(child1);
            chromosomes.push(child2);
        }
        chromosomes.truncate(self.size);

        evaluate(chromosomes, evaluator)
    }

    /// Merge offspring into the population, rank the combined 2N
    /// candidates and keep the best N.
    pub fn advance(&mut self, offspring: Vec<Individual>) -> Result<()> {
        let mut combined = std::mem::take(&mut self.individuals);
        combined.extend(offspring);

        let fronts = rank_population(&mut combined);
        trace!(
            "ranked {} candidates into {} fronts",
            combined.len(),
            fronts.len()
        );

        self.front = distinct_front(&combined);
        self.individuals = select_survivors(combined, &fronts, self.size);
        if self.individuals.len() != self.size {
            return Err(OptimizerError::evaluation(format!(
                "environmental selection kept {} individuals, expected {}",
                self.individuals.len(),
                self.size
            )));
        }

        Ok(())
    }

    /// Distinct routes of the non-dominated front of the last ranked
    /// population, the combined 2N candidates once a generation has run.
    pub fn pareto_front(&self) -> impl Iterator<Item = &Individual> {
        self.front.iter()
    }

    /// The individual with the lowest total time, ties broken by distance
    /// and then by route.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.iter().min_by(|a, b| compare_by_time(a, b))
    }
}

/// Order by time, then distance, then chromosome.
pub(crate) fn compare_by_time(a: &Individual, b: &Individual) -> Ordering {
    a.objectives
        .time_min
        .partial_cmp(&b.objectives.time_min)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.objectives
                .distance_km
                .partial_cmp(&b.objectives.distance_km)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.chromosome.cmp(&b.chromosome))
}

/// Fill whole fronts in rank order; split the first front that does not
/// fit by descending crowding distance, ties kept in index order.
///
/// While splitting, a clone of a route already taken from the front is
/// passed over until every distinct route has had its turn.
pub fn select_survivors(
    candidates: Vec<Individual>,
    fronts: &[Vec<usize>],
    size: usize,
) -> Vec<Individual> {
    let mut chosen: Vec<usize> = Vec::with_capacity(size);

    for front in fronts {
        let room = size - chosen.len();
        if room == 0 {
            break;
        }
        if front.len() <= room {
            chosen.extend(front);
            continue;
        }

        let mut crowded = front.clone();
        crowded.sort_by(|&a, &b| {
            candidates[b]
                .crowding_distance
                .partial_cmp(&candidates[a].crowding_distance)
                .unwrap_or(Ordering::Equal)
        });

        let (distinct, clones): (Vec<usize>, Vec<usize>) =
            crowded.iter().enumerate().partition_map(|(k, &i)| {
                let seen = crowded[..k]
                    .iter()
                    .any(|&j| candidates[j].is_clone_of(&candidates[i]));
                if seen {
                    Either::Right(i)
                } else {
                    Either::Left(i)
                }
            });
        chosen.extend(distinct.into_iter().chain(clones).take(room));
        break;
    }

    let mut slots: Vec<Option<Individual>> = candidates.into_iter().map(Some).collect();
    chosen
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

/// Rank-0 members of a ranked population, one per route.
fn distinct_front(individuals: &[Individual]) -> Vec<Individual> {
    let mut front: Vec<Individual> = individuals
        .iter()
        .filter(|i| i.is_on_front())
        .cloned()
        .collect();
    front.sort_by(|a, b| a.chromosome.cmp(&b.chromosome));
    front.dedup_by(|later, kept| later.is_clone_of(kept));
    front
}

fn evaluate(chromosomes: Vec<Chromosome>, evaluator: &Evaluator) -> Result<Vec<Individual>> {
    let evaluations = evaluator.evaluate_all(&chromosomes)?;
    Ok(chromosomes
        .into_iter()
        .zip(evaluations)
        .map(|(chromosome, evaluation)| Individual::new(chromosome, evaluation))
        .collect())
}
