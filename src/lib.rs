//! # Collection routes
//!
//! Multi-objective optimization of waste-collection routes with NSGA-II.
//!
//! Given collection zones and the measured distances and travel times
//! between them, the optimizer searches over visiting orders and returns the
//! Pareto front of routes that trade total distance against total time,
//! where total time includes the service penalty of every visited zone.
//!
//! Based on "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! by Deb, Pratap, Agarwal and Meyarivan.

pub mod config;
pub mod distance;
pub mod encoding;
pub mod error;
pub mod genetic;
pub mod individual;
pub mod objective;
pub mod population;
pub mod problem;
pub mod ranking;
pub mod utils;

use crate::config::Config;
use crate::distance::{DistanceIndex, FallbackPolicy};
use crate::encoding::RouteEncoder;
use crate::error::{OptimizerError, Result};
use crate::genetic::Genetic;
use crate::individual::Individual;
use crate::objective::{Evaluator, ObjectiveVector};
use crate::population::{compare_by_time, Population};
use crate::problem::{DistanceEdge, Problem, Zone, ZoneId};

use itertools::Itertools;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// A stop of a result route, with the data a map needs to draw it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub zone_id: ZoneId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A route of the returned Pareto front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoRoute {
    /// Zone ids in visiting order
    pub route: Vec<ZoneId>,
    pub objectives: ObjectiveVector,
    pub rank: usize,
    /// Infinite at the ends of the front; `null` in JSON
    #[serde(with = "crowding_json")]
    pub crowding_distance: f64,
    /// Legs priced by the distance fallback policy rather than measured
    pub estimated_legs: usize,
    pub stops: Vec<RouteStop>,
}

/// Writes an infinite crowding distance as `null` and reads `null` back as
/// infinity, since JSON has no infinite numbers.
mod crowding_json {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        Some(*value).filter(|v| v.is_finite()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Non-fatal observations about how a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvergenceWarning {
    /// The run was cancelled or hit its time limit before the generation budget.
    StoppedEarly { completed: usize, requested: usize },
    /// The front still changed in the last generation; more generations
    /// could improve it.
    StillImproving { generation: usize },
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceWarning::StoppedEarly {
                completed,
                requested,
            } => write!(
                f,
                "stopped after {} of {} generations",
                completed, requested
            ),
            ConvergenceWarning::StillImproving { generation } => write!(
                f,
                "front changed in the final generation {}, more generations may improve it",
                generation
            ),
        }
    }
}

/// Output of an optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Distinct non-dominated routes sorted by distance, then time
    pub pareto_front: Vec<ParetoRoute>,
    /// The front route with the lowest total time
    pub best: ParetoRoute,
    pub generations_completed: usize,
    pub run_time: Duration,
    /// Unordered zone pairs of the scope priced by the fallback policy
    pub missing_pairs: usize,
    pub fallback: FallbackPolicy,
    pub warnings: Vec<ConvergenceWarning>,
}

/// The evolution controller: owns the validated input and drives the
/// generational loop.
pub struct ParetoOptimizer {
    pub problem: Problem,
    pub config: Config,
    pub population: Option<Population>,
    pub generations_completed: usize,
    pub run_time: Duration,
    pub missing_pairs: Vec<(ZoneId, ZoneId)>,
    evaluator: Evaluator,
    genetic: Genetic,
}

impl ParetoOptimizer {
    /// Validate the configuration against the problem and prepare the
    /// distance index, encoder and evaluator. Nothing is evaluated yet.
    pub fn new(problem: Problem, config: Config) -> Result<Self> {
        config.validate()?;

        let scope = match &config.zone_scope {
            Some(scope) => {
                if let Some(&unknown) = scope.iter().find(|&&id| problem.zone(id).is_none()) {
                    return Err(OptimizerError::unknown_zone("zone scope", unknown));
                }
                scope.clone()
            }
            None => problem.zone_ids(),
        };
        if scope.len() < 2 {
            return Err(OptimizerError::configuration(format!(
                "at least 2 zones are needed to build a route, got {}",
                scope.len()
            )));
        }

        let index = DistanceIndex::new(&problem, config.fallback)?;
        let missing_pairs = index.missing_pairs(&scope);
        if let Some(&(a, b)) = missing_pairs.first() {
            if config.fallback == FallbackPolicy::Reject {
                return Err(OptimizerError::validation(format!(
                    "{} zone pairs have no distance data, first is {} - {}",
                    missing_pairs.len(),
                    a,
                    b
                )));
            }
            warn!(
                "{} zone pairs have no distance data and will be estimated with {:?}",
                missing_pairs.len(),
                config.fallback
            );
        }

        let encoder = RouteEncoder::new(&scope)?;
        let evaluator = Evaluator::new(&problem, index, encoder, config.closed_tour)?;

        Ok(ParetoOptimizer {
            problem,
            config,
            population: None,
            generations_completed: 0,
            run_time: Duration::from_secs(0),
            missing_pairs,
            evaluator,
            genetic: Genetic,
        })
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Run the full generation budget.
    pub fn run(&mut self) -> Result<OptimizationResult> {
        self.run_with_cancel(&AtomicBool::new(false))
    }

    /// Run until the generation budget is spent, `cancel` is set, or the
    /// time limit passes. The last two are checked between generations.
    pub fn run_with_cancel(&mut self, cancel: &AtomicBool) -> Result<OptimizationResult> {
        let start_time = Instant::now();
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        info!(
            "optimizing {} zones ({}): population {}, {} generations, seed {:?}",
            self.evaluator.encoder().len(),
            if self.evaluator.closed_tour() {
                "closed tour"
            } else {
                "open path"
            },
            self.config.population_size,
            self.config.generations,
            self.config.seed
        );

        let mut population =
            Population::initialize(self.config.population_size, &self.evaluator, &mut rng)?;
        let mut previous_front = front_signature(&population);
        let mut front_changed = false;
        self.generations_completed = 0;

        for generation in 1..=self.config.generations {
            if self.should_terminate(cancel, start_time) {
                break;
            }

            let offspring = population.reproduce(
                &self.evaluator,
                &self.genetic,
                self.config.crossover_rate,
                self.config.mutation_rate,
                &mut rng,
            )?;
            population.advance(offspring)?;
            self.generations_completed = generation;

            let signature = front_signature(&population);
            front_changed = signature != previous_front;
            previous_front = signature;

            if let Some(best) = population.best() {
                debug!(
                    "generation {}: {} distinct objective points on the front, best time {:.2} min at {:.2} km",
                    generation,
                    previous_front.len(),
                    best.objectives.time_min,
                    best.objectives.distance_km
                );
            }
        }

        self.run_time = start_time.elapsed();
        let result = self.build_result(&population, front_changed)?;
        self.population = Some(population);

        info!(
            "finished {} generations in {}: {} routes on the front, best time {:.2} min",
            self.generations_completed,
            utils::format_duration(self.run_time),
            result.pareto_front.len(),
            result.best.objectives.time_min
        );

        Ok(result)
    }

    /// Check if the time limit passed or the caller cancelled.
    fn should_terminate(&self, cancel: &AtomicBool, start_time: Instant) -> bool {
        if cancel.load(Ordering::Relaxed) {
            return true;
        }

        if let Some(time_limit) = self.config.time_limit {
            if start_time.elapsed() >= time_limit {
                return true;
            }
        }

        false
    }

    fn build_result(
        &self,
        population: &Population,
        front_changed: bool,
    ) -> Result<OptimizationResult> {
        let front: Vec<&Individual> = population
            .pareto_front()
            .sorted_by(|a, b| {
                a.objectives
                    .distance_km
                    .total_cmp(&b.objectives.distance_km)
                    .then(a.objectives.time_min.total_cmp(&b.objectives.time_min))
                    .then_with(|| a.chromosome.cmp(&b.chromosome))
            })
            .collect();

        let best = front
            .iter()
            .copied()
            .min_by(|a, b| compare_by_time(a, b))
            .ok_or_else(|| OptimizerError::evaluation("final population has no front"))?;

        let mut warnings = Vec::new();
        if self.generations_completed < self.config.generations {
            warnings.push(ConvergenceWarning::StoppedEarly {
                completed: self.generations_completed,
                requested: self.config.generations,
            });
        }
        if front_changed {
            warnings.push(ConvergenceWarning::StillImproving {
                generation: self.generations_completed,
            });
        }
        for warning in &warnings {
            warn!("{}", warning);
        }

        Ok(OptimizationResult {
            pareto_front: front
                .iter()
                .map(|individual| self.to_route(individual))
                .collect::<Result<_>>()?,
            best: self.to_route(best)?,
            generations_completed: self.generations_completed,
            run_time: self.run_time,
            missing_pairs: self.missing_pairs.len(),
            fallback: self.evaluator.index().policy(),
            warnings,
        })
    }

    fn to_route(&self, individual: &Individual) -> Result<ParetoRoute> {
        let route = self.evaluator.encoder().decode(&individual.chromosome)?;
        let stops: Vec<RouteStop> = route
            .iter()
            .map(|&id| {
                self.problem
                    .zone(id)
                    .map(|zone| RouteStop {
                        zone_id: zone.id,
                        name: zone.name.clone(),
                        latitude: zone.latitude,
                        longitude: zone.longitude,
                    })
                    .ok_or_else(|| OptimizerError::unknown_zone("route", id))
            })
            .collect::<Result<_>>()?;

        Ok(ParetoRoute {
            route,
            objectives: individual.objectives,
            rank: individual.rank,
            crowding_distance: individual.crowding_distance,
            estimated_legs: individual.estimated_legs,
            stops,
        })
    }
}

/// Distinct objective vectors on the front, as sortable bit patterns.
fn front_signature(population: &Population) -> Vec<(u64, u64)> {
    population
        .pareto_front()
        .map(|i| (i.objectives.distance_km.to_bits(), i.objectives.time_min.to_bits()))
        .sorted()
        .dedup()
        .collect()
}

/// Validate the input and run one optimization.
///
/// Input errors are reported before any route is evaluated.
#[allow(clippy::too_many_arguments)]
pub fn optimize(
    zones: Vec<Zone>,
    distances: Vec<DistanceEdge>,
    population_size: usize,
    generations: usize,
    mutation_rate: f64,
    crossover_rate: f64,
    closed_tour: bool,
    seed: Option<u64>,
) -> Result<OptimizationResult> {
    let mut config = Config::new()
        .with_population_size(population_size)
        .with_generations(generations)
        .with_mutation_rate(mutation_rate)
        .with_crossover_rate(crossover_rate)
        .with_closed_tour(closed_tour);
    config.seed = seed;
    config.validate()?;

    let problem = Problem::new(zones, distances)?;
    ParetoOptimizer::new(problem, config)?.run()
}
