//! Configuration parameters for the route optimizer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::distance::FallbackPolicy;
use crate::error::{OptimizerError, Result};
use crate::problem::ZoneId;

/// Smallest population that still gives binary tournaments a choice.
pub const MIN_POPULATION_SIZE: usize = 4;

/// Configuration settings for the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of individuals kept after every generation (N)
    pub population_size: usize,
    /// Number of generations to evolve
    pub generations: usize,
    /// Probability that an offspring gets a swap mutation
    pub mutation_rate: f64,
    /// Probability that a pair of parents is recombined instead of copied
    pub crossover_rate: f64,
    /// Add the leg from the last zone back to the first
    pub closed_tour: bool,
    /// Seed for the random generator; `None` draws one from the OS
    pub seed: Option<u64>,
    /// Optional wall-clock limit, checked between generations
    pub time_limit: Option<Duration>,
    /// How to price zone pairs without a measured edge
    pub fallback: FallbackPolicy,
    /// Zones to route; `None` routes every zone of the problem
    pub zone_scope: Option<Vec<ZoneId>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 0.9,
            closed_tour: false,
            seed: None,
            time_limit: None,
            fallback: FallbackPolicy::default(),
            zone_scope: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Evaluate routes as closed tours.
    pub fn with_closed_tour(mut self, closed: bool) -> Self {
        self.closed_tour = closed;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Set the distance fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Restrict routes to a subset of the zones.
    pub fn with_zone_scope(mut self, zones: Vec<ZoneId>) -> Self {
        self.zone_scope = Some(zones);
        self
    }

    /// Check the numeric parameters.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < MIN_POPULATION_SIZE {
            return Err(OptimizerError::configuration(format!(
                "population size must be at least {}, got {}",
                MIN_POPULATION_SIZE, self.population_size
            )));
        }
        if self.generations == 0 {
            return Err(OptimizerError::configuration(
                "generation count must be at least 1",
            ));
        }
        for (name, rate) in [
            ("mutation rate", self.mutation_rate),
            ("crossover rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(OptimizerError::configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }
        self.fallback.validate()
    }
}
