//! Constant-time distance and travel time lookup between zones.

use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{OptimizerError, Result};
use crate::problem::{Problem, ZoneId};

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// What to do when neither direction of a zone pair was measured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Use the same distance and time for every missing pair.
    Fixed { distance_km: f64, time_min: f64 },
    /// Great-circle distance between the zone coordinates scaled by a detour
    /// factor, driven at a constant speed.
    Haversine { speed_kmh: f64, detour_factor: f64 },
    /// Missing pairs are an input error.
    Reject,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        FallbackPolicy::Haversine {
            speed_kmh: 25.0,
            detour_factor: 1.3,
        }
    }
}

impl FallbackPolicy {
    pub(crate) fn validate(&self) -> Result<()> {
        let valid = match *self {
            FallbackPolicy::Fixed {
                distance_km,
                time_min,
            } => {
                distance_km.is_finite()
                    && distance_km >= 0.0
                    && time_min.is_finite()
                    && time_min >= 0.0
            }
            FallbackPolicy::Haversine {
                speed_kmh,
                detour_factor,
            } => {
                speed_kmh.is_finite()
                    && speed_kmh > 0.0
                    && detour_factor.is_finite()
                    && detour_factor >= 1.0
            }
            FallbackPolicy::Reject => true,
        };

        if valid {
            Ok(())
        } else {
            Err(OptimizerError::configuration(format!(
                "invalid distance fallback policy {:?}",
                self
            )))
        }
    }
}

/// Where the value of a lookup came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeSource {
    /// The pair was measured in the requested direction.
    Forward,
    /// Only the opposite direction was measured.
    Reverse,
    /// Neither direction was measured; the fallback policy supplied the value.
    Estimated,
    /// Origin and destination are the same zone.
    Identity,
}

/// Distance and travel time of one leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub distance_km: f64,
    pub time_min: f64,
    pub source: EdgeSource,
}

/// Dense lookup table over every zone of a problem.
///
/// Read-only after construction, so it can be shared between evaluation
/// threads without locking.
#[derive(Debug, Clone)]
pub struct DistanceIndex {
    positions: HashMap<ZoneId, usize>,
    coordinates: Vec<(f64, f64)>,
    measured: Vec<Option<(f64, f64)>>,
    policy: FallbackPolicy,
}

impl DistanceIndex {
    /// Build the index for all zones and edges of a problem.
    ///
    /// Fails when an edge references an unknown zone or the same directed
    /// pair is measured twice.
    pub fn new(problem: &Problem, policy: FallbackPolicy) -> Result<Self> {
        policy.validate()?;

        let n = problem.zone_count();
        let positions: HashMap<ZoneId, usize> = problem
            .zones
            .iter()
            .enumerate()
            .map(|(i, zone)| (zone.id, i))
            .collect();
        let coordinates = problem
            .zones
            .iter()
            .map(|zone| (zone.latitude, zone.longitude))
            .collect();

        let mut measured = vec![None; n * n];
        for edge in &problem.edges {
            let from = *positions.get(&edge.origin).ok_or_else(|| {
                OptimizerError::unknown_zone("distance edge", edge.origin)
            })?;
            let to = *positions.get(&edge.destination).ok_or_else(|| {
                OptimizerError::unknown_zone("distance edge", edge.destination)
            })?;

            let slot = &mut measured[from * n + to];
            if slot.is_some() {
                return Err(OptimizerError::validation(format!(
                    "edge {} -> {} is listed more than once",
                    edge.origin, edge.destination
                )));
            }
            *slot = Some((edge.distance_km, edge.time_min));
        }

        Ok(DistanceIndex {
            positions,
            coordinates,
            measured,
            policy,
        })
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn contains(&self, zone: ZoneId) -> bool {
        self.positions.contains_key(&zone)
    }

    /// Resolve the leg from `origin` to `destination`.
    ///
    /// Checks the forward pair, then the reverse pair, then applies the
    /// fallback policy. The returned [`EdgeSource`] tells which one answered.
    pub fn lookup(&self, origin: ZoneId, destination: ZoneId) -> Result<Leg> {
        let from = self.position(origin)?;
        let to = self.position(destination)?;
        let n = self.coordinates.len();

        if let Some((distance_km, time_min)) = self.measured[from * n + to] {
            return Ok(Leg {
                distance_km,
                time_min,
                source: EdgeSource::Forward,
            });
        }
        if let Some((distance_km, time_min)) = self.measured[to * n + from] {
            return Ok(Leg {
                distance_km,
                time_min,
                source: EdgeSource::Reverse,
            });
        }
        if from == to {
            return Ok(Leg {
                distance_km: 0.0,
                time_min: 0.0,
                source: EdgeSource::Identity,
            });
        }

        let (distance_km, time_min) = match self.policy {
            FallbackPolicy::Fixed {
                distance_km,
                time_min,
            } => (distance_km, time_min),
            FallbackPolicy::Haversine {
                speed_kmh,
                detour_factor,
            } => {
                let (a, b) = (from.min(to), from.max(to));
                let distance_km =
                    haversine_km(self.coordinates[a], self.coordinates[b]) * detour_factor;
                (distance_km, distance_km / speed_kmh * 60.0)
            }
            FallbackPolicy::Reject => {
                return Err(OptimizerError::evaluation(format!(
                    "no distance data for {} -> {}",
                    origin, destination
                )))
            }
        };
        trace!(
            "estimated leg {} -> {}: {:.3} km, {:.3} min",
            origin,
            destination,
            distance_km,
            time_min
        );

        Ok(Leg {
            distance_km,
            time_min,
            source: EdgeSource::Estimated,
        })
    }

    /// Unordered pairs among `zones` with no measurement in either direction.
    pub fn missing_pairs(&self, zones: &[ZoneId]) -> Vec<(ZoneId, ZoneId)> {
        let n = self.coordinates.len();
        let mut missing = Vec::new();

        for (i, &a) in zones.iter().enumerate() {
            for &b in &zones[i + 1..] {
                let (Some(&from), Some(&to)) = (self.positions.get(&a), self.positions.get(&b))
                else {
                    continue;
                };
                if self.measured[from * n + to].is_none() && self.measured[to * n + from].is_none()
                {
                    missing.push((a, b));
                }
            }
        }

        missing
    }

    fn position(&self, zone: ZoneId) -> Result<usize> {
        self.positions
            .get(&zone)
            .copied()
            .ok_or_else(|| OptimizerError::evaluation(format!("unknown zone id {}", zone)))
    }
}

/// Great-circle distance between two (latitude, longitude) points in degrees.
pub fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
