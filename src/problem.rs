//! Problem definition: collection zones and the measured inter-zone edges.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::{OptimizerError, Result};

/// Identifier of a collection zone.
pub type ZoneId = u32;

/// A collection zone. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    #[serde(alias = "nombre_zona")]
    pub name: String,
    #[serde(alias = "latitud")]
    pub latitude: f64,
    #[serde(alias = "longitud")]
    pub longitude: f64,
    /// Estimated waste volume in kilograms
    #[serde(alias = "volumen_estimado_kg")]
    pub volume_kg: f64,
    /// Service priority, lower is more urgent
    #[serde(alias = "prioridad")]
    pub priority: u32,
    /// Minutes added to a route's total time when it visits this zone
    #[serde(alias = "penalizacion_min")]
    pub penalty_min: f64,
}

impl Zone {
    /// Create a zone with no volume, priority or penalty.
    pub fn new(id: ZoneId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Zone {
            id,
            name: name.into(),
            latitude,
            longitude,
            volume_kg: 0.0,
            priority: 0,
            penalty_min: 0.0,
        }
    }

    pub fn with_volume(mut self, volume_kg: f64) -> Self {
        self.volume_kg = volume_kg;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_penalty(mut self, penalty_min: f64) -> Self {
        self.penalty_min = penalty_min;
        self
    }
}

/// A measured, directed edge between two zones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceEdge {
    #[serde(alias = "origen")]
    pub origin: ZoneId,
    #[serde(alias = "destino")]
    pub destination: ZoneId,
    #[serde(alias = "distancia_km")]
    pub distance_km: f64,
    #[serde(alias = "tiempo_estimado_min")]
    pub time_min: f64,
}

impl DistanceEdge {
    pub fn new(origin: ZoneId, destination: ZoneId, distance_km: f64, time_min: f64) -> Self {
        DistanceEdge {
            origin,
            destination,
            distance_km,
            time_min,
        }
    }
}

/// A validated optimization input.
#[derive(Debug, Clone, Serialize)]
pub struct Problem {
    pub zones: Vec<Zone>,
    pub edges: Vec<DistanceEdge>,
    #[serde(skip)]
    zone_positions: HashMap<ZoneId, usize>,
}

#[derive(Deserialize)]
struct ProblemFile {
    zones: Vec<Zone>,
    #[serde(alias = "distances")]
    edges: Vec<DistanceEdge>,
}

impl Problem {
    /// Validate zones and edges and build a problem from them.
    ///
    /// Fails when the zone list is empty, a zone id repeats, a numeric field
    /// is negative or not finite, or an edge references an unknown zone.
    pub fn new(zones: Vec<Zone>, edges: Vec<DistanceEdge>) -> Result<Self> {
        if zones.is_empty() {
            return Err(OptimizerError::validation("zone list is empty"));
        }

        let mut zone_positions = HashMap::with_capacity(zones.len());
        for (position, zone) in zones.iter().enumerate() {
            if zone_positions.insert(zone.id, position).is_some() {
                return Err(OptimizerError::validation(format!(
                    "duplicate zone id {}",
                    zone.id
                )));
            }
            if !zone.latitude.is_finite() || !zone.longitude.is_finite() {
                return Err(OptimizerError::validation(format!(
                    "zone {} has non-finite coordinates",
                    zone.id
                )));
            }
            if !is_non_negative(zone.penalty_min) || !is_non_negative(zone.volume_kg) {
                return Err(OptimizerError::validation(format!(
                    "zone {} has a negative or non-finite penalty or volume",
                    zone.id
                )));
            }
        }

        for edge in &edges {
            for id in [edge.origin, edge.destination] {
                if !zone_positions.contains_key(&id) {
                    return Err(OptimizerError::unknown_zone(
                        &format!("edge {} -> {}", edge.origin, edge.destination),
                        id,
                    ));
                }
            }
            if !is_non_negative(edge.distance_km) || !is_non_negative(edge.time_min) {
                return Err(OptimizerError::validation(format!(
                    "edge {} -> {} has a negative or non-finite distance or time",
                    edge.origin, edge.destination
                )));
            }
        }

        Ok(Problem {
            zones,
            edges,
            zone_positions,
        })
    }

    /// Get a zone by id.
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zone_positions.get(&id).map(|&i| &self.zones[i])
    }

    /// Ids of all zones, in input order.
    pub fn zone_ids(&self) -> Vec<ZoneId> {
        self.zones.iter().map(|zone| zone.id).collect()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Load zones and distances from two CSV files.
    pub fn from_csv_files<P: AsRef<Path>, Q: AsRef<Path>>(zones: P, distances: Q) -> Result<Self> {
        let zones = read_csv::<Zone>(zones.as_ref())?;
        let edges = read_csv::<DistanceEdge>(distances.as_ref())?;
        Problem::new(zones, edges)
    }

    /// Load a problem from a JSON document with `zones` and `distances` arrays.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| io_error(path, err))?;
        let parsed: ProblemFile =
            serde_json::from_reader(BufReader::new(file)).map_err(|err| OptimizerError::Parse {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        Problem::new(parsed.zones, parsed.edges)
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn read_csv<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| io_error(path, err))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(row, record)| {
            record.map_err(|err| OptimizerError::Parse {
                path: path.display().to_string(),
                reason: format!("row {}: {}", row + 1, err),
            })
        })
        .collect()
}

fn io_error(path: &Path, err: impl std::fmt::Display) -> OptimizerError {
    OptimizerError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
