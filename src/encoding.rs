//! Mapping between zone-id routes and the chromosomes the search manipulates.
//!
//! A chromosome is a permutation of `0..n`, where gene `g` stands for the
//! `g`-th zone of the route scope. Operators work on dense indices so they
//! never have to hash zone ids.

use std::collections::HashMap;

use crate::error::{OptimizerError, Result};
use crate::problem::ZoneId;

/// Permutation of gene indices.
pub type Chromosome = Vec<usize>;

/// Deterministic bijection between zone-id routes and chromosomes.
#[derive(Debug, Clone)]
pub struct RouteEncoder {
    zone_ids: Vec<ZoneId>,
    genes: HashMap<ZoneId, usize>,
}

impl RouteEncoder {
    /// Create an encoder over the given route scope.
    pub fn new(zone_ids: &[ZoneId]) -> Result<Self> {
        let mut genes = HashMap::with_capacity(zone_ids.len());
        for (gene, &id) in zone_ids.iter().enumerate() {
            if genes.insert(id, gene).is_some() {
                return Err(OptimizerError::validation(format!(
                    "zone id {} appears twice in the route scope",
                    id
                )));
            }
        }

        Ok(RouteEncoder {
            zone_ids: zone_ids.to_vec(),
            genes,
        })
    }

    /// Number of zones every route must visit.
    pub fn len(&self) -> usize {
        self.zone_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zone_ids.is_empty()
    }

    /// Zone ids of the scope, indexed by gene.
    pub fn zone_ids(&self) -> &[ZoneId] {
        &self.zone_ids
    }

    /// Zone id of a single gene.
    pub fn zone_id(&self, gene: usize) -> Option<ZoneId> {
        self.zone_ids.get(gene).copied()
    }

    /// Encode a route. It must visit every zone of the scope exactly once.
    pub fn encode(&self, route: &[ZoneId]) -> Result<Chromosome> {
        if route.len() != self.len() {
            return Err(OptimizerError::validation(format!(
                "route visits {} zones but the scope has {}",
                route.len(),
                self.len()
            )));
        }

        let mut seen = vec![false; self.len()];
        route
            .iter()
            .map(|id| {
                let gene = *self.genes.get(id).ok_or_else(|| {
                    OptimizerError::validation(format!("zone id {} is not in the route scope", id))
                })?;
                if std::mem::replace(&mut seen[gene], true) {
                    return Err(OptimizerError::validation(format!(
                        "zone id {} appears twice in the route",
                        id
                    )));
                }
                Ok(gene)
            })
            .collect()
    }

    /// Decode a chromosome, rejecting anything that is not a permutation.
    pub fn decode(&self, chromosome: &[usize]) -> Result<Vec<ZoneId>> {
        self.check(chromosome)?;
        Ok(chromosome.iter().map(|&gene| self.zone_ids[gene]).collect())
    }

    /// Verify that a chromosome is a complete permutation of the scope.
    pub fn check(&self, chromosome: &[usize]) -> Result<()> {
        if chromosome.len() != self.len() {
            return Err(OptimizerError::decoding(format!(
                "chromosome has {} genes, expected {}",
                chromosome.len(),
                self.len()
            )));
        }

        let mut seen = vec![false; self.len()];
        for &gene in chromosome {
            match seen.get_mut(gene) {
                None => {
                    return Err(OptimizerError::decoding(format!(
                        "gene {} is out of range",
                        gene
                    )))
                }
                Some(slot) if *slot => {
                    return Err(OptimizerError::decoding(format!(
                        "gene {} appears more than once",
                        gene
                    )))
                }
                Some(slot) => *slot = true,
            }
        }

        Ok(())
    }
}
