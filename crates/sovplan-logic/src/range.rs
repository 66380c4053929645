//! Bridge range index: which systems a bridge from `X` could reach.
//!
//! Positions are immutable within a session, so candidate lists are memoized
//! per `(system, exclusion set)`. The cache key holds the exclusion set's
//! members, not its size. The owning session calls [`BridgeRangeIndex::invalidate`]
//! whenever a new snapshot is loaded.

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::constants::MAX_BRIDGE_RANGE_LY;
use crate::error::PlannerResult;
use crate::network::{Network, SystemId};

/// A system within bridge range of some origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCandidate {
    pub system: SystemId,
    pub name: String,
    pub distance_ly: f64,
}

/// Range overview for one system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSummary {
    NoCandidates {
        system: String,
    },
    Candidates {
        system: String,
        count: usize,
        nearest: String,
        nearest_ly: f64,
        farthest: String,
        farthest_ly: f64,
        mean_ly: f64,
    },
}

impl RangeSummary {
    pub fn count(&self) -> usize {
        match self {
            Self::NoCandidates { .. } => 0,
            Self::Candidates { count, .. } => *count,
        }
    }
}

/// Region-wide bridge connectivity statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionStatistics {
    pub total_systems: usize,
    /// Unordered system pairs within bridge range.
    pub possible_pairs: usize,
    pub mean_candidates: f64,
    pub max_candidates: usize,
    pub min_candidates: usize,
    pub systems_without_candidates: usize,
}

type CacheKey = (SystemId, Vec<SystemId>);

/// Memoizing range-candidate lookup.
#[derive(Debug, Default)]
pub struct BridgeRangeIndex {
    cache: HashMap<CacheKey, Vec<RangeCandidate>>,
}

impl BridgeRangeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Systems within [`MAX_BRIDGE_RANGE_LY`] of `system`, nearest first
    /// (enumeration order on equal distance), skipping `exclude`.
    ///
    /// Systems without position data cannot host a bridge and are left out;
    /// `system` itself must have a position.
    pub fn candidates(
        &mut self,
        network: &Network,
        system: SystemId,
        exclude: &BTreeSet<SystemId>,
    ) -> PlannerResult<&[RangeCandidate]> {
        let key = (system, exclude.iter().copied().collect::<Vec<_>>());
        match self.cache.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut().as_slice()),
            Entry::Vacant(entry) => {
                let computed = compute_candidates(network, system, exclude)?;
                log::debug!(
                    "Range cache miss for {} ({} excluded): {} candidates",
                    network.name(system),
                    exclude.len(),
                    computed.len()
                );
                Ok(entry.insert(computed).as_slice())
            }
        }
    }

    pub fn summary(&mut self, network: &Network, system: SystemId) -> PlannerResult<RangeSummary> {
        let candidates = self.candidates(network, system, &BTreeSet::new())?;
        let name = network.name(system).to_string();
        let (Some(nearest), Some(farthest)) = (candidates.first(), candidates.last()) else {
            return Ok(RangeSummary::NoCandidates { system: name });
        };
        let total: f64 = candidates.iter().map(|c| c.distance_ly).sum();
        Ok(RangeSummary::Candidates {
            system: name,
            count: candidates.len(),
            nearest: nearest.name.clone(),
            nearest_ly: nearest.distance_ly,
            farthest: farthest.name.clone(),
            farthest_ly: farthest.distance_ly,
            mean_ly: total / candidates.len() as f64,
        })
    }

    pub fn region_statistics(&mut self, network: &Network) -> PlannerResult<RegionStatistics> {
        let mut counts = Vec::with_capacity(network.len());
        for id in network.ids() {
            if network.system(id).position.is_none() {
                counts.push(0);
                continue;
            }
            counts.push(self.candidates(network, id, &BTreeSet::new())?.len());
        }
        let total: usize = counts.iter().sum();
        Ok(RegionStatistics {
            total_systems: network.len(),
            possible_pairs: total / 2,
            mean_candidates: if counts.is_empty() {
                0.0
            } else {
                total as f64 / counts.len() as f64
            },
            max_candidates: counts.iter().copied().max().unwrap_or(0),
            min_candidates: counts.iter().copied().min().unwrap_or(0),
            systems_without_candidates: counts.iter().filter(|&&c| c == 0).count(),
        })
    }

    /// Drop every memoized list. Required after the snapshot changes.
    pub fn invalidate(&mut self) {
        if !self.cache.is_empty() {
            log::debug!("Range cache invalidated ({} entries)", self.cache.len());
        }
        self.cache.clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

fn compute_candidates(
    network: &Network,
    system: SystemId,
    exclude: &BTreeSet<SystemId>,
) -> PlannerResult<Vec<RangeCandidate>> {
    let origin = network.position(system)?;
    let mut found: Vec<RangeCandidate> = network
        .ids()
        .filter(|&other| other != system && !exclude.contains(&other))
        .filter_map(|other| {
            let position = network.system(other).position?;
            let distance_ly = origin.distance_ly(&position);
            (distance_ly <= MAX_BRIDGE_RANGE_LY).then(|| RangeCandidate {
                system: other,
                name: network.name(other).to_string(),
                distance_ly,
            })
        })
        .collect();
    found.sort_by(|a, b| a.distance_ly.total_cmp(&b.distance_ly));
    Ok(found)
}
