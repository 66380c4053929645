//! Committed bridge configuration.
//!
//! A `BridgeSet` is the plan the user has accepted, as opposed to the
//! optimizer's proposals. Each system anchors at most one bridge. Bridges are
//! stored by system name so the set can be persisted and restored against a
//! later snapshot; [`BridgeSet::revalidate`] drops whatever no longer holds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MAX_BRIDGE_RANGE_LY;
use crate::error::{PlannerError, PlannerResult};
use crate::network::{Network, SystemId};
use crate::optimizer::PlacedBridge;

fn default_active() -> bool {
    true
}

/// One committed bridge. Also the persistence record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bridge {
    pub from: String,
    pub to: String,
    /// Recomputed from positions whenever the bridge is (re)validated.
    #[serde(default)]
    pub distance_ly: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Bridge {
    /// Whether this bridge joins `a` and `b`, in either orientation.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }

    pub fn touches(&self, system: &str) -> bool {
        self.from == system || self.to == system
    }
}

/// Why a bridge was not added.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeRejection {
    #[error("bridge already exists between {from} and {to}")]
    AlreadyExists { from: String, to: String },

    #[error("system {0} already has a bridge")]
    SystemInUse(String),

    #[error("systems too far apart: {distance_ly:.2} LY (max {} LY)", MAX_BRIDGE_RANGE_LY)]
    OutOfRange {
        from: String,
        to: String,
        distance_ly: f64,
    },

    #[error("cannot bridge {0} to itself")]
    SameSystem(String),
}

impl From<BridgeRejection> for PlannerError {
    fn from(rejection: BridgeRejection) -> Self {
        match rejection {
            BridgeRejection::AlreadyExists { from, to } => PlannerError::AlreadyExists { from, to },
            BridgeRejection::SystemInUse(system) => PlannerError::SystemInUse(system),
            BridgeRejection::OutOfRange {
                from,
                to,
                distance_ly,
            } => PlannerError::OutOfRange {
                from,
                to,
                distance_ly,
                max_ly: MAX_BRIDGE_RANGE_LY,
            },
            BridgeRejection::SameSystem(system) => PlannerError::SameSystem(system),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeDecision {
    Added(Bridge),
    Rejected(BridgeRejection),
}

impl BridgeDecision {
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    /// Lift a rejection into an error, for callers that use `?`.
    pub fn into_result(self) -> PlannerResult<Bridge> {
        match self {
            Self::Added(bridge) => Ok(bridge),
            Self::Rejected(rejection) => Err(rejection.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BridgeSet {
    bridges: Vec<Bridge>,
}

impl BridgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a bridge.
    ///
    /// Unknown systems and missing positions are errors; everything else that
    /// makes the pair illegal comes back as [`BridgeDecision::Rejected`].
    pub fn add(
        &mut self,
        network: &Network,
        a: &str,
        b: &str,
        active: bool,
    ) -> PlannerResult<BridgeDecision> {
        match self.check(network, a, b)? {
            Ok(distance_ly) => {
                let bridge = Bridge {
                    from: a.to_string(),
                    to: b.to_string(),
                    distance_ly,
                    active,
                };
                log::debug!("Bridge added: {} <-> {} ({:.2} LY)", a, b, distance_ly);
                self.bridges.push(bridge.clone());
                Ok(BridgeDecision::Added(bridge))
            }
            Err(rejection) => Ok(BridgeDecision::Rejected(rejection)),
        }
    }

    fn check(
        &self,
        network: &Network,
        a: &str,
        b: &str,
    ) -> PlannerResult<Result<f64, BridgeRejection>> {
        let id_a = network.id(a)?;
        let id_b = network.id(b)?;
        if id_a == id_b {
            return Ok(Err(BridgeRejection::SameSystem(a.to_string())));
        }
        if self.contains(a, b) {
            return Ok(Err(BridgeRejection::AlreadyExists {
                from: a.to_string(),
                to: b.to_string(),
            }));
        }
        for system in [a, b] {
            if self.for_system(system).is_some() {
                return Ok(Err(BridgeRejection::SystemInUse(system.to_string())));
            }
        }
        let distance_ly = network.distance_ly(id_a, id_b)?;
        if distance_ly > MAX_BRIDGE_RANGE_LY {
            return Ok(Err(BridgeRejection::OutOfRange {
                from: a.to_string(),
                to: b.to_string(),
                distance_ly,
            }));
        }
        Ok(Ok(distance_ly))
    }

    /// Remove the bridge between `a` and `b` (either orientation).
    pub fn remove(&mut self, a: &str, b: &str) -> PlannerResult<Bridge> {
        let index = self
            .bridges
            .iter()
            .position(|bridge| bridge.connects(a, b))
            .ok_or_else(|| PlannerError::NotFound(format!("bridge {a} <-> {b}")))?;
        Ok(self.bridges.remove(index))
    }

    pub fn contains(&self, a: &str, b: &str) -> bool {
        self.bridges.iter().any(|bridge| bridge.connects(a, b))
    }

    /// The bridge anchored at `system`, if any.
    pub fn for_system(&self, system: &str) -> Option<&Bridge> {
        self.bridges.iter().find(|bridge| bridge.touches(system))
    }

    /// Every system that anchors a bridge.
    pub fn used_systems(&self) -> BTreeSet<&str> {
        self.bridges
            .iter()
            .flat_map(|bridge| [bridge.from.as_str(), bridge.to.as_str()])
            .collect()
    }

    pub fn set_active(&mut self, a: &str, b: &str, active: bool) -> PlannerResult<()> {
        let bridge = self
            .bridges
            .iter_mut()
            .find(|bridge| bridge.connects(a, b))
            .ok_or_else(|| PlannerError::NotFound(format!("bridge {a} <-> {b}")))?;
        bridge.active = active;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bridges.clear();
    }

    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.bridges.iter().filter(|bridge| bridge.active).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bridge> {
        self.bridges.iter()
    }

    /// Replace the set with an optimizer result. All placed bridges start
    /// active. Each one is validated as if added fresh, with the distance
    /// taken from the live positions; on the first failure the current set is
    /// left untouched.
    pub fn apply_plan(
        &mut self,
        network: &Network,
        placed: &[PlacedBridge],
    ) -> PlannerResult<()> {
        let mut next = Self::new();
        for p in placed {
            next.add(network, &p.from, &p.to, true)?.into_result()?;
        }
        *self = next;
        log::info!("Applied bridge plan with {} bridges", self.bridges.len());
        Ok(())
    }

    /// Active bridges as id pairs, for building a bridged graph.
    pub fn active_pairs(&self, network: &Network) -> PlannerResult<Vec<(SystemId, SystemId)>> {
        self.bridges
            .iter()
            .filter(|bridge| bridge.active)
            .map(|bridge| Ok((network.id(&bridge.from)?, network.id(&bridge.to)?)))
            .collect()
    }

    /// Persistence records, in insertion order.
    pub fn records(&self) -> Vec<Bridge> {
        self.bridges.clone()
    }

    /// Rebuild a set from persisted records. Every record is validated as if
    /// it were added fresh; the first one that fails aborts the restore.
    pub fn from_records(network: &Network, records: Vec<Bridge>) -> PlannerResult<Self> {
        let mut set = Self::new();
        for record in records {
            set.add(network, &record.from, &record.to, record.active)?
                .into_result()?;
        }
        Ok(set)
    }

    /// Re-check every bridge against a new snapshot, dropping the ones that no
    /// longer hold. Returns the dropped bridges.
    pub fn revalidate(&mut self, network: &Network) -> Vec<Bridge> {
        let previous = std::mem::take(&mut self.bridges);
        let mut dropped = Vec::new();
        for bridge in previous {
            match self.add(network, &bridge.from, &bridge.to, bridge.active) {
                Ok(BridgeDecision::Added(_)) => {}
                Ok(BridgeDecision::Rejected(reason)) => {
                    log::warn!("Dropping bridge {} <-> {}: {}", bridge.from, bridge.to, reason);
                    dropped.push(bridge);
                }
                Err(err) => {
                    log::warn!("Dropping bridge {} <-> {}: {}", bridge.from, bridge.to, err);
                    dropped.push(bridge);
                }
            }
        }
        dropped
    }
}
