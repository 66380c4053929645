//! Per-system capacity ledger.
//!
//! Each system has a base power and workforce pool from the snapshot.
//! Installed upgrades either consume from a pool or grant extra capacity to it
//! (see [`crate::catalog::ResourceDelta`]). For each resource:
//!
//! ```text
//! total     = base + added
//! available = total - used
//! ```
//!
//! Capacity problems are expected outcomes, returned as
//! [`Decision::Rejected`]. Unknown systems and upgrades are errors.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Resource, UpgradeCatalog, UpgradeDefinition};
use crate::constants::preset_upgrades;
use crate::error::{EntityKind, PlannerError, PlannerResult};
use crate::network::Network;

// ── Records ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseCapacity {
    pub power: i64,
    pub workforce: i64,
}

/// Accounting for one resource pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub base: i64,
    pub added: i64,
    pub used: i64,
    pub total: i64,
    pub available: i64,
}

impl ResourceUsage {
    /// Share of the total pool in use, as a percentage. 0 when the pool is
    /// empty.
    pub fn percent_used(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.used as f64 / self.total as f64 * 100.0
        }
    }
}

/// An upgrade installed in a system, with its catalog deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledUpgrade {
    pub name: String,
    pub category: String,
    pub power: i64,
    pub workforce: i64,
}

impl From<&UpgradeDefinition> for InstalledUpgrade {
    fn from(def: &UpgradeDefinition) -> Self {
        Self {
            name: def.name.clone(),
            category: def.category.clone(),
            power: def.power,
            workforce: def.workforce,
        }
    }
}

/// Full capacity breakdown for one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityUsage {
    pub system: String,
    pub power: ResourceUsage,
    pub workforce: ResourceUsage,
    pub upgrades: Vec<InstalledUpgrade>,
}

impl CapacityUsage {
    pub fn resource(&self, resource: Resource) -> &ResourceUsage {
        match resource {
            Resource::Power => &self.power,
            Resource::Workforce => &self.workforce,
        }
    }
}

/// Persisted ledger entry: the ordered upgrade list of one system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub system: String,
    pub upgrades: Vec<String>,
}

// ── Decisions ──────────────────────────────────────────────────────────────

/// Why a ledger change was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("insufficient power: need {need}, only {available} available (deficit: {})", .need - .available)]
    InsufficientPower { need: i64, available: i64 },

    #[error("insufficient workforce: need {need}, only {available} available (deficit: {})", .need - .available)]
    InsufficientWorkforce { need: i64, available: i64 },

    #[error("upgrade '{0}' is already installed")]
    AlreadyInstalled(String),

    #[error("removing '{upgrade}' would leave {resource} at {remaining}")]
    WouldStrand {
        upgrade: String,
        resource: Resource,
        remaining: i64,
    },
}

impl Rejection {
    /// Lift into a [`PlannerError`] naming the system.
    pub fn into_error(self, system: &str) -> PlannerError {
        let system = system.to_string();
        match self {
            Self::InsufficientPower { need, available } => PlannerError::CapacityExceeded {
                system,
                resource: Resource::Power,
                need,
                available,
            },
            Self::InsufficientWorkforce { need, available } => PlannerError::CapacityExceeded {
                system,
                resource: Resource::Workforce,
                need,
                available,
            },
            Self::AlreadyInstalled(upgrade) => PlannerError::AlreadyInstalled { system, upgrade },
            Self::WouldStrand {
                resource,
                remaining,
                ..
            } => PlannerError::CapacityExceeded {
                system,
                resource,
                need: remaining.saturating_neg(),
                available: 0,
            },
        }
    }
}

/// Outcome of a checked ledger change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Change allowed; capacity left afterwards.
    Accepted {
        power_remaining: i64,
        workforce_remaining: i64,
    },
    Rejected(Rejection),
}

impl Decision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted {
                power_remaining,
                workforce_remaining,
            } => write!(
                f,
                "ok: {power_remaining} power and {workforce_remaining} workforce will remain"
            ),
            Self::Rejected(rejection) => write!(f, "{rejection}"),
        }
    }
}

// ── Presets ────────────────────────────────────────────────────────────────

/// Built-in upgrade layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    MaxMining,
    MaxRatting,
    Balanced,
    Empty,
}

const MAX_MINING_SLOTS: &[&[&str]] = &[&preset_upgrades::PROSPECTING_ARRAY];
const MAX_RATTING_SLOTS: &[&[&str]] = &[
    &preset_upgrades::MAJOR_THREAT,
    &preset_upgrades::MINOR_THREAT,
];
const BALANCED_SLOTS: &[&[&str]] = &[&["Prospecting Array 1"], &["Major Threat 1"]];

impl Preset {
    /// Ordered slots; each slot lists candidates best tier first. A slot
    /// installs the first candidate the ledger accepts.
    pub fn slots(&self) -> &'static [&'static [&'static str]] {
        match self {
            Self::MaxMining => MAX_MINING_SLOTS,
            Self::MaxRatting => MAX_RATTING_SLOTS,
            Self::Balanced => BALANCED_SLOTS,
            Self::Empty => &[],
        }
    }
}

impl FromStr for Preset {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max_mining" => Ok(Self::MaxMining),
            "max_ratting" => Ok(Self::MaxRatting),
            "balanced" => Ok(Self::Balanced),
            "empty" => Ok(Self::Empty),
            other => Err(PlannerError::UnknownPreset(other.to_string())),
        }
    }
}

// ── Ledger ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct CapacityLedger {
    catalog: UpgradeCatalog,
    bases: HashMap<String, BaseCapacity>,
    installed: BTreeMap<String, Vec<String>>,
}

impl CapacityLedger {
    pub fn new(catalog: UpgradeCatalog, network: &Network) -> Self {
        Self {
            catalog,
            bases: base_capacities(network),
            installed: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &UpgradeCatalog {
        &self.catalog
    }

    fn base(&self, system: &str) -> PlannerResult<BaseCapacity> {
        self.bases
            .get(system)
            .copied()
            .ok_or_else(|| PlannerError::unknown_system(system))
    }

    /// Capacity breakdown for `system`, walking its upgrade list once.
    pub fn usage(&self, system: &str) -> PlannerResult<CapacityUsage> {
        let base = self.base(system)?;
        let mut power = ResourceUsage {
            base: base.power,
            ..Default::default()
        };
        let mut workforce = ResourceUsage {
            base: base.workforce,
            ..Default::default()
        };
        let mut upgrades = Vec::new();

        for name in self.installed(system) {
            let def = self.catalog.get(name)?;
            for (resource, usage) in [
                (Resource::Power, &mut power),
                (Resource::Workforce, &mut workforce),
            ] {
                let delta = def.delta(resource);
                usage.added += delta.grants;
                usage.used += delta.consumes;
            }
            upgrades.push(InstalledUpgrade::from(def));
        }

        for usage in [&mut power, &mut workforce] {
            usage.total = usage.base + usage.added;
            usage.available = usage.total - usage.used;
        }
        Ok(CapacityUsage {
            system: system.to_string(),
            power,
            workforce,
            upgrades,
        })
    }

    /// Check an install without applying it.
    ///
    /// Only the consuming half of each delta counts as cost, so an upgrade
    /// that grants a resource never blocks itself on that resource. Power is
    /// checked before workforce, and both before the duplicate check.
    pub fn can_add(&self, system: &str, upgrade: &str) -> PlannerResult<Decision> {
        let def = self.catalog.get(upgrade)?;
        let usage = self.usage(system)?;

        let power = def.delta(Resource::Power);
        let workforce = def.delta(Resource::Workforce);
        if usage.power.available - power.consumes < 0 {
            return Ok(Decision::Rejected(Rejection::InsufficientPower {
                need: power.consumes,
                available: usage.power.available,
            }));
        }
        if usage.workforce.available - workforce.consumes < 0 {
            return Ok(Decision::Rejected(Rejection::InsufficientWorkforce {
                need: workforce.consumes,
                available: usage.workforce.available,
            }));
        }
        if self.installed(system).iter().any(|name| name == upgrade) {
            return Ok(Decision::Rejected(Rejection::AlreadyInstalled(
                upgrade.to_string(),
            )));
        }
        Ok(Decision::Accepted {
            power_remaining: usage.power.available - power.consumes + power.grants,
            workforce_remaining: usage.workforce.available - workforce.consumes
                + workforce.grants,
        })
    }

    /// Install an upgrade. With `force` every check is skipped.
    pub fn add(&mut self, system: &str, upgrade: &str, force: bool) -> PlannerResult<Decision> {
        let decision = if force {
            self.base(system)?;
            self.catalog.get(upgrade)?;
            Decision::Accepted {
                power_remaining: 0,
                workforce_remaining: 0,
            }
        } else {
            self.can_add(system, upgrade)?
        };
        if !decision.is_accepted() {
            return Ok(decision);
        }

        self.installed
            .entry(system.to_string())
            .or_default()
            .push(upgrade.to_string());
        if !force {
            return Ok(decision);
        }

        let usage = self.usage(system)?;
        if usage.power.available < 0 || usage.workforce.available < 0 {
            log::warn!(
                "Forced '{}' into {}: {} power / {} workforce available",
                upgrade,
                system,
                usage.power.available,
                usage.workforce.available
            );
        }
        Ok(Decision::Accepted {
            power_remaining: usage.power.available,
            workforce_remaining: usage.workforce.available,
        })
    }

    /// Remove the first installed copy of `upgrade`.
    ///
    /// Fails when the upgrade is not installed. Refuses (as a rejection) to
    /// remove a capacity grant that the remaining upgrades still depend on.
    pub fn remove(&mut self, system: &str, upgrade: &str) -> PlannerResult<Decision> {
        let usage = self.usage(system)?;
        let index = self
            .installed(system)
            .iter()
            .position(|name| name == upgrade)
            .ok_or_else(|| PlannerError::NotFound(format!("upgrade '{upgrade}' in {system}")))?;

        let def = self.catalog.get(upgrade)?;
        let mut remaining = [0i64; 2];
        for (slot, resource) in [Resource::Power, Resource::Workforce].into_iter().enumerate() {
            let delta = def.delta(resource);
            let after = usage.resource(resource).available - delta.grants + delta.consumes;
            if delta.grants > 0 && after < 0 {
                return Ok(Decision::Rejected(Rejection::WouldStrand {
                    upgrade: upgrade.to_string(),
                    resource,
                    remaining: after,
                }));
            }
            remaining[slot] = after;
        }

        if let Some(list) = self.installed.get_mut(system) {
            list.remove(index);
            if list.is_empty() {
                self.installed.remove(system);
            }
        }
        Ok(Decision::Accepted {
            power_remaining: remaining[0],
            workforce_remaining: remaining[1],
        })
    }

    /// Remove every upgrade from `system`.
    pub fn clear(&mut self, system: &str) -> PlannerResult<()> {
        self.base(system)?;
        self.installed.remove(system);
        Ok(())
    }

    /// Installed upgrade names, in install order.
    pub fn installed(&self, system: &str) -> &[String] {
        self.installed.get(system).map_or(&[], Vec::as_slice)
    }

    /// Systems with at least one upgrade, sorted by name.
    pub fn systems_with_upgrades(&self) -> Vec<&str> {
        self.installed.keys().map(String::as_str).collect()
    }

    /// Reset `system` and fill it from a preset. Returns what was installed.
    ///
    /// The preset name is resolved before the ledger is touched.
    pub fn apply_preset(&mut self, system: &str, preset: &str) -> PlannerResult<Vec<String>> {
        let preset: Preset = preset.parse()?;
        self.clear(system)?;

        let mut added = Vec::new();
        for slot in preset.slots() {
            for &candidate in *slot {
                if !self.catalog.contains(candidate) {
                    log::warn!("Preset {:?} names unknown upgrade '{}'", preset, candidate);
                    continue;
                }
                if self.add(system, candidate, false)?.is_accepted() {
                    added.push(candidate.to_string());
                    break;
                }
            }
        }
        log::info!(
            "Applied preset {:?} to {}: {} upgrades",
            preset,
            system,
            added.len()
        );
        Ok(added)
    }

    /// Persistence records for every system with upgrades.
    pub fn snapshot(&self) -> Vec<LedgerRecord> {
        self.installed
            .iter()
            .map(|(system, upgrades)| LedgerRecord {
                system: system.clone(),
                upgrades: upgrades.clone(),
            })
            .collect()
    }

    /// Replace the ledger with persisted records.
    ///
    /// Names are validated up front so a bad record leaves the ledger
    /// untouched; a system may appear in at most one record. Over-committed
    /// systems are kept (they may have been forced) and logged.
    pub fn restore(&mut self, records: Vec<LedgerRecord>) -> PlannerResult<()> {
        let mut seen = HashSet::new();
        for record in &records {
            self.base(&record.system)?;
            if !seen.insert(record.system.as_str()) {
                return Err(PlannerError::DuplicateEntity {
                    kind: EntityKind::System,
                    name: record.system.clone(),
                });
            }
            for upgrade in &record.upgrades {
                self.catalog.get(upgrade)?;
            }
        }

        self.installed = records
            .into_iter()
            .filter(|record| !record.upgrades.is_empty())
            .map(|record| (record.system, record.upgrades))
            .collect();

        for system in self.installed.keys() {
            let usage = self.usage(system)?;
            if usage.power.available < 0 || usage.workforce.available < 0 {
                log::warn!(
                    "Restored ledger for {} is over capacity: {} power / {} workforce available",
                    system,
                    usage.power.available,
                    usage.workforce.available
                );
            }
        }
        log::info!("Restored ledger for {} systems", self.installed.len());
        Ok(())
    }

    /// Take base capacities from a new snapshot. Upgrade lists for systems
    /// that disappeared are dropped; returns how many.
    pub fn rebase(&mut self, network: &Network) -> usize {
        self.bases = base_capacities(network);
        let before = self.installed.len();
        let bases = &self.bases;
        self.installed.retain(|system, _| {
            let keep = bases.contains_key(system);
            if !keep {
                log::warn!("Dropping upgrades of {}: not in the new snapshot", system);
            }
            keep
        });
        before - self.installed.len()
    }
}

fn base_capacities(network: &Network) -> HashMap<String, BaseCapacity> {
    network
        .systems()
        .iter()
        .map(|s| {
            (
                s.name.clone(),
                BaseCapacity {
                    power: s.power_capacity,
                    workforce: s.workforce_capacity,
                },
            )
        })
        .collect()
}
