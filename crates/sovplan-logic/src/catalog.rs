//! Upgrade catalog: reference data for the capacity ledger.
//!
//! Catalog entries keep the external sign convention: a positive delta
//! *consumes* capacity, a negative delta *grants* capacity. Accounting code
//! never reads the signed value directly; it goes through [`ResourceDelta`],
//! which names the two halves.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, PlannerError, PlannerResult};

/// The two independently tracked capacity pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Power,
    Workforce,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Power => "power",
            Self::Workforce => "workforce",
        })
    }
}

/// A signed catalog delta split into what it takes and what it gives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceDelta {
    pub consumes: i64,
    pub grants: i64,
}

impl ResourceDelta {
    pub fn from_signed(delta: i64) -> Self {
        if delta < 0 {
            Self {
                consumes: 0,
                grants: delta.saturating_neg(),
            }
        } else {
            Self {
                consumes: delta,
                grants: 0,
            }
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub name: String,
    pub category: String,
    /// Signed: positive consumes power, negative adds power.
    pub power: i64,
    /// Signed: positive consumes workforce, negative adds workforce.
    pub workforce: i64,
    #[serde(default)]
    pub description: String,
}

impl UpgradeDefinition {
    pub fn delta(&self, resource: Resource) -> ResourceDelta {
        match resource {
            Resource::Power => ResourceDelta::from_signed(self.power),
            Resource::Workforce => ResourceDelta::from_signed(self.workforce),
        }
    }
}

/// Name-indexed upgrade catalog, preserving load order.
#[derive(Debug, Clone, Default)]
pub struct UpgradeCatalog {
    upgrades: Vec<UpgradeDefinition>,
    by_name: HashMap<String, usize>,
}

impl UpgradeCatalog {
    pub fn from_definitions(upgrades: Vec<UpgradeDefinition>) -> PlannerResult<Self> {
        let mut by_name = HashMap::with_capacity(upgrades.len());
        for (i, upgrade) in upgrades.iter().enumerate() {
            if by_name.insert(upgrade.name.clone(), i).is_some() {
                return Err(PlannerError::DuplicateEntity {
                    kind: EntityKind::Upgrade,
                    name: upgrade.name.clone(),
                });
            }
        }
        Ok(Self { upgrades, by_name })
    }

    /// Parse a JSON array of definitions.
    pub fn from_json_str(json: &str) -> PlannerResult<Self> {
        let upgrades: Vec<UpgradeDefinition> = serde_json::from_str(json)?;
        Self::from_definitions(upgrades)
    }

    pub fn get(&self, name: &str) -> PlannerResult<&UpgradeDefinition> {
        self.by_name
            .get(name)
            .map(|&i| &self.upgrades[i])
            .ok_or_else(|| PlannerError::unknown_upgrade(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.upgrades.iter()
    }

    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a UpgradeDefinition> {
        self.upgrades.iter().filter(move |u| u.category == category)
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for upgrade in &self.upgrades {
            if !seen.contains(&upgrade.category.as_str()) {
                seen.push(&upgrade.category);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_catalog, upgrade};

    #[test]
    fn test_sign_convention() {
        let consumer = ResourceDelta::from_signed(500);
        assert_eq!(consumer.consumes, 500);
        assert_eq!(consumer.grants, 0);
        let booster = ResourceDelta::from_signed(-300);
        assert_eq!(booster.consumes, 0);
        assert_eq!(booster.grants, 300);
        assert_eq!(ResourceDelta::from_signed(0), ResourceDelta::default());
    }

    #[test]
    fn test_lookup_and_categories() {
        let catalog = sample_catalog();
        assert_eq!(catalog.get("Major Threat 2").unwrap().power, 1200);
        assert!(matches!(
            catalog.get("Warp Gate"),
            Err(PlannerError::UnknownEntity {
                kind: EntityKind::Upgrade,
                ..
            })
        ));
        assert_eq!(
            catalog.categories(),
            vec!["Mining", "Ratting", "Capacity", "Strategic"]
        );
        assert_eq!(catalog.by_category("Mining").count(), 3);
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = UpgradeCatalog::from_definitions(vec![
            upgrade("Cyno", "Strategic", 100, 0),
            upgrade("Cyno", "Strategic", 200, 0),
        ]);
        assert!(matches!(result, Err(PlannerError::DuplicateEntity { .. })));
    }

    #[test]
    fn test_from_json() {
        let catalog = UpgradeCatalog::from_json_str(
            r#"[{"name": "Power Monitoring Division 1", "category": "Capacity",
                 "power": -300, "workforce": 0, "description": "adds power"}]"#,
        )
        .unwrap();
        let def = catalog.get("Power Monitoring Division 1").unwrap();
        assert_eq!(def.delta(Resource::Power).grants, 300);
    }
}
