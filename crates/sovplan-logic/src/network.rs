//! Network snapshot and spatial model.
//!
//! A `Network` is the immutable, indexed form of a [`NetworkSnapshot`]: systems
//! keep their snapshot order (the stable enumeration order every deterministic
//! algorithm in this crate relies on) and are addressed by [`SystemId`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::METERS_PER_LY;
use crate::error::{EntityKind, PlannerError, PlannerResult};

/// Index of a system in snapshot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SystemId(pub u32);

impl SystemId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// In-game coordinates in metres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build a position from light-year coordinates.
    pub fn from_ly(x: f64, y: f64, z: f64) -> Self {
        Self::new(x * METERS_PER_LY, y * METERS_PER_LY, z * METERS_PER_LY)
    }

    /// Euclidean distance in light-years.
    pub fn distance_ly(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        (dx * dx + dy * dy + dz * dz).sqrt() / METERS_PER_LY
    }
}

/// One system as supplied by the data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub name: String,
    #[serde(default)]
    pub position: Option<Position>,
    pub constellation: String,
    #[serde(default)]
    pub power_capacity: i64,
    #[serde(default)]
    pub workforce_capacity: i64,
}

/// A permanent stargate connection, unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedLinkRecord {
    pub from: String,
    pub to: String,
}

/// Already-parsed network data handed to the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub systems: Vec<SystemRecord>,
    #[serde(default)]
    pub links: Vec<FixedLinkRecord>,
}

impl NetworkSnapshot {
    pub fn from_json_str(json: &str) -> PlannerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Indexed, immutable network for one planning session.
#[derive(Debug, Clone)]
pub struct Network {
    systems: Vec<SystemRecord>,
    by_name: HashMap<String, SystemId>,
    links: Vec<(SystemId, SystemId)>,
    skipped_links: usize,
}

impl Network {
    /// Index a snapshot.
    ///
    /// Duplicate system names are an error. Links that name a system outside
    /// the snapshot are border links into other regions; they are skipped and
    /// counted. Self-links are dropped.
    pub fn from_snapshot(snapshot: NetworkSnapshot) -> PlannerResult<Self> {
        let mut by_name = HashMap::with_capacity(snapshot.systems.len());
        for (i, system) in snapshot.systems.iter().enumerate() {
            if by_name
                .insert(system.name.clone(), SystemId(i as u32))
                .is_some()
            {
                return Err(PlannerError::DuplicateEntity {
                    kind: EntityKind::System,
                    name: system.name.clone(),
                });
            }
        }

        let mut links = Vec::with_capacity(snapshot.links.len());
        let mut skipped_links = 0;
        for link in &snapshot.links {
            match (by_name.get(&link.from), by_name.get(&link.to)) {
                (Some(&a), Some(&b)) if a != b => links.push((a, b)),
                (Some(_), Some(_)) => {}
                _ => skipped_links += 1,
            }
        }
        if skipped_links > 0 {
            log::warn!(
                "Skipped {} fixed links to systems outside the snapshot",
                skipped_links
            );
        }
        log::info!(
            "Network loaded: {} systems, {} internal links",
            snapshot.systems.len(),
            links.len()
        );

        Ok(Self {
            systems: snapshot.systems,
            by_name,
            links,
            skipped_links,
        })
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// All system ids in enumeration order.
    pub fn ids(&self) -> impl Iterator<Item = SystemId> + '_ {
        (0..self.systems.len() as u32).map(SystemId)
    }

    pub fn id(&self, name: &str) -> PlannerResult<SystemId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| PlannerError::unknown_system(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn system(&self, id: SystemId) -> &SystemRecord {
        &self.systems[id.index()]
    }

    pub fn systems(&self) -> &[SystemRecord] {
        &self.systems
    }

    pub fn name(&self, id: SystemId) -> &str {
        &self.systems[id.index()].name
    }

    pub fn constellation(&self, id: SystemId) -> &str {
        &self.systems[id.index()].constellation
    }

    /// Internal fixed links as id pairs, in snapshot order.
    pub fn links(&self) -> &[(SystemId, SystemId)] {
        &self.links
    }

    /// Links dropped at load because an endpoint was outside the snapshot.
    pub fn skipped_links(&self) -> usize {
        self.skipped_links
    }

    pub fn position(&self, id: SystemId) -> PlannerResult<Position> {
        self.systems[id.index()]
            .position
            .ok_or_else(|| PlannerError::MissingPosition(self.name(id).to_string()))
    }

    /// Distance in light-years between two systems.
    pub fn distance_ly(&self, a: SystemId, b: SystemId) -> PlannerResult<f64> {
        let pa = self.position(a)?;
        let pb = self.position(b)?;
        Ok(pa.distance_ly(&pb))
    }

    /// Distance in light-years, by name.
    pub fn distance_between(&self, a: &str, b: &str) -> PlannerResult<f64> {
        self.distance_ly(self.id(a)?, self.id(b)?)
    }

    /// Systems in a constellation, in enumeration order.
    pub fn constellation_systems(&self, constellation: &str) -> Vec<&str> {
        self.systems
            .iter()
            .filter(|s| s.constellation == constellation)
            .map(|s| s.name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{link, system};

    #[test]
    fn test_distance_in_light_years() {
        let a = Position::from_ly(0.0, 0.0, 0.0);
        let b = Position::from_ly(3.0, 4.0, 0.0);
        assert!((a.distance_ly(&b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_lookup_and_order() {
        let net = Network::from_snapshot(NetworkSnapshot {
            systems: vec![
                system("A", "C1", 0.0, 0.0, 0.0),
                system("B", "C1", 1.0, 0.0, 0.0),
                system("C", "C2", 2.0, 0.0, 0.0),
            ],
            links: vec![link("A", "B"), link("B", "C")],
        })
        .unwrap();
        assert_eq!(net.len(), 3);
        assert_eq!(net.id("B").unwrap(), SystemId(1));
        assert_eq!(net.name(SystemId(2)), "C");
        assert_eq!(net.constellation_systems("C1"), vec!["A", "B"]);
        assert!((net.distance_between("A", "C").unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_system() {
        let net = Network::from_snapshot(NetworkSnapshot {
            systems: vec![system("A", "C1", 0.0, 0.0, 0.0)],
            links: vec![],
        })
        .unwrap();
        assert!(matches!(
            net.id("Z"),
            Err(PlannerError::UnknownEntity {
                kind: EntityKind::System,
                ..
            })
        ));
    }

    #[test]
    fn test_duplicate_system_rejected() {
        let result = Network::from_snapshot(NetworkSnapshot {
            systems: vec![
                system("A", "C1", 0.0, 0.0, 0.0),
                system("A", "C2", 1.0, 0.0, 0.0),
            ],
            links: vec![],
        });
        assert!(matches!(
            result,
            Err(PlannerError::DuplicateEntity { .. })
        ));
    }

    #[test]
    fn test_border_links_skipped() {
        let net = Network::from_snapshot(NetworkSnapshot {
            systems: vec![
                system("A", "C1", 0.0, 0.0, 0.0),
                system("B", "C1", 1.0, 0.0, 0.0),
            ],
            links: vec![link("A", "B"), link("B", "Outside"), link("A", "A")],
        })
        .unwrap();
        assert_eq!(net.links().len(), 1);
        assert_eq!(net.skipped_links(), 1);
    }

    #[test]
    fn test_missing_position() {
        let mut lost = system("Lost", "C1", 0.0, 0.0, 0.0);
        lost.position = None;
        let net = Network::from_snapshot(NetworkSnapshot {
            systems: vec![system("A", "C1", 0.0, 0.0, 0.0), lost],
            links: vec![],
        })
        .unwrap();
        assert!(matches!(
            net.distance_between("A", "Lost"),
            Err(PlannerError::MissingPosition(name)) if name == "Lost"
        ));
    }

    #[test]
    fn test_snapshot_from_json() {
        let json = r#"{
            "systems": [
                {"name": "A", "position": {"x": 0.0, "y": 0.0, "z": 0.0},
                 "constellation": "C1", "power_capacity": 1000, "workforce_capacity": 500},
                {"name": "B", "constellation": "C1"}
            ],
            "links": [{"from": "A", "to": "B"}]
        }"#;
        let snapshot = NetworkSnapshot::from_json_str(json).unwrap();
        assert_eq!(snapshot.systems.len(), 2);
        assert_eq!(snapshot.systems[0].power_capacity, 1000);
        assert!(snapshot.systems[1].position.is_none());
    }
}
