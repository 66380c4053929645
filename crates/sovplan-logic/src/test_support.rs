//! Shared fixtures for unit tests.

use crate::catalog::{UpgradeCatalog, UpgradeDefinition};
use crate::network::{FixedLinkRecord, Network, NetworkSnapshot, Position, SystemRecord};

/// A system at light-year coordinates with 2000 power / 1000 workforce.
pub fn system(name: &str, constellation: &str, x: f64, y: f64, z: f64) -> SystemRecord {
    SystemRecord {
        name: name.to_string(),
        position: Some(Position::from_ly(x, y, z)),
        constellation: constellation.to_string(),
        power_capacity: 2000,
        workforce_capacity: 1000,
    }
}

pub fn link(from: &str, to: &str) -> FixedLinkRecord {
    FixedLinkRecord {
        from: from.to_string(),
        to: to.to_string(),
    }
}

pub fn network(systems: Vec<SystemRecord>, links: Vec<FixedLinkRecord>) -> Network {
    Network::from_snapshot(NetworkSnapshot { systems, links }).unwrap()
}

/// A and B are 3.2 LY apart but four gate jumps apart: A-X1-X2-X3-B.
/// The detour systems sit far above the plane, out of bridge range.
pub fn detour_snapshot() -> NetworkSnapshot {
    NetworkSnapshot {
        systems: vec![
            system("A", "North", 0.0, 0.0, 0.0),
            system("X1", "North", 0.0, 20.0, 0.0),
            system("X2", "Middle", 0.0, 40.0, 0.0),
            system("X3", "South", 3.2, 20.0, 0.0),
            system("B", "South", 3.2, 0.0, 0.0),
        ],
        links: vec![
            link("A", "X1"),
            link("X1", "X2"),
            link("X2", "X3"),
            link("X3", "B"),
        ],
    }
}

/// Four far-apart clusters of two systems each, gated in a chain.
/// Exactly four non-overlapping bridge pairs exist (one per cluster).
pub fn clustered_snapshot() -> NetworkSnapshot {
    let mut systems = Vec::new();
    let mut links = Vec::new();
    for k in 0..4 {
        let x = 100.0 * k as f64;
        let constellation = format!("K{k}");
        systems.push(system(&format!("P{k}a"), &constellation, x, 0.0, 0.0));
        systems.push(system(&format!("P{k}b"), &constellation, x + 1.0, 0.0, 0.0));
        links.push(link(&format!("P{k}a"), &format!("P{k}b")));
        if k > 0 {
            links.push(link(&format!("P{}b", k - 1), &format!("P{k}a")));
        }
    }
    NetworkSnapshot { systems, links }
}

/// Star-shaped region: hub H gated to four spokes, all within bridge range,
/// spread over three constellations.
pub fn star_snapshot() -> NetworkSnapshot {
    NetworkSnapshot {
        systems: vec![
            system("H", "Core", 0.0, 0.0, 0.0),
            system("S1", "Core", 2.0, 0.0, 0.0),
            system("S2", "East", -2.0, 0.0, 0.0),
            system("S3", "East", 0.0, 2.0, 0.0),
            system("S4", "West", 0.0, -2.0, 0.0),
        ],
        links: vec![
            link("H", "S1"),
            link("H", "S2"),
            link("H", "S3"),
            link("H", "S4"),
        ],
    }
}

pub fn upgrade(name: &str, category: &str, power: i64, workforce: i64) -> UpgradeDefinition {
    UpgradeDefinition {
        name: name.to_string(),
        category: category.to_string(),
        power,
        workforce,
        description: String::new(),
    }
}

/// Catalog covering every preset candidate plus capacity boosters.
pub fn sample_catalog() -> UpgradeCatalog {
    UpgradeCatalog::from_definitions(vec![
        upgrade("Prospecting Array 1", "Mining", 400, 200),
        upgrade("Prospecting Array 2", "Mining", 900, 400),
        upgrade("Prospecting Array 3", "Mining", 1800, 800),
        upgrade("Major Threat 1", "Ratting", 600, 300),
        upgrade("Major Threat 2", "Ratting", 1200, 500),
        upgrade("Major Threat 3", "Ratting", 2400, 900),
        upgrade("Minor Threat 1", "Ratting", 300, 100),
        upgrade("Minor Threat 2", "Ratting", 600, 250),
        upgrade("Minor Threat 3", "Ratting", 1100, 450),
        upgrade("Power Monitoring Division 1", "Capacity", -300, 0),
        upgrade("Power Monitoring Division 3", "Capacity", -1000, 0),
        upgrade("Workforce Mecha-Tooling 1", "Capacity", 0, -400),
        upgrade("Cynosural Navigation", "Strategic", 500, 0),
    ])
    .unwrap()
}
