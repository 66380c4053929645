//! Error taxonomy for the planning core.
//!
//! Structural problems (unknown identifiers, disconnected networks, malformed
//! records) are hard failures. Expected outcomes such as a full capacity pool
//! or a duplicate bridge are returned as reject values by the ledger and the
//! bridge set; the matching variants here exist so those rejections can be
//! lifted into `?`-style control flow when a caller wants that.

use std::fmt;

use thiserror::Error;

use crate::catalog::Resource;

/// What kind of identifier failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    System,
    Upgrade,
    Bridge,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::Upgrade => "upgrade",
            Self::Bridge => "bridge",
        })
    }
}

/// Root error type for all planning failures.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("unknown {kind}: {name}")]
    UnknownEntity { kind: EntityKind, name: String },

    #[error("duplicate {kind}: {name}")]
    DuplicateEntity { kind: EntityKind, name: String },

    #[error("system {0} has no position data")]
    MissingPosition(String),

    #[error("cannot bridge {0} to itself")]
    SameSystem(String),

    #[error("{from} and {to} are {distance_ly:.2} LY apart (max {max_ly} LY)")]
    OutOfRange {
        from: String,
        to: String,
        distance_ly: f64,
        max_ly: f64,
    },

    #[error("no fixed-link path between {from} and {to}")]
    Unreachable { from: String, to: String },

    #[error("insufficient {resource} in {system}: need {need}, only {available} available")]
    CapacityExceeded {
        system: String,
        resource: Resource,
        need: i64,
        available: i64,
    },

    #[error("bridge already exists between {from} and {to}")]
    AlreadyExists { from: String, to: String },

    #[error("system {0} already has a bridge")]
    SystemInUse(String),

    #[error("upgrade '{upgrade}' is already installed in {system}")]
    AlreadyInstalled { system: String, upgrade: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("network is disconnected ({components} components)")]
    Disconnected { components: usize },

    #[error("unknown preset: {0} (expected max_mining, max_ratting, balanced or empty)")]
    UnknownPreset(String),

    #[error("unknown strategy: {0} (expected jump_savings, coverage, cross_constellation or balanced)")]
    UnknownStrategy(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("malformed record: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlannerError {
    pub fn unknown_system(name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind: EntityKind::System,
            name: name.into(),
        }
    }

    pub fn unknown_upgrade(name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind: EntityKind::Upgrade,
            name: name.into(),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;
