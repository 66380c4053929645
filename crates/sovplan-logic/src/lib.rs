//! Pure planning logic for sovereignty infrastructure.
//!
//! This crate contains the network optimization and capacity-ledger engine,
//! independent of any data source, persistence layer, or dashboard. Functions
//! take plain records and return results, making them unit-testable and
//! reusable from the headless harness, a web backend, or any future host.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bridges`] | Committed bridge set (exclusivity, persistence records) |
//! | [`catalog`] | Upgrade catalog and signed power/workforce deltas |
//! | [`config`] | Tunable sampling and reporting policies |
//! | [`constants`] | Physical constants, range limit, scoring weights |
//! | [`error`] | `PlannerError` taxonomy and `PlannerResult` alias |
//! | [`evaluator`] | Per-pair bridge value (jump savings, improved paths) |
//! | [`graph`] | Fixed-link connectivity: BFS, centrality, chokepoints |
//! | [`ledger`] | Per-system capacity accounting, add/remove/presets |
//! | [`network`] | Snapshot loading, system lookup, 3D distance in LY |
//! | [`optimizer`] | Greedy bridge placement with pluggable scoring strategy |
//! | [`range`] | Bridge-range candidate index with session cache |
//! | [`reports`] | Network, jump-savings and staging reports |
//! | [`scoring`] | Per-system metrics and composite hub ranking |
//! | [`session`] | Planning session owning snapshot, cache, bridges, ledger |

pub mod bridges;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod ledger;
pub mod network;
pub mod optimizer;
pub mod range;
pub mod reports;
pub mod scoring;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{PlannerError, PlannerResult};
pub use session::PlanningSession;
