//! Planning constants: physical units, bridge range, scoring weights.
//!
//! Plain `const` values with no runtime dependency. Tunable sampling policies
//! live in [`crate::config`]; everything here is fixed by the game rules or by
//! the published scoring formulas.

/// Metres per light-year. Snapshot coordinates are in metres.
pub const METERS_PER_LY: f64 = 9.461e15;

/// Maximum bridge span in light-years.
pub const MAX_BRIDGE_RANGE_LY: f64 = 5.0;

/// Hops a bridge costs to traverse.
pub const BRIDGE_HOP_COST: u32 = 1;

/// Weights for the composite bridge-hub score. Each metric is normalized by
/// its maximum over all systems before weighting.
pub mod composite_weights {
    pub const CLOSENESS: f64 = 0.25;
    pub const BETWEENNESS: f64 = 0.25;
    pub const CANDIDATES: f64 = 0.30;
    pub const CROSS_CONSTELLATION: f64 = 0.20;
}

/// Weights for the `balanced` placement strategy.
pub mod balanced_weights {
    pub const JUMP_SAVINGS: f64 = 0.4;
    pub const IMPROVED_PATHS: f64 = 0.4;
    pub const CROSS_REGION: f64 = 0.2;
    /// Raw bonus a cross-constellation pair earns before weighting.
    pub const CROSS_REGION_BONUS: f64 = 10.0;
}

/// Multiplier the `cross_constellation` strategy applies to improved paths.
pub const CROSS_CONSTELLATION_MULTIPLIER: f64 = 2.0;

/// Default sampling and report sizes (see [`crate::config::PlannerConfig`]).
pub mod defaults {
    pub const IMPROVED_PATH_SAMPLE: usize = 20;
    pub const BETWEENNESS_SOURCES: usize = 10;
    pub const TOP_IMPROVEMENTS: usize = 10;
    pub const HIGH_TRAFFIC: usize = 10;
}

/// Upgrade names used by the built-in ledger presets.
pub mod preset_upgrades {
    pub const PROSPECTING_ARRAY: [&str; 3] = [
        "Prospecting Array 3",
        "Prospecting Array 2",
        "Prospecting Array 1",
    ];
    pub const MAJOR_THREAT: [&str; 3] = ["Major Threat 3", "Major Threat 2", "Major Threat 1"];
    pub const MINOR_THREAT: [&str; 3] = ["Minor Threat 3", "Minor Threat 2", "Minor Threat 1"];
}
