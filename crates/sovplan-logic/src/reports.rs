//! Network and bridge-impact reports.
//!
//! Read-only summaries built from the connectivity graph and the committed
//! bridge set. Active bridges are modelled as extra one-hop edges; inactive
//! bridges are ignored.

use serde::{Deserialize, Serialize};

use crate::bridges::BridgeSet;
use crate::config::PlannerConfig;
use crate::error::PlannerResult;
use crate::graph::ConnectivityGraph;
use crate::network::{Network, SystemId};
use crate::scoring::RankedSystem;

// ── Network report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub systems: usize,
    pub links: usize,
    pub density: f64,
    pub diameter: u32,
    pub average_path_length: f64,
    /// Articulation points, in enumeration order.
    pub chokepoints: Vec<String>,
    /// Highest closeness centrality; `None` for an empty network.
    pub network_center: Option<String>,
    /// Highest betweenness first.
    pub high_traffic: Vec<RankedSystem>,
}

/// Whole-network structure summary. Requires a connected graph.
pub fn network_report(
    network: &Network,
    graph: &ConnectivityGraph,
    config: &PlannerConfig,
) -> PlannerResult<NetworkReport> {
    let (diameter, average_path_length) = graph.path_length_stats()?;
    let closeness = graph.closeness_centrality()?;
    let betweenness = graph.betweenness_centrality(config.betweenness_sources)?;

    let mut center: Option<(SystemId, f64)> = None;
    for id in network.ids() {
        let score = closeness[id.index()];
        if center.map_or(true, |(_, best)| score > best) {
            center = Some((id, score));
        }
    }

    let mut high_traffic: Vec<RankedSystem> = network
        .ids()
        .map(|id| RankedSystem {
            system: network.name(id).to_string(),
            score: betweenness[id.index()],
        })
        .collect();
    high_traffic.sort_by(|a, b| b.score.total_cmp(&a.score));
    high_traffic.truncate(config.high_traffic);

    Ok(NetworkReport {
        systems: network.len(),
        links: graph.edge_count(),
        density: graph.density(),
        diameter,
        average_path_length,
        chokepoints: graph
            .articulation_points()
            .into_iter()
            .map(|id| network.name(id).to_string())
            .collect(),
        network_center: center.map(|(id, _)| network.name(id).to_string()),
        high_traffic,
    })
}

// ── Jump savings ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathImprovement {
    pub from: String,
    pub to: String,
    pub before: u32,
    pub after: u32,
    pub saved: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JumpSavingsReport {
    pub active_bridges: usize,
    /// Unordered pairs reachable over fixed links.
    pub pairs_compared: usize,
    pub average_jumps_before: f64,
    pub average_jumps_after: f64,
    pub average_savings: f64,
    pub improved_pairs: usize,
    /// Largest saving first; enumeration order on ties.
    pub top_improvements: Vec<PathImprovement>,
}

/// All-pairs hop counts over fixed links versus fixed links plus active
/// bridges. Pairs unreachable over fixed links are skipped.
pub fn jump_savings_report(
    network: &Network,
    graph: &ConnectivityGraph,
    bridges: &BridgeSet,
    config: &PlannerConfig,
) -> PlannerResult<JumpSavingsReport> {
    let bridged = graph.with_extra_edges(&bridges.active_pairs(network)?);

    let mut pairs = 0usize;
    let mut total_before = 0u64;
    let mut total_after = 0u64;
    let mut improvements = Vec::new();

    for from in network.ids() {
        let before_row = graph.hops_from(from);
        let after_row = bridged.hops_from(from);
        for to in network.ids().filter(|&to| to > from) {
            let (Some(before), Some(after)) = (before_row[to.index()], after_row[to.index()])
            else {
                continue;
            };
            pairs += 1;
            total_before += u64::from(before);
            total_after += u64::from(after);
            if after < before {
                improvements.push(PathImprovement {
                    from: network.name(from).to_string(),
                    to: network.name(to).to_string(),
                    before,
                    after,
                    saved: before - after,
                });
            }
        }
    }

    let average = |total: u64| if pairs == 0 { 0.0 } else { total as f64 / pairs as f64 };
    let improved_pairs = improvements.len();
    improvements.sort_by(|a, b| b.saved.cmp(&a.saved));
    improvements.truncate(config.top_improvements);

    Ok(JumpSavingsReport {
        active_bridges: bridges.active_count(),
        pairs_compared: pairs,
        average_jumps_before: average(total_before),
        average_jumps_after: average(total_after),
        average_savings: average(total_before) - average(total_after),
        improved_pairs,
        top_improvements: improvements,
    })
}

// ── Staging ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingReport {
    pub system: String,
    /// Other systems reachable over fixed links.
    pub reachable: usize,
    pub average_jumps: f64,
    pub max_jumps: u32,
    pub average_jumps_with_bridges: f64,
    pub max_jumps_with_bridges: u32,
}

/// Reach of a staging system, over fixed links and with active bridges.
pub fn staging_report(
    network: &Network,
    graph: &ConnectivityGraph,
    bridges: &BridgeSet,
    staging: &str,
) -> PlannerResult<StagingReport> {
    let origin = network.id(staging)?;
    let bridged = graph.with_extra_edges(&bridges.active_pairs(network)?);

    let (reachable, average_jumps, max_jumps) = reach(graph, origin);
    let (_, average_jumps_with_bridges, max_jumps_with_bridges) = reach(&bridged, origin);

    Ok(StagingReport {
        system: staging.to_string(),
        reachable,
        average_jumps,
        max_jumps,
        average_jumps_with_bridges,
        max_jumps_with_bridges,
    })
}

/// (count, mean, max) of hop counts to every other reachable system.
fn reach(graph: &ConnectivityGraph, origin: SystemId) -> (usize, f64, u32) {
    let hops: Vec<u32> = graph
        .hops_from(origin)
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| i != origin.index())
        .filter_map(|(_, hops)| hops)
        .collect();
    if hops.is_empty() {
        return (0, 0.0, 0);
    }
    let total: u64 = hops.iter().map(|&h| u64::from(h)).sum();
    let max = hops.iter().copied().max().unwrap_or(0);
    (hops.len(), total as f64 / hops.len() as f64, max)
}
