//! Per-system metrics and hub rankings.
//!
//! Ranks systems as bridge *endpoints* independently of any specific partner.
//! The composite score normalizes each raw metric by its maximum across all
//! systems (0 when that maximum is 0) and weights them with
//! [`crate::constants::composite_weights`]. Rankings are informational; the
//! optimizer does not read them.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::PlannerConfig;
use crate::constants::composite_weights;
use crate::error::{PlannerError, PlannerResult};
use crate::graph::ConnectivityGraph;
use crate::network::Network;
use crate::range::BridgeRangeIndex;

/// Raw placement metrics for one system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub system: String,
    pub constellation: String,
    pub closeness: f64,
    pub betweenness: f64,
    /// Fixed-link count.
    pub degree: usize,
    /// Systems within bridge range.
    pub candidate_count: usize,
    /// Distinct other constellations among the range candidates.
    pub cross_constellation_reach: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSystem {
    pub system: String,
    pub score: f64,
}

/// What to rank systems by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    Composite,
    Closeness,
    Betweenness,
    Connections,
    CrossConstellation,
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Composite => "composite",
            Self::Closeness => "closeness",
            Self::Betweenness => "betweenness",
            Self::Connections => "connections",
            Self::CrossConstellation => "cross_constellation",
        })
    }
}

impl FromStr for RankMetric {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "composite" => Ok(Self::Composite),
            "closeness" | "centrality" => Ok(Self::Closeness),
            "betweenness" => Ok(Self::Betweenness),
            "connections" => Ok(Self::Connections),
            "cross_constellation" => Ok(Self::CrossConstellation),
            other => Err(PlannerError::Config(format!("unknown rank metric: {other}"))),
        }
    }
}

/// Metrics for every system, in enumeration order. Requires a connected graph.
pub fn system_metrics(
    network: &Network,
    graph: &ConnectivityGraph,
    range_index: &mut BridgeRangeIndex,
    config: &PlannerConfig,
) -> PlannerResult<Vec<SystemMetrics>> {
    let closeness = graph.closeness_centrality()?;
    let betweenness = graph.betweenness_centrality(config.betweenness_sources)?;

    let mut metrics = Vec::with_capacity(network.len());
    for id in network.ids() {
        let own = network.constellation(id);
        let (candidate_count, cross_constellation_reach) = if network.system(id).position.is_some()
        {
            let candidates = range_index.candidates(network, id, &BTreeSet::new())?;
            let reach: HashSet<&str> = candidates
                .iter()
                .map(|c| network.constellation(c.system))
                .filter(|&c| c != own)
                .collect();
            (candidates.len(), reach.len())
        } else {
            (0, 0)
        };
        metrics.push(SystemMetrics {
            system: network.name(id).to_string(),
            constellation: own.to_string(),
            closeness: closeness[id.index()],
            betweenness: betweenness[id.index()],
            degree: graph.degree(id),
            candidate_count,
            cross_constellation_reach,
        });
    }
    Ok(metrics)
}

fn normalizer(values: impl Iterator<Item = f64>) -> impl Fn(f64) -> f64 {
    let max = values.fold(0.0f64, f64::max);
    move |v| if max > 0.0 { v / max } else { 0.0 }
}

/// Composite hub score for every system, descending; ties keep enumeration
/// order.
pub fn composite_ranking(metrics: &[SystemMetrics]) -> Vec<RankedSystem> {
    let closeness = normalizer(metrics.iter().map(|m| m.closeness));
    let betweenness = normalizer(metrics.iter().map(|m| m.betweenness));
    let candidates = normalizer(metrics.iter().map(|m| m.candidate_count as f64));
    let reach = normalizer(metrics.iter().map(|m| m.cross_constellation_reach as f64));

    let mut ranked: Vec<RankedSystem> = metrics
        .iter()
        .map(|m| RankedSystem {
            system: m.system.clone(),
            score: composite_weights::CLOSENESS * closeness(m.closeness)
                + composite_weights::BETWEENNESS * betweenness(m.betweenness)
                + composite_weights::CANDIDATES * candidates(m.candidate_count as f64)
                + composite_weights::CROSS_CONSTELLATION
                    * reach(m.cross_constellation_reach as f64),
        })
        .collect();
    sort_descending(&mut ranked);
    ranked
}

/// Rank by one metric (or the composite), keeping the top `top_n`.
pub fn rank_systems(metrics: &[SystemMetrics], metric: RankMetric, top_n: usize) -> Vec<RankedSystem> {
    let mut ranked = match metric {
        RankMetric::Composite => composite_ranking(metrics),
        single => {
            let mut ranked: Vec<RankedSystem> = metrics
                .iter()
                .map(|m| RankedSystem {
                    system: m.system.clone(),
                    score: match single {
                        RankMetric::Closeness => m.closeness,
                        RankMetric::Betweenness => m.betweenness,
                        RankMetric::Connections => m.candidate_count as f64,
                        _ => m.cross_constellation_reach as f64,
                    },
                })
                .collect();
            sort_descending(&mut ranked);
            ranked
        }
    };
    ranked.truncate(top_n);
    ranked
}

fn sort_descending(ranked: &mut [RankedSystem]) {
    // stable: equal scores keep enumeration order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::star_snapshot;

    fn star_metrics() -> Vec<SystemMetrics> {
        let net = Network::from_snapshot(star_snapshot()).unwrap();
        let graph = ConnectivityGraph::new(&net);
        let mut index = BridgeRangeIndex::new();
        system_metrics(&net, &graph, &mut index, &PlannerConfig::default()).unwrap()
    }

    #[test]
    fn test_star_metrics() {
        let metrics = star_metrics();
        let hub = &metrics[0];
        assert_eq!(hub.system, "H");
        assert_eq!(hub.degree, 4);
        assert!((hub.closeness - 1.0).abs() < 1e-9);
        assert!((hub.betweenness - 1.0).abs() < 1e-9);
        assert_eq!(hub.candidate_count, 4);
        // S2/S3 are East, S4 is West
        assert_eq!(hub.cross_constellation_reach, 2);
        assert_eq!(metrics[1].betweenness, 0.0);
    }

    #[test]
    fn test_hub_ranks_first() {
        let ranked = composite_ranking(&star_metrics());
        assert_eq!(ranked[0].system, "H");
        assert!(ranked[0].score <= 1.0 + 1e-9);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_zero_max_normalizes_to_zero() {
        let metrics = vec![
            SystemMetrics {
                system: "A".into(),
                constellation: "C".into(),
                closeness: 0.0,
                betweenness: 0.0,
                degree: 0,
                candidate_count: 0,
                cross_constellation_reach: 0,
            },
            SystemMetrics {
                system: "B".into(),
                constellation: "C".into(),
                closeness: 0.0,
                betweenness: 0.0,
                degree: 0,
                candidate_count: 0,
                cross_constellation_reach: 0,
            },
        ];
        let ranked = composite_ranking(&metrics);
        assert_eq!(ranked[0].score, 0.0);
        // tie keeps enumeration order
        assert_eq!(ranked[0].system, "A");
        assert_eq!(ranked[1].system, "B");
    }

    #[test]
    fn test_composite_weights() {
        let metric = |name: &str, closeness, betweenness, candidates, reach| SystemMetrics {
            system: name.into(),
            constellation: "C".into(),
            closeness,
            betweenness,
            degree: 1,
            candidate_count: candidates,
            cross_constellation_reach: reach,
        };
        let ranked = composite_ranking(&[
            metric("A", 1.0, 0.0, 10, 0),
            metric("B", 0.5, 1.0, 5, 4),
        ]);
        // A: 0.25 + 0 + 0.30 + 0 = 0.55; B: 0.125 + 0.25 + 0.15 + 0.20 = 0.725
        assert_eq!(ranked[0].system, "B");
        assert!((ranked[0].score - 0.725).abs() < 1e-9);
        assert!((ranked[1].score - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_single_metric_and_top_n() {
        let ranked = rank_systems(&star_metrics(), RankMetric::Connections, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].system, "H");
        assert_eq!("centrality".parse::<RankMetric>().unwrap(), RankMetric::Closeness);
        assert!("popularity".parse::<RankMetric>().is_err());
    }
}
