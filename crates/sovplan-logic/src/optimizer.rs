//! Greedy bridge placement.
//!
//! Each round scores every still-legal pair and commits the best one, then
//! marks both endpoints used so no system anchors two bridges. The loop stops
//! after `max_bridges` rounds or as soon as a round finds no legal pair.
//!
//! This is a local greedy heuristic: a pair committed early can block a
//! combination that would score better overall. Determinism comes from the
//! fixed enumeration order and the strict `>` comparison (first-seen pair
//! wins ties). Scoring is a [`Strategy`] value, so a different search can
//! reuse the same scoring contract.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{balanced_weights, CROSS_CONSTELLATION_MULTIPLIER};
use crate::error::{PlannerError, PlannerResult};
use crate::evaluator::{BridgeEvaluation, BridgeEvaluator, BridgeValue};
use crate::network::{Network, SystemId};
use crate::range::BridgeRangeIndex;

/// How a candidate pair's value is collapsed to one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Direct hops saved between the endpoints.
    JumpSavings,
    /// Sample pairs whose route gets shorter.
    Coverage,
    /// Coverage, doubled for pairs spanning two constellations.
    CrossConstellation,
    /// Weighted blend of savings, coverage and a cross-region bonus.
    Balanced,
}

impl Strategy {
    pub fn all() -> &'static [Strategy] {
        &[
            Self::JumpSavings,
            Self::Coverage,
            Self::CrossConstellation,
            Self::Balanced,
        ]
    }

    pub fn score(&self, value: &BridgeValue) -> f64 {
        let improved = f64::from(value.improved_paths);
        match self {
            Self::JumpSavings => value.jump_savings_score(),
            Self::Coverage => improved,
            Self::CrossConstellation => {
                if value.cross_region {
                    improved * CROSS_CONSTELLATION_MULTIPLIER
                } else {
                    improved
                }
            }
            Self::Balanced => {
                let bonus = if value.cross_region {
                    balanced_weights::CROSS_REGION_BONUS
                } else {
                    0.0
                };
                balanced_weights::JUMP_SAVINGS * value.jump_savings_score()
                    + balanced_weights::IMPROVED_PATHS * improved
                    + balanced_weights::CROSS_REGION * bonus
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::JumpSavings => "jump_savings",
            Self::Coverage => "coverage",
            Self::CrossConstellation => "cross_constellation",
            Self::Balanced => "balanced",
        })
    }
}

impl FromStr for Strategy {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::all()
            .iter()
            .copied()
            .find(|strategy| strategy.to_string() == s)
            .ok_or_else(|| PlannerError::UnknownStrategy(s.to_string()))
    }
}

/// A bridge chosen by the optimizer, with the evaluation that won it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedBridge {
    pub from: String,
    pub to: String,
    pub distance_ly: f64,
    pub score: f64,
    pub value: BridgeValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyOptimizer {
    pub strategy: Strategy,
    pub max_bridges: usize,
}

impl GreedyOptimizer {
    pub fn new(strategy: Strategy, max_bridges: usize) -> Self {
        Self {
            strategy,
            max_bridges,
        }
    }

    /// Place up to `max_bridges` bridges, in placement order.
    pub fn run(
        &self,
        network: &Network,
        range_index: &mut BridgeRangeIndex,
        evaluator: &mut BridgeEvaluator<'_>,
    ) -> PlannerResult<Vec<PlacedBridge>> {
        let mut used: BTreeSet<SystemId> = BTreeSet::new();
        let mut placed = Vec::new();

        for round in 0..self.max_bridges {
            let mut best: Option<(SystemId, SystemId, f64, BridgeValue)> = None;
            let mut best_score = f64::NEG_INFINITY;

            for first in network.ids() {
                if used.contains(&first) || network.system(first).position.is_none() {
                    continue;
                }
                for candidate in range_index.candidates(network, first, &used)? {
                    // Scores are symmetric; (b, a) was already scored as (a, b).
                    if candidate.system < first {
                        continue;
                    }
                    let BridgeEvaluation::Valid(value) = evaluator.evaluate(first, candidate.system)?
                    else {
                        continue;
                    };
                    let score = self.strategy.score(&value);
                    if score > best_score {
                        best_score = score;
                        best = Some((first, candidate.system, score, value));
                    }
                }
            }

            let Some((a, b, score, value)) = best else {
                log::debug!("Round {}: no legal bridge left, stopping", round + 1);
                break;
            };
            log::debug!(
                "Round {}: {} <-> {} ({:.2} LY, score {:.2})",
                round + 1,
                network.name(a),
                network.name(b),
                value.distance_ly,
                score
            );
            used.insert(a);
            used.insert(b);
            placed.push(PlacedBridge {
                from: network.name(a).to_string(),
                to: network.name(b).to_string(),
                distance_ly: value.distance_ly,
                score,
                value,
            });
        }

        log::info!(
            "Placed {} of {} requested bridges ({} strategy)",
            placed.len(),
            self.max_bridges,
            self.strategy
        );
        Ok(placed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SamplePolicy;
    use crate::graph::ConnectivityGraph;
    use crate::test_support::{clustered_snapshot, detour_snapshot, link, network, system};

    fn optimize(net: &Network, strategy: Strategy, max_bridges: usize) -> Vec<PlacedBridge> {
        let graph = ConnectivityGraph::new(net);
        let mut index = BridgeRangeIndex::new();
        let mut evaluator = BridgeEvaluator::new(net, &graph, &SamplePolicy::default()).unwrap();
        GreedyOptimizer::new(strategy, max_bridges)
            .run(net, &mut index, &mut evaluator)
            .unwrap()
    }

    fn value(jump_savings: Option<u32>, improved_paths: u32, cross_region: bool) -> BridgeValue {
        BridgeValue {
            distance_ly: 1.0,
            current_jumps: jump_savings.map(|s| s + 1),
            jump_savings,
            cross_region,
            from_constellation: "A".into(),
            to_constellation: if cross_region { "B".into() } else { "A".into() },
            improved_paths,
        }
    }

    #[test]
    fn test_strategy_scores() {
        let v = value(Some(3), 5, true);
        assert_eq!(Strategy::JumpSavings.score(&v), 3.0);
        assert_eq!(Strategy::Coverage.score(&v), 5.0);
        assert_eq!(Strategy::CrossConstellation.score(&v), 10.0);
        // 0.4*3 + 0.4*5 + 0.2*10
        assert!((Strategy::Balanced.score(&v) - 5.2).abs() < 1e-9);

        let local = value(Some(3), 5, false);
        assert_eq!(Strategy::CrossConstellation.score(&local), 5.0);
        assert!((Strategy::Balanced.score(&local) - 3.2).abs() < 1e-9);
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for &strategy in Strategy::all() {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert!(matches!(
            "fastest".parse::<Strategy>(),
            Err(PlannerError::UnknownStrategy(_))
        ));
    }

    #[test]
    fn test_stops_early_when_pairs_run_out() {
        let net = Network::from_snapshot(clustered_snapshot()).unwrap();
        let placed = optimize(&net, Strategy::Balanced, 10);
        assert_eq!(placed.len(), 4);
        let mut pairs: Vec<_> = placed
            .iter()
            .map(|p| (p.from.clone(), p.to.clone()))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("P0a".to_string(), "P0b".to_string()),
                ("P1a".to_string(), "P1b".to_string()),
                ("P2a".to_string(), "P2b".to_string()),
                ("P3a".to_string(), "P3b".to_string()),
            ]
        );
    }

    #[test]
    fn test_exclusivity() {
        let net = network(
            (0..8)
                .map(|i| system(&format!("S{i}"), "C", i as f64 * 0.5, 0.0, 0.0))
                .collect(),
            (0..7)
                .map(|i| link(&format!("S{i}"), &format!("S{}", i + 1)))
                .collect(),
        );
        for &strategy in Strategy::all() {
            let placed = optimize(&net, strategy, 10);
            assert_eq!(placed.len(), 4, "{strategy}: 8 systems allow 4 bridges");
            let mut endpoints = BTreeSet::new();
            for bridge in &placed {
                assert_ne!(bridge.from, bridge.to);
                assert!(endpoints.insert(bridge.from.clone()), "{} reused", bridge.from);
                assert!(endpoints.insert(bridge.to.clone()), "{} reused", bridge.to);
            }
        }
    }

    #[test]
    fn test_max_bridges_respected() {
        let net = Network::from_snapshot(clustered_snapshot()).unwrap();
        assert_eq!(optimize(&net, Strategy::Coverage, 2).len(), 2);
        assert!(optimize(&net, Strategy::Coverage, 0).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let net = Network::from_snapshot(clustered_snapshot()).unwrap();
        for &strategy in Strategy::all() {
            assert_eq!(optimize(&net, strategy, 10), optimize(&net, strategy, 10));
        }
    }

    #[test]
    fn test_jump_savings_picks_detour_pair() {
        let net = Network::from_snapshot(detour_snapshot()).unwrap();
        let placed = optimize(&net, Strategy::JumpSavings, 1);
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].from, "A");
        assert_eq!(placed[0].to, "B");
        assert_eq!(placed[0].score, 3.0);
        assert_eq!(placed[0].value.jump_savings, Some(3));
    }

    #[test]
    fn test_tie_keeps_first_pair() {
        // Every gate-adjacent pair saves 0 jumps; the first enumerated pair wins.
        let net = network(
            vec![
                system("A", "C", 0.0, 0.0, 0.0),
                system("B", "C", 1.0, 0.0, 0.0),
                system("C", "C", 20.0, 0.0, 0.0),
                system("D", "C", 21.0, 0.0, 0.0),
            ],
            vec![link("A", "B"), link("B", "C"), link("C", "D")],
        );
        let placed = optimize(&net, Strategy::JumpSavings, 1);
        assert_eq!((placed[0].from.as_str(), placed[0].to.as_str()), ("A", "B"));
    }
}
