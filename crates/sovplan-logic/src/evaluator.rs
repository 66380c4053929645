//! Bridge value evaluation for a single candidate pair.
//!
//! An evaluation first checks the pair against the bridge range. Out-of-range
//! pairs yield [`BridgeEvaluation::Invalid`] with the measured distance and
//! nothing else. In-range pairs get:
//!
//! - `current_jumps`: fixed-link hops between the endpoints (`None` when the
//!   endpoints sit in different components),
//! - `jump_savings`: `current_jumps - 1`, floored at zero, since traversing a
//!   bridge costs exactly one hop,
//! - `cross_region`: whether the endpoints are in different constellations,
//! - `improved_paths`: how many sample pairs `(x, y)` would get strictly
//!   shorter by routing `x → a ⇒ b → y` or `x → b ⇒ a → y`.
//!
//! The sample is resolved once from [`SamplePolicy`]; hop rows for endpoints
//! are memoized for the evaluator's lifetime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::SamplePolicy;
use crate::constants::{BRIDGE_HOP_COST, MAX_BRIDGE_RANGE_LY};
use crate::error::{PlannerError, PlannerResult};
use crate::graph::{ConnectivityGraph, HopRow};
use crate::network::{Network, SystemId};

/// Value metrics for an in-range pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeValue {
    pub distance_ly: f64,
    /// `None` when no fixed-link path exists.
    pub current_jumps: Option<u32>,
    /// `None` when the endpoints are unreachable from each other, i.e. the
    /// bridge would join two components and the saving is unbounded.
    pub jump_savings: Option<u32>,
    pub cross_region: bool,
    pub from_constellation: String,
    pub to_constellation: String,
    pub improved_paths: u32,
}

impl BridgeValue {
    /// Jump savings as a score input; unbounded savings rank above any
    /// finite value.
    pub fn jump_savings_score(&self) -> f64 {
        self.jump_savings.map_or(f64::INFINITY, f64::from)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BridgeEvaluation {
    /// Pair exceeds the bridge range; no value metrics are computed.
    Invalid { distance_ly: f64 },
    Valid(BridgeValue),
}

impl BridgeEvaluation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn distance_ly(&self) -> f64 {
        match self {
            Self::Invalid { distance_ly } => *distance_ly,
            Self::Valid(value) => value.distance_ly,
        }
    }

    pub fn value(&self) -> Option<&BridgeValue> {
        match self {
            Self::Invalid { .. } => None,
            Self::Valid(value) => Some(value),
        }
    }
}

/// Evaluates candidate bridges against one network snapshot.
pub struct BridgeEvaluator<'a> {
    network: &'a Network,
    graph: &'a ConnectivityGraph,
    sample: Vec<SystemId>,
    /// Hop rows for each sample member, same order as `sample`.
    sample_rows: Vec<HopRow>,
    endpoint_rows: HashMap<SystemId, HopRow>,
}

impl<'a> BridgeEvaluator<'a> {
    pub fn new(
        network: &'a Network,
        graph: &'a ConnectivityGraph,
        policy: &SamplePolicy,
    ) -> PlannerResult<Self> {
        let sample = resolve_sample(network, policy)?;
        let sample_rows = sample.iter().map(|&s| graph.hops_from(s)).collect();
        Ok(Self {
            network,
            graph,
            sample,
            sample_rows,
            endpoint_rows: HashMap::new(),
        })
    }

    /// Systems used for the improved-path count, in sample order.
    pub fn sample(&self) -> &[SystemId] {
        &self.sample
    }

    pub fn evaluate(&mut self, a: SystemId, b: SystemId) -> PlannerResult<BridgeEvaluation> {
        if a == b {
            return Err(PlannerError::SameSystem(self.network.name(a).to_string()));
        }
        let distance_ly = self.network.distance_ly(a, b)?;
        if distance_ly > MAX_BRIDGE_RANGE_LY {
            return Ok(BridgeEvaluation::Invalid { distance_ly });
        }

        self.ensure_row(a);
        self.ensure_row(b);
        let row_a = &self.endpoint_rows[&a];
        let row_b = &self.endpoint_rows[&b];

        let current_jumps = row_a[b.index()];
        let jump_savings = current_jumps.map(|j| j.saturating_sub(BRIDGE_HOP_COST));
        let from_constellation = self.network.constellation(a).to_string();
        let to_constellation = self.network.constellation(b).to_string();

        Ok(BridgeEvaluation::Valid(BridgeValue {
            distance_ly,
            current_jumps,
            jump_savings,
            cross_region: from_constellation != to_constellation,
            from_constellation,
            to_constellation,
            improved_paths: self.count_improved_paths(row_a, row_b),
        }))
    }

    fn ensure_row(&mut self, id: SystemId) {
        let graph = self.graph;
        self.endpoint_rows
            .entry(id)
            .or_insert_with(|| graph.hops_from(id));
    }

    fn count_improved_paths(&self, row_a: &HopRow, row_b: &HopRow) -> u32 {
        let via = |to_entry: Option<u32>, from_exit: Option<u32>| {
            Some(to_entry? + BRIDGE_HOP_COST + from_exit?)
        };
        let mut improved = 0;
        for (i, &x) in self.sample.iter().enumerate() {
            for &y in &self.sample[i + 1..] {
                let Some(current) = self.sample_rows[i][y.index()] else {
                    continue;
                };
                let forward = via(row_a[x.index()], row_b[y.index()]);
                let reverse = via(row_b[x.index()], row_a[y.index()]);
                let Some(best) = forward.into_iter().chain(reverse).min() else {
                    continue;
                };
                if best < current {
                    improved += 1;
                }
            }
        }
        improved
    }
}

fn resolve_sample(network: &Network, policy: &SamplePolicy) -> PlannerResult<Vec<SystemId>> {
    match policy {
        SamplePolicy::FirstN(n) => Ok(network.ids().take(*n).collect()),
        SamplePolicy::Named(names) => names.iter().map(|name| network.id(name)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{detour_snapshot, link, network, star_snapshot, system};

    fn evaluate(net: &Network, a: &str, b: &str) -> BridgeEvaluation {
        let graph = ConnectivityGraph::new(net);
        let mut evaluator = BridgeEvaluator::new(net, &graph, &SamplePolicy::default()).unwrap();
        evaluator
            .evaluate(net.id(a).unwrap(), net.id(b).unwrap())
            .unwrap()
    }

    #[test]
    fn test_detour_pair_saves_three_jumps() {
        let net = Network::from_snapshot(detour_snapshot()).unwrap();
        let eval = evaluate(&net, "A", "B");
        let value = eval.value().expect("pair is in range");
        assert!((value.distance_ly - 3.2).abs() < 1e-9);
        assert_eq!(value.current_jumps, Some(4));
        assert_eq!(value.jump_savings, Some(3));
        assert!(value.cross_region);
        assert_eq!(value.from_constellation, "North");
        assert_eq!(value.to_constellation, "South");
    }

    #[test]
    fn test_detour_improved_paths() {
        let net = Network::from_snapshot(detour_snapshot()).unwrap();
        let value = evaluate(&net, "A", "B").value().cloned().unwrap();
        // Sample = all 5 systems. Pairs shortened by A⇒B:
        // A-B (4→1), A-X3 (3→2), X1-B (3→2), X1-X3 (2 vs 3, no) → 3
        assert_eq!(value.improved_paths, 3);
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let net = Network::from_snapshot(detour_snapshot()).unwrap();
        let eval = evaluate(&net, "A", "X2");
        assert!(!eval.is_valid());
        assert!((eval.distance_ly() - 40.0).abs() < 1e-9);
        assert!(eval.value().is_none());
    }

    #[test]
    fn test_adjacent_pair_saves_nothing() {
        let net = Network::from_snapshot(star_snapshot()).unwrap();
        let value = evaluate(&net, "H", "S1").value().cloned().unwrap();
        assert_eq!(value.current_jumps, Some(1));
        assert_eq!(value.jump_savings, Some(0));
        assert_eq!(value.improved_paths, 0);
        assert!(!value.cross_region);
    }

    #[test]
    fn test_unreachable_endpoints() {
        let net = network(
            vec![
                system("A", "C1", 0.0, 0.0, 0.0),
                system("B", "C1", 1.0, 0.0, 0.0),
                system("Island", "C2", 2.0, 0.0, 0.0),
            ],
            vec![link("A", "B")],
        );
        let value = evaluate(&net, "A", "Island").value().cloned().unwrap();
        assert_eq!(value.current_jumps, None);
        assert_eq!(value.jump_savings, None);
        assert_eq!(value.jump_savings_score(), f64::INFINITY);
        // every sample pair involving Island is unreachable and skipped
        assert_eq!(value.improved_paths, 0);
    }

    #[test]
    fn test_same_system_rejected() {
        let net = Network::from_snapshot(star_snapshot()).unwrap();
        let graph = ConnectivityGraph::new(&net);
        let mut evaluator = BridgeEvaluator::new(&net, &graph, &SamplePolicy::default()).unwrap();
        let h = net.id("H").unwrap();
        assert!(matches!(
            evaluator.evaluate(h, h),
            Err(PlannerError::SameSystem(_))
        ));
    }

    #[test]
    fn test_named_sample() {
        let net = Network::from_snapshot(detour_snapshot()).unwrap();
        let graph = ConnectivityGraph::new(&net);
        let policy = SamplePolicy::Named(vec!["X1".into(), "X3".into()]);
        let mut evaluator = BridgeEvaluator::new(&net, &graph, &policy).unwrap();
        assert_eq!(evaluator.sample().len(), 2);
        let value = evaluator
            .evaluate(net.id("A").unwrap(), net.id("B").unwrap())
            .unwrap();
        // X1-X3 is 2 hops; via the bridge it would be 1 + 1 + 1
        assert_eq!(value.value().unwrap().improved_paths, 0);

        let bad = SamplePolicy::Named(vec!["Nowhere".into()]);
        assert!(BridgeEvaluator::new(&net, &graph, &bad).is_err());
    }

    #[test]
    fn test_savings_never_negative() {
        let net = Network::from_snapshot(star_snapshot()).unwrap();
        let graph = ConnectivityGraph::new(&net);
        let mut evaluator = BridgeEvaluator::new(&net, &graph, &SamplePolicy::default()).unwrap();
        for a in net.ids() {
            for b in net.ids().filter(|&b| b != a) {
                if let BridgeEvaluation::Valid(value) = evaluator.evaluate(a, b).unwrap() {
                    let current = value.current_jumps.unwrap();
                    assert_eq!(value.jump_savings, Some(current.saturating_sub(1)));
                }
            }
        }
    }
}
