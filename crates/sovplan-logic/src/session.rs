//! Planning session: one user's working state.
//!
//! Owns the loaded network, its connectivity graph, the range-candidate cache,
//! the committed bridge set and the capacity ledger. Every planning operation
//! is reachable here by system name. The session is single-writer: mutating
//! methods take `&mut self`, and a host that shares a session across threads
//! wraps it in one lock.

use crate::bridges::{Bridge, BridgeDecision, BridgeSet};
use crate::catalog::UpgradeCatalog;
use crate::config::PlannerConfig;
use crate::error::{PlannerError, PlannerResult};
use crate::evaluator::{BridgeEvaluation, BridgeEvaluator};
use crate::graph::ConnectivityGraph;
use crate::ledger::{CapacityLedger, CapacityUsage, Decision, LedgerRecord};
use crate::network::{Network, NetworkSnapshot};
use crate::optimizer::{GreedyOptimizer, PlacedBridge, Strategy};
use crate::range::{BridgeRangeIndex, RangeCandidate, RangeSummary, RegionStatistics};
use crate::reports::{self, JumpSavingsReport, NetworkReport, StagingReport};
use crate::scoring::{self, RankMetric, RankedSystem, SystemMetrics};

pub struct PlanningSession {
    config: PlannerConfig,
    network: Network,
    graph: ConnectivityGraph,
    range_index: BridgeRangeIndex,
    bridges: BridgeSet,
    ledger: CapacityLedger,
}

impl PlanningSession {
    pub fn new(
        snapshot: NetworkSnapshot,
        catalog: UpgradeCatalog,
        config: PlannerConfig,
    ) -> PlannerResult<Self> {
        config.validate()?;
        let network = Network::from_snapshot(snapshot)?;
        let graph = ConnectivityGraph::new(&network);
        let ledger = CapacityLedger::new(catalog, &network);
        Ok(Self {
            config,
            network,
            graph,
            range_index: BridgeRangeIndex::new(),
            bridges: BridgeSet::new(),
            ledger,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn graph(&self) -> &ConnectivityGraph {
        &self.graph
    }

    pub fn bridges(&self) -> &BridgeSet {
        &self.bridges
    }

    pub fn ledger(&self) -> &CapacityLedger {
        &self.ledger
    }

    /// Swap in a new snapshot. Cached range lists are discarded, bridges that
    /// no longer hold are dropped, and ledger bases follow the new snapshot.
    pub fn load_network(&mut self, snapshot: NetworkSnapshot) -> PlannerResult<()> {
        self.network = Network::from_snapshot(snapshot)?;
        self.graph = ConnectivityGraph::new(&self.network);
        self.range_index.invalidate();
        let dropped = self.bridges.revalidate(&self.network);
        let orphaned = self.ledger.rebase(&self.network);
        log::info!(
            "Reloaded network: {} systems, {} bridges dropped, {} ledgers dropped",
            self.network.len(),
            dropped.len(),
            orphaned
        );
        Ok(())
    }

    // ── Spatial & graph queries ────────────────────────────────────────

    pub fn distance_ly(&self, a: &str, b: &str) -> PlannerResult<f64> {
        self.network.distance_between(a, b)
    }

    pub fn neighbors(&self, system: &str) -> PlannerResult<Vec<&str>> {
        let id = self.network.id(system)?;
        Ok(self
            .graph
            .neighbors(id)
            .iter()
            .map(|&n| self.network.name(n))
            .collect())
    }

    pub fn degree(&self, system: &str) -> PlannerResult<usize> {
        Ok(self.graph.degree(self.network.id(system)?))
    }

    pub fn constellation_systems(&self, constellation: &str) -> Vec<&str> {
        self.network.constellation_systems(constellation)
    }

    /// Shortest fixed-link route, both endpoints included.
    pub fn route(&self, a: &str, b: &str) -> PlannerResult<Vec<&str>> {
        let route = self
            .graph
            .route(self.network.id(a)?, self.network.id(b)?)
            .ok_or_else(|| unreachable(a, b))?;
        Ok(route.into_iter().map(|id| self.network.name(id)).collect())
    }

    pub fn jumps(&self, a: &str, b: &str) -> PlannerResult<u32> {
        self.graph
            .hop_distance(self.network.id(a)?, self.network.id(b)?)
            .ok_or_else(|| unreachable(a, b))
    }

    pub fn range_candidates(&mut self, system: &str) -> PlannerResult<Vec<RangeCandidate>> {
        let id = self.network.id(system)?;
        Ok(self
            .range_index
            .candidates(&self.network, id, &Default::default())?
            .to_vec())
    }

    pub fn range_summary(&mut self, system: &str) -> PlannerResult<RangeSummary> {
        let id = self.network.id(system)?;
        self.range_index.summary(&self.network, id)
    }

    pub fn region_statistics(&mut self) -> PlannerResult<RegionStatistics> {
        self.range_index.region_statistics(&self.network)
    }

    // ── Evaluation, ranking, optimization ──────────────────────────────

    fn evaluator(&self) -> PlannerResult<BridgeEvaluator<'_>> {
        BridgeEvaluator::new(
            &self.network,
            &self.graph,
            &self.config.improved_path_sample,
        )
    }

    pub fn evaluate_bridge(&self, a: &str, b: &str) -> PlannerResult<BridgeEvaluation> {
        let (id_a, id_b) = (self.network.id(a)?, self.network.id(b)?);
        self.evaluator()?.evaluate(id_a, id_b)
    }

    pub fn all_system_metrics(&mut self) -> PlannerResult<Vec<SystemMetrics>> {
        scoring::system_metrics(
            &self.network,
            &self.graph,
            &mut self.range_index,
            &self.config,
        )
    }

    pub fn system_metrics(&mut self, system: &str) -> PlannerResult<SystemMetrics> {
        let id = self.network.id(system)?;
        let mut metrics = self.all_system_metrics()?;
        Ok(metrics.swap_remove(id.index()))
    }

    pub fn rank_systems(
        &mut self,
        metric: RankMetric,
        top_n: usize,
    ) -> PlannerResult<Vec<RankedSystem>> {
        let metrics = self.all_system_metrics()?;
        Ok(scoring::rank_systems(&metrics, metric, top_n))
    }

    pub fn network_report(&self) -> PlannerResult<NetworkReport> {
        reports::network_report(&self.network, &self.graph, &self.config)
    }

    /// Propose a bridge layout. The committed set is not touched; see
    /// [`Self::apply_plan`].
    pub fn optimize(
        &mut self,
        strategy: Strategy,
        max_bridges: usize,
    ) -> PlannerResult<Vec<PlacedBridge>> {
        let mut evaluator = BridgeEvaluator::new(
            &self.network,
            &self.graph,
            &self.config.improved_path_sample,
        )?;
        GreedyOptimizer::new(strategy, max_bridges).run(
            &self.network,
            &mut self.range_index,
            &mut evaluator,
        )
    }

    // ── Bridge set ─────────────────────────────────────────────────────

    pub fn add_bridge(&mut self, a: &str, b: &str, active: bool) -> PlannerResult<BridgeDecision> {
        self.bridges.add(&self.network, a, b, active)
    }

    pub fn remove_bridge(&mut self, a: &str, b: &str) -> PlannerResult<Bridge> {
        self.bridges.remove(a, b)
    }

    pub fn set_bridge_active(&mut self, a: &str, b: &str, active: bool) -> PlannerResult<()> {
        self.bridges.set_active(a, b, active)
    }

    pub fn clear_bridges(&mut self) {
        self.bridges.clear();
    }

    pub fn apply_plan(&mut self, placed: &[PlacedBridge]) -> PlannerResult<()> {
        self.bridges.apply_plan(&self.network, placed)
    }

    pub fn bridge_records(&self) -> Vec<Bridge> {
        self.bridges.records()
    }

    pub fn restore_bridges(&mut self, records: Vec<Bridge>) -> PlannerResult<()> {
        self.bridges = BridgeSet::from_records(&self.network, records)?;
        log::info!("Restored {} bridges", self.bridges.len());
        Ok(())
    }

    pub fn jump_savings_report(&self) -> PlannerResult<JumpSavingsReport> {
        reports::jump_savings_report(&self.network, &self.graph, &self.bridges, &self.config)
    }

    pub fn staging_report(&self, staging: &str) -> PlannerResult<StagingReport> {
        reports::staging_report(&self.network, &self.graph, &self.bridges, staging)
    }

    // ── Capacity ledger ────────────────────────────────────────────────

    pub fn usage(&self, system: &str) -> PlannerResult<CapacityUsage> {
        self.ledger.usage(system)
    }

    pub fn can_add_upgrade(&self, system: &str, upgrade: &str) -> PlannerResult<Decision> {
        self.ledger.can_add(system, upgrade)
    }

    pub fn add_upgrade(&mut self, system: &str, upgrade: &str, force: bool) -> PlannerResult<Decision> {
        self.ledger.add(system, upgrade, force)
    }

    pub fn remove_upgrade(&mut self, system: &str, upgrade: &str) -> PlannerResult<Decision> {
        self.ledger.remove(system, upgrade)
    }

    pub fn clear_upgrades(&mut self, system: &str) -> PlannerResult<()> {
        self.ledger.clear(system)
    }

    pub fn apply_preset(&mut self, system: &str, preset: &str) -> PlannerResult<Vec<String>> {
        self.ledger.apply_preset(system, preset)
    }

    pub fn ledger_records(&self) -> Vec<LedgerRecord> {
        self.ledger.snapshot()
    }

    pub fn restore_ledger(&mut self, records: Vec<LedgerRecord>) -> PlannerResult<()> {
        self.ledger.restore(records)
    }
}

fn unreachable(a: &str, b: &str) -> PlannerError {
    PlannerError::Unreachable {
        from: a.to_string(),
        to: b.to_string(),
    }
}
