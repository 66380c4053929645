//! Sovplan Headless Planning Harness
//!
//! Validates pure planning logic against the bundled sample region.
//! Runs entirely in-process: no database, no dashboard, no file I/O.
//!
//! Usage:
//!   cargo run -p sovplan-simtest
//!   cargo run -p sovplan-simtest -- --verbose
//!   RUST_LOG=debug cargo run -p sovplan-simtest

use std::collections::HashSet;

use sovplan_logic::bridges::Bridge;
use sovplan_logic::catalog::UpgradeCatalog;
use sovplan_logic::config::PlannerConfig;
use sovplan_logic::constants::MAX_BRIDGE_RANGE_LY;
use sovplan_logic::evaluator::BridgeEvaluation;
use sovplan_logic::ledger::{Decision, LedgerRecord};
use sovplan_logic::network::NetworkSnapshot;
use sovplan_logic::optimizer::Strategy;
use sovplan_logic::scoring::RankMetric;
use sovplan_logic::{PlannerResult, PlanningSession};

// ── Sample data (same JSON the integration tests use) ───────────────────
const NETWORK_JSON: &str = include_str!("../../../data/sample_network.json");
const CATALOG_JSON: &str = include_str!("../../../data/upgrade_catalog.json");
const CONFIG_JSON: &str = include_str!("../../../data/planner_config.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }

    fn error(name: &str, err: impl std::fmt::Display) -> Self {
        Self::new(name, false, format!("error: {}", err))
    }
}

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Sovplan Planning Harness ===\n");

    let mut session = match load_session() {
        Ok(session) => session,
        Err(e) => {
            println!("  ✗ sample_data_load: {}", e);
            println!("\n=== RESULT: 0/1 passed, 1 failed ===");
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Sample data & graph structure
    results.extend(validate_network(&mut session, verbose));

    // 2. Bridge evaluator sweep
    results.extend(validate_evaluator(&session, verbose));

    // 3. Greedy optimizer per strategy
    results.extend(validate_optimizer(&mut session, verbose));

    // 4. Capacity ledger
    results.extend(validate_ledger(&mut session, verbose));

    // 5. Reports & persistence
    results.extend(validate_reports(&mut session, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_session() -> PlannerResult<PlanningSession> {
    let snapshot = NetworkSnapshot::from_json_str(NETWORK_JSON)?;
    let catalog = UpgradeCatalog::from_json_str(CATALOG_JSON)?;
    let config = PlannerConfig::from_json_str(CONFIG_JSON)?;
    PlanningSession::new(snapshot, catalog, config)
}

// ── 1. Network ──────────────────────────────────────────────────────────

fn validate_network(session: &mut PlanningSession, verbose: bool) -> Vec<TestResult> {
    println!("--- Network ---");
    let mut results = Vec::new();

    let network = session.network();
    results.push(TestResult::new(
        "network_loaded",
        network.len() > 10,
        format!(
            "{} systems, {} internal links, {} border links skipped",
            network.len(),
            network.links().len(),
            network.skipped_links()
        ),
    ));

    let components = session.graph().component_count();
    results.push(TestResult::new(
        "network_connected",
        components == 1,
        format!("{} component(s)", components),
    ));

    match session.region_statistics() {
        Ok(stats) => {
            if verbose {
                println!(
                    "  {} bridgeable pairs, {:.1} candidates per system (max {}, min {})",
                    stats.possible_pairs,
                    stats.mean_candidates,
                    stats.max_candidates,
                    stats.min_candidates
                );
            }
            results.push(TestResult::new(
                "region_has_bridge_pairs",
                stats.possible_pairs > 0,
                format!(
                    "{} pairs, {} systems without candidates",
                    stats.possible_pairs, stats.systems_without_candidates
                ),
            ));
        }
        Err(e) => results.push(TestResult::error("region_has_bridge_pairs", e)),
    }

    match session.network_report() {
        Ok(report) => {
            if verbose {
                println!(
                    "  diameter {}, avg path {:.2}, density {:.3}, center {}",
                    report.diameter,
                    report.average_path_length,
                    report.density,
                    report.network_center.as_deref().unwrap_or("-")
                );
                println!("  chokepoints: {}", report.chokepoints.join(", "));
            }
            results.push(TestResult::new(
                "network_report",
                report.network_center.is_some() && !report.high_traffic.is_empty(),
                format!(
                    "{} chokepoints, {} high-traffic systems",
                    report.chokepoints.len(),
                    report.high_traffic.len()
                ),
            ));
        }
        Err(e) => results.push(TestResult::error("network_report", e)),
    }

    match session.rank_systems(RankMetric::Composite, 5) {
        Ok(ranked) => {
            let sorted = ranked.windows(2).all(|w| w[0].score >= w[1].score);
            let bounded = ranked.iter().all(|r| (0.0..=1.0 + 1e-9).contains(&r.score));
            results.push(TestResult::new(
                "composite_ranking",
                sorted && bounded,
                format!(
                    "top hubs: {}",
                    ranked
                        .iter()
                        .map(|r| format!("{} ({:.2})", r.system, r.score))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            ));
        }
        Err(e) => results.push(TestResult::error("composite_ranking", e)),
    }

    results
}

// ── 2. Evaluator ────────────────────────────────────────────────────────

fn validate_evaluator(session: &PlanningSession, _verbose: bool) -> Vec<TestResult> {
    println!("--- Bridge Evaluator ---");
    let mut results = Vec::new();

    let names: Vec<String> = session
        .network()
        .systems()
        .iter()
        .filter(|s| s.position.is_some())
        .map(|s| s.name.clone())
        .collect();

    let mut evaluated = 0;
    let mut bad_savings = Vec::new();
    let mut out_of_range_valid = Vec::new();
    for a in &names {
        for b in names.iter().filter(|b| *b != a) {
            let evaluation = match session.evaluate_bridge(a, b) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    results.push(TestResult::error("evaluator_sweep", e));
                    return results;
                }
            };
            evaluated += 1;
            match evaluation {
                BridgeEvaluation::Valid(value) => {
                    if value.distance_ly > MAX_BRIDGE_RANGE_LY {
                        out_of_range_valid.push(format!("{}-{}", a, b));
                    }
                    let expected = value.current_jumps.map(|j| j.saturating_sub(1));
                    if value.jump_savings != expected {
                        bad_savings.push(format!("{}-{}", a, b));
                    }
                }
                BridgeEvaluation::Invalid { distance_ly } => {
                    if distance_ly <= MAX_BRIDGE_RANGE_LY {
                        out_of_range_valid.push(format!("{}-{} (rejected in range)", a, b));
                    }
                }
            }
        }
    }

    results.push(TestResult::new(
        "evaluator_range_gate",
        out_of_range_valid.is_empty(),
        if out_of_range_valid.is_empty() {
            format!("{} ordered pairs checked against the range limit", evaluated)
        } else {
            format!("range mismatches: {}", out_of_range_valid.join(", "))
        },
    ));
    results.push(TestResult::new(
        "evaluator_savings_non_negative",
        bad_savings.is_empty(),
        if bad_savings.is_empty() {
            "jump savings = current jumps - 1 for every valid pair".to_string()
        } else {
            format!("bad savings: {}", bad_savings.join(", "))
        },
    ));

    results
}

// ── 3. Optimizer ────────────────────────────────────────────────────────

fn validate_optimizer(session: &mut PlanningSession, verbose: bool) -> Vec<TestResult> {
    println!("--- Greedy Optimizer ---");
    let mut results = Vec::new();

    for &strategy in Strategy::all() {
        let name = format!("optimizer_{}", strategy);
        let (first, second) = match (session.optimize(strategy, 10), session.optimize(strategy, 10))
        {
            (Ok(first), Ok(second)) => (first, second),
            (Err(e), _) | (_, Err(e)) => {
                results.push(TestResult::error(&name, e));
                continue;
            }
        };

        let mut endpoints = HashSet::new();
        let exclusive = first
            .iter()
            .all(|b| b.from != b.to && endpoints.insert(&b.from) && endpoints.insert(&b.to));

        if verbose {
            for bridge in &first {
                println!(
                    "  [{}] {} <-> {} ({:.2} LY, score {:.2})",
                    strategy, bridge.from, bridge.to, bridge.distance_ly, bridge.score
                );
            }
        }
        results.push(TestResult::new(
            &name,
            !first.is_empty() && exclusive && first == second,
            format!(
                "{} bridges, exclusive={}, deterministic={}",
                first.len(),
                exclusive,
                first == second
            ),
        ));
    }

    results
}

// ── 4. Capacity Ledger ──────────────────────────────────────────────────

fn validate_ledger(session: &mut PlanningSession, _verbose: bool) -> Vec<TestResult> {
    println!("--- Capacity Ledger ---");
    let mut results = Vec::new();

    // 2000 base, +500 consumed, -300 granted
    let example = session
        .add_upgrade("5I-Q", "Cynosural Navigation", false)
        .and_then(|_| session.add_upgrade("5I-Q", "Power Monitoring Division 1", false))
        .and_then(|_| session.usage("5I-Q"));
    match example {
        Ok(usage) => {
            let p = usage.power;
            results.push(TestResult::new(
                "ledger_signed_deltas",
                p.added == 300 && p.used == 500 && p.total == 2300 && p.available == 1800,
                format!(
                    "added {}, used {}, total {}, available {}",
                    p.added, p.used, p.total, p.available
                ),
            ));
        }
        Err(e) => results.push(TestResult::error("ledger_signed_deltas", e)),
    }

    let names: Vec<String> = session
        .ledger()
        .catalog()
        .iter()
        .map(|u| u.name.clone())
        .collect();
    let mut mismatches = Vec::new();
    let mut accepted = 0;
    for name in &names {
        let outcome = session
            .can_add_upgrade("UC3H-Y", name)
            .and_then(|predicted| Ok((predicted, session.add_upgrade("UC3H-Y", name, false)?)))
            .and_then(|(predicted, decision)| Ok((predicted, decision, session.usage("UC3H-Y")?)));
        match outcome {
            Ok((predicted, decision, usage)) => {
                if decision.is_accepted() {
                    accepted += 1;
                }
                if predicted != decision
                    || usage.power.available < 0
                    || usage.workforce.available < 0
                {
                    mismatches.push(name.clone());
                }
            }
            Err(e) => {
                results.push(TestResult::error("ledger_no_false_accepts", e));
                return results;
            }
        }
    }
    results.push(TestResult::new(
        "ledger_no_false_accepts",
        mismatches.is_empty(),
        if mismatches.is_empty() {
            format!("{}/{} catalog upgrades fit in UC3H-Y", accepted, names.len())
        } else {
            format!("mismatches: {}", mismatches.join(", "))
        },
    ));

    let idempotent = session.usage("5I-Q").and_then(|before| {
        session.remove_upgrade("5I-Q", "Cynosural Navigation")?;
        session.add_upgrade("5I-Q", "Cynosural Navigation", false)?;
        Ok(before == session.usage("5I-Q")?)
    });
    match idempotent {
        Ok(same) => results.push(TestResult::new(
            "ledger_remove_add_idempotent",
            same,
            "remove then re-add restores usage",
        )),
        Err(e) => results.push(TestResult::error("ledger_remove_add_idempotent", e)),
    }

    for preset in ["max_mining", "max_ratting", "balanced", "empty"] {
        match session.apply_preset("R-LT4M", preset) {
            Ok(added) => results.push(TestResult::new(
                &format!("preset_{}", preset),
                preset == "empty" || !added.is_empty(),
                if added.is_empty() {
                    "nothing installed".to_string()
                } else {
                    added.join(", ")
                },
            )),
            Err(e) => results.push(TestResult::error(&format!("preset_{}", preset), e)),
        }
    }
    results.push(TestResult::new(
        "preset_unknown_rejected",
        session.apply_preset("R-LT4M", "max_industry").is_err(),
        "unknown preset names are errors",
    ));

    results
}

// ── 5. Reports & Persistence ────────────────────────────────────────────

fn validate_reports(session: &mut PlanningSession, verbose: bool) -> Vec<TestResult> {
    println!("--- Reports & Persistence ---");
    let mut results = Vec::new();

    let plan = match session.optimize(Strategy::Balanced, 5) {
        Ok(plan) => plan,
        Err(e) => {
            results.push(TestResult::error("plan_for_reports", e));
            return results;
        }
    };
    if let Err(e) = session.apply_plan(&plan) {
        results.push(TestResult::error("apply_plan", e));
        return results;
    }

    match session.jump_savings_report() {
        Ok(report) => {
            if verbose {
                for p in &report.top_improvements {
                    println!("  {} -> {}: {} -> {} jumps", p.from, p.to, p.before, p.after);
                }
            }
            results.push(TestResult::new(
                "jump_savings_report",
                report.average_jumps_after <= report.average_jumps_before,
                format!(
                    "avg {:.2} -> {:.2} jumps, {} pairs improved",
                    report.average_jumps_before, report.average_jumps_after, report.improved_pairs
                ),
            ));
        }
        Err(e) => results.push(TestResult::error("jump_savings_report", e)),
    }

    match session.staging_report("5I-Q") {
        Ok(report) => results.push(TestResult::new(
            "staging_report",
            report.max_jumps_with_bridges <= report.max_jumps,
            format!(
                "avg {:.2} / max {} jumps, with bridges avg {:.2} / max {}",
                report.average_jumps,
                report.max_jumps,
                report.average_jumps_with_bridges,
                report.max_jumps_with_bridges
            ),
        )),
        Err(e) => results.push(TestResult::error("staging_report", e)),
    }

    let round_trip = persist_and_restore(session);
    match round_trip {
        Ok(same) => results.push(TestResult::new(
            "persistence_round_trip",
            same,
            "bridge and ledger records restore identically",
        )),
        Err(e) => results.push(TestResult::error("persistence_round_trip", e)),
    }

    results
}

fn persist_and_restore(session: &PlanningSession) -> PlannerResult<bool> {
    let bridge_json = serde_json::to_string(&session.bridge_records())?;
    let ledger_json = serde_json::to_string(&session.ledger_records())?;

    let mut restored = load_session()?;
    let bridges: Vec<Bridge> = serde_json::from_str(&bridge_json)?;
    let ledger: Vec<LedgerRecord> = serde_json::from_str(&ledger_json)?;
    restored.restore_bridges(bridges)?;
    restored.restore_ledger(ledger)?;

    let same_ledger = session
        .ledger()
        .systems_with_upgrades()
        .into_iter()
        .map(|system| -> PlannerResult<bool> {
            Ok(session.usage(system)? == restored.usage(system)?)
        })
        .collect::<PlannerResult<Vec<bool>>>()?
        .into_iter()
        .all(|same| same);
    let checked = session.can_add_upgrade("5I-Q", "Minor Threat 1")?;
    let restored_checked = restored.can_add_upgrade("5I-Q", "Minor Threat 1")?;
    Ok(restored.bridges() == session.bridges()
        && same_ledger
        && matches!(
            (checked, restored_checked),
            (Decision::Accepted { .. }, Decision::Accepted { .. })
                | (Decision::Rejected(_), Decision::Rejected(_))
        ))
}
