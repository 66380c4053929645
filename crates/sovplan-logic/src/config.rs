//! Planner configuration: sampling and reporting policies.
//!
//! The improved-path sample and the betweenness source sample bound the cost
//! of evaluation on large networks. Both are deterministic: they pick systems
//! in snapshot enumeration order (or by explicit name), never at random. The
//! default "first N" selection is a cost bound, not a statistically
//! representative sample, so hosts that care can name the sample explicitly.

use serde::{Deserialize, Serialize};

use crate::constants::defaults;
use crate::error::{PlannerError, PlannerResult};

/// Which systems feed the sampled improved-path count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplePolicy {
    /// The first `n` systems in snapshot order.
    FirstN(usize),
    /// An explicit list of system names, used in the given order.
    Named(Vec<String>),
}

impl Default for SamplePolicy {
    fn default() -> Self {
        Self::FirstN(defaults::IMPROVED_PATH_SAMPLE)
    }
}

/// Root configuration for a planning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Sample used by the bridge evaluator's improved-path count.
    pub improved_path_sample: SamplePolicy,
    /// Number of BFS sources for betweenness centrality (first K systems).
    /// `None` computes exact betweenness over every source.
    pub betweenness_sources: Option<usize>,
    /// Improvements kept in a jump-savings report.
    pub top_improvements: usize,
    /// High-traffic systems listed in a network report.
    pub high_traffic: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            improved_path_sample: SamplePolicy::default(),
            betweenness_sources: Some(defaults::BETWEENNESS_SOURCES),
            top_improvements: defaults::TOP_IMPROVEMENTS,
            high_traffic: defaults::HIGH_TRAFFIC,
        }
    }
}

impl PlannerConfig {
    /// Parse a JSON override document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> PlannerResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PlannerResult<()> {
        match &self.improved_path_sample {
            SamplePolicy::FirstN(0) => {
                return Err(PlannerError::Config(
                    "improved_path_sample must include at least one system".into(),
                ))
            }
            SamplePolicy::Named(names) if names.is_empty() => {
                return Err(PlannerError::Config(
                    "improved_path_sample name list is empty".into(),
                ))
            }
            _ => {}
        }
        if self.betweenness_sources == Some(0) {
            return Err(PlannerError::Config(
                "betweenness_sources must be positive (use null for exact)".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.improved_path_sample, SamplePolicy::FirstN(20));
        assert_eq!(config.betweenness_sources, Some(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = PlannerConfig::from_json_str(r#"{"top_improvements": 3}"#).unwrap();
        assert_eq!(config.top_improvements, 3);
        assert_eq!(config.improved_path_sample, SamplePolicy::FirstN(20));
    }

    #[test]
    fn test_named_sample_and_exact_betweenness() {
        let config = PlannerConfig::from_json_str(
            r#"{"improved_path_sample": {"named": ["A", "B"]}, "betweenness_sources": null}"#,
        )
        .unwrap();
        assert_eq!(
            config.improved_path_sample,
            SamplePolicy::Named(vec!["A".into(), "B".into()])
        );
        assert_eq!(config.betweenness_sources, None);
    }

    #[test]
    fn test_zero_sample_rejected() {
        let err = PlannerConfig::from_json_str(r#"{"improved_path_sample": {"first_n": 0}}"#);
        assert!(matches!(err, Err(PlannerError::Config(_))));
    }

    #[test]
    fn test_malformed_json() {
        let err = PlannerConfig::from_json_str("{not json");
        assert!(matches!(err, Err(PlannerError::Json(_))));
    }
}
