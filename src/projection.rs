//! Complexity metrics derived from a graph.
//!
//! The projection is a pure function of the graph. Raw counts go through a
//! [`ComplexityNormalizer`] to produce bounded scores for the host.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComplexityCounts {
    /// distinct triggers and inputs, trimmed and case-folded
    pub inputs: usize,
    /// nodes other than start and end markers
    pub steps: usize,
    /// distinct dependencies, including legacy team fields
    pub dependencies: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, strum::AsRefStr, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ComplexityMetric {
    Inputs,
    Steps,
    Dependencies,
}

/// Maps a raw count into a bounded score.
pub trait ComplexityNormalizer: Send + Sync {
    fn normalize(
        &self,
        metric: ComplexityMetric,
        raw: usize,
    ) -> f64;
}

/// Linear score in `[0, 1]` that saturates at a per-metric ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturatingNormalizer {
    pub inputs: usize,
    pub steps: usize,
    pub dependencies: usize,
}

impl Default for SaturatingNormalizer {
    fn default() -> Self {
        Self {
            inputs: 20,
            steps: 50,
            dependencies: 20,
        }
    }
}

impl ComplexityNormalizer for SaturatingNormalizer {
    fn normalize(
        &self,
        metric: ComplexityMetric,
        raw: usize,
    ) -> f64 {
        let ceiling = match metric {
            ComplexityMetric::Inputs => self.inputs,
            ComplexityMetric::Steps => self.steps,
            ComplexityMetric::Dependencies => self.dependencies,
        };
        if ceiling == 0 {
            return 1.0;
        }
        (raw as f64 / ceiling as f64).min(1.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexityScores {
    pub inputs: f64,
    pub steps: f64,
    pub dependencies: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexityProjection {
    pub counts: ComplexityCounts,
    pub scores: ComplexityScores,
}

impl ComplexityProjection {
    pub fn compute(
        graph: &Graph,
        normalizer: &dyn ComplexityNormalizer,
    ) -> Self {
        let counts = ComplexityCounts::of(graph);
        Self {
            counts,
            scores: ComplexityScores {
                inputs: normalizer.normalize(ComplexityMetric::Inputs, counts.inputs),
                steps: normalizer.normalize(ComplexityMetric::Steps, counts.steps),
                dependencies: normalizer.normalize(ComplexityMetric::Dependencies, counts.dependencies),
            },
        }
    }
}

impl ComplexityCounts {
    pub fn of(graph: &Graph) -> Self {
        let mut inputs = BTreeSet::new();
        let mut dependencies = BTreeSet::new();
        let mut steps = 0;
        for node in graph.nodes() {
            if node.kind.is_step() {
                steps += 1;
            }
            let config = &node.config;
            inputs.extend(config.triggers.iter().chain(config.inputs.iter()).filter_map(|v| fold(v)));
            dependencies.extend(config.dependencies.iter().chain(config.team.iter()).filter_map(|v| fold(v)));
        }
        Self {
            inputs: inputs.len(),
            steps,
            dependencies: dependencies.len(),
        }
    }
}

fn fold(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_lowercase())
}
