use serde::{Deserialize, Serialize};

use crate::domain::topology::normalizer::PathNormalizer;

/// Knobs that shape a model for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// Allow more than one circuit between the same pair of nodes.
    pub parallel_interfaces: bool,

    /// Seed for the LSP tie-break. Drawn from the OS once per model when absent.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { parallel_interfaces: true, seed: None }
    }
}

impl SimulationConfig {
    pub fn single_link() -> Self {
        Self { parallel_interfaces: false, seed: None }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn normalizer(&self) -> PathNormalizer {
        if self.parallel_interfaces { PathNormalizer::ParallelLinks } else { PathNormalizer::SingleLink }
    }
}
