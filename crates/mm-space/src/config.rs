//! Serializable space configuration.

use mm_types::{config_error, MmResult};
use serde::{Deserialize, Serialize};

/// Tolerance used when none is configured.
pub const DEFAULT_DELTA: f64 = 0.001;

/// Which neighbor generator a configured space uses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NeighborKind {
    /// All N-length arrangements of the current coordinates.
    #[default]
    RepeatedPermutations,
    /// `{-step, 0, +step}` per coordinate within `[low, high]`. Without an
    /// explicit step the space's delta is used.
    Step {
        #[serde(default)]
        step: Option<f64>,
        low: f64,
        high: f64,
    },
}

/// Which search strategy a configured space uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    BestImprovement,
    FirstImprovement,
}

/// Top-level configuration for a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    pub name: String,

    /// Convergence tolerance, and step size for step neighborhoods
    /// without an explicit step.
    pub delta: f64,

    pub neighbors: NeighborKind,

    pub strategy: StrategyKind,

    /// Re-anchor found points so their leading coordinate is one.
    pub normalize: bool,

    /// Optional iteration cap per morph (none by default).
    pub max_iterations: Option<usize>,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            name: "space".to_string(),
            delta: DEFAULT_DELTA,
            neighbors: NeighborKind::RepeatedPermutations,
            strategy: StrategyKind::BestImprovement,
            normalize: false,
            max_iterations: None,
        }
    }
}

impl SpaceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_neighbors(mut self, neighbors: NeighborKind) -> Self {
        self.neighbors = neighbors;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Step size for step neighborhoods, falling back to delta.
    pub fn step_size(&self) -> Option<f64> {
        match self.neighbors {
            NeighborKind::Step { step, .. } => Some(step.unwrap_or(self.delta)),
            NeighborKind::RepeatedPermutations => None,
        }
    }

    pub fn validate(&self) -> MmResult<()> {
        if !(self.delta.is_finite() && self.delta > 0.0) {
            return Err(config_error!("delta must be positive and finite, got {}", self.delta));
        }
        if let NeighborKind::Step { step, low, high } = self.neighbors {
            if let Some(step) = step {
                if !(step.is_finite() && step > 0.0) {
                    return Err(config_error!("step must be positive and finite, got {step}"));
                }
            }
            if !(low <= high) {
                return Err(config_error!("step range is inverted: [{low}, {high}]"));
            }
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> MmResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> MmResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
