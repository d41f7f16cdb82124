//! The space coordinator: owns metrics, boundaries and strategy choices, and
//! runs one fresh search per morph request.

use std::fmt;

use mm_types::{
    ensure_len, invalid_argument, Boundary, GlobalScaling, Metric, MmResult, ScalingProvider,
};
use num_traits::Float;
use tracing::{debug, info};

use crate::config::{NeighborKind, SpaceConfig, StrategyKind, DEFAULT_DELTA};
use crate::cost::{CostModel, EuclideanCost, MorphContext};
use crate::neighbors::{NeighborFunction, RepeatedPermutations, StepNeighbors};
use crate::normalize::{Normalizer, ReanchorToIdentity};
use crate::scope::{Bindings, Scope};
use crate::search::{BestImprovement, FirstImprovement, SearchProblem, SearchResult, SearchStrategy};

/// Input to [`Space::set_max_distance`].
#[derive(Debug, Clone, PartialEq)]
pub enum MaxDistance {
    /// A single bound, applied to the first metric only.
    Scalar(f64),
    /// One bound per metric, zipped in order.
    PerDimension(Vec<f64>),
}

impl MaxDistance {
    fn into_vec(self) -> Vec<f64> {
        match self {
            Self::Scalar(bound) => vec![bound],
            Self::PerDimension(bounds) => bounds,
        }
    }
}

impl From<f64> for MaxDistance {
    fn from(bound: f64) -> Self {
        Self::Scalar(bound)
    }
}

impl From<Vec<f64>> for MaxDistance {
    fn from(bounds: Vec<f64>) -> Self {
        Self::PerDimension(bounds)
    }
}

impl From<&[f64]> for MaxDistance {
    fn from(bounds: &[f64]) -> Self {
        Self::PerDimension(bounds.to_vec())
    }
}

/// Input to [`Space::set_metric`].
pub enum MetricSet<T> {
    Single(Box<dyn Metric<T>>),
    Many(Vec<Box<dyn Metric<T>>>),
}

impl<T> From<Box<dyn Metric<T>>> for MetricSet<T> {
    fn from(metric: Box<dyn Metric<T>>) -> Self {
        Self::Single(metric)
    }
}

impl<T> From<Vec<Box<dyn Metric<T>>>> for MetricSet<T> {
    fn from(metrics: Vec<Box<dyn Metric<T>>>) -> Self {
        Self::Many(metrics)
    }
}

/// A space of points measured by one metric per dimension.
pub struct Space<T> {
    metrics: Vec<Box<dyn Metric<T>>>,
    delta: f64,
    boundaries: Option<Vec<Boundary<T>>>,
    max_distance: Option<Vec<f64>>,
    neighbors: Box<dyn NeighborFunction<T>>,
    cost_model: Box<dyn CostModel<T>>,
    strategy: Box<dyn SearchStrategy<T>>,
    normalizer: Option<Box<dyn Normalizer<T>>>,
    scaling: Box<dyn ScalingProvider>,
    max_iterations: Option<usize>,
    pub(crate) open_scopes: usize,
}

impl<T: Clone + 'static> Space<T> {
    pub fn new(metrics: Vec<Box<dyn Metric<T>>>) -> Self {
        Self {
            metrics,
            delta: DEFAULT_DELTA,
            boundaries: None,
            max_distance: None,
            neighbors: Box::new(RepeatedPermutations),
            cost_model: Box::new(EuclideanCost),
            strategy: Box::new(BestImprovement),
            normalizer: None,
            scaling: Box::new(GlobalScaling),
            max_iterations: None,
            open_scopes: 0,
        }
    }

    pub fn with_delta(mut self, delta: f64) -> MmResult<Self> {
        self.set_delta(delta)?;
        Ok(self)
    }

    /// Sets boundaries and derives max distances from them.
    pub fn with_boundaries(mut self, boundaries: Vec<Boundary<T>>) -> MmResult<Self> {
        self.set_boundaries(boundaries)?;
        Ok(self)
    }

    pub fn with_neighbor_function(mut self, neighbors: impl NeighborFunction<T> + 'static) -> Self {
        self.neighbors = Box::new(neighbors);
        self
    }

    pub fn with_cost_model(mut self, cost_model: impl CostModel<T> + 'static) -> Self {
        self.cost_model = Box::new(cost_model);
        self
    }

    pub fn with_strategy(mut self, strategy: impl SearchStrategy<T> + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn with_normalizer(mut self, normalizer: impl Normalizer<T> + 'static) -> Self {
        self.normalizer = Some(Box::new(normalizer));
        self
    }

    /// Must be set before boundaries or max distances to affect them.
    pub fn with_scaling(mut self, scaling: impl ScalingProvider + 'static) -> Self {
        self.scaling = Box::new(scaling);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

impl<T: Float + Send + Sync + 'static> Space<T> {
    /// Builds a space for floating-point coordinates from a configuration.
    pub fn from_config(metrics: Vec<Box<dyn Metric<T>>>, config: &SpaceConfig) -> MmResult<Self> {
        config.validate()?;

        let mut space = Self::new(metrics).with_delta(config.delta)?;
        space.max_iterations = config.max_iterations;

        if let NeighborKind::Step { low, high, .. } = config.neighbors {
            let step = config.step_size().unwrap_or(config.delta);
            let cast = |value: f64| {
                num_traits::cast::<f64, T>(value)
                    .ok_or_else(|| invalid_argument!("{value} is not representable as a coordinate"))
            };
            space = space.with_neighbor_function(StepNeighbors::new(
                cast(step)?,
                cast(low)?,
                cast(high)?,
            ));
        }

        space = match config.strategy {
            StrategyKind::BestImprovement => space.with_strategy(BestImprovement),
            StrategyKind::FirstImprovement => space.with_strategy(FirstImprovement),
        };

        if config.normalize {
            space = space.with_normalizer(ReanchorToIdentity);
        }

        debug!(
            "Configured space {} with delta {} and {} neighbors",
            config.name,
            config.delta,
            space.neighbors.name()
        );
        Ok(space)
    }
}

impl<T> Space<T> {
    pub fn metrics(&self) -> &[Box<dyn Metric<T>>] {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut [Box<dyn Metric<T>>] {
        &mut self.metrics
    }

    pub fn dimensions(&self) -> usize {
        self.metrics.len()
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn boundaries(&self) -> Option<&[Boundary<T>]> {
        self.boundaries.as_deref()
    }

    pub fn max_distance(&self) -> Option<&[f64]> {
        self.max_distance.as_deref()
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn neighbor_name(&self) -> &str {
        self.neighbors.name()
    }

    pub fn cost_model_name(&self) -> &str {
        self.cost_model.name()
    }

    /// Whether an [`enter`](Space::enter) scope is currently open.
    pub fn bindings_active(&self) -> bool {
        self.open_scopes > 0
    }

    pub fn set_delta(&mut self, delta: f64) -> MmResult<()> {
        if !(delta.is_finite() && delta > 0.0) {
            return Err(invalid_argument!("delta must be positive and finite, got {delta}"));
        }
        self.delta = delta;
        Ok(())
    }

    /// Assigns each metric the scale derived from its bound.
    ///
    /// Bounds are zipped against the metrics, so a scalar or a short
    /// sequence only rescales the leading metrics.
    pub fn set_max_distance(&mut self, max_distance: impl Into<MaxDistance>) -> MmResult<()> {
        let bounds = max_distance.into().into_vec();
        validate_bounds(&bounds)?;
        self.apply_max_distance(bounds);
        Ok(())
    }

    /// Replaces the metric set wholesale.
    pub fn set_metric(&mut self, metric: impl Into<MetricSet<T>>) -> MmResult<()> {
        self.metrics = match metric.into() {
            MetricSet::Single(metric) => vec![metric],
            MetricSet::Many(metrics) if metrics.is_empty() => {
                return Err(invalid_argument!("metric set must not be empty"));
            }
            MetricSet::Many(metrics) => metrics,
        };
        debug!("Metric set replaced; {} dimensions", self.metrics.len());
        Ok(())
    }

    /// Stores boundaries, then recomputes max distance as the unscaled
    /// distance from each dimension's low to its high point.
    pub fn set_boundaries(&mut self, boundaries: Vec<Boundary<T>>) -> MmResult<()> {
        ensure_len("boundaries", self.metrics.len(), boundaries.len())?;

        let bounds: Vec<f64> = self
            .metrics
            .iter()
            .zip(&boundaries)
            .map(|(metric, boundary)| metric.raw_distance(&boundary.low, &boundary.high))
            .collect();
        validate_bounds(&bounds)?;

        self.boundaries = Some(boundaries);
        self.apply_max_distance(bounds);
        Ok(())
    }

    pub fn clear_boundaries(&mut self) {
        self.boundaries = None;
    }

    fn apply_max_distance(&mut self, bounds: Vec<f64>) {
        for (metric, bound) in self.metrics.iter_mut().zip(&bounds) {
            let scale = self.scaling.global_scale(*bound);
            metric.set_scale(scale);
            debug!("Metric {} scaled by {} (max distance {})", metric.name(), scale, bound);
        }
        self.max_distance = Some(bounds);
    }

    fn check_dimensions(&self, start: &[T], target: &[f64], current: Option<&[T]>) -> MmResult<()> {
        ensure_len("target vector", self.metrics.len(), target.len())?;
        if let Some(boundaries) = &self.boundaries {
            ensure_len("boundaries", self.metrics.len(), boundaries.len())?;
        }
        if let Some(current) = current {
            ensure_len("current point", start.len(), current.len())?;
        }
        Ok(())
    }
}

impl<T: Clone> Space<T> {
    /// Searches for a point whose distance vector from `start` matches
    /// `target` within delta.
    ///
    /// With `current_point` the walk begins there, while distances are still
    /// measured from `start`. Exhaustion is an `Ok` result; errors are
    /// reserved for inconsistent dimensions.
    pub fn morph(
        &self,
        start: &[T],
        target: &[f64],
        current_point: Option<Vec<T>>,
    ) -> MmResult<SearchResult<T>> {
        self.check_dimensions(start, target, current_point.as_deref())?;

        let ctx = MorphContext::new(start, target, &self.metrics, self.boundaries.as_deref());
        let cost = |candidate: &[T]| self.cost_model.cost(&ctx, candidate);
        let problem = SearchProblem::new(start, &cost, self.neighbors.as_ref(), self.delta)
            .with_max_iterations(self.max_iterations);

        let result = match current_point {
            Some(point) => self.strategy.find_from_point(&problem, point),
            None => self.strategy.find(&problem),
        };
        let result = match &self.normalizer {
            Some(normalizer) => result.map_found(|point| normalizer.normalize(point)),
            None => result,
        };

        info!(
            "Morph {} after {} iterations (cost {}, delta {})",
            if result.is_found() { "found a point" } else { "exhausted" },
            result.iterations(),
            result.cost(),
            self.delta
        );
        Ok(result)
    }

    pub fn morph_to(&self, start: &[T], target: &[f64]) -> MmResult<SearchResult<T>> {
        self.morph(start, target, None)
    }

    /// Runs `f` with `bindings` resolvable through the scope it receives.
    ///
    /// The bindings are dropped when `f` returns, fails or panics; the
    /// callback's return value is passed through.
    pub fn enter<R>(&mut self, bindings: Bindings<T>, f: impl FnOnce(&mut Scope<'_, T>) -> R) -> R {
        let mut scope = Scope::open(self, bindings);
        f(&mut scope)
    }
}

impl<T> fmt::Debug for Space<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metric_names: Vec<&str> = self.metrics.iter().map(|m| m.name()).collect();
        f.debug_struct("Space")
            .field("metrics", &metric_names)
            .field("delta", &self.delta)
            .field("has_boundaries", &self.boundaries.is_some())
            .field("max_distance", &self.max_distance)
            .field("neighbors", &self.neighbors.name())
            .field("cost_model", &self.cost_model.name())
            .field("strategy", &self.strategy.name())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

fn validate_bounds(bounds: &[f64]) -> MmResult<()> {
    if bounds.is_empty() {
        return Err(invalid_argument!("max distance must name at least one bound"));
    }
    if let Some(bad) = bounds.iter().find(|b| !(b.is_finite() && **b >= 0.0)) {
        return Err(invalid_argument!(
            "max distance bounds must be finite and non-negative, got {bad}"
        ));
    }
    Ok(())
}
