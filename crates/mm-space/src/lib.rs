//! # mm-space
//!
//! Coordinate search for metric spaces.
//!
//! A [`Space`] measures points with one [`Metric`](mm_types::Metric) per
//! dimension and morphs a start point toward a target distance vector by
//! local search: a [`CostModel`] scores candidates, a [`NeighborFunction`]
//! proposes them and a [`SearchStrategy`] walks downhill until the cost is
//! within the space's delta or no neighbor improves.

mod config;
mod cost;
mod neighbors;
mod normalize;
mod scope;
mod search;
mod space;

pub use config::{NeighborKind, SpaceConfig, StrategyKind, DEFAULT_DELTA};
pub use cost::{CostModel, EuclideanCost, MorphContext};
pub use neighbors::{FnNeighbors, NeighborFunction, RepeatedPermutationIter, RepeatedPermutations, StepNeighbors};
pub use normalize::{FnNormalizer, Normalizer, ReanchorToIdentity};
pub use scope::{Bindings, Local, Scope};
pub use search::{
    BestImprovement, FirstImprovement, SearchProblem, SearchResult, SearchStrategy, Searcher,
    Selection,
};
pub use space::{MaxDistance, MetricSet, Space};
