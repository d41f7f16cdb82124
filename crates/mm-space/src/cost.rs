//! Composite cost functions built from per-dimension metrics.

use mm_types::{Boundary, Metric};

/// Everything a cost model may look at during one morph call.
///
/// Built fresh for every morph; the start point is the fixed origin against
/// which candidate distances are measured.
pub struct MorphContext<'a, T> {
    pub start: &'a [T],
    pub target: &'a [f64],
    pub metrics: &'a [Box<dyn Metric<T>>],
    pub boundaries: Option<&'a [Boundary<T>]>,
}

impl<'a, T> MorphContext<'a, T> {
    pub fn new(
        start: &'a [T],
        target: &'a [f64],
        metrics: &'a [Box<dyn Metric<T>>],
        boundaries: Option<&'a [Boundary<T>]>,
    ) -> Self {
        Self {
            start,
            target,
            metrics,
            boundaries,
        }
    }
}

/// Scores how far a candidate's distance vector is from the target vector.
///
/// Lower is better; a search succeeds once the cost drops to its tolerance.
pub trait CostModel<T>: Send + Sync {
    fn cost(&self, ctx: &MorphContext<'_, T>, candidate: &[T]) -> f64;

    fn name(&self) -> &str;
}

/// Root of the summed squared differences between the (signed) distance
/// vector and the target.
///
/// With boundaries, a dimension's distance is negated when the candidate
/// sits closer to that dimension's lower boundary than the start does, so
/// negative targets mean "move toward the low end". Without boundaries all
/// distances are unsigned and only non-negative targets are reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanCost;

impl EuclideanCost {
    fn signed_distance<T>(
        metric: &dyn Metric<T>,
        start: &[T],
        candidate: &[T],
        boundary: Option<&Boundary<T>>,
    ) -> f64 {
        let distance = metric.distance(start, candidate);
        match boundary {
            Some(boundary) => {
                let start_to_low = metric.distance(start, &boundary.low);
                let candidate_to_low = metric.distance(candidate, &boundary.low);
                if start_to_low > candidate_to_low {
                    -distance
                } else {
                    distance
                }
            }
            None => distance,
        }
    }
}

impl<T> CostModel<T> for EuclideanCost {
    fn cost(&self, ctx: &MorphContext<'_, T>, candidate: &[T]) -> f64 {
        ctx.metrics
            .iter()
            .zip(ctx.target)
            .enumerate()
            .map(|(i, (metric, goal))| {
                let boundary = ctx.boundaries.and_then(|b| b.get(i));
                let distance =
                    Self::signed_distance(metric.as_ref(), ctx.start, candidate, boundary);
                (distance - goal).powi(2)
            })
            .sum::<f64>()
            .sqrt()
    }

    fn name(&self) -> &str {
        "euclidean"
    }
}
