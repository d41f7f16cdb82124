//! Scaling providers turn a raw per-dimension distance bound into the scale
//! factor assigned to that dimension's metric.

/// Derives a metric scale from a maximum distance.
pub trait ScalingProvider: Send + Sync {
    fn global_scale(&self, bound: f64) -> f64;
}

/// Normalizes so that `bound` maps to a distance of 1.0.
///
/// A zero bound cannot be normalized against and leaves the metric unscaled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalScaling;

impl ScalingProvider for GlobalScaling {
    fn global_scale(&self, bound: f64) -> f64 {
        if bound == 0.0 {
            1.0
        } else {
            1.0 / bound
        }
    }
}

/// Leaves every metric at unit scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IdentityScaling;

impl ScalingProvider for IdentityScaling {
    fn global_scale(&self, _bound: f64) -> f64 {
        1.0
    }
}
