//! Per-dimension distance functions.
//!
//! A [`Metric`] measures how far apart two points are along one dimension of
//! a space. Metrics carry a mutable scale factor so that a space can
//! normalize every dimension against its maximum distance.

use std::fmt;

/// A per-dimension distance between two points.
pub trait Metric<T>: Send + Sync {
    /// Unscaled distance from `a` to `b`.
    fn raw_distance(&self, a: &[T], b: &[T]) -> f64;

    /// Distance from `a` to `b`, multiplied by the current scale.
    fn distance(&self, a: &[T], b: &[T]) -> f64 {
        self.raw_distance(a, b) * self.scale()
    }

    /// Current scale factor.
    fn scale(&self) -> f64;

    /// Replace the scale factor. Called by max-distance derivation.
    fn set_scale(&mut self, scale: f64);

    /// Human-readable metric name.
    fn name(&self) -> &str;
}

/// A metric backed by a plain closure.
///
/// The closure computes the raw distance; [`Metric::distance`] multiplies
/// it by the current scale (1.0 until set).
pub struct FnMetric<F> {
    name: String,
    scale: f64,
    raw: F,
}

impl<F> FnMetric<F> {
    pub fn new(name: impl Into<String>, raw: F) -> Self {
        Self {
            name: name.into(),
            scale: 1.0,
            raw,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }
}

impl<F> fmt::Debug for FnMetric<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMetric")
            .field("name", &self.name)
            .field("scale", &self.scale)
            .finish()
    }
}

impl<T, F> Metric<T> for FnMetric<F>
where
    F: Fn(&[T], &[T]) -> f64 + Send + Sync,
{
    fn raw_distance(&self, a: &[T], b: &[T]) -> f64 {
        (self.raw)(a, b)
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Boxes a closure as a dynamically dispatched metric.
pub fn metric_fn<T, F>(name: impl Into<String>, raw: F) -> Box<dyn Metric<T>>
where
    T: 'static,
    F: Fn(&[T], &[T]) -> f64 + Send + Sync + 'static,
{
    Box::new(FnMetric::new(name, raw))
}
