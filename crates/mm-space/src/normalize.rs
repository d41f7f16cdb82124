//! Post-processing applied to points a morph has found.

use num_traits::Float;

/// Rewrites a found point, e.g. to re-anchor it in a canonical form.
pub trait Normalizer<T>: Send + Sync {
    fn normalize(&self, point: Vec<T>) -> Vec<T>;
}

/// Divides every coordinate by the leading one, so the
/// leading coordinate becomes the identity element.
///
/// Points with a zero (or empty) leading coordinate are returned unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReanchorToIdentity;

impl<T: Float + Send + Sync> Normalizer<T> for ReanchorToIdentity {
    fn normalize(&self, point: Vec<T>) -> Vec<T> {
        match point.first().copied() {
            Some(lead) if !lead.is_zero() => point.into_iter().map(|v| v / lead).collect(),
            _ => point,
        }
    }
}

/// Adapts a closure.
pub struct FnNormalizer<F>(pub F);

impl<T, F> Normalizer<T> for FnNormalizer<F>
where
    F: Fn(Vec<T>) -> Vec<T> + Send + Sync,
{
    fn normalize(&self, point: Vec<T>) -> Vec<T> {
        (self.0)(point)
    }
}
