//! Points and per-dimension boundaries.

use serde::{Deserialize, Serialize};

/// A location in the space: an ordered tuple of coordinate values.
///
/// Points are owned by callers and only ever borrowed as `&[T]` by cost and
/// neighbor functions.
pub type Point<T> = Vec<T>;

/// The extreme pair of points bounding one dimension of a space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary<T> {
    pub low: Point<T>,
    pub high: Point<T>,
}

impl<T> Boundary<T> {
    pub fn new(low: Point<T>, high: Point<T>) -> Self {
        Self { low, high }
    }
}

impl<T> From<(Point<T>, Point<T>)> for Boundary<T> {
    fn from((low, high): (Point<T>, Point<T>)) -> Self {
        Self { low, high }
    }
}
