//! Scoped execution: named values made available to a block of morph calls.

use std::collections::BTreeMap;

use mm_types::{MmError, MmResult};

use crate::search::SearchResult;
use crate::space::Space;

/// A value bound to a name inside a scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Local<T> {
    Point(Vec<T>),
    Vector(Vec<f64>),
    Scalar(f64),
}

impl<T> Local<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::Point(_) => "point",
            Self::Vector(_) => "vector",
            Self::Scalar(_) => "scalar",
        }
    }
}

/// Name-to-value bindings for [`Space::enter`].
#[derive(Debug, Clone, PartialEq)]
pub struct Bindings<T> {
    values: BTreeMap<String, Local<T>>,
}

impl<T> Bindings<T> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: Local<T>) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn with_point(self, name: impl Into<String>, point: Vec<T>) -> Self {
        self.with(name, Local::Point(point))
    }

    pub fn with_vector(self, name: impl Into<String>, vector: Vec<f64>) -> Self {
        self.with(name, Local::Vector(vector))
    }

    pub fn with_scalar(self, name: impl Into<String>, value: f64) -> Self {
        self.with(name, Local::Scalar(value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> Default for Bindings<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The context handed to an [`enter`](Space::enter) callback.
///
/// Owns the bindings and borrows the space for the duration of the
/// callback; both are released when the scope is dropped.
pub struct Scope<'s, T> {
    space: &'s mut Space<T>,
    bindings: Bindings<T>,
}

impl<'s, T> Scope<'s, T> {
    pub(crate) fn open(space: &'s mut Space<T>, bindings: Bindings<T>) -> Self {
        space.open_scopes += 1;
        Self { space, bindings }
    }

    pub fn get(&self, name: &str) -> Option<&Local<T>> {
        self.bindings.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.values.keys().map(String::as_str)
    }

    pub fn point(&self, name: &str) -> MmResult<&[T]> {
        match self.lookup(name)? {
            Local::Point(point) => Ok(point),
            other => Err(type_error(name, "point", other)),
        }
    }

    pub fn vector(&self, name: &str) -> MmResult<&[f64]> {
        match self.lookup(name)? {
            Local::Vector(vector) => Ok(vector),
            other => Err(type_error(name, "vector", other)),
        }
    }

    pub fn scalar(&self, name: &str) -> MmResult<f64> {
        match self.lookup(name)? {
            Local::Scalar(value) => Ok(*value),
            other => Err(type_error(name, "scalar", other)),
        }
    }

    pub fn space(&self) -> &Space<T> {
        self.space
    }

    pub fn space_mut(&mut self) -> &mut Space<T> {
        self.space
    }

    fn lookup(&self, name: &str) -> MmResult<&Local<T>> {
        self.get(name).ok_or_else(|| MmError::UnboundName {
            name: name.to_string(),
        })
    }
}

impl<T: Clone> Scope<'_, T> {
    pub fn morph(
        &self,
        start: &[T],
        target: &[f64],
        current_point: Option<Vec<T>>,
    ) -> MmResult<SearchResult<T>> {
        self.space.morph(start, target, current_point)
    }

    /// Morphs between a bound start point and a bound target vector.
    pub fn morph_named(&self, start: &str, target: &str) -> MmResult<SearchResult<T>> {
        self.space.morph(self.point(start)?, self.vector(target)?, None)
    }
}

impl<T> Drop for Scope<'_, T> {
    fn drop(&mut self) {
        self.space.open_scopes -= 1;
    }
}

fn type_error<T>(name: &str, expected: &str, found: &Local<T>) -> MmError {
    MmError::BindingType {
        name: name.to_string(),
        expected: format!("{expected} (found {})", found.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::StepNeighbors;
    use mm_types::{metric_fn, Metric};
    use std::panic::{self, AssertUnwindSafe};

    fn axis(i: usize) -> Box<dyn Metric<f64>> {
        metric_fn(format!("axis_{i}"), move |a: &[f64], b: &[f64]| (a[i] - b[i]).abs())
    }

    fn grid_space() -> Space<f64> {
        Space::new(vec![axis(0), axis(1)]).with_neighbor_function(StepNeighbors::new(
            1.0, -10.0, 10.0,
        ))
    }

    #[test]
    fn bindings_resolve_inside_callback() {
        let mut space = grid_space();
        let bindings = Bindings::new()
            .with_point("start", vec![0.0, 0.0])
            .with_vector("to", vec![2.0, 3.0])
            .with_scalar("tolerance", 0.5);

        space.enter(bindings, |scope| {
            assert!(scope.space().bindings_active());
            assert_eq!(scope.point("start").unwrap(), &[0.0, 0.0]);
            assert_eq!(scope.vector("to").unwrap(), &[2.0, 3.0]);
            assert_eq!(scope.scalar("tolerance").unwrap(), 0.5);
            assert_eq!(scope.names().collect::<Vec<_>>(), vec!["start", "to", "tolerance"]);
        });

        assert!(!space.bindings_active());
    }

    #[test]
    fn callback_result_is_returned() {
        let mut space = grid_space();
        let bindings = Bindings::new()
            .with_point("start", vec![0.0, 0.0])
            .with_vector("to", vec![2.0, 3.0]);

        let result = space
            .enter(bindings, |scope| scope.morph_named("start", "to"))
            .unwrap();

        let point = result.into_point().unwrap();
        assert_eq!(point.len(), 2);
        assert_eq!((point[0].abs(), point[1].abs()), (2.0, 3.0));
    }

    #[test]
    fn chained_morphs_inside_scope() {
        let mut space = grid_space();
        let bindings = Bindings::new().with_point("start", vec![0.0, 0.0]);

        let end = space.enter(bindings, |scope| -> MmResult<Vec<f64>> {
            let start = scope.point("start")?.to_vec();
            let first = scope
                .morph(&start, &[1.0, 1.0], None)?
                .into_point()
                .ok_or_else(|| MmError::InvalidArgument("first leg exhausted".into()))?;
            scope.space_mut().set_delta(0.5)?;
            let second = scope
                .morph(&first, &[2.0, 0.0], None)?
                .into_point()
                .ok_or_else(|| MmError::InvalidArgument("second leg exhausted".into()))?;
            Ok(second)
        });

        let end = end.unwrap();
        assert_eq!((end[0] - -1.0).abs() + (end[1] - -1.0).abs(), 2.0);
        assert_eq!(space.delta(), 0.5);
    }

    #[test]
    fn unknown_and_mistyped_names_fail() {
        let mut space = grid_space();
        let bindings = Bindings::new().with_scalar("tolerance", 0.5);

        space.enter(bindings, |scope| {
            assert!(matches!(
                scope.point("start"),
                Err(MmError::UnboundName { ref name }) if name == "start"
            ));
            assert!(matches!(
                scope.vector("tolerance"),
                Err(MmError::BindingType { .. })
            ));
            assert!(!scope.contains("start"));
        });
    }

    #[test]
    fn errors_propagate_and_release_bindings() {
        let mut space = grid_space();
        let result: MmResult<()> = space.enter(Bindings::new(), |scope| {
            scope.point("missing")?;
            Ok(())
        });

        assert!(result.is_err());
        assert!(!space.bindings_active());
    }

    #[test]
    fn panics_release_bindings() {
        let mut space = grid_space();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            space.enter(Bindings::new().with_scalar("x", 1.0), |_| {
                panic!("callback failed");
            })
        }));

        assert!(outcome.is_err());
        assert!(!space.bindings_active());
    }

    #[test]
    fn nested_scopes_track_depth() {
        let mut space = grid_space();
        space.enter(Bindings::new(), |outer| {
            outer
                .space_mut()
                .enter(Bindings::new().with_scalar("inner", 1.0), |inner| {
                    assert!(inner.contains("inner"));
                    assert!(inner.space().bindings_active());
                });
            assert!(outer.space().bindings_active());
            assert!(!outer.contains("inner"));
        });
        assert!(!space.bindings_active());
    }
}
