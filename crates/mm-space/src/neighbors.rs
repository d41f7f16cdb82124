//! Candidate-neighbor generation.
//!
//! The default [`RepeatedPermutations`] generator yields every N-length
//! arrangement of a point's own N coordinates. That is N^N candidates per
//! iteration, so it only suits small dimension counts: anything beyond a
//! handful of coordinates should supply its own [`NeighborFunction`], for
//! example [`StepNeighbors`].

use num_traits::Float;

/// Produces the candidates considered during one search iteration.
///
/// Generation order matters: the searcher breaks cost ties in favor of the
/// first candidate produced. Implementations must yield a finite sequence;
/// the searcher does not cap a single iteration.
pub trait NeighborFunction<T>: Send + Sync {
    fn neighbors<'a>(&'a self, point: &'a [T]) -> Box<dyn Iterator<Item = Vec<T>> + 'a>;

    fn name(&self) -> &str;
}

// ---- Repeated permutations ----

/// Every N-length combination of the current point's N coordinate values,
/// chosen independently per slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatedPermutations;

impl<T: Clone> NeighborFunction<T> for RepeatedPermutations {
    fn neighbors<'a>(&'a self, point: &'a [T]) -> Box<dyn Iterator<Item = Vec<T>> + 'a> {
        Box::new(RepeatedPermutationIter::new(point))
    }

    fn name(&self) -> &str {
        "repeated_permutations"
    }
}

/// Odometer over slot indices; the last slot varies fastest.
#[derive(Debug, Clone)]
pub struct RepeatedPermutationIter<'a, T> {
    values: &'a [T],
    indices: Vec<usize>,
    remaining: Option<usize>,
    done: bool,
}

impl<'a, T> RepeatedPermutationIter<'a, T> {
    pub fn new(values: &'a [T]) -> Self {
        let n = values.len();
        let remaining = u32::try_from(n).ok().and_then(|exp| n.checked_pow(exp));
        Self {
            values,
            indices: vec![0; n],
            remaining,
            done: false,
        }
    }

    fn advance(&mut self) {
        let n = self.values.len();
        for slot in (0..n).rev() {
            self.indices[slot] += 1;
            if self.indices[slot] < n {
                return;
            }
            self.indices[slot] = 0;
        }
        self.done = true;
    }
}

impl<T: Clone> Iterator for RepeatedPermutationIter<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let candidate = self
            .indices
            .iter()
            .map(|&i| self.values[i].clone())
            .collect();
        self.advance();
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(1);
        }
        Some(candidate)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Some(remaining) => (remaining, Some(remaining)),
            None => (0, None),
        }
    }
}

// ---- Arithmetic steps ----

/// Perturbs each coordinate by `-step`, `0` or `+step` independently.
///
/// Produces up to 3^N - 1 candidates (the unchanged point is skipped).
/// Any candidate with a coordinate outside `[low, high]` is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepNeighbors<T> {
    pub step: T,
    pub low: T,
    pub high: T,
}

impl<T: Float> StepNeighbors<T> {
    pub fn new(step: T, low: T, high: T) -> Self {
        Self { step, low, high }
    }

    fn offset(&self, digit: usize) -> T {
        match digit {
            0 => -self.step,
            1 => T::zero(),
            _ => self.step,
        }
    }
}

impl<T: Float + Send + Sync> NeighborFunction<T> for StepNeighbors<T> {
    fn neighbors<'a>(&'a self, point: &'a [T]) -> Box<dyn Iterator<Item = Vec<T>> + 'a> {
        let n = point.len();
        let total = u32::try_from(n)
            .map(|exp| 3usize.saturating_pow(exp))
            .unwrap_or(usize::MAX);

        Box::new((0..total).filter_map(move |code| {
            let mut rest = code;
            let mut candidate = vec![T::zero(); n];
            let mut moved = false;
            for slot in (0..n).rev() {
                let digit = rest % 3;
                rest /= 3;
                moved |= digit != 1;
                let value = point[slot] + self.offset(digit);
                if value < self.low || value > self.high {
                    return None;
                }
                candidate[slot] = value;
            }
            moved.then_some(candidate)
        }))
    }

    fn name(&self) -> &str {
        "step"
    }
}

// ---- Closures ----

/// Adapts a closure returning a candidate list.
pub struct FnNeighbors<F> {
    name: String,
    generate: F,
}

impl<F> FnNeighbors<F> {
    pub fn new(name: impl Into<String>, generate: F) -> Self {
        Self {
            name: name.into(),
            generate,
        }
    }
}

impl<T, F> NeighborFunction<T> for FnNeighbors<F>
where
    F: Fn(&[T]) -> Vec<Vec<T>> + Send + Sync,
{
    fn neighbors<'a>(&'a self, point: &'a [T]) -> Box<dyn Iterator<Item = Vec<T>> + 'a> {
        Box::new((self.generate)(point).into_iter())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
