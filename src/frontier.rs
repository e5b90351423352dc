//! Frontier buffers
//!
//! A frontier is the ordered set of active vertices (or edges) for the current
//! iteration. The logical element count is decoupled from the allocation:
//! operators overwrite the buffer every iteration and grow it with a
//! multiplicative over-allocation so monotonically growing frontiers do not
//! reallocate every call.
//!
//! Growth hands back a fresh view of the storage. Views taken before a
//! `reserve` cannot outlive it, so a stale view after reallocation is a
//! compile error rather than a convention.

use crate::limits::Invalid;
use crate::storage::VertexId;
use crate::EngineError;
use serde::{Deserialize, Serialize};

/// Default multiplicative over-allocation applied on growth
pub const DEFAULT_RESIZING_FACTOR: f32 = 2.0;

/// What a frontier holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrontierKind {
    /// Vertex identifiers
    Vertex,
    /// Edge identifiers
    Edge,
}

/// Resizable frontier buffer
///
/// # Example
///
/// ```
/// use trueno_frontier::{Frontier, FrontierKind};
///
/// let mut frontier = Frontier::<u32>::new(FrontierKind::Vertex);
/// frontier.assign(&[3, 1, 4]).unwrap();
/// assert_eq!(frontier.len(), 3);
/// assert!(frontier.capacity() >= 3);
/// ```
#[derive(Debug, Clone)]
pub struct Frontier<T: Invalid> {
    kind: FrontierKind,
    /// Whole allocation; `storage.len()` is the capacity
    storage: Vec<T>,
    len: usize,
    resizing_factor: f32,
}

impl<T: Invalid> Frontier<T> {
    /// Empty frontier with no allocation
    #[must_use]
    pub fn new(kind: FrontierKind) -> Self {
        Self {
            kind,
            storage: Vec::new(),
            len: 0,
            resizing_factor: DEFAULT_RESIZING_FACTOR,
        }
    }

    /// Empty frontier with exactly `capacity` slots allocated
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Allocation` if the allocation fails
    pub fn with_capacity(kind: FrontierKind, capacity: usize) -> Result<Self, EngineError> {
        let mut frontier = Self::new(kind);
        frontier.grow_exact(capacity)?;
        Ok(frontier)
    }

    /// Vertex or edge frontier
    #[must_use]
    pub const fn kind(&self) -> FrontierKind {
        self.kind
    }

    /// Number of logical elements
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Alias of [`len`](Self::len)
    #[must_use]
    pub const fn number_of_elements(&self) -> usize {
        self.len
    }

    /// True iff the logical count is zero
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Current resizing factor
    #[must_use]
    pub const fn resizing_factor(&self) -> f32 {
        self.resizing_factor
    }

    /// Set the over-allocation applied by future growth
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidResizingFactor` unless `factor` is finite and `>= 1.0`
    pub fn set_resizing_factor(&mut self, factor: f32) -> Result<(), EngineError> {
        if !factor.is_finite() || factor < 1.0 {
            return Err(EngineError::InvalidResizingFactor(factor));
        }
        self.resizing_factor = factor;
        Ok(())
    }

    /// Guarantee `capacity() >= n`, growing by the resizing factor
    ///
    /// Elements in `0..len()` are preserved; new slots hold the sentinel.
    /// Returns a view of the whole allocation taken after any growth.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Allocation` if growth cannot be allocated
    pub fn reserve(&mut self, n: usize) -> Result<&mut [T], EngineError> {
        if n > self.storage.len() {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss
            )]
            let scaled = (n as f64 * f64::from(self.resizing_factor)).ceil() as usize;
            self.grow_exact(scaled.max(n))?;
        }
        Ok(&mut self.storage)
    }

    fn grow_exact(&mut self, capacity: usize) -> Result<(), EngineError> {
        let additional = capacity.saturating_sub(self.storage.len());
        self.storage
            .try_reserve_exact(additional)
            .map_err(|_| EngineError::Allocation(capacity))?;
        self.storage.resize(capacity, T::INVALID);
        Ok(())
    }

    /// Set the logical element count
    ///
    /// # Errors
    ///
    /// Returns `EngineError::CapacityExceeded` if `n > capacity()`; reserve first
    pub fn set_number_of_elements(&mut self, n: usize) -> Result<(), EngineError> {
        if n > self.storage.len() {
            return Err(EngineError::CapacityExceeded {
                requested: n,
                capacity: self.storage.len(),
            });
        }
        self.len = n;
        Ok(())
    }

    /// Valid prefix `0..len()`
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// Mutable valid prefix `0..len()`
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[..self.len]
    }

    /// Whole allocation (including slots past `len()`)
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.storage
    }

    /// Element `index` of the valid prefix
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    /// Elements of the valid prefix that are not the sentinel
    pub fn iter_valid(&self) -> impl Iterator<Item = T> + '_ {
        self.as_slice().iter().copied().filter(|item| item.is_valid())
    }

    /// Replace the contents with `items`
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Allocation` if growth fails
    pub fn assign(&mut self, items: &[T]) -> Result<(), EngineError> {
        let view = self.reserve(items.len())?;
        view[..items.len()].copy_from_slice(items);
        self.len = items.len();
        Ok(())
    }

    /// Append one element
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Allocation` if growth fails
    pub fn push(&mut self, item: T) -> Result<(), EngineError> {
        let index = self.len;
        let view = self.reserve(index + 1)?;
        view[index] = item;
        self.len = index + 1;
        Ok(())
    }

    /// Set the logical count to zero (allocation kept)
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Remove sentinel slots in place, keeping order; returns the new length
    pub fn compact(&mut self) -> usize {
        let mut write = 0;
        for read in 0..self.len {
            let item = self.storage[read];
            if item.is_valid() {
                self.storage[write] = item;
                write += 1;
            }
        }
        self.storage[write..self.len].fill(T::INVALID);
        self.len = write;
        write
    }
}

impl Frontier<VertexId> {
    /// Fill with every vertex `0..num_vertices` in order
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Allocation` if growth fails, or
    /// `EngineError::InvalidGraph` if the ids do not fit below the sentinel
    pub fn fill_sequence(&mut self, num_vertices: usize) -> Result<(), EngineError> {
        let Ok(upper) = VertexId::try_from(num_vertices) else {
            return Err(EngineError::InvalidGraph(format!(
                "{num_vertices} vertices exceed the vertex id range"
            )));
        };
        let view = self.reserve(num_vertices)?;
        for (slot, v) in view.iter_mut().zip(0..upper) {
            *slot = v;
        }
        self.len = num_vertices;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frontier_is_empty() {
        let frontier = Frontier::<u32>::new(FrontierKind::Vertex);
        assert!(frontier.is_empty());
        assert_eq!(frontier.capacity(), 0);
        assert_eq!(frontier.kind(), FrontierKind::Vertex);
        assert!((frontier.resizing_factor() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reserve_applies_resizing_factor() {
        let mut frontier = Frontier::<u32>::new(FrontierKind::Vertex);
        frontier.reserve(10).unwrap();
        assert_eq!(frontier.capacity(), 20);

        // Already large enough: no growth
        frontier.reserve(15).unwrap();
        assert_eq!(frontier.capacity(), 20);

        frontier.set_resizing_factor(1.5).unwrap();
        frontier.reserve(21).unwrap();
        assert_eq!(frontier.capacity(), 32);
    }

    #[test]
    fn test_reserve_preserves_contents() {
        let mut frontier = Frontier::<u32>::with_capacity(FrontierKind::Vertex, 3).unwrap();
        frontier.assign(&[7, 8, 9]).unwrap();
        assert_eq!(frontier.capacity(), 3);

        let view = frontier.reserve(100).unwrap();
        assert!(view.len() >= 100);
        assert_eq!(&view[..3], &[7, 8, 9]);
        assert!(view[3..].iter().all(|&x| x == u32::MAX));
        assert_eq!(frontier.as_slice(), &[7, 8, 9]);
    }

    #[test]
    fn test_set_number_of_elements_checks_capacity() {
        let mut frontier = Frontier::<u32>::with_capacity(FrontierKind::Edge, 4).unwrap();
        frontier.set_number_of_elements(4).unwrap();
        assert_eq!(frontier.len(), 4);

        let err = frontier.set_number_of_elements(5).unwrap_err();
        assert_eq!(
            err,
            EngineError::CapacityExceeded {
                requested: 5,
                capacity: 4
            }
        );
    }

    #[test]
    fn test_invalid_resizing_factor() {
        let mut frontier = Frontier::<u32>::new(FrontierKind::Vertex);
        assert!(frontier.set_resizing_factor(0.5).is_err());
        assert!(frontier.set_resizing_factor(f32::NAN).is_err());
        assert!(frontier.set_resizing_factor(1.0).is_ok());
    }

    #[test]
    fn test_push_and_clear() {
        let mut frontier = Frontier::<u32>::new(FrontierKind::Vertex);
        frontier.push(5).unwrap();
        frontier.push(6).unwrap();
        assert_eq!(frontier.as_slice(), &[5, 6]);
        assert_eq!(frontier.get(1), Some(6));
        assert_eq!(frontier.get(2), None);

        frontier.clear();
        assert!(frontier.is_empty());
        assert!(frontier.capacity() >= 2);
    }

    #[test]
    fn test_compact_is_stable() {
        let mut frontier = Frontier::<u32>::new(FrontierKind::Vertex);
        frontier.assign(&[u32::MAX, 4, u32::MAX, 2, 4, u32::MAX]).unwrap();

        assert_eq!(frontier.iter_valid().collect::<Vec<_>>(), vec![4, 2, 4]);
        assert_eq!(frontier.compact(), 3);
        assert_eq!(frontier.as_slice(), &[4, 2, 4]);
    }

    #[test]
    fn test_fill_sequence() {
        let mut frontier = Frontier::<u32>::new(FrontierKind::Vertex);
        frontier.fill_sequence(5).unwrap();
        assert_eq!(frontier.as_slice(), &[0, 1, 2, 3, 4]);

        frontier.fill_sequence(0).unwrap();
        assert!(frontier.is_empty());
    }
}
