//! Engine error taxonomy
//!
//! Configuration errors (unsupported strategy, multiple device contexts) are
//! programming mistakes and are reported at the call site, never retried.
//! Capacity errors are fatal. Empty expansions are not errors.

use crate::operators::{AdvanceDirection, AdvanceType, LoadBalance};
use thiserror::Error;

/// Errors raised by frontier buffers, execution contexts and operators
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Load-balancing strategy is a reserved tag without a kernel
    #[error("Advance load-balancing strategy not supported: {0:?}")]
    UnsupportedLoadBalance(LoadBalance),

    /// Advance input/output kind combination is not implemented
    #[error("Advance type not supported: {0:?}")]
    UnsupportedAdvanceType(AdvanceType),

    /// Advance direction is not implemented
    #[error("Advance direction not supported: {0:?}")]
    UnsupportedDirection(AdvanceDirection),

    /// Only single-context execution is supported
    #[error("`context.size() != 1` not supported (got {0})")]
    MultiContext(usize),

    /// Device context index out of range
    #[error("Device context {index} out of range ({size} available)")]
    ContextOutOfRange {
        /// Requested index
        index: usize,
        /// Number of contexts
        size: usize,
    },

    /// Failed to build the worker pool backing a context
    #[error("Failed to build execution context: {0}")]
    ContextBuild(String),

    /// Logical size larger than allocated capacity
    #[error("Requested {requested} elements but frontier capacity is {capacity}")]
    CapacityExceeded {
        /// Requested logical size
        requested: usize,
        /// Allocated capacity
        capacity: usize,
    },

    /// Frontier growth could not be allocated
    #[error("Failed to allocate frontier storage for {0} elements")]
    Allocation(usize),

    /// Resizing factor must be finite and at least 1.0
    #[error("Invalid frontier resizing factor: {0}")]
    InvalidResizingFactor(f32),

    /// Enactor properties rejected at construction
    #[error("Invalid enactor properties: {0}")]
    InvalidProperties(String),

    /// A valid (non-sentinel) vertex id outside the graph
    #[error("Vertex {vertex} out of bounds ({num_vertices} vertices)")]
    VertexOutOfBounds {
        /// Offending vertex id
        vertex: u32,
        /// Number of vertices in the graph
        num_vertices: usize,
    },

    /// Malformed graph components
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),
}
