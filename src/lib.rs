//! trueno-frontier: frontier-centric graph processing engine
//!
//! # Overview
//!
//! Graph traversals are written as a few data-parallel operators applied to
//! a *frontier* (the active vertices or edges), driven by an *enactor* until
//! the algorithm converges. The core operator is **advance**: every input
//! vertex expands into its neighbors, load-balanced across workers so a
//! single high-degree hub does not serialize the step.
//!
//! Kernels run on a CPU emulation of the GPU execution model (rayon-backed
//! cooperative blocks); the `gpu` feature adds the block-mapped advance as a
//! wgpu compute shader.
//!
//! # Quick Start
//!
//! ```
//! use trueno_frontier::algorithms::bfs;
//! use trueno_frontier::operators::{AdvanceConfig, LoadBalance};
//! use trueno_frontier::{CsrGraph, NodeId};
//!
//! let graph = CsrGraph::from_edge_list(&[
//!     (NodeId(0), NodeId(1), 1.0),
//!     (NodeId(0), NodeId(2), 1.0),
//!     (NodeId(1), NodeId(2), 1.0),
//! ])
//! .unwrap();
//!
//! let result = bfs(&graph, NodeId(0), AdvanceConfig::with_load_balance(LoadBalance::BlockMapped))
//!     .unwrap();
//! assert_eq!(result.depths, vec![0, 1, 1]);
//! ```
//!
//! # Architecture
//!
//! - **Storage**: CSR, CSC and COO graphs behind one [`GraphAccess`] trait
//! - **Frontier**: growable buffer with an invalid-element sentinel
//! - **Operators**: advance (block-mapped, thread-mapped, merge-path)
//! - **Enactor**: double-buffered iteration loop over [`Algorithm`] hooks
//! - **Algorithms**: BFS and SSSP on the enactor

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod context;
pub mod enactor;
pub mod error;
pub mod frontier;
pub mod limits;
pub mod operators;
pub mod search;
pub mod storage;

#[cfg(feature = "gpu")]
pub mod gpu;

// Re-export core types
pub use context::{LaunchConfig, MultiContext, StandardContext, Timer};
pub use enactor::{Algorithm, Enactor, EnactorProperties, EnactorState, Problem};
pub use error::EngineError;
pub use frontier::{Frontier, FrontierKind};
pub use limits::Invalid;
pub use storage::{CooGraph, CscGraph, CsrGraph, EdgeId, GraphAccess, NodeId, VertexId, Weight};

#[cfg(feature = "gpu")]
pub use gpu::{gpu_advance_block_mapped, GpuCsrBuffers, GpuDevice, GpuDeviceError};

// Error type
pub use anyhow::{Error, Result};
