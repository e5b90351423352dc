//! Reference algorithms built on the enactor (BFS, SSSP)
//!
//! Both express one iteration as a single advance whose predicate performs
//! the atomic state update, the frontier-centric pattern from Gunrock
//! (Wang et al., `PPoPP` 2016).

pub mod bfs;
pub mod sssp;

pub use bfs::{bfs, bfs_with_context, BfsResult};
pub use sssp::{sssp, sssp_with_context, SsspResult};
