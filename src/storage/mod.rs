//! Graph storage layer
//!
//! Read-only neighbor-access contract consumed by the operators, plus CSR,
//! CSC and COO accessors that satisfy it.

pub mod coo;
pub mod csc;
pub mod csr;

pub use coo::CooGraph;
pub use csc::CscGraph;
pub use csr::{CsrGraph, NodeId};

/// Vertex identifier as stored in frontiers and adjacency arrays
pub type VertexId = u32;

/// Edge identifier (position in the adjacency arrays)
pub type EdgeId = u32;

/// Edge weight
pub type Weight = f32;

/// Read-only neighbor access
///
/// Every lookup is O(1) (O(log n) for `source` and `find_edge`), performs no
/// allocation and is safe to call from many worker threads at once.
/// Callers pass only in-range ids; operators check frontier contents before
/// calling in.
pub trait GraphAccess: Sync {
    /// Number of vertices
    fn num_vertices(&self) -> usize;

    /// Number of edges
    fn num_edges(&self) -> usize;

    /// Number of neighbors of `v`
    fn degree(&self, v: VertexId) -> EdgeId;

    /// Id of the first edge of `v`; its edges are `starting_edge(v)..starting_edge(v) + degree(v)`
    fn starting_edge(&self, v: VertexId) -> EdgeId;

    /// Neighbor at the far end of `e`
    fn destination(&self, e: EdgeId) -> VertexId;

    /// Weight of `e`
    fn weight(&self, e: EdgeId) -> Weight;

    /// Vertex that owns `e`
    fn source(&self, e: EdgeId) -> VertexId;

    /// First edge from `source` to `destination`, if any
    fn find_edge(&self, source: VertexId, destination: VertexId) -> Option<EdgeId> {
        if (source as usize) >= self.num_vertices() {
            return None;
        }
        let start = self.starting_edge(source);
        (start..start + self.degree(source)).find(|&e| self.destination(e) == destination)
    }
}

/// Build exclusive offsets from per-vertex counts (`counts.len() + 1` entries)
pub(crate) fn offsets_from_counts(counts: &[u32]) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(counts.len() + 1);
    let mut offset = 0_u32;
    offsets.push(offset);
    for &count in counts {
        offset += count;
        offsets.push(offset);
    }
    offsets
}

/// Validate an offsets array against an edge count
pub(crate) fn validate_offsets(offsets: &[u32], num_edges: usize) -> Result<(), crate::EngineError> {
    use crate::EngineError;

    if offsets.is_empty() {
        return Err(EngineError::InvalidGraph(
            "offsets must contain at least one entry".to_string(),
        ));
    }
    if offsets[0] != 0 {
        return Err(EngineError::InvalidGraph(format!(
            "offsets must start at 0, found {}",
            offsets[0]
        )));
    }
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(EngineError::InvalidGraph(
            "offsets must be monotonically non-decreasing".to_string(),
        ));
    }
    let last = offsets[offsets.len() - 1] as usize;
    if last != num_edges {
        return Err(EngineError::InvalidGraph(format!(
            "last offset {last} does not match edge count {num_edges}"
        )));
    }
    Ok(())
}
