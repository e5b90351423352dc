//! CSR (Compressed Sparse Row) graph representation
//!
//! Based on `GraphBLAST` (Yang et al., ACM `ToMS` 2022) for GPU-optimized sparse matrix operations.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 → 1, 0 → 2, 1 → 2
//!
//! CSR:
//!   row_offsets: [0, 2, 3, 3]  // Node 0: edges [0..2), Node 1: [2..3), Node 2: [3..3)
//!   col_indices: [1, 2, 2]      // Edge 0 → node 1, edge 1 → node 2, edge 2 → node 2
//!   edge_weights: [1.0, 1.0, 1.0]
//! ```

use super::{offsets_from_counts, validate_offsets, EdgeId, GraphAccess, VertexId, Weight};
use crate::search::upper_bound;
use crate::EngineError;

/// Node identifier (zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// CSR (Compressed Sparse Row) graph
///
/// Optimized for:
/// - O(1) access to outgoing edges
/// - Flat arrays that upload to the device unchanged
///
/// # Example
///
/// ```
/// use trueno_frontier::{CsrGraph, GraphAccess, NodeId};
///
/// let mut graph = CsrGraph::new();
/// graph.add_edge(NodeId(0), NodeId(1), 1.0).unwrap();
/// graph.add_edge(NodeId(0), NodeId(2), 1.0).unwrap();
///
/// assert_eq!(graph.degree(0), 2);
/// assert_eq!(graph.outgoing_neighbors(NodeId(0)).unwrap(), &[1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct CsrGraph {
    /// node i's edges start at `row_offsets`[i]
    /// Length: `num_nodes` + 1
    row_offsets: Vec<u32>,

    /// Column indices (edge targets)
    /// Length: `num_edges`
    col_indices: Vec<u32>,

    /// Edge weights
    /// Length: `num_edges`
    edge_weights: Vec<f32>,

    num_nodes: usize,
}

impl CsrGraph {
    /// Create new empty graph
    #[must_use]
    pub fn new() -> Self {
        Self {
            row_offsets: vec![0], // Start with single offset
            col_indices: Vec::new(),
            edge_weights: Vec::new(),
            num_nodes: 0,
        }
    }

    /// Create graph from edge list
    ///
    /// Edges keep their input order within each source row.
    ///
    /// # Arguments
    ///
    /// * `edges` - List of (source, target, weight) tuples
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is the invalid sentinel (`u32::MAX`)
    pub fn from_edge_list(edges: &[(NodeId, NodeId, f32)]) -> Result<Self, EngineError> {
        let Some(max_node) = edges.iter().flat_map(|(src, dst, _)| [src.0, dst.0]).max() else {
            return Ok(Self::new());
        };
        if max_node == u32::MAX {
            return Err(EngineError::InvalidGraph(
                "node id u32::MAX is reserved as the invalid sentinel".to_string(),
            ));
        }

        let num_nodes = (max_node + 1) as usize;

        let mut counts = vec![0_u32; num_nodes];
        for (src, _, _) in edges {
            counts[src.0 as usize] += 1;
        }
        let row_offsets = offsets_from_counts(&counts);

        // Scatter edges into their rows (stable within a row)
        let mut cursor: Vec<u32> = row_offsets[..num_nodes].to_vec();
        let mut col_indices = vec![0_u32; edges.len()];
        let mut edge_weights = vec![0.0_f32; edges.len()];
        for (src, dst, weight) in edges {
            let slot = &mut cursor[src.0 as usize];
            col_indices[*slot as usize] = dst.0;
            edge_weights[*slot as usize] = *weight;
            *slot += 1;
        }

        Ok(Self {
            row_offsets,
            col_indices,
            edge_weights,
            num_nodes,
        })
    }

    /// Create graph from raw CSR arrays
    ///
    /// # Errors
    ///
    /// Returns error if offsets are not monotonic, do not cover the edge
    /// arrays, or a column index is out of range
    pub fn from_csr_parts(
        row_offsets: Vec<u32>,
        col_indices: Vec<u32>,
        edge_weights: Vec<f32>,
    ) -> Result<Self, EngineError> {
        if col_indices.len() != edge_weights.len() {
            return Err(EngineError::InvalidGraph(format!(
                "{} column indices but {} weights",
                col_indices.len(),
                edge_weights.len()
            )));
        }
        validate_offsets(&row_offsets, col_indices.len())?;

        let num_nodes = row_offsets.len() - 1;
        if let Some(&bad) = col_indices.iter().find(|&&c| c as usize >= num_nodes) {
            return Err(EngineError::InvalidGraph(format!(
                "column index {bad} out of range for {num_nodes} nodes"
            )));
        }

        Ok(Self {
            row_offsets,
            col_indices,
            edge_weights,
            num_nodes,
        })
    }

    /// Add edge to graph (dynamic insertion)
    ///
    /// Note: For large graphs, use `from_edge_list` for better performance.
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is the invalid sentinel
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, weight: f32) -> Result<(), EngineError> {
        if src.0 == u32::MAX || dst.0 == u32::MAX {
            return Err(EngineError::InvalidGraph(
                "node id u32::MAX is reserved as the invalid sentinel".to_string(),
            ));
        }

        // Expand graph if needed
        let max_node = src.0.max(dst.0) as usize;
        if max_node >= self.num_nodes {
            self.expand_to(max_node + 1);
        }

        let src_idx = src.0 as usize;
        let end = self.row_offsets[src_idx + 1] as usize;

        self.col_indices.insert(end, dst.0);
        self.edge_weights.insert(end, weight);

        // Update row offsets for all nodes after src
        for offset in &mut self.row_offsets[src_idx + 1..] {
            *offset += 1;
        }

        Ok(())
    }

    /// Get outgoing neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn outgoing_neighbors(&self, node: NodeId) -> Result<&[u32], EngineError> {
        if (node.0 as usize) >= self.num_nodes {
            return Err(EngineError::VertexOutOfBounds {
                vertex: node.0,
                num_vertices: self.num_nodes,
            });
        }

        let idx = node.0 as usize;
        let start = self.row_offsets[idx] as usize;
        let end = self.row_offsets[idx + 1] as usize;

        Ok(&self.col_indices[start..end])
    }

    /// Get number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Expand graph to accommodate new nodes
    fn expand_to(&mut self, new_size: usize) {
        if new_size <= self.num_nodes {
            return;
        }

        // New nodes have no edges: repeat the last offset
        let last_offset = *self.row_offsets.last().unwrap_or(&0);
        self.row_offsets.resize(new_size + 1, last_offset);

        self.num_nodes = new_size;
    }

    /// Get CSR components (`row_offsets`, `col_indices`, `edge_weights`)
    #[must_use]
    pub fn csr_components(&self) -> (&[u32], &[u32], &[f32]) {
        (&self.row_offsets, &self.col_indices, &self.edge_weights)
    }
}

impl Default for CsrGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAccess for CsrGraph {
    fn num_vertices(&self) -> usize {
        self.num_nodes
    }

    fn num_edges(&self) -> usize {
        self.col_indices.len()
    }

    #[inline]
    fn degree(&self, v: VertexId) -> EdgeId {
        let idx = v as usize;
        self.row_offsets[idx + 1] - self.row_offsets[idx]
    }

    #[inline]
    fn starting_edge(&self, v: VertexId) -> EdgeId {
        self.row_offsets[v as usize]
    }

    #[inline]
    fn destination(&self, e: EdgeId) -> VertexId {
        self.col_indices[e as usize]
    }

    #[inline]
    fn weight(&self, e: EdgeId) -> Weight {
        self.edge_weights[e as usize]
    }

    fn source(&self, e: EdgeId) -> VertexId {
        // Last row whose offset is <= e; empty rows share offsets and are skipped
        #[allow(clippy::cast_possible_truncation)] // num_nodes fits in u32 by construction
        let row = (upper_bound(&self.row_offsets, e) - 1) as u32;
        row
    }
}
