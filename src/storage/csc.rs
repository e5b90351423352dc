//! CSC (Compressed Sparse Column) graph representation
//!
//! The transpose view of CSR: each vertex owns the edges that point *into* it.
//! Through [`GraphAccess`], `degree(v)` is the in-degree, `destination(e)` is
//! the in-neighbor stored at `e`, and `source(e)` is the vertex (column) that
//! owns `e`. Advancing over a `CscGraph` therefore walks edges backwards.
//!
//! ```text
//! Graph: 0 → 1, 0 → 2, 1 → 2
//!
//! CSC:
//!   col_offsets: [0, 0, 1, 3]  // Node 0: no in-edges, Node 1: [0..1), Node 2: [1..3)
//!   row_indices: [0, 0, 1]
//! ```

use super::{offsets_from_counts, validate_offsets, EdgeId, GraphAccess, NodeId, VertexId, Weight};
use crate::search::upper_bound;
use crate::EngineError;

/// CSC graph (incoming adjacency)
#[derive(Debug, Clone)]
pub struct CscGraph {
    /// node i's incoming edges start at `col_offsets`[i]
    /// Length: `num_nodes` + 1
    col_offsets: Vec<u32>,

    /// Row indices (edge sources in the original direction)
    row_indices: Vec<u32>,

    values: Vec<f32>,

    num_nodes: usize,
}

impl CscGraph {
    /// Create graph from a directed edge list (source, target, weight)
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is the invalid sentinel
    pub fn from_edge_list(edges: &[(NodeId, NodeId, f32)]) -> Result<Self, EngineError> {
        let Some(max_node) = edges.iter().flat_map(|(src, dst, _)| [src.0, dst.0]).max() else {
            return Ok(Self {
                col_offsets: vec![0],
                row_indices: Vec::new(),
                values: Vec::new(),
                num_nodes: 0,
            });
        };
        if max_node == u32::MAX {
            return Err(EngineError::InvalidGraph(
                "node id u32::MAX is reserved as the invalid sentinel".to_string(),
            ));
        }

        let num_nodes = (max_node + 1) as usize;

        let mut counts = vec![0_u32; num_nodes];
        for (_, dst, _) in edges {
            counts[dst.0 as usize] += 1;
        }
        let col_offsets = offsets_from_counts(&counts);

        let mut cursor: Vec<u32> = col_offsets[..num_nodes].to_vec();
        let mut row_indices = vec![0_u32; edges.len()];
        let mut values = vec![0.0_f32; edges.len()];
        for (src, dst, weight) in edges {
            let slot = &mut cursor[dst.0 as usize];
            row_indices[*slot as usize] = src.0;
            values[*slot as usize] = *weight;
            *slot += 1;
        }

        Ok(Self {
            col_offsets,
            row_indices,
            values,
            num_nodes,
        })
    }

    /// Create graph from raw CSC arrays
    ///
    /// # Errors
    ///
    /// Returns error if the arrays are inconsistent
    pub fn from_csc_parts(
        col_offsets: Vec<u32>,
        row_indices: Vec<u32>,
        values: Vec<f32>,
    ) -> Result<Self, EngineError> {
        if row_indices.len() != values.len() {
            return Err(EngineError::InvalidGraph(format!(
                "{} row indices but {} values",
                row_indices.len(),
                values.len()
            )));
        }
        validate_offsets(&col_offsets, row_indices.len())?;

        let num_nodes = col_offsets.len() - 1;
        if let Some(&bad) = row_indices.iter().find(|&&r| r as usize >= num_nodes) {
            return Err(EngineError::InvalidGraph(format!(
                "row index {bad} out of range for {num_nodes} nodes"
            )));
        }

        Ok(Self {
            col_offsets,
            row_indices,
            values,
            num_nodes,
        })
    }

    /// Get incoming neighbors of a node
    ///
    /// # Errors
    ///
    /// Returns error if node ID is out of bounds
    pub fn incoming_neighbors(&self, node: NodeId) -> Result<&[u32], EngineError> {
        if (node.0 as usize) >= self.num_nodes {
            return Err(EngineError::VertexOutOfBounds {
                vertex: node.0,
                num_vertices: self.num_nodes,
            });
        }
        let idx = node.0 as usize;
        let start = self.col_offsets[idx] as usize;
        let end = self.col_offsets[idx + 1] as usize;
        Ok(&self.row_indices[start..end])
    }

    /// Get CSC components (`col_offsets`, `row_indices`, `values`)
    #[must_use]
    pub fn csc_components(&self) -> (&[u32], &[u32], &[f32]) {
        (&self.col_offsets, &self.row_indices, &self.values)
    }
}

impl GraphAccess for CscGraph {
    fn num_vertices(&self) -> usize {
        self.num_nodes
    }

    fn num_edges(&self) -> usize {
        self.row_indices.len()
    }

    #[inline]
    fn degree(&self, v: VertexId) -> EdgeId {
        let idx = v as usize;
        self.col_offsets[idx + 1] - self.col_offsets[idx]
    }

    #[inline]
    fn starting_edge(&self, v: VertexId) -> EdgeId {
        self.col_offsets[v as usize]
    }

    #[inline]
    fn destination(&self, e: EdgeId) -> VertexId {
        self.row_indices[e as usize]
    }

    #[inline]
    fn weight(&self, e: EdgeId) -> Weight {
        self.values[e as usize]
    }

    /// Column whose range `[col_offsets[v], col_offsets[v + 1])` contains `e`
    ///
    /// Upper bound minus one: the last column with offset `<= e`. A lower
    /// bound would land on the first of several empty columns sharing the
    /// offset, which owns no edges.
    fn source(&self, e: EdgeId) -> VertexId {
        #[allow(clippy::cast_possible_truncation)]
        let column = (upper_bound(&self.col_offsets, e) - 1) as u32;
        column
    }
}
