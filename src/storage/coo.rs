//! COO (Coordinate) graph representation
//!
//! Triplets `(row, column, value)` sorted by row at construction. An auxiliary
//! row-offset index is built alongside so the neighbor-access contract stays
//! O(1) for `degree` and `starting_edge`, and `source(e)` is a direct lookup.

use super::{offsets_from_counts, EdgeId, GraphAccess, NodeId, VertexId, Weight};
use crate::EngineError;

/// COO graph with a row-offset index
#[derive(Debug, Clone)]
pub struct CooGraph {
    row_indices: Vec<u32>,
    column_indices: Vec<u32>,
    values: Vec<f32>,

    /// Auxiliary index: row i's triplets are `row_offsets[i]..row_offsets[i + 1]`
    row_offsets: Vec<u32>,

    num_nodes: usize,
}

impl CooGraph {
    /// Create graph from an edge list
    ///
    /// # Errors
    ///
    /// Returns error if an endpoint is the invalid sentinel
    pub fn from_edge_list(edges: &[(NodeId, NodeId, f32)]) -> Result<Self, EngineError> {
        let num_nodes = match edges.iter().flat_map(|(src, dst, _)| [src.0, dst.0]).max() {
            None => 0,
            Some(u32::MAX) => {
                return Err(EngineError::InvalidGraph(
                    "node id u32::MAX is reserved as the invalid sentinel".to_string(),
                ))
            }
            Some(max_node) => (max_node + 1) as usize,
        };
        let triplets: Vec<(u32, u32, f32)> = edges.iter().map(|(s, d, w)| (s.0, d.0, *w)).collect();
        Ok(Self::build(num_nodes, triplets))
    }

    /// Create graph from raw triplet arrays
    ///
    /// Triplets need not be sorted; they are stably sorted by row.
    ///
    /// # Errors
    ///
    /// Returns error if the arrays differ in length or an index is out of range
    pub fn from_coo_parts(
        num_nodes: usize,
        row_indices: &[u32],
        column_indices: &[u32],
        values: &[f32],
    ) -> Result<Self, EngineError> {
        if row_indices.len() != column_indices.len() || row_indices.len() != values.len() {
            return Err(EngineError::InvalidGraph(format!(
                "triplet arrays differ in length: {} rows, {} columns, {} values",
                row_indices.len(),
                column_indices.len(),
                values.len()
            )));
        }
        if let Some(&bad) = row_indices
            .iter()
            .chain(column_indices)
            .find(|&&i| i as usize >= num_nodes)
        {
            return Err(EngineError::InvalidGraph(format!(
                "index {bad} out of range for {num_nodes} nodes"
            )));
        }

        let triplets = row_indices
            .iter()
            .zip(column_indices)
            .zip(values)
            .map(|((&r, &c), &v)| (r, c, v))
            .collect();
        Ok(Self::build(num_nodes, triplets))
    }

    fn build(num_nodes: usize, mut triplets: Vec<(u32, u32, f32)>) -> Self {
        triplets.sort_by_key(|&(row, _, _)| row);

        let mut counts = vec![0_u32; num_nodes];
        for &(row, _, _) in &triplets {
            counts[row as usize] += 1;
        }

        let mut row_indices = Vec::with_capacity(triplets.len());
        let mut column_indices = Vec::with_capacity(triplets.len());
        let mut values = Vec::with_capacity(triplets.len());
        for (row, column, value) in triplets {
            row_indices.push(row);
            column_indices.push(column);
            values.push(value);
        }

        Self {
            row_indices,
            column_indices,
            values,
            row_offsets: offsets_from_counts(&counts),
            num_nodes,
        }
    }

    /// Get COO components (`row_indices`, `column_indices`, `values`)
    #[must_use]
    pub fn coo_components(&self) -> (&[u32], &[u32], &[f32]) {
        (&self.row_indices, &self.column_indices, &self.values)
    }
}

impl GraphAccess for CooGraph {
    fn num_vertices(&self) -> usize {
        self.num_nodes
    }

    fn num_edges(&self) -> usize {
        self.row_indices.len()
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
        self.column_indices[e as usize]
    }

    #[inline]
    fn weight(&self, e: EdgeId) -> Weight {
        self.values[e as usize]
    }

    #[inline]
    fn source(&self, e: EdgeId) -> VertexId {
        self.row_indices[e as usize]
    }

    fn find_edge(&self, source: VertexId, destination: VertexId) -> Option<EdgeId> {
        if (source as usize) >= self.num_nodes {
            return None;
        }
        let start = self.row_offsets[source as usize] as usize;
        let end = self.row_offsets[source as usize + 1] as usize;
        self.column_indices[start..end]
            .iter()
            .position(|&c| c == destination)
            .map(|offset| {
                #[allow(clippy::cast_possible_truncation)]
                let e = (start + offset) as EdgeId;
                e
            })
    }
}
