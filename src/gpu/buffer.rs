//! Device-resident CSR topology

use super::GpuDevice;
use crate::storage::CsrGraph;

/// CSR arrays uploaded for advance kernels
///
/// Weights are not uploaded: the device kernel keeps every neighbor.
#[derive(Debug)]
pub struct GpuCsrBuffers {
    num_nodes: usize,
    num_edges: usize,

    /// `row_offsets` (`num_nodes + 1` words)
    pub row_offsets: wgpu::Buffer,

    /// `col_indices` (`num_edges` words, at least one)
    pub col_indices: wgpu::Buffer,
}

impl GpuCsrBuffers {
    /// Upload `graph`'s topology
    #[must_use]
    pub fn from_csr_graph(device: &GpuDevice, graph: &CsrGraph) -> Self {
        let (row_offsets, col_indices, _) = graph.csr_components();

        let row_offsets_buffer = device.create_buffer_init(
            "CSR row_offsets",
            bytemuck::cast_slice(row_offsets),
            wgpu::BufferUsages::STORAGE,
        );

        // Zero-sized storage bindings are invalid
        let placeholder = [u32::MAX];
        let col_indices_data = if col_indices.is_empty() {
            &placeholder[..]
        } else {
            col_indices
        };
        let col_indices_buffer = device.create_buffer_init(
            "CSR col_indices",
            bytemuck::cast_slice(col_indices_data),
            wgpu::BufferUsages::STORAGE,
        );

        Self {
            num_nodes: graph.num_nodes(),
            num_edges: col_indices.len(),
            row_offsets: row_offsets_buffer,
            col_indices: col_indices_buffer,
        }
    }

    /// Number of nodes
    #[must_use]
    pub const fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges
    #[must_use]
    pub const fn num_edges(&self) -> usize {
        self.num_edges
    }
}
