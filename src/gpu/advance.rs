//! Block-mapped advance on the device
//!
//! Phase 1 (degree scan) runs on the host with the shared helper; phase 2 is
//! `shaders/block_mapped.wgsl`, one workgroup per 128 input elements. The
//! kernel keeps every neighbor except self-loops.

use super::{GpuCsrBuffers, GpuDevice, GpuDeviceError};
use crate::context::StandardContext;
use crate::frontier::Frontier;
use crate::operators::advance::helpers::{compute_output_length, prepare_output};
use crate::operators::{AdvanceStats, THREADS_PER_BLOCK};
use crate::storage::{CsrGraph, GraphAccess, VertexId};
use anyhow::{ensure, Context, Result};
use tracing::debug;

/// Uniform block for the advance shader
#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct AdvanceParams {
    input_len: u32,
    total: u32,
    num_vertices: u32,
    _padding: u32,
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Keep-all vertex-to-vertex advance of `input` into `output` on the device
///
/// The device kernel takes no predicate and always writes neighbor ids;
/// only self-loops are dropped. Filtering and edge-id output need the host
/// `advance::execute`.
///
/// `graph` must be the graph `buffers` was uploaded from. `segments` and
/// `context` serve the host-side degree scan.
///
/// # Errors
///
/// - `EngineError::VertexOutOfBounds` for an out-of-range input vertex
/// - `GpuDeviceError::DispatchTooLarge` if the input needs more workgroups
///   than the device allows
/// - Readback failures
///
/// # Example
///
/// ```ignore
/// # use trueno_frontier::gpu::{gpu_advance_block_mapped, GpuCsrBuffers, GpuDevice};
/// # use trueno_frontier::{CsrGraph, Frontier, FrontierKind, NodeId, StandardContext};
/// let device = GpuDevice::new().await?;
/// let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 1.0)])?;
/// let buffers = GpuCsrBuffers::from_csr_graph(&device, &graph);
///
/// let mut input = Frontier::new(FrontierKind::Vertex);
/// input.assign(&[0])?;
/// let mut output = Frontier::new(FrontierKind::Vertex);
/// let stats = gpu_advance_block_mapped(
///     &device, &graph, &buffers, &input, &mut output, &mut Vec::new(), &StandardContext::new(0),
/// )
/// .await?;
/// assert_eq!(output.as_slice(), &[1]);
/// ```
#[allow(clippy::too_many_lines)]
#[allow(clippy::cast_possible_truncation)]
pub async fn gpu_advance_block_mapped(
    device: &GpuDevice,
    graph: &CsrGraph,
    buffers: &GpuCsrBuffers,
    input: &Frontier<VertexId>,
    output: &mut Frontier<VertexId>,
    segments: &mut Vec<usize>,
    context: &StandardContext,
) -> Result<AdvanceStats> {
    const SHADER: &str = include_str!("shaders/block_mapped.wgsl");

    ensure!(
        buffers.num_nodes() == graph.num_nodes() && buffers.num_edges() == graph.num_edges(),
        "GPU buffers do not match the host graph"
    );

    let input = input.as_slice();
    let total = compute_output_length(graph, input, segments, context)?;
    if total == 0 {
        output.set_number_of_elements(0)?;
        return Ok(AdvanceStats {
            input_len: input.len(),
            expanded: 0,
            output_len: 0,
        });
    }
    ensure!(
        u32::try_from(total).is_ok(),
        "Advance of {total} slots does not fit 32-bit device offsets"
    );

    let num_blocks = input.len().div_ceil(THREADS_PER_BLOCK) as u64;
    let limit = device.max_workgroups_per_dimension();
    if num_blocks > u64::from(limit) {
        return Err(GpuDeviceError::DispatchTooLarge {
            requested: num_blocks,
            limit,
        }
        .into());
    }

    let shader_module = device
        .device()
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Block-Mapped Advance Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });

    let bind_group_layout =
        device
            .device()
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Advance Bind Group Layout"),
                entries: &[
                    // @binding(0): uniform params
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::COMPUTE,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    storage_entry(1, true),  // row_offsets
                    storage_entry(2, true),  // col_indices
                    storage_entry(3, true),  // input frontier
                    storage_entry(4, true),  // segments
                    storage_entry(5, false), // output slots
                ],
            });

    let pipeline_layout = device
        .device()
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Advance Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

    let compute_pipeline =
        device
            .device()
            .create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some("Block-Mapped Advance Pipeline"),
                layout: Some(&pipeline_layout),
                module: &shader_module,
                entry_point: "block_mapped_advance",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache: None,
            });

    let params_buffer = device.create_buffer_init(
        "Advance Params",
        bytemuck::bytes_of(&AdvanceParams {
            input_len: input.len() as u32,
            total: total as u32,
            num_vertices: graph.num_nodes() as u32,
            _padding: 0,
        }),
        wgpu::BufferUsages::UNIFORM,
    );

    let input_buffer = device.create_buffer_init(
        "Advance Input",
        bytemuck::cast_slice(input),
        wgpu::BufferUsages::STORAGE,
    );

    let device_segments: Vec<u32> = segments[..input.len()].iter().map(|&s| s as u32).collect();
    let segments_buffer = device.create_buffer_init(
        "Advance Segments",
        bytemuck::cast_slice(&device_segments),
        wgpu::BufferUsages::STORAGE,
    );

    let output_buffer = device.create_buffer(
        "Advance Output",
        (total * std::mem::size_of::<u32>()) as u64,
        wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
    );

    let bind_group = device
        .device()
        .create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Advance Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.row_offsets.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.col_indices.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: input_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: segments_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: output_buffer.as_entire_binding(),
                },
            ],
        });

    let mut encoder = device
        .device()
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Advance Command Encoder"),
        });
    {
        let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Advance Compute Pass"),
            timestamp_writes: None,
        });
        compute_pass.set_pipeline(&compute_pipeline);
        compute_pass.set_bind_group(0, &bind_group, &[]);
        compute_pass.dispatch_workgroups(num_blocks as u32, 1, 1);
    }
    device.queue().submit(Some(encoder.finish()));
    device.device().poll(wgpu::Maintain::Wait);

    let slots = device
        .read_u32s(&output_buffer, total)
        .await
        .context("Failed to read advance output")?;

    prepare_output(output, total)?.copy_from_slice(&slots);
    let kept = output.compact();

    debug!(
        input = input.len(),
        expanded = total,
        output = kept,
        blocks = num_blocks,
        "gpu advance"
    );

    Ok(AdvanceStats {
        input_len: input.len(),
        expanded: total,
        output_len: kept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::FrontierKind;
    use crate::operators::{advance, AdvanceConfig, LoadBalance};
    use crate::{MultiContext, NodeId};

    async fn run(graph: &CsrGraph, items: &[u32]) -> Option<Vec<u32>> {
        if !GpuDevice::is_gpu_available().await {
            return None;
        }
        let device = GpuDevice::new().await.unwrap();
        let buffers = GpuCsrBuffers::from_csr_graph(&device, graph);

        let mut input = Frontier::new(FrontierKind::Vertex);
        input.assign(items).unwrap();
        let mut output = Frontier::new(FrontierKind::Vertex);

        gpu_advance_block_mapped(
            &device,
            graph,
            &buffers,
            &input,
            &mut output,
            &mut Vec::new(),
            &StandardContext::new(0),
        )
        .await
        .unwrap();
        Some(output.as_slice().to_vec())
    }

    #[tokio::test]
    async fn test_gpu_advance_triangle() {
        let graph = CsrGraph::from_edge_list(&[
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 1.0),
            (NodeId(1), NodeId(2), 1.0),
        ])
        .unwrap();

        let Some(output) = run(&graph, &[0, 1]).await else {
            eprintln!("⚠️  Skipping test_gpu_advance_triangle: GPU not available");
            return;
        };
        assert_eq!(output, vec![1, 2, 2]);
    }

    #[tokio::test]
    async fn test_gpu_advance_writes_neighbors_and_drops_self_loops() {
        // Edge ids: 0→0 is 0, 0→1 is 1, 1→0 is 2
        let graph = CsrGraph::from_edge_list(&[
            (NodeId(0), NodeId(0), 1.0),
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(1), NodeId(0), 1.0),
        ])
        .unwrap();

        let Some(output) = run(&graph, &[1, 0]).await else {
            eprintln!("⚠️  Skipping test_gpu_advance_writes_neighbors_and_drops_self_loops: GPU not available");
            return;
        };
        assert_eq!(output, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_gpu_advance_matches_cpu() {
        // Hub of degree 300 spans several workgroups' worth of slots
        let mut edges: Vec<_> = (1..=300).map(|i| (NodeId(0), NodeId(i), 1.0)).collect();
        edges.extend((1..300).map(|i| (NodeId(i), NodeId(i + 1), 1.0)));
        edges.push((NodeId(5), NodeId(5), 1.0));
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let items: Vec<u32> = (0..200).chain([u32::MAX, 0, 5]).collect();
        let Some(gpu_output) = run(&graph, &items).await else {
            eprintln!("⚠️  Skipping test_gpu_advance_matches_cpu: GPU not available");
            return;
        };

        let mut input = Frontier::new(FrontierKind::Vertex);
        input.assign(&items).unwrap();
        let mut cpu_output = Frontier::new(FrontierKind::Vertex);
        advance::execute(
            &graph,
            |_, _, _, _| true,
            &input,
            &mut cpu_output,
            &mut Vec::new(),
            &MultiContext::single(),
            AdvanceConfig::with_load_balance(LoadBalance::BlockMapped),
        )
        .unwrap();

        assert_eq!(gpu_output, cpu_output.as_slice());
    }
}
