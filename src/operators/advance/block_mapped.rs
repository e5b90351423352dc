//! Block-mapped advance
//!
//! Each cooperative block takes `THREADS` consecutive input elements and
//! shares their combined neighbor lists among all of its threads, so a single
//! high-degree vertex is expanded by the whole block instead of one thread.
//!
//! # Algorithm
//!
//! ```text
//! phase 1 (global)  degrees → exclusive scan → segments, total
//! phase 2 (block b) a. load v, degree(v), starting_edge(v)   into shared
//!                   b. block exclusive sum over degrees       → local offsets, aggregate
//!                   c. global base = segments[b * THREADS]    (once per block)
//!                   d. for i in (tid..aggregate).step_by(THREADS):
//!                        id = rightmost(local offsets, i)     → owning element
//!                   e.   e = starting_edge + (i - offset[id]); write neighbor or sentinel
//! ```
//!
//! Blocks write disjoint windows of the output derived from the segment
//! table, so no synchronization is needed between blocks. Output is
//! reproducible for a fixed input order and predicate.

use super::helpers::{self, compute_output_length, exclusive_sum, expand_edge, split_windows};
use super::AdvanceStats;
use crate::context::{LaunchConfig, StandardContext};
use crate::frontier::Frontier;
use crate::limits::Invalid;
use crate::operators::AdvanceType;
use crate::search::rightmost;
use crate::storage::{EdgeId, GraphAccess, VertexId, Weight};
use crate::EngineError;
use rayon::prelude::*;

/// Threads per block used by the advance dispatcher
pub const THREADS_PER_BLOCK: usize = 128;

/// Run block-mapped advance with `THREADS` threads per block
///
/// # Errors
///
/// Returns `EngineError::VertexOutOfBounds` for an out-of-range input vertex,
/// or a capacity error if the output cannot grow
pub fn execute<const THREADS: usize, G, F>(
    graph: &G,
    op: &F,
    input: &Frontier<VertexId>,
    output: &mut Frontier<VertexId>,
    segments: &mut Vec<usize>,
    context: &StandardContext,
    advance_type: AdvanceType,
) -> Result<AdvanceStats, EngineError>
where
    G: GraphAccess,
    F: Fn(VertexId, VertexId, EdgeId, Weight) -> bool + Sync,
{
    let input = input.as_slice();
    let total = compute_output_length(graph, input, segments, context)?;

    // Nothing to expand: skip the launch entirely
    if total == 0 {
        output.set_number_of_elements(0)?;
        return Ok(AdvanceStats::empty(input.len()));
    }

    let slots = helpers::prepare_output(output, total)?;
    let segments = &segments[..input.len()];
    let launch = LaunchConfig::for_items(input.len(), THREADS);

    // Block b's window starts at its global base offset
    let windows = split_windows(slots, launch.grid_dim, |block| segments[block * THREADS]);

    context.launch(|| {
        windows
            .into_par_iter()
            .enumerate()
            .for_each(|(block, window)| {
                block_mapped_kernel::<THREADS, _, _>(graph, op, input, block, window, advance_type);
            });
    });
    context.synchronize();

    let kept = output.compact();
    Ok(AdvanceStats {
        input_len: input.len(),
        expanded: total,
        output_len: kept,
    })
}

/// One cooperative block; `window` is `output[global_base..global_base + aggregate]`
fn block_mapped_kernel<const THREADS: usize, G, F>(
    graph: &G,
    op: &F,
    input: &[VertexId],
    block: usize,
    window: &mut [VertexId],
    advance_type: AdvanceType,
) where
    G: GraphAccess,
    F: Fn(VertexId, VertexId, EdgeId, Weight) -> bool,
{
    let block_start = block * THREADS;

    // Shared memory
    let mut vertices = [VertexId::INVALID; THREADS];
    let mut degrees = [0_usize; THREADS];
    let mut sedges: [EdgeId; THREADS] = [0; THREADS];

    // a. One element per thread; threads past the input end hold the sentinel
    for thread in 0..THREADS {
        if let Some(&v) = input.get(block_start + thread) {
            vertices[thread] = v;
            if v.is_valid() {
                sedges[thread] = graph.starting_edge(v);
                degrees[thread] = graph.degree(v) as usize;
            }
        }
    }
    // All threads loaded before the scan reads the shared arrays

    // b. Block-wide exclusive sum of degrees
    let aggregate = exclusive_sum(&mut degrees);
    // Offsets final before any thread searches them

    debug_assert_eq!(aggregate, window.len());

    // Elements of this block that exist in the input
    let length = (input.len() - block_start).min(THREADS);
    let offsets = &degrees[..length];

    // d./e. Every thread strides over the block's whole workload
    for thread in 0..THREADS {
        let mut i = thread;
        while i < aggregate {
            let id = rightmost(offsets, i);
            window[i] = if id < length && vertices[id].is_valid() {
                let v = vertices[id];
                #[allow(clippy::cast_possible_truncation)] // bounded by degree(v)
                let e = sedges[id] + (i - offsets[id]) as EdgeId;
                expand_edge(graph, op, advance_type, v, e)
            } else {
                VertexId::INVALID
            };
            i += THREADS;
        }
    }
}
