//! Thread-mapped advance
//!
//! One logical thread per input element walks that element's whole neighbor
//! list. Cheap for uniform degrees; a single hub serializes onto one worker.

use super::helpers::{self, compute_output_length, expand_edge, split_windows};
use super::AdvanceStats;
use crate::context::StandardContext;
use crate::frontier::Frontier;
use crate::limits::Invalid;
use crate::operators::AdvanceType;
use crate::storage::{EdgeId, GraphAccess, VertexId, Weight};
use crate::EngineError;
use rayon::prelude::*;

/// Run thread-mapped advance
///
/// # Errors
///
/// Returns `EngineError::VertexOutOfBounds` for an out-of-range input vertex,
/// or a capacity error if the output cannot grow
pub fn execute<G, F>(
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

    if total == 0 {
        output.set_number_of_elements(0)?;
        return Ok(AdvanceStats::empty(input.len()));
    }

    let slots = helpers::prepare_output(output, total)?;
    let segments = &segments[..input.len()];
    let windows = split_windows(slots, input.len(), |i| segments[i]);

    context.launch(|| {
        input
            .par_iter()
            .zip(windows.into_par_iter())
            .for_each(|(&v, window)| {
                if !v.is_valid() {
                    return;
                }
                let start = graph.starting_edge(v);
                for (offset, slot) in window.iter_mut().enumerate() {
                    #[allow(clippy::cast_possible_truncation)]
                    let e = start + offset as EdgeId;
                    *slot = expand_edge(graph, op, advance_type, v, e);
                }
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
