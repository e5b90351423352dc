//! Merge-path advance
//!
//! Based on Merrill & Garland (SC 2016). The expansion is viewed as merging
//! the list of input elements with the list of output slots; cutting that
//! merge into equal-length partitions gives every worker the same amount of
//! (elements + edges), however the degrees are distributed.

use super::helpers::{self, compute_output_length, expand_edge, split_windows};
use super::AdvanceStats;
use crate::context::StandardContext;
use crate::frontier::Frontier;
use crate::operators::AdvanceType;
use crate::search::merge_path;
use crate::storage::{EdgeId, GraphAccess, VertexId, Weight};
use crate::EngineError;
use rayon::prelude::*;

/// Merge items (elements + slots) handled per partition: 128 threads × 8 items
pub const ITEMS_PER_PARTITION: usize = 128 * 8;

/// Run merge-path advance with `items_per_partition` merge items per partition
///
/// # Errors
///
/// Returns `EngineError::VertexOutOfBounds` for an out-of-range input vertex,
/// or a capacity error if the output cannot grow
#[allow(clippy::too_many_arguments)]
pub fn execute<G, F>(
    graph: &G,
    op: &F,
    input: &Frontier<VertexId>,
    output: &mut Frontier<VertexId>,
    segments: &mut Vec<usize>,
    context: &StandardContext,
    advance_type: AdvanceType,
    items_per_partition: usize,
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

    let num_rows = input.len();
    let segments = &segments[..num_rows];
    let row_end = |x: usize| {
        if x + 1 < num_rows {
            segments[x + 1]
        } else {
            total
        }
    };

    let work = num_rows + total;
    let per_partition = items_per_partition.max(1);
    let partitions = work.div_ceil(per_partition);

    // Merge coordinates (row, slot) where each partition starts; last entry is the end
    let starts: Vec<(usize, usize)> = (0..=partitions)
        .into_par_iter()
        .map(|p| {
            let diagonal = (p * per_partition).min(work);
            let x = merge_path(diagonal, num_rows, total, row_end);
            (x, diagonal - x)
        })
        .collect();

    let slots = helpers::prepare_output(output, total)?;
    let windows = split_windows(slots, partitions, |p| starts[p].1);

    context.launch(|| {
        windows
            .into_par_iter()
            .enumerate()
            .for_each(|(p, window)| {
                let (mut x, mut y) = starts[p];
                let (x_end, y_end) = starts[p + 1];
                let first_slot = y;

                while x < x_end || y < y_end {
                    if y < y_end && y < row_end(x) {
                        // Slot y belongs to input[x]; sentinels have empty rows
                        let v = input[x];
                        #[allow(clippy::cast_possible_truncation)]
                        let e = graph.starting_edge(v) + (y - segments[x]) as EdgeId;
                        window[y - first_slot] = expand_edge(graph, op, advance_type, v, e);
                        y += 1;
                    } else {
                        x += 1;
                    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::FrontierKind;
    use crate::storage::{CsrGraph, NodeId};

    #[test]
    fn test_partitions_split_inside_a_row() {
        // Vertex 0 has 6 neighbors, vertex 7 has one
        let mut edges: Vec<_> = (1..=6).map(|i| (NodeId(0), NodeId(i), 1.0)).collect();
        edges.push((NodeId(7), NodeId(3), 1.0));
        let graph = CsrGraph::from_edge_list(&edges).unwrap();

        let mut input = Frontier::new(FrontierKind::Vertex);
        input.assign(&[7, u32::MAX, 0]).unwrap();
        let mut output = Frontier::new(FrontierKind::Vertex);
        let mut segments = Vec::new();
        let context = StandardContext::new(0);

        // 3 rows + 7 slots over partitions of 3 items
        let stats = execute(
            &graph,
            &|_: u32, _: u32, _: u32, _: f32| true,
            &input,
            &mut output,
            &mut segments,
            &context,
            AdvanceType::VertexToVertex,
            3,
        )
        .unwrap();

        assert_eq!(output.as_slice(), &[3, 1, 2, 3, 4, 5, 6]);
        assert_eq!(stats.expanded, 7);
    }
}
