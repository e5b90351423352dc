//! Shared advance steps: output-size scan, output preparation, window
//! splitting and the per-edge write rule

use crate::context::StandardContext;
use crate::frontier::Frontier;
use crate::limits::Invalid;
use crate::operators::AdvanceType;
use crate::storage::{EdgeId, GraphAccess, VertexId, Weight};
use crate::EngineError;
use rayon::prelude::*;

/// Degree of a frontier item; the sentinel contributes nothing
#[inline]
fn degree_of<G: GraphAccess>(graph: &G, v: VertexId) -> Result<usize, EngineError> {
    if !v.is_valid() {
        return Ok(0);
    }
    if (v as usize) >= graph.num_vertices() {
        return Err(EngineError::VertexOutOfBounds {
            vertex: v,
            num_vertices: graph.num_vertices(),
        });
    }
    Ok(graph.degree(v) as usize)
}

/// In-place exclusive prefix sum; returns the total
pub(crate) fn exclusive_sum(values: &mut [usize]) -> usize {
    let mut running = 0;
    for value in values.iter_mut() {
        let degree = *value;
        *value = running;
        running += degree;
    }
    running
}

/// Phase 1: degrees of `input`, exclusive-scanned into `segments`
///
/// After the call `segments[i]` is the first output slot of `input[i]`.
/// The scratch buffer only grows. Returns the total number of slots.
pub(crate) fn compute_output_length<G: GraphAccess>(
    graph: &G,
    input: &[VertexId],
    segments: &mut Vec<usize>,
    context: &StandardContext,
) -> Result<usize, EngineError> {
    if segments.len() < input.len() {
        segments.resize(input.len(), 0);
    }
    let table = &mut segments[..input.len()];

    context.launch(|| {
        input
            .par_iter()
            .zip(table.par_iter_mut())
            .try_for_each(|(&v, slot)| {
                *slot = degree_of(graph, v)?;
                Ok::<(), EngineError>(())
            })
    })?;
    context.synchronize();

    Ok(exclusive_sum(table))
}

/// Grow `output` to hold `total` slots and expose them
pub(crate) fn prepare_output(
    output: &mut Frontier<VertexId>,
    total: usize,
) -> Result<&mut [VertexId], EngineError> {
    output.reserve(total)?;
    output.set_number_of_elements(total)?;
    Ok(output.as_mut_slice())
}

/// Cut `slots` into `count` consecutive windows; window `w` starts at `base(w)`
///
/// `base` must be non-decreasing with `base(0) == 0`; the last window runs to
/// the end of `slots`. Each base is read exactly once.
pub(crate) fn split_windows<T, B>(mut slots: &mut [T], count: usize, base: B) -> Vec<&mut [T]>
where
    B: Fn(usize) -> usize,
{
    let mut windows = Vec::with_capacity(count);
    let mut consumed = 0;
    for w in 0..count {
        let end = if w + 1 < count {
            base(w + 1)
        } else {
            consumed + slots.len()
        };
        let (head, tail) = std::mem::take(&mut slots).split_at_mut(end - consumed);
        windows.push(head);
        slots = tail;
        consumed = end;
    }
    windows
}

/// Item written for one traversed edge
///
/// The predicate always runs; self-loops are dropped regardless of its answer.
#[inline]
pub(crate) fn expand_edge<G, F>(
    graph: &G,
    op: &F,
    advance_type: AdvanceType,
    v: VertexId,
    e: EdgeId,
) -> VertexId
where
    G: GraphAccess,
    F: Fn(VertexId, VertexId, EdgeId, Weight) -> bool,
{
    let n = graph.destination(e);
    let w = graph.weight(e);
    let keep = op(v, n, e, w);
    if !keep || n == v {
        return VertexId::INVALID;
    }
    match advance_type {
        AdvanceType::VertexToEdge => e,
        _ => n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CsrGraph, NodeId};

    fn graph() -> CsrGraph {
        CsrGraph::from_edge_list(&[
            (NodeId(0), NodeId(1), 1.0),
            (NodeId(0), NodeId(2), 1.0),
            (NodeId(1), NodeId(2), 1.0),
            (NodeId(2), NodeId(2), 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_exclusive_sum() {
        let mut values = vec![2, 0, 3, 1];
        assert_eq!(exclusive_sum(&mut values), 6);
        assert_eq!(values, vec![0, 2, 2, 5]);
    }

    #[test]
    fn test_compute_output_length_with_sentinel() {
        let context = StandardContext::new(0);
        let mut segments = Vec::new();

        let total =
            compute_output_length(&graph(), &[0, u32::MAX, 1, 0], &mut segments, &context).unwrap();

        assert_eq!(total, 5);
        assert_eq!(&segments[..4], &[0, 2, 2, 3]);
    }

    #[test]
    fn test_compute_output_length_rejects_out_of_range() {
        let context = StandardContext::new(0);
        let mut segments = vec![0; 8];

        let err = compute_output_length(&graph(), &[0, 9], &mut segments, &context).unwrap_err();
        assert_eq!(
            err,
            EngineError::VertexOutOfBounds {
                vertex: 9,
                num_vertices: 3
            }
        );
        // Scratch never shrinks
        assert_eq!(segments.len(), 8);
    }

    #[test]
    fn test_split_windows() {
        let mut slots = [0_u32; 6];
        let bases = [0, 2, 2, 5];
        let windows = split_windows(&mut slots, 4, |w| bases[w]);

        let lengths: Vec<usize> = windows.iter().map(|w| w.len()).collect();
        assert_eq!(lengths, vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_expand_edge_drops_self_loops() {
        let g = graph();
        let always = |_: u32, _: u32, _: u32, _: f32| true;

        assert_eq!(expand_edge(&g, &always, AdvanceType::VertexToVertex, 0, 0), 1);
        assert_eq!(expand_edge(&g, &always, AdvanceType::VertexToEdge, 0, 1), 1);
        assert_eq!(expand_edge(&g, &always, AdvanceType::VertexToVertex, 2, 3), u32::MAX);

        let never = |_: u32, _: u32, _: u32, _: f32| false;
        assert_eq!(expand_edge(&g, &never, AdvanceType::VertexToVertex, 0, 0), u32::MAX);
    }
}
