//! Advance operator
//!
//! Generates a new frontier from an input frontier by visiting the neighbors
//! of every input element. The output holds the neighbors (or traversed
//! edges), never the sources. Advance is irregular for two reasons: vertices
//! have different degrees, and vertices share neighbors.
//!
//! Based on Gunrock (Wang et al., ACM `ToPC` 2017).
//!
//! # Example
//!
//! ```
//! use trueno_frontier::operators::{advance, AdvanceConfig, LoadBalance};
//! use trueno_frontier::{CsrGraph, Frontier, FrontierKind, MultiContext, NodeId};
//!
//! let graph = CsrGraph::from_edge_list(&[
//!     (NodeId(0), NodeId(1), 1.0),
//!     (NodeId(0), NodeId(2), 1.0),
//!     (NodeId(1), NodeId(2), 1.0),
//! ])
//! .unwrap();
//!
//! let mut input = Frontier::new(FrontierKind::Vertex);
//! input.assign(&[0]).unwrap();
//! let mut output = Frontier::new(FrontierKind::Vertex);
//! let mut segments = Vec::new();
//!
//! let stats = advance::execute(
//!     &graph,
//!     |_src, _dst, _edge, _weight| true,
//!     &input,
//!     &mut output,
//!     &mut segments,
//!     &MultiContext::single(),
//!     AdvanceConfig::with_load_balance(LoadBalance::BlockMapped),
//! )
//! .unwrap();
//!
//! assert_eq!(output.as_slice(), &[1, 2]);
//! assert_eq!(stats.expanded, 2);
//! ```

pub mod block_mapped;
pub(crate) mod helpers;
pub mod merge_path;
pub mod thread_mapped;

use super::{AdvanceConfig, LoadBalance};
use crate::context::MultiContext;
use crate::enactor::{Enactor, Problem};
use crate::frontier::Frontier;
use crate::storage::{EdgeId, GraphAccess, VertexId, Weight};
use crate::EngineError;
use tracing::debug;

/// Sizes observed by one advance call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdvanceStats {
    /// Input frontier length (sentinels included)
    pub input_len: usize,
    /// Slots produced before predicate filtering (sum of degrees)
    pub expanded: usize,
    /// Surviving items written to the output frontier
    pub output_len: usize,
}

impl AdvanceStats {
    pub(crate) const fn empty(input_len: usize) -> Self {
        Self {
            input_len,
            expanded: 0,
            output_len: 0,
        }
    }
}

/// Advance `input` into `output`
///
/// `op(source, neighbor, edge, weight)` decides whether the neighbor survives.
/// It runs concurrently with no ordering guarantee between edges, so it must
/// not depend on visitation order. Self-loops never survive.
///
/// # Errors
///
/// - Unsupported strategy, advance type or direction
/// - `EngineError::MultiContext` unless `context.size() == 1`
/// - `EngineError::VertexOutOfBounds` for an input vertex outside the graph
/// - Capacity errors while growing `output`
pub fn execute<G, F>(
    graph: &G,
    op: F,
    input: &Frontier<VertexId>,
    output: &mut Frontier<VertexId>,
    segments: &mut Vec<usize>,
    context: &MultiContext,
    config: AdvanceConfig,
) -> Result<AdvanceStats, EngineError>
where
    G: GraphAccess,
    F: Fn(VertexId, VertexId, EdgeId, Weight) -> bool + Sync,
{
    let context0 = context.single_context()?;
    config.validate()?;

    let advance_type = config.advance_type;
    let stats = match config.load_balance {
        LoadBalance::BlockMapped => block_mapped::execute::<{ block_mapped::THREADS_PER_BLOCK }, _, _>(
            graph,
            &op,
            input,
            output,
            segments,
            context0,
            advance_type,
        )?,
        LoadBalance::ThreadMapped => {
            thread_mapped::execute(graph, &op, input, output, segments, context0, advance_type)?
        }
        LoadBalance::MergePath => merge_path::execute(
            graph,
            &op,
            input,
            output,
            segments,
            context0,
            advance_type,
            merge_path::ITEMS_PER_PARTITION,
        )?,
        other => return Err(EngineError::UnsupportedLoadBalance(other)),
    };

    debug!(
        load_balance = ?config.load_balance,
        input = stats.input_len,
        expanded = stats.expanded,
        output = stats.output_len,
        "advance"
    );
    Ok(stats)
}

/// Advance the enactor's input frontier into its output frontier
///
/// Uses the enactor's scratch buffer for the segment table. Unless
/// `swap_buffers` is false, the buffers are swapped afterwards so the new
/// frontier becomes the next operator's input.
///
/// # Errors
///
/// Same as [`execute`]; buffers are not swapped on error
pub fn execute_enactor<P, F>(
    enactor: &mut Enactor<'_, P>,
    op: F,
    config: AdvanceConfig,
    swap_buffers: bool,
) -> Result<AdvanceStats, EngineError>
where
    P: Problem,
    F: Fn(VertexId, VertexId, EdgeId, Weight) -> bool + Sync,
{
    let problem = enactor.problem();
    let context = enactor.context().clone();
    let (input, output, segments) = enactor.buffers_mut();

    let stats = execute(problem.graph(), op, input, output, segments, &context, config)?;

    if swap_buffers {
        enactor.swap_frontier_buffers();
    }
    Ok(stats)
}
