//! Level-synchronous breadth-first search on the enactor
//!
//! Every iteration advances the whole frontier one hop. A neighbor survives
//! only if this thread is the one that claims its depth, so the next frontier
//! holds each newly discovered vertex exactly once.

use crate::context::MultiContext;
use crate::enactor::{Algorithm, Enactor, EnactorProperties, Problem};
use crate::frontier::Frontier;
use crate::limits::Invalid;
use crate::operators::{advance, AdvanceConfig, AdvanceType};
use crate::storage::{GraphAccess, NodeId, VertexId};
use crate::EngineError;
use anyhow::Result;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Output of a BFS run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsResult {
    /// Hop count from the source; `u32::MAX` for unreachable vertices
    pub depths: Vec<u32>,
    /// Levels expanded
    pub iterations: usize,
    /// Enactor loop time
    pub elapsed: Duration,
}

impl BfsResult {
    /// Number of vertices reached (source included)
    #[must_use]
    pub fn reached(&self) -> usize {
        self.depths.iter().filter(|d| d.is_valid()).count()
    }

    /// Depth of `node`, `None` if unreachable or out of range
    #[must_use]
    pub fn depth(&self, node: NodeId) -> Option<u32> {
        self.depths
            .get(node.0 as usize)
            .copied()
            .filter(|d| d.is_valid())
    }
}

struct BfsProblem<'g, G> {
    graph: &'g G,
    source: VertexId,
    depths: Vec<AtomicU32>,
}

impl<G: GraphAccess> Problem for BfsProblem<'_, G> {
    type Graph = G;

    fn graph(&self) -> &G {
        self.graph
    }
}

struct Bfs<'g, G> {
    config: AdvanceConfig,
    _graph: PhantomData<&'g G>,
}

impl<'g, G: GraphAccess> Algorithm for Bfs<'g, G> {
    type Problem = BfsProblem<'g, G>;

    fn prepare_frontier(
        &mut self,
        problem: &Self::Problem,
        frontier: &mut Frontier<VertexId>,
        _context: &MultiContext,
    ) -> Result<()> {
        problem.depths[problem.source as usize].store(0, Ordering::Relaxed);
        frontier.assign(&[problem.source])?;
        Ok(())
    }

    fn loop_body(&mut self, enactor: &mut Enactor<'_, Self::Problem>, _context: &MultiContext) -> Result<()> {
        let depths = &enactor.problem().depths;
        #[allow(clippy::cast_possible_truncation)]
        let next_depth = enactor.iteration() as u32 + 1;

        advance::execute_enactor(
            enactor,
            |_source, neighbor, _edge, _weight| {
                depths[neighbor as usize]
                    .compare_exchange(u32::INVALID, next_depth, Ordering::Relaxed, Ordering::Relaxed)
                    .is_ok()
            },
            self.config,
            true,
        )?;
        Ok(())
    }
}

/// Breadth-first search from `source` on a fresh single-device context
///
/// # Errors
///
/// Returns `EngineError::VertexOutOfBounds` if `source` is not a vertex of
/// `graph`, `EngineError::UnsupportedAdvanceType` unless `config` advances
/// vertex to vertex, or any advance error
///
/// # Example
///
/// ```
/// use trueno_frontier::algorithms::bfs;
/// use trueno_frontier::operators::AdvanceConfig;
/// use trueno_frontier::{CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 1.0),
///     (NodeId(1), NodeId(2), 1.0),
///     (NodeId(0), NodeId(3), 1.0),
/// ])
/// .unwrap();
///
/// let result = bfs(&graph, NodeId(0), AdvanceConfig::default()).unwrap();
/// assert_eq!(result.depths, vec![0, 1, 2, 1]);
/// assert_eq!(result.iterations, 3);
/// ```
pub fn bfs<G: GraphAccess>(graph: &G, source: NodeId, config: AdvanceConfig) -> Result<BfsResult> {
    bfs_with_context(graph, source, Arc::new(MultiContext::single()), config)
}

/// Breadth-first search from `source` on `context`
///
/// # Errors
///
/// Same as [`bfs`], plus `EngineError::MultiContext` for multi-device contexts
pub fn bfs_with_context<G: GraphAccess>(
    graph: &G,
    source: NodeId,
    context: Arc<MultiContext>,
    config: AdvanceConfig,
) -> Result<BfsResult> {
    // Next frontier is fed back as vertices
    if config.advance_type != AdvanceType::VertexToVertex {
        return Err(EngineError::UnsupportedAdvanceType(config.advance_type).into());
    }

    let num_vertices = graph.num_vertices();
    if source.0 as usize >= num_vertices {
        return Err(EngineError::VertexOutOfBounds {
            vertex: source.0,
            num_vertices,
        }
        .into());
    }

    let problem = BfsProblem {
        graph,
        source: source.0,
        depths: (0..num_vertices).map(|_| AtomicU32::new(u32::INVALID)).collect(),
    };
    let mut algorithm = Bfs {
        config,
        _graph: PhantomData,
    };

    let mut enactor = Enactor::new(&problem, context, EnactorProperties::default())?;
    let elapsed = enactor.enact(&mut algorithm)?;
    let iterations = enactor.iteration();
    drop(enactor);

    Ok(BfsResult {
        depths: problem.depths.into_iter().map(AtomicU32::into_inner).collect(),
        iterations,
        elapsed,
    })
}
