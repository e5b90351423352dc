//! Single-source shortest paths by frontier relaxation
//!
//! Bellman-Ford style: each iteration relaxes the out-edges of every vertex
//! whose distance improved in the previous iteration. Distances are `f32`
//! bit patterns in `AtomicU32` cells updated with a compare-exchange min.

use crate::context::MultiContext;
use crate::enactor::{Algorithm, Enactor, EnactorProperties, Problem};
use crate::frontier::Frontier;
use crate::operators::{advance, AdvanceConfig, AdvanceType};
use crate::storage::{GraphAccess, NodeId, VertexId};
use crate::EngineError;
use anyhow::{bail, Result};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Output of an SSSP run
#[derive(Debug, Clone, PartialEq)]
pub struct SsspResult {
    /// Distance from the source; `f32::INFINITY` for unreachable vertices
    pub distances: Vec<f32>,
    /// Relaxation rounds
    pub iterations: usize,
    /// Enactor loop time
    pub elapsed: Duration,
}

impl SsspResult {
    /// Distance to `node`, `None` if unreachable or out of range
    #[must_use]
    pub fn distance(&self, node: NodeId) -> Option<f32> {
        self.distances
            .get(node.0 as usize)
            .copied()
            .filter(|d| d.is_finite())
    }
}

/// Lower `cell` to `value` if smaller; returns the previous distance
fn atomic_min(cell: &AtomicU32, value: f32) -> f32 {
    let mut current = cell.load(Ordering::Relaxed);
    loop {
        let old = f32::from_bits(current);
        if old <= value {
            return old;
        }
        match cell.compare_exchange_weak(current, value.to_bits(), Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return old,
            Err(actual) => current = actual,
        }
    }
}

struct SsspProblem<'g, G> {
    graph: &'g G,
    source: VertexId,
    distances: Vec<AtomicU32>,
    negative_self_loop: AtomicBool,
}

impl<G: GraphAccess> Problem for SsspProblem<'_, G> {
    type Graph = G;

    fn graph(&self) -> &G {
        self.graph
    }
}

impl<G> SsspProblem<'_, G> {
    fn distance(&self, v: VertexId) -> f32 {
        f32::from_bits(self.distances[v as usize].load(Ordering::Relaxed))
    }
}

struct Sssp<'g, G> {
    config: AdvanceConfig,
    max_iterations: usize,
    _graph: PhantomData<&'g G>,
}

impl<'g, G: GraphAccess> Algorithm for Sssp<'g, G> {
    type Problem = SsspProblem<'g, G>;

    fn prepare_frontier(
        &mut self,
        problem: &Self::Problem,
        frontier: &mut Frontier<VertexId>,
        _context: &MultiContext,
    ) -> Result<()> {
        problem.distances[problem.source as usize].store(0.0_f32.to_bits(), Ordering::Relaxed);
        frontier.assign(&[problem.source])?;
        Ok(())
    }

    fn loop_body(&mut self, enactor: &mut Enactor<'_, Self::Problem>, _context: &MultiContext) -> Result<()> {
        let problem = enactor.problem();

        advance::execute_enactor(
            enactor,
            |source, neighbor, _edge, weight| {
                // Self-loops never re-enter the frontier, so they must not relax
                if source == neighbor {
                    if weight < 0.0 {
                        problem.negative_self_loop.store(true, Ordering::Relaxed);
                    }
                    return false;
                }
                let candidate = problem.distance(source) + weight;
                candidate < atomic_min(&problem.distances[neighbor as usize], candidate)
            },
            self.config,
            true,
        )?;
        Ok(())
    }

    fn is_converged(&self, enactor: &Enactor<'_, Self::Problem>, _context: &MultiContext) -> bool {
        enactor.input_frontier().is_empty() || enactor.iteration() >= self.max_iterations
    }

    fn finalize(&mut self, enactor: &mut Enactor<'_, Self::Problem>, _context: &MultiContext) -> Result<()> {
        if enactor.problem().negative_self_loop.load(Ordering::Relaxed) {
            bail!("Reachable self-loop with negative weight (negative cycle)");
        }
        if !enactor.input_frontier().is_empty() {
            warn!(
                iterations = enactor.iteration(),
                pending = enactor.input_frontier().len(),
                "sssp stopped with pending relaxations"
            );
            bail!(
                "Distances still changing after {} iterations (negative cycle?)",
                enactor.iteration()
            );
        }
        Ok(())
    }
}

/// Shortest distances from `source` on a fresh single-device context
///
/// Weights are edge lengths. Relaxation stops after `num_vertices`
/// rounds; a frontier still active at that point means a negative cycle.
///
/// # Errors
///
/// - `EngineError::VertexOutOfBounds` if `source` is not a vertex of `graph`
/// - An error if distances never settle or a reachable self-loop is negative
/// - `EngineError::UnsupportedAdvanceType` unless the config is vertex-to-vertex
/// - Any advance error
///
/// # Example
///
/// ```
/// use trueno_frontier::algorithms::sssp;
/// use trueno_frontier::operators::AdvanceConfig;
/// use trueno_frontier::{CsrGraph, NodeId};
///
/// let graph = CsrGraph::from_edge_list(&[
///     (NodeId(0), NodeId(1), 4.0),
///     (NodeId(0), NodeId(2), 1.0),
///     (NodeId(2), NodeId(1), 2.0),
/// ])
/// .unwrap();
///
/// let result = sssp(&graph, NodeId(0), AdvanceConfig::default()).unwrap();
/// assert_eq!(result.distance(NodeId(1)), Some(3.0));
/// ```
pub fn sssp<G: GraphAccess>(graph: &G, source: NodeId, config: AdvanceConfig) -> Result<SsspResult> {
    sssp_with_context(graph, source, Arc::new(MultiContext::single()), config)
}

/// Shortest distances from `source` on `context`
///
/// # Errors
///
/// Same as [`sssp`], plus `EngineError::MultiContext` for multi-device contexts
pub fn sssp_with_context<G: GraphAccess>(
    graph: &G,
    source: NodeId,
    context: Arc<MultiContext>,
    config: AdvanceConfig,
) -> Result<SsspResult> {
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

    let problem = SsspProblem {
        graph,
        source: source.0,
        distances: (0..num_vertices)
            .map(|_| AtomicU32::new(f32::INFINITY.to_bits()))
            .collect(),
        negative_self_loop: AtomicBool::new(false),
    };
    let mut algorithm = Sssp {
        config,
        max_iterations: num_vertices,
        _graph: PhantomData,
    };

    let mut enactor = Enactor::new(&problem, context, EnactorProperties::default())?;
    let elapsed = enactor.enact(&mut algorithm)?;
    let iterations = enactor.iteration();
    drop(enactor);

    Ok(SsspResult {
        distances: problem
            .distances
            .into_iter()
            .map(|d| f32::from_bits(d.into_inner()))
            .collect(),
        iterations,
        elapsed,
    })
}
