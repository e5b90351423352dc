//! Enactor: the iteration engine every algorithm runs on
//!
//! An algorithm supplies four hooks ([`Algorithm`]): seed the initial
//! frontier, run one iteration, decide convergence, wrap up. The enactor owns
//! two frontier buffers and the advance scratch space, drives the hooks, and
//! times the run.
//!
//! ```text
//! Constructed ──enact()──► Preparing ──► Iterating ──► Finalized
//!                          prepare_frontier  │  ▲         finalize
//!                          (timer starts)    ▼  │
//!                                 loop_body, iteration += 1
//!                                 until is_converged()
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trueno_frontier::enactor::{Algorithm, Enactor, EnactorProperties};
//! use trueno_frontier::operators::{advance, AdvanceConfig};
//! use trueno_frontier::{CsrGraph, Frontier, MultiContext, NodeId, VertexId};
//!
//! /// Walk every out-edge from vertex 0, level by level
//! struct Walk;
//!
//! impl Algorithm for Walk {
//!     type Problem = CsrGraph;
//!
//!     fn prepare_frontier(
//!         &mut self,
//!         _graph: &CsrGraph,
//!         frontier: &mut Frontier<VertexId>,
//!         _context: &MultiContext,
//!     ) -> anyhow::Result<()> {
//!         frontier.assign(&[0])?;
//!         Ok(())
//!     }
//!
//!     fn loop_body(
//!         &mut self,
//!         enactor: &mut Enactor<'_, CsrGraph>,
//!         _context: &MultiContext,
//!     ) -> anyhow::Result<()> {
//!         advance::execute_enactor(enactor, |_, _, _, _| true, AdvanceConfig::default(), true)?;
//!         Ok(())
//!     }
//! }
//!
//! let graph = CsrGraph::from_edge_list(&[(NodeId(0), NodeId(1), 1.0), (NodeId(1), NodeId(2), 1.0)])
//!     .unwrap();
//! let mut enactor =
//!     Enactor::new(&graph, Arc::new(MultiContext::single()), EnactorProperties::default()).unwrap();
//!
//! enactor.enact(&mut Walk).unwrap();
//! assert_eq!(enactor.iteration(), 2);
//! ```

use crate::context::MultiContext;
use crate::frontier::{Frontier, FrontierKind, DEFAULT_RESIZING_FACTOR};
use crate::storage::{GraphAccess, VertexId};
use crate::EngineError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace};

/// Construction-time enactor settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnactorProperties {
    /// Frontiers grow to this factor times the size required
    pub frontier_sizing_factor: f32,

    /// Number of frontier buffers; only double buffering (2) is implemented
    pub number_of_frontier_buffers: usize,

    /// Whether the buffers hold vertices or edges
    pub frontier_kind: FrontierKind,
}

impl Default for EnactorProperties {
    fn default() -> Self {
        Self {
            frontier_sizing_factor: DEFAULT_RESIZING_FACTOR,
            number_of_frontier_buffers: 2,
            frontier_kind: FrontierKind::Vertex,
        }
    }
}

impl EnactorProperties {
    /// Replace the frontier sizing factor
    #[must_use]
    pub const fn with_frontier_sizing_factor(mut self, factor: f32) -> Self {
        self.frontier_sizing_factor = factor;
        self
    }

    /// Replace the frontier kind
    #[must_use]
    pub const fn with_frontier_kind(mut self, kind: FrontierKind) -> Self {
        self.frontier_kind = kind;
        self
    }

    /// # Errors
    ///
    /// Returns `EngineError::InvalidProperties` for a sizing factor below 1
    /// or a buffer count other than 2
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.frontier_sizing_factor.is_finite() || self.frontier_sizing_factor < 1.0 {
            return Err(EngineError::InvalidProperties(format!(
                "frontier_sizing_factor must be >= 1.0, got {}",
                self.frontier_sizing_factor
            )));
        }
        if self.number_of_frontier_buffers != 2 {
            return Err(EngineError::InvalidProperties(format!(
                "number_of_frontier_buffers must be 2, got {}",
                self.number_of_frontier_buffers
            )));
        }
        Ok(())
    }
}

/// Lifecycle of an enactor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnactorState {
    /// Buffers allocated, never enacted
    Constructed,
    /// Seeding the initial frontier
    Preparing,
    /// Running loop bodies
    Iterating,
    /// Converged and finalized
    Finalized,
}

/// Algorithm-specific data the enactor borrows
pub trait Problem {
    /// Graph accessor type
    type Graph: GraphAccess;

    /// Graph being processed
    fn graph(&self) -> &Self::Graph;
}

/// A bare graph is a problem with no per-vertex state
impl<G: GraphAccess> Problem for G {
    type Graph = G;

    fn graph(&self) -> &G {
        self
    }
}

/// Hooks an algorithm implements to run on an [`Enactor`]
pub trait Algorithm {
    /// Problem type the algorithm runs on
    type Problem: Problem;

    /// Seed the initial active frontier (a source vertex, every vertex, ...)
    ///
    /// # Errors
    ///
    /// Any error aborts `enact`
    fn prepare_frontier(
        &mut self,
        problem: &Self::Problem,
        frontier: &mut Frontier<VertexId>,
        context: &MultiContext,
    ) -> Result<()>;

    /// One iteration: issue operators against the enactor's buffers
    ///
    /// This runs on the timed path.
    ///
    /// # Errors
    ///
    /// Any error aborts `enact`
    fn loop_body(
        &mut self,
        enactor: &mut Enactor<'_, Self::Problem>,
        context: &MultiContext,
    ) -> Result<()>;

    /// Checked before every iteration; default: the input frontier is empty
    fn is_converged(&self, enactor: &Enactor<'_, Self::Problem>, _context: &MultiContext) -> bool {
        enactor.input_frontier().is_empty()
    }

    /// Runs once after convergence; default: nothing
    ///
    /// # Errors
    ///
    /// Any error aborts `enact`
    fn finalize(
        &mut self,
        _enactor: &mut Enactor<'_, Self::Problem>,
        _context: &MultiContext,
    ) -> Result<()> {
        Ok(())
    }
}

/// Double-buffered frontier engine
pub struct Enactor<'p, P: Problem> {
    properties: EnactorProperties,
    context: Arc<MultiContext>,
    problem: &'p P,
    frontiers: [Frontier<VertexId>; 2],
    /// Segment table for advance
    scanned_work_domain: Vec<usize>,
    buffer_selector: usize,
    iteration: usize,
    state: EnactorState,
}

impl<'p, P: Problem> Enactor<'p, P> {
    /// Allocate buffers for `problem`
    ///
    /// Each frontier reserves `max(num_vertices, num_edges)` slots (scaled by
    /// the sizing factor); the scratch space starts at `num_vertices`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidProperties` or an allocation error
    pub fn new(
        problem: &'p P,
        context: Arc<MultiContext>,
        properties: EnactorProperties,
    ) -> Result<Self, EngineError> {
        properties.validate()?;

        let graph = problem.graph();
        let initial_size = graph.num_vertices().max(graph.num_edges());

        let build = || -> Result<Frontier<VertexId>, EngineError> {
            let mut frontier = Frontier::new(properties.frontier_kind);
            frontier.set_resizing_factor(properties.frontier_sizing_factor)?;
            frontier.reserve(initial_size)?;
            Ok(frontier)
        };
        let frontiers = [build()?, build()?];

        debug!(
            num_vertices = graph.num_vertices(),
            num_edges = graph.num_edges(),
            capacity = frontiers[0].capacity(),
            "enactor constructed"
        );

        Ok(Self {
            properties,
            context,
            problem,
            frontiers,
            scanned_work_domain: vec![0; graph.num_vertices()],
            buffer_selector: 0,
            iteration: 0,
            state: EnactorState::Constructed,
        })
    }

    /// Problem being enacted
    #[must_use]
    pub const fn problem(&self) -> &'p P {
        self.problem
    }

    /// Shared execution context
    #[must_use]
    pub const fn context(&self) -> &Arc<MultiContext> {
        &self.context
    }

    /// Construction properties
    #[must_use]
    pub const fn properties(&self) -> &EnactorProperties {
        &self.properties
    }

    /// Active frontier: input to the next operator
    #[must_use]
    pub fn input_frontier(&self) -> &Frontier<VertexId> {
        &self.frontiers[self.buffer_selector]
    }

    /// Inactive frontier: usually the next operator's output
    #[must_use]
    pub fn output_frontier(&self) -> &Frontier<VertexId> {
        &self.frontiers[self.buffer_selector ^ 1]
    }

    /// Mutable active frontier
    pub fn input_frontier_mut(&mut self) -> &mut Frontier<VertexId> {
        &mut self.frontiers[self.buffer_selector]
    }

    /// Mutable inactive frontier
    pub fn output_frontier_mut(&mut self) -> &mut Frontier<VertexId> {
        &mut self.frontiers[self.buffer_selector ^ 1]
    }

    /// Input frontier, output frontier and scratch space at once
    pub fn buffers_mut(&mut self) -> (&Frontier<VertexId>, &mut Frontier<VertexId>, &mut Vec<usize>) {
        let [first, second] = &mut self.frontiers;
        let (input, output) = if self.buffer_selector == 0 {
            (first, second)
        } else {
            (second, first)
        };
        (input, output, &mut self.scanned_work_domain)
    }

    /// Scratch segment table left by the last advance
    #[must_use]
    pub fn scanned_work_domain(&self) -> &[usize] {
        &self.scanned_work_domain
    }

    /// Exchange input and output roles; no data moves
    pub fn swap_frontier_buffers(&mut self) {
        self.buffer_selector ^= 1;
    }

    /// Which buffer is currently the input (0 or 1)
    #[must_use]
    pub const fn buffer_selector(&self) -> usize {
        self.buffer_selector
    }

    /// Loop bodies completed in the current (or last) enact
    #[must_use]
    pub const fn iteration(&self) -> usize {
        self.iteration
    }

    /// Lifecycle state
    #[must_use]
    pub const fn state(&self) -> EnactorState {
        self.state
    }

    /// Run `algorithm` to convergence
    ///
    /// Returns the wall-clock time from the end of `prepare_frontier` to the
    /// end of `finalize`. Enacting again restarts from iteration 0.
    ///
    /// # Errors
    ///
    /// - `EngineError::MultiContext` unless the context has exactly one device
    /// - Any hook error, which aborts the run
    pub fn enact<A>(&mut self, algorithm: &mut A) -> Result<Duration>
    where
        A: Algorithm<Problem = P>,
    {
        let context = Arc::clone(&self.context);
        let device = context.single_context()?;

        self.buffer_selector = 0;
        self.iteration = 0;

        self.state = EnactorState::Preparing;
        let problem = self.problem;
        algorithm
            .prepare_frontier(problem, self.input_frontier_mut(), &context)
            .context("Failed to prepare initial frontier")?;
        debug!(frontier = self.input_frontier().len(), "initial frontier prepared");

        let mut timer = device.timer();
        timer.begin();

        self.state = EnactorState::Iterating;
        while !algorithm.is_converged(self, &context) {
            let iteration = self.iteration;
            algorithm
                .loop_body(self, &context)
                .with_context(|| format!("Loop body failed at iteration {iteration}"))?;
            self.iteration += 1;
            trace!(
                iteration = self.iteration,
                frontier = self.input_frontier().len(),
                "iteration complete"
            );
        }

        self.state = EnactorState::Finalized;
        algorithm
            .finalize(self, &context)
            .context("Failed to finalize")?;

        let elapsed = timer.end();
        info!(
            iterations = self.iteration,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "enact complete"
        );
        Ok(elapsed)
    }
}

impl<P: Problem> std::fmt::Debug for Enactor<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enactor")
            .field("properties", &self.properties)
            .field("buffer_selector", &self.buffer_selector)
            .field("iteration", &self.iteration)
            .field("state", &self.state)
            .field("input_len", &self.input_frontier().len())
            .field("output_len", &self.output_frontier().len())
            .finish_non_exhaustive()
    }
}
