//! Integration tests for trueno-frontier
//!
//! Advance scenarios run once per supported load-balancing strategy, plus
//! end-to-end enactor runs through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trueno_frontier::operators::{advance, AdvanceConfig, AdvanceStats, AdvanceType, LoadBalance};
use trueno_frontier::{
    Algorithm, CooGraph, CscGraph, CsrGraph, Enactor, EnactorProperties, EngineError, Frontier,
    FrontierKind, GraphAccess, MultiContext, NodeId, StandardContext, VertexId,
};

const STRATEGIES: [LoadBalance; 3] = [
    LoadBalance::BlockMapped,
    LoadBalance::ThreadMapped,
    LoadBalance::MergePath,
];

/// 0 → 1, 0 → 2, 1 → 2
fn triangle() -> CsrGraph {
    CsrGraph::from_edge_list(&[
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(0), NodeId(2), 1.0),
        (NodeId(1), NodeId(2), 1.0),
    ])
    .unwrap()
}

fn run<G, F>(graph: &G, items: &[u32], op: F, strategy: LoadBalance) -> (Vec<u32>, AdvanceStats)
where
    G: GraphAccess,
    F: Fn(VertexId, VertexId, u32, f32) -> bool + Sync,
{
    let mut input = Frontier::new(FrontierKind::Vertex);
    input.assign(items).unwrap();
    let mut output = Frontier::new(FrontierKind::Vertex);
    let mut segments = Vec::new();

    let stats = advance::execute(
        graph,
        op,
        &input,
        &mut output,
        &mut segments,
        &MultiContext::single(),
        AdvanceConfig::with_load_balance(strategy),
    )
    .unwrap();

    (output.as_slice().to_vec(), stats)
}

fn sorted(mut items: Vec<u32>) -> Vec<u32> {
    items.sort_unstable();
    items
}

#[test]
fn test_source_with_two_neighbors() {
    let graph = triangle();

    for strategy in STRATEGIES {
        let (output, stats) = run(&graph, &[0], |_, _, _, _| true, strategy);
        assert_eq!(sorted(output), vec![1, 2], "{strategy:?}");
        assert_eq!(stats.output_len, 2);
    }
}

#[test]
fn test_source_with_one_neighbor() {
    let graph = triangle();

    for strategy in STRATEGIES {
        let (output, stats) = run(&graph, &[1], |_, _, _, _| true, strategy);
        assert_eq!(output, vec![2], "{strategy:?}");
        assert_eq!(stats.expanded, 1);
    }
}

#[test]
fn test_duplicate_sources_rejected_by_predicate() {
    let graph = triangle();

    for strategy in STRATEGIES {
        let (output, stats) = run(&graph, &[0, 0], |_, _, _, _| false, strategy);
        assert!(output.is_empty(), "{strategy:?}");
        assert_eq!(stats.expanded, 4, "{strategy:?}");
        assert_eq!(stats.output_len, 0);
    }
}

#[test]
fn test_sentinel_among_valid_sources() {
    // Vertex 0 has degree 2, vertex 3 has degree 3
    let graph = CsrGraph::from_edge_list(&[
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(0), NodeId(2), 1.0),
        (NodeId(3), NodeId(0), 1.0),
        (NodeId(3), NodeId(1), 1.0),
        (NodeId(3), NodeId(2), 1.0),
    ])
    .unwrap();

    for strategy in STRATEGIES {
        let (output, stats) = run(&graph, &[0, u32::MAX, 3], |_, _, _, _| true, strategy);
        assert_eq!(stats.expanded, 5, "{strategy:?}");
        assert!(stats.output_len <= 5);
        assert_eq!(output, vec![1, 2, 0, 1, 2], "{strategy:?}");
    }
}

#[test]
fn test_self_loops_dropped_even_when_accepted() {
    let graph = CsrGraph::from_edge_list(&[
        (NodeId(0), NodeId(0), 1.0),
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(1), NodeId(1), 1.0),
    ])
    .unwrap();

    for strategy in STRATEGIES {
        let seen = AtomicUsize::new(0);
        let (output, stats) = run(
            &graph,
            &[0, 1],
            |_, _, _, _| {
                seen.fetch_add(1, Ordering::Relaxed);
                true
            },
            strategy,
        );
        assert_eq!(output, vec![1], "{strategy:?}");
        assert_eq!(stats.expanded, 3);
        // The predicate still sees self-loop edges
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }
}

#[test]
fn test_predicate_receives_edge_and_weight() {
    let graph = CsrGraph::from_edge_list(&[
        (NodeId(0), NodeId(1), 0.5),
        (NodeId(0), NodeId(2), 2.5),
        (NodeId(1), NodeId(2), 1.0),
    ])
    .unwrap();

    for strategy in STRATEGIES {
        let (output, _) = run(
            &graph,
            &[0, 1],
            |source, neighbor, edge, weight| {
                assert_eq!(graph.source(edge), source);
                assert_eq!(graph.destination(edge), neighbor);
                weight >= 1.0
            },
            strategy,
        );
        assert_eq!(output, vec![2, 2], "{strategy:?}");
    }
}

#[test]
fn test_vertex_to_edge_output() {
    let graph = triangle();

    for strategy in STRATEGIES {
        let mut input = Frontier::new(FrontierKind::Vertex);
        input.assign(&[1, 0]).unwrap();
        let mut output = Frontier::new(FrontierKind::Edge);

        advance::execute(
            &graph,
            |_, _, _, _| true,
            &input,
            &mut output,
            &mut Vec::new(),
            &MultiContext::single(),
            AdvanceConfig::with_load_balance(strategy).advance_type(AdvanceType::VertexToEdge),
        )
        .unwrap();

        assert_eq!(output.as_slice(), &[2, 0, 1], "{strategy:?}");
    }
}

#[test]
fn test_strategies_agree_on_skewed_graph() {
    // Hub 0 with 500 neighbors, a chain, and a few isolated vertices
    let mut edges: Vec<_> = (1..=500).map(|i| (NodeId(0), NodeId(i), 1.0)).collect();
    edges.extend((1..500).map(|i| (NodeId(i), NodeId(i + 1), 1.0)));
    edges.push((NodeId(600), NodeId(600), 1.0));
    let graph = CsrGraph::from_edge_list(&edges).unwrap();

    let mut items: Vec<u32> = (0..=600).rev().collect();
    items.insert(100, u32::MAX);

    let (reference, reference_stats) = run(&graph, &items, |_, n, _, _| n % 3 != 0, LoadBalance::ThreadMapped);
    for strategy in STRATEGIES {
        let (output, stats) = run(&graph, &items, |_, n, _, _| n % 3 != 0, strategy);
        assert_eq!(output, reference, "{strategy:?}");
        assert_eq!(stats, reference_stats);
    }
}

#[test]
fn test_same_result_on_every_format() {
    let edges = [
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(0), NodeId(2), 1.0),
        (NodeId(1), NodeId(2), 1.0),
        (NodeId(2), NodeId(0), 1.0),
    ];
    let csr = CsrGraph::from_edge_list(&edges).unwrap();
    let coo = CooGraph::from_edge_list(&edges).unwrap();
    let csc = CscGraph::from_edge_list(&edges).unwrap();

    for strategy in STRATEGIES {
        let (from_csr, _) = run(&csr, &[0, 1, 2], |_, _, _, _| true, strategy);
        let (from_coo, _) = run(&coo, &[0, 1, 2], |_, _, _, _| true, strategy);
        assert_eq!(from_csr, from_coo);

        // In-neighbors of 2 are 0 and 1
        let (from_csc, _) = run(&csc, &[2], |_, _, _, _| true, strategy);
        assert_eq!(sorted(from_csc), vec![0, 1]);
    }
}

#[test]
fn test_unsupported_strategies_rejected() {
    let graph = triangle();
    let mut input = Frontier::new(FrontierKind::Vertex);
    input.assign(&[0]).unwrap();
    let mut output = Frontier::new(FrontierKind::Vertex);

    for strategy in [LoadBalance::WarpMapped, LoadBalance::Bucketing, LoadBalance::WorkStealing] {
        let err = advance::execute(
            &graph,
            |_, _, _, _| true,
            &input,
            &mut output,
            &mut Vec::new(),
            &MultiContext::single(),
            AdvanceConfig::with_load_balance(strategy),
        )
        .unwrap_err();
        assert_eq!(err, EngineError::UnsupportedLoadBalance(strategy));
    }
}

#[test]
fn test_multi_device_context_rejected() {
    let graph = triangle();
    let mut input = Frontier::new(FrontierKind::Vertex);
    input.assign(&[0]).unwrap();
    let mut output = Frontier::new(FrontierKind::Vertex);

    let err = advance::execute(
        &graph,
        |_, _, _, _| true,
        &input,
        &mut output,
        &mut Vec::new(),
        &MultiContext::new(&[0, 1]),
        AdvanceConfig::default(),
    )
    .unwrap_err();

    assert_eq!(err, EngineError::MultiContext(2));
}

#[test]
fn test_out_of_range_vertex_rejected() {
    let graph = triangle();
    let mut input = Frontier::new(FrontierKind::Vertex);
    input.assign(&[0, 9]).unwrap();
    let mut output = Frontier::new(FrontierKind::Vertex);

    for strategy in STRATEGIES {
        let err = advance::execute(
            &graph,
            |_, _, _, _| true,
            &input,
            &mut output,
            &mut Vec::new(),
            &MultiContext::single(),
            AdvanceConfig::with_load_balance(strategy),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::VertexOutOfBounds {
                vertex: 9,
                num_vertices: 3
            }
        );
    }
}

#[test]
fn test_dedicated_thread_pool() {
    let graph = triangle();
    let context = MultiContext::from_context(StandardContext::with_threads(0, 2).unwrap());
    let mut input = Frontier::new(FrontierKind::Vertex);
    input.assign(&[0, 1]).unwrap();
    let mut output = Frontier::new(FrontierKind::Vertex);

    advance::execute(
        &graph,
        |_, _, _, _| true,
        &input,
        &mut output,
        &mut Vec::new(),
        &context,
        AdvanceConfig::with_load_balance(LoadBalance::BlockMapped),
    )
    .unwrap();

    assert_eq!(output.as_slice(), &[1, 2, 2]);
    assert!(context.get_context(0).unwrap().launch_count() >= 2);
}

/// Counts vertices reachable within `max_hops`, revisits included
struct HopCounter {
    start: Vec<u32>,
    max_hops: usize,
    visits: usize,
}

impl Algorithm for HopCounter {
    type Problem = CsrGraph;

    fn prepare_frontier(
        &mut self,
        _graph: &CsrGraph,
        frontier: &mut Frontier<VertexId>,
        _context: &MultiContext,
    ) -> trueno_frontier::Result<()> {
        frontier.assign(&self.start)?;
        Ok(())
    }

    fn loop_body(
        &mut self,
        enactor: &mut Enactor<'_, CsrGraph>,
        _context: &MultiContext,
    ) -> trueno_frontier::Result<()> {
        let stats = advance::execute_enactor(enactor, |_, _, _, _| true, AdvanceConfig::default(), true)?;
        self.visits += stats.output_len;
        Ok(())
    }

    fn is_converged(&self, enactor: &Enactor<'_, CsrGraph>, _context: &MultiContext) -> bool {
        enactor.input_frontier().is_empty() || enactor.iteration() >= self.max_hops
    }
}

#[test]
fn test_enactor_empty_start_runs_zero_iterations() {
    let graph = triangle();
    let mut enactor =
        Enactor::new(&graph, Arc::new(MultiContext::single()), EnactorProperties::default()).unwrap();
    let mut algorithm = HopCounter {
        start: Vec::new(),
        max_hops: 10,
        visits: 0,
    };

    enactor.enact(&mut algorithm).unwrap();

    assert_eq!(enactor.iteration(), 0);
    assert_eq!(algorithm.visits, 0);
}

#[test]
fn test_enactor_walks_triangle() {
    let graph = triangle();
    let mut enactor =
        Enactor::new(&graph, Arc::new(MultiContext::single()), EnactorProperties::default()).unwrap();
    let mut algorithm = HopCounter {
        start: vec![0],
        max_hops: 10,
        visits: 0,
    };

    enactor.enact(&mut algorithm).unwrap();

    // [0] → [1, 2] → [2] → []
    assert_eq!(enactor.iteration(), 3);
    assert_eq!(algorithm.visits, 3);
}

#[test]
fn test_enactor_frontier_grows_past_initial_capacity() {
    // Complete digraph on 20 vertices: frontier of all vertices expands to 380
    let edges: Vec<_> = (0..20u32)
        .flat_map(|s| (0..20u32).filter(move |&d| d != s).map(move |d| (NodeId(s), NodeId(d), 1.0)))
        .collect();
    let graph = CsrGraph::from_edge_list(&edges).unwrap();
    let properties = EnactorProperties::default().with_frontier_sizing_factor(1.0);
    let mut enactor = Enactor::new(&graph, Arc::new(MultiContext::single()), properties).unwrap();
    let initial_capacity = enactor.input_frontier().capacity();

    let mut algorithm = HopCounter {
        start: (0..20).collect(),
        max_hops: 2,
        visits: 0,
    };
    enactor.enact(&mut algorithm).unwrap();

    assert_eq!(algorithm.visits, 380 + 380 * 19);
    assert!(enactor.input_frontier().capacity() >= 380 * 19);
    assert!(enactor.input_frontier().capacity() > initial_capacity);
}
