//! Frontier engine walkthrough: advance strategies, BFS and SSSP
//!
//! Run with: `RUST_LOG=debug cargo run --example bfs_demo`

use trueno_frontier::algorithms::{bfs, sssp};
use trueno_frontier::operators::{advance, AdvanceConfig, LoadBalance};
use trueno_frontier::{CsrGraph, Frontier, FrontierKind, GraphAccess, MultiContext, NodeId};
use tracing_subscriber::EnvFilter;

fn main() -> trueno_frontier::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Road-like network: two routes from depot (0) to market (5)
    //   0 → 1 → 2 → 5   (cost 1 + 1 + 1)
    //   0 → 3 → 4 → 5   (cost 1 + 5 + 1)
    //   0 → 5           (cost 10, direct)
    let graph = CsrGraph::from_edge_list(&[
        (NodeId(0), NodeId(1), 1.0),
        (NodeId(1), NodeId(2), 1.0),
        (NodeId(2), NodeId(5), 1.0),
        (NodeId(0), NodeId(3), 1.0),
        (NodeId(3), NodeId(4), 5.0),
        (NodeId(4), NodeId(5), 1.0),
        (NodeId(0), NodeId(5), 10.0),
    ])?;
    println!("✓ Built graph with {} nodes and {} edges\n", graph.num_nodes(), graph.num_edges());

    // One advance step from the depot, per strategy
    println!("🔀 Advance from node 0:");
    let mut input = Frontier::new(FrontierKind::Vertex);
    input.assign(&[0])?;
    for strategy in [LoadBalance::BlockMapped, LoadBalance::ThreadMapped, LoadBalance::MergePath] {
        let mut output = Frontier::new(FrontierKind::Vertex);
        let stats = advance::execute(
            &graph,
            |_, _, _, _| true,
            &input,
            &mut output,
            &mut Vec::new(),
            &MultiContext::single(),
            AdvanceConfig::with_load_balance(strategy),
        )?;
        println!("   {strategy:?}: {:?} ({} expanded)", output.as_slice(), stats.expanded);
    }
    println!();

    // Hop counts
    let hops = bfs(&graph, NodeId(0), AdvanceConfig::default())?;
    println!("🔍 BFS from node 0 ({} levels, {:?}):", hops.iterations, hops.elapsed);
    for (node, depth) in hops.depths.iter().enumerate() {
        println!("   node {node}: {depth} hops");
    }
    println!();

    // Weighted distances
    let distances = sssp(&graph, NodeId(0), AdvanceConfig::default())?;
    println!("🛣️  SSSP from node 0 ({} rounds):", distances.iterations);
    for (node, distance) in distances.distances.iter().enumerate() {
        println!("   node {node}: {distance}");
    }

    Ok(())
}
