mod common;

use common::{chain_edges, cycle_edges, func, functions, star};
use pretty_assertions::assert_eq;
use structmap::risk::MAX_PENALTY;
use structmap::{
    AnalysisMode, CallEdge, CallGraph, DependencyCalculator, GraphBuildOptions, RiskLevel,
    SccAnalyzer, StructuralAnalyzer, StructuralConfig, StructuralMetrics,
};

fn analyze(functions: &[structmap::FunctionRecord], edges: &[CallEdge]) -> StructuralMetrics {
    StructuralAnalyzer::new(StructuralConfig::default())
        .unwrap()
        .analyze_graph("scenario", functions, edges)
}

#[test]
fn test_acyclic_chain_has_singleton_components() {
    let functions = functions("f", 12, "src/lib.rs");
    let metrics = analyze(&functions, &chain_edges("f", 12));

    assert_eq!(metrics.scc.total_components, 12);
    assert_eq!(metrics.scc.largest_component_size, 1);
    assert!(metrics.scc.cyclic_function_ids.is_empty());
    assert_eq!(metrics.penalty.cyclic_penalty, 0.0);
}

#[test]
fn test_single_cycle_of_length_k() {
    for k in [2, 3, 7, 15] {
        let functions = functions("c", k, "src/cycle.rs");
        let metrics = analyze(&functions, &cycle_edges("c", k));

        assert_eq!(metrics.scc.total_components, 1, "k={k}");
        assert_eq!(metrics.scc.largest_component_size, k);
        assert_eq!(metrics.scc.cyclic_function_count, k);
        assert_eq!(metrics.scc.cycles.len(), 1);
    }
}

#[test]
fn test_two_separate_five_cycles() {
    let mut all = functions("a", 5, "src/a.rs");
    all.extend(functions("b", 5, "src/b.rs"));
    let mut edges = cycle_edges("a", 5);
    edges.extend(cycle_edges("b", 5));

    let metrics = analyze(&all, &edges);

    assert_eq!(metrics.scc.total_components, 2);
    assert_eq!(metrics.scc.largest_component_size, 5);
    assert_eq!(metrics.scc.cyclic_function_count, 10);
    // 10 cyclic functions, 5 over the allowance
    assert_eq!(metrics.penalty.cyclic_penalty, 15.0);
}

#[test]
fn test_two_cycles_with_acyclic_singletons() {
    let mut all = functions("a", 5, "src/a.rs");
    all.extend(functions("b", 5, "src/b.rs"));
    all.push(func("lonely", "src/c.rs"));
    all.push(func("main", "src/main.rs"));
    let mut edges = cycle_edges("a", 5);
    edges.extend(cycle_edges("b", 5));
    edges.push(CallEdge::new("main", "a0"));

    let metrics = analyze(&all, &edges);

    assert_eq!(metrics.scc.total_components, 4);
    assert_eq!(metrics.scc.cyclic_function_count, 10);
    assert_eq!(metrics.dependencies.entry_point_count, 1);
}

#[test]
fn test_star_hub_is_detected() {
    let (functions, edges) = star(30);
    let metrics = analyze(&functions, &edges);

    assert_eq!(metrics.dependencies.max_fan_in, 30);
    assert_eq!(metrics.dependencies.hub_threshold, 5);
    assert_eq!(metrics.dependencies.hub_function_ids, vec!["hub".to_string()]);
    assert_eq!(metrics.dependencies.top_fan_in[0].function_id, "hub");
    assert_eq!(metrics.dependencies.top_fan_in[0].count, 30);

    let pagerank = metrics.pagerank.expect("pagerank computed");
    assert_eq!(pagerank.scores[0].function_id, "hub");
    assert_eq!(pagerank.scores[0].normalized_score, 1.0);
}

#[test]
fn test_star_leaves_have_zero_fan_in() {
    let (functions, edges) = star(30);
    let graph = CallGraph::build(&functions, &edges, GraphBuildOptions::default()).unwrap();
    let deps = DependencyCalculator::new().calculate(&graph);

    assert_eq!(deps.get("hub").unwrap().fan_in, 30);
    for i in 0..30 {
        let leaf = deps.get(&format!("leaf{i}")).unwrap();
        assert_eq!(leaf.fan_in, 0);
        assert_eq!(leaf.fan_out, 1);
        assert!(leaf.is_entry_point);
    }
}

#[test]
fn test_empty_snapshot_returns_zeroed_metrics() {
    let metrics = analyze(&[], &[]);

    assert_eq!(metrics.mode, AnalysisMode::Full);
    assert_eq!(metrics.structural_risk, RiskLevel::Low);
    assert_eq!(metrics.function_count, 0);
    assert_eq!(metrics.edge_count, 0);
    assert_eq!(metrics.scc.total_components, 0);
    assert_eq!(metrics.penalty.total, 0.0);
    assert!(metrics.analysis_error.is_none());
}

#[test]
fn test_functions_without_edges() {
    let functions = functions("f", 4, "src/lib.rs");
    let metrics = analyze(&functions, &[]);

    assert_eq!(metrics.scc.total_components, 4);
    assert_eq!(metrics.dependencies.total_fan_in, 0);
    let pagerank = metrics.pagerank.unwrap();
    assert!(pagerank.scores.iter().all(|s| (s.score - 0.25).abs() < 1e-9));
    assert_eq!(pagerank.centrality.gini, 0.0);
}

#[test]
fn test_self_recursive_function() {
    let functions = vec![func("fact", "src/math.rs")];
    let edges = vec![CallEdge::new("fact", "fact")];

    let graph = CallGraph::build(&functions, &edges, GraphBuildOptions::default()).unwrap();
    let scc = SccAnalyzer::new().analyze(&graph);

    assert_eq!(scc.total_components, 1);
    assert_eq!(scc.largest_component_size, 1);
    assert_eq!(scc.cyclic_function_ids, vec!["fact".to_string()]);
}

#[test]
fn test_external_calls_are_not_traversed() {
    let functions = vec![func("a", "src/a.rs"), func("b", "src/b.rs")];
    let edges = vec![
        CallEdge::new("a", "b"),
        CallEdge::external("a"),
        CallEdge::new("b", "std::fs::read"),
    ];

    let metrics = analyze(&functions, &edges);

    assert_eq!(metrics.edge_count, 1);
    assert_eq!(metrics.graph.external_edges, 1);
    assert_eq!(metrics.graph.unresolved_edges, 1);
    assert_eq!(metrics.dependencies.total_fan_out, 1);
}

#[test]
fn test_repeated_call_sites_count_once_for_fan_in() {
    let functions = vec![func("a", "src/a.rs"), func("b", "src/b.rs")];
    let edges = vec![CallEdge::new("a", "b"); 4];

    let graph = CallGraph::build(&functions, &edges, GraphBuildOptions::default()).unwrap();
    let deps = DependencyCalculator::new().calculate(&graph);

    let b = deps.get("b").unwrap();
    assert_eq!(b.fan_in, 1);
    assert_eq!(b.call_sites_in, 4);
}

#[test]
fn test_deep_chain_does_not_overflow() {
    let n = 50_000;
    let functions = functions("f", n, "src/deep.rs");
    let mut edges = chain_edges("f", n);
    edges.push(CallEdge::new(format!("f{}", n - 1), "f0"));

    let graph = CallGraph::build(&functions, &edges, GraphBuildOptions::default()).unwrap();
    let scc = SccAnalyzer::new().analyze(&graph);

    assert_eq!(scc.total_components, 1);
    assert_eq!(scc.largest_component_size, n);
}

#[test]
fn test_large_cycle_raises_risk() {
    let functions = functions("c", 25, "src/tangle.rs");
    let metrics = analyze(&functions, &cycle_edges("c", 25));

    // component 25 -> 3 points, 25 cyclic -> 2 points
    assert_eq!(metrics.risk_points, 5);
    assert_eq!(metrics.structural_risk, RiskLevel::High);
    assert_eq!(metrics.penalty.risk_multiplier, 0.85);
    assert_eq!(metrics.penalty.total, MAX_PENALTY);
}
