// Shared graph fixtures for structmap integration tests
#![allow(dead_code)]

use structmap::{CallEdge, FunctionRecord};

pub fn func(id: &str, file: &str) -> FunctionRecord {
    FunctionRecord::new(id, id, file, 1, 10)
}

/// `n` functions `{prefix}0 .. {prefix}{n-1}`, all in `file`
pub fn functions(prefix: &str, n: usize, file: &str) -> Vec<FunctionRecord> {
    (0..n).map(|i| func(&format!("{prefix}{i}"), file)).collect()
}

/// Edges `{prefix}0 -> {prefix}1 -> ... -> {prefix}{k-1} -> {prefix}0`
pub fn cycle_edges(prefix: &str, k: usize) -> Vec<CallEdge> {
    (0..k)
        .map(|i| CallEdge::new(format!("{prefix}{i}"), format!("{prefix}{}", (i + 1) % k)))
        .collect()
}

/// Edges `{prefix}0 -> {prefix}1 -> ... -> {prefix}{n-1}`
pub fn chain_edges(prefix: &str, n: usize) -> Vec<CallEdge> {
    (1..n)
        .map(|i| CallEdge::new(format!("{prefix}{}", i - 1), format!("{prefix}{i}")))
        .collect()
}

/// One `hub` called by `leaves` leaf functions; the hub calls nothing
pub fn star(leaves: usize) -> (Vec<FunctionRecord>, Vec<CallEdge>) {
    let mut functions = vec![func("hub", "src/core/hub.rs")];
    functions.extend(functions_in_files("leaf", leaves));
    let edges = (0..leaves)
        .map(|i| CallEdge::new(format!("leaf{i}"), "hub"))
        .collect();
    (functions, edges)
}

fn functions_in_files(prefix: &str, n: usize) -> Vec<FunctionRecord> {
    (0..n)
        .map(|i| func(&format!("{prefix}{i}"), &format!("src/features/{prefix}{i}.rs")))
        .collect()
}
