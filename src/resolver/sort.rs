//! Topological ordering of bundles using depth-first search (DFS)
//!
//! Produces a dependencies-first order: a bundle always appears after every
//! bundle it depends on. The packaging and distribution steps use it, and
//! [`DependencyGraph::validate`](super::graph::DependencyGraph::validate)
//! uses it for cycle detection.
//!
//! ## Algorithm
//!
//! Uses DFS with three-color marking:
//!
//! 1. **WHITE** (unvisited): Node hasn't been processed
//! 2. **GRAY** (on the current path): Node is in the recursion stack
//! 3. **BLACK** (done): Node and all its dependencies are emitted
//!
//! Reaching a GRAY node means the graph has a cycle.

use std::collections::BTreeSet;

use super::graph::DependencyGraph;
use crate::error::{Result, circular_dependency};

struct TopoSortContext<'a> {
    graph: &'a DependencyGraph,
    /// BLACK
    visited: BTreeSet<String>,
    /// GRAY nodes in path order, for reporting the cycle
    path: Vec<String>,
    result: Vec<String>,
}

/// Order every bundle of `graph` dependencies-first
///
/// Independent bundles come out in name order, which keeps the result
/// stable across runs.
///
/// # Errors
///
/// Returns `CircularDependency` naming the cycle, e.g. `a -> b -> a`.
///
/// # Example
///
/// ```text
/// Dependencies:
///   ui     depends on fonts
///   fonts  depends on shared
///   shared has no dependencies
///
/// Result: [shared, fonts, ui]
/// ```
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<String>> {
    let mut ctx = TopoSortContext {
        graph,
        visited: BTreeSet::new(),
        path: Vec::new(),
        result: Vec::with_capacity(graph.len()),
    };

    for name in graph.bundles() {
        if !ctx.visited.contains(name) {
            topo_dfs(&mut ctx, name)?;
        }
    }

    Ok(ctx.result)
}

fn topo_dfs(ctx: &mut TopoSortContext, name: &str) -> Result<()> {
    if let Some(start) = ctx.path.iter().position(|n| n == name) {
        let mut chain: Vec<&str> = ctx.path[start..].iter().map(String::as_str).collect();
        chain.push(name);
        return Err(circular_dependency(chain.join(" -> ")));
    }

    if ctx.visited.contains(name) {
        return Ok(());
    }

    let graph = ctx.graph;
    ctx.path.push(name.to_string());
    for dep in graph.direct_dependencies(name) {
        topo_dfs(ctx, dep)?;
    }
    ctx.path.pop();

    ctx.visited.insert(name.to_string());
    ctx.result.push(name.to_string());
    Ok(())
}
