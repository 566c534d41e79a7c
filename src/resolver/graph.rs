//! Bundle dependency graph
//!
//! The graph comes from the manifest written by the packaging step. It only
//! stores direct edges:
//!
//! ```text
//! BTreeMap<String, Vec<String>>
//!    ↓              ↓
//!  bundle_name   [dep1, dep2, dep3]
//! ```
//!
//! Transitive closures are derived on demand. Keys are the full set of
//! produced bundles, so `contains` doubles as "was this bundle produced".

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::error::{Result, dependency_not_found};

/// Direct dependency edges between bundles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new(edges: BTreeMap<String, Vec<String>>) -> Self {
        Self { edges }
    }

    /// Build a graph from `(bundle, [deps])` pairs
    pub fn from_edges<I, S>(edges: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            edges: edges
                .into_iter()
                .map(|(name, deps)| (name.into(), deps.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Whether `bundle` is a node of the graph
    pub fn contains(&self, bundle: &str) -> bool {
        self.edges.contains_key(bundle)
    }

    /// Direct dependencies of `bundle`, empty for unknown bundles
    pub fn direct_dependencies(&self, bundle: &str) -> &[String] {
        self.edges.get(bundle).map_or(&[], Vec::as_slice)
    }

    /// All bundle names, sorted
    pub fn bundles(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub(crate) fn edges(&self) -> &BTreeMap<String, Vec<String>> {
        &self.edges
    }

    /// `bundle` plus everything it transitively depends on
    pub fn closure(&self, bundle: &str) -> BTreeSet<String> {
        self.closure_of([bundle])
    }

    /// Union of the closures of every root
    ///
    /// Breadth-first and cycle tolerant: each node is visited once, so a
    /// malformed graph cannot loop forever here.
    pub fn closure_of<'a>(&self, roots: impl IntoIterator<Item = &'a str>) -> BTreeSet<String> {
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<&str> = roots.into_iter().collect();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name.to_string()) {
                continue;
            }
            for dep in self.direct_dependencies(name) {
                if !seen.contains(dep) {
                    queue.push_back(dep);
                }
            }
        }
        seen
    }

    /// Check that every named dependency exists and the graph is acyclic
    pub fn validate(&self) -> Result<()> {
        for (name, deps) in &self.edges {
            if let Some(missing) = deps.iter().find(|d| !self.edges.contains_key(*d)) {
                return Err(dependency_not_found(name, missing));
            }
        }
        super::sort::topological_order(self).map(|_| ())
    }
}
