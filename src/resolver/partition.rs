//! Local/remote bundle partitioning
//!
//! Decides which produced bundles ship inside the client package and which
//! are fetched on demand, from three inputs:
//!
//! - the catalog, whose bundle entries name the bundles actually used
//! - the manifest dependency graph, whose nodes are every produced bundle
//! - the explicit-local set (and an optional banned set) from configuration
//!
//! ## Algorithm
//!
//! 1. Every explicit-local bundle present in the graph adds its closure to
//!    `local`. Explicit-local bundles the graph lacks are reported.
//! 2. Used bundles are split against the final `local` set.
//! 3. Each used, non-local bundle present in the graph adds its closure,
//!    minus `local`, to `remote`.
//! 4. Used bundles the graph lacks are reported, never classified.
//! 5. Produced bundles in neither set and not banned are reported as waste.
//!
//! Step 1 runs before step 3, so a bundle reachable from both a local and a
//! remote root is always local.

use std::collections::BTreeSet;

use super::graph::DependencyGraph;
use crate::catalog::Catalog;
use crate::error::{AddressableError, Result};

/// Outcome of partitioning one platform's bundles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionResult {
    /// Shipped with the client; closed under dependency
    pub local: BTreeSet<String>,
    /// Fetched on demand; disjoint from `local`
    pub remote: BTreeSet<String>,
    /// Referenced by the catalog but never produced
    pub used_not_in_manifest: BTreeSet<String>,
    /// Produced but neither used, local nor banned
    pub in_manifest_not_used: BTreeSet<String>,
    /// Declared local but never produced
    pub declared_local_not_in_manifest: BTreeSet<String>,
}

impl PartitionResult {
    /// Turn the diagnostics into a build verdict
    ///
    /// Missing bundles fail the build with `ManifestMismatch`. Unused bundles
    /// are returned (and logged) as warnings.
    pub fn check(&self) -> Result<Vec<AddressableError>> {
        if !self.used_not_in_manifest.is_empty() || !self.declared_local_not_in_manifest.is_empty()
        {
            return Err(AddressableError::ManifestMismatch {
                used_not_in_manifest: self.used_not_in_manifest.iter().cloned().collect(),
                declared_local_not_in_manifest: self
                    .declared_local_not_in_manifest
                    .iter()
                    .cloned()
                    .collect(),
            });
        }

        let mut warnings = Vec::new();
        if !self.in_manifest_not_used.is_empty() {
            let warning = AddressableError::InManifestNotUsed {
                bundles: self.in_manifest_not_used.iter().cloned().collect(),
            };
            log::warn!("{warning}");
            warnings.push(warning);
        }
        Ok(warnings)
    }

    /// Where a produced bundle ended up, if anywhere
    pub fn is_local(&self, bundle: &str) -> bool {
        self.local.contains(bundle)
    }
}

/// Builder-style partition run over one catalog and graph
pub struct Partitioner<'a> {
    catalog: &'a Catalog,
    graph: &'a DependencyGraph,
    explicit_local: BTreeSet<String>,
    banned: BTreeSet<String>,
}

impl<'a> Partitioner<'a> {
    /// Start a partition; the catalog's own local bundles are explicit-local
    pub fn new(catalog: &'a Catalog, graph: &'a DependencyGraph) -> Self {
        Self {
            catalog,
            graph,
            explicit_local: catalog.local_bundle_names().clone(),
            banned: BTreeSet::new(),
        }
    }

    /// Add bundles that must ship with the client
    pub fn explicit_local<I, S>(mut self, bundles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_local.extend(bundles.into_iter().map(Into::into));
        self
    }

    /// Bundles known to be unused on purpose; they never count as waste
    pub fn banned<I, S>(mut self, bundles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banned.extend(bundles.into_iter().map(Into::into));
        self
    }

    pub fn run(self) -> PartitionResult {
        let mut result = PartitionResult::default();

        // 1. explicit local roots
        let (present, absent): (Vec<&String>, Vec<&String>) = self
            .explicit_local
            .iter()
            .partition(|b| self.graph.contains(b));
        result.local = self.graph.closure_of(present.into_iter().map(String::as_str));
        result.declared_local_not_in_manifest = absent.into_iter().cloned().collect();

        // 2. split used bundles against the final local set
        let used = self.catalog.used_bundle_names();
        let candidate_remote = used.iter().filter(|b| !result.local.contains(*b));

        for bundle in candidate_remote {
            if self.graph.contains(bundle) {
                // 3. remote closure, never duplicating local bundles
                for dep in self.graph.closure(bundle) {
                    if !result.local.contains(&dep) {
                        result.remote.insert(dep);
                    }
                }
            } else {
                // 4
                result.used_not_in_manifest.insert(bundle.clone());
            }
        }

        // 5. waste
        result.in_manifest_not_used = self
            .graph
            .bundles()
            .filter(|b| {
                !result.local.contains(*b) && !result.remote.contains(*b) && !self.banned.contains(*b)
            })
            .map(str::to_string)
            .collect();

        log::debug!(
            "Partitioned {} bundles: {} local, {} remote",
            self.graph.len(),
            result.local.len(),
            result.remote.len()
        );
        result
    }
}
