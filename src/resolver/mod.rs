//! Bundle dependency resolution
//!
//! This module handles:
//! - The manifest dependency graph and its transitive closures
//! - Topological ordering and circular dependency detection
//! - Partitioning produced bundles into local and remote sets

pub mod graph;
pub mod partition;
pub mod sort;

pub use graph::DependencyGraph;
pub use partition::{PartitionResult, Partitioner};
pub use sort::topological_order;
