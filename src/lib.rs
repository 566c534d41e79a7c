//! Addressable - asset catalog and bundle loader
//!
//! Two halves share the types in this crate:
//!
//! - The runtime: a [`Catalog`](catalog::Catalog) maps logical ids to physical
//!   storage, [`provider`]s load through that storage, and a
//!   [`Session`](session::Session) tracks every outstanding request against a
//!   reference-counted [`BundleCache`](cache::BundleCache).
//! - The build: the [`pipeline`] compiles a design catalog, packages bundles
//!   and [partitions](resolver::Partitioner) them into the ones shipped with
//!   the client and the ones downloaded on demand.

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod common;
pub mod compiler;
pub mod config;
pub mod domain;
pub mod error;
pub mod hash;
pub mod operation;
pub mod pipeline;
pub mod progress;
pub mod provider;
pub mod resolver;
pub mod session;
pub mod store;
pub mod transaction;

#[cfg(test)]
mod test_fixtures;

pub use error::{AddressableError, Result};
