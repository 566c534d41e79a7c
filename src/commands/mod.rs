//! Command implementations for Addressable CLI

pub mod completions;
pub mod helpers;
pub mod inspect;
pub mod stage;
pub mod version;
