//! Cache statistics

use std::fmt;

/// Physical load/unload counters of a [`BundleCache`](super::BundleCache)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Physical loads issued (downloads included)
    pub physical_loads: usize,
    /// Bundles physically unloaded
    pub physical_unloads: usize,
    /// Bundles currently held
    pub held: usize,
    /// Released bundles whose physical load has not finished yet
    pub draining: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} held, {} draining, {} loads, {} unloads",
            self.held, self.draining, self.physical_loads, self.physical_unloads
        )
    }
}
