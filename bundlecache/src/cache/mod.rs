//! The three bundle caches.
//!
//! - [`FilenameCache`]: fallback chains per `(base name, locale)`, never expire
//! - [`FileTableCache`]: parsed tables per candidate identifier, TTL-bounded
//! - [`MergedViewCache`]: one flattened table per locale, TTL-disabled mode only
//!
//! Each cache owns its own lock. When more than one is held the order is
//! merged view → filenames → tables → a table's pattern cache; no code path
//! takes a coarser lock while holding a finer one.

mod filenames;
mod merged;
mod tables;

pub use filenames::FilenameCache;
pub use merged::MergedViewCache;
pub use tables::FileTableCache;

/// Counters from the file table cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by a fresh cached table.
    pub hits: u64,
    /// Identifiers (re)resolved through the resource loader.
    pub refreshes: u64,
    /// Resources whose parsed entries were reused because their
    /// modification time was unchanged.
    pub skipped_reloads: u64,
    /// Refreshes that ended in a "not found" table.
    pub negative_entries: u64,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of lookups served from cache, `0.0` with no lookups.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.refreshes;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        assert_eq!(CacheStats::new().hit_rate(), 0.0);

        let stats = CacheStats {
            hits: 3,
            refreshes: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }
}
