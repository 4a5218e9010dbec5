//! TTL-bounded cache of parsed bundle tables.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::CacheStats;
use crate::clock::Clock;
use crate::config::CacheTtl;
use crate::load::TableLoader;
use crate::table::{FileTable, SourceSnapshot};

/// [`FileTable`]s keyed by candidate identifier.
///
/// A lookup that finds a stale or missing entry refreshes it inline while
/// holding the cache lock, so no two threads build the same identifier's
/// table concurrently. Lookups for other identifiers wait meanwhile.
pub struct FileTableCache {
    loader: TableLoader,
    ttl: CacheTtl,
    clock: Arc<dyn Clock>,
    tables: Mutex<HashMap<String, Arc<FileTable>>>,
    hits: AtomicU64,
    refreshes: AtomicU64,
    skipped_reloads: AtomicU64,
    negative_entries: AtomicU64,
}

impl FileTableCache {
    pub fn new(loader: TableLoader, ttl: CacheTtl, clock: Arc<dyn Clock>) -> Self {
        Self {
            loader,
            ttl,
            clock,
            tables: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            refreshes: AtomicU64::new(0),
            skipped_reloads: AtomicU64::new(0),
            negative_entries: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    /// Table for `identifier`, refreshed first if missing or stale.
    pub fn get(&self, identifier: &str) -> Arc<FileTable> {
        let mut tables = self.tables.lock();
        let now = self.clock.now();

        let previous = tables.get(identifier).cloned();
        if let Some(table) = &previous {
            if self.ttl.is_fresh(table.cached_at(), now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(identifier, "Bundle table cache hit");
                return Arc::clone(table);
            }
        }

        let table = self.refresh(identifier, previous.as_ref(), now);
        tables.insert(identifier.to_string(), Arc::clone(&table));
        table
    }

    /// Re-resolve `identifier`, reusing unchanged resources from `previous`.
    ///
    /// A resource is reused when the TTL is enabled and its modification
    /// time matches the one recorded in `previous`. When every resource was
    /// reused, `previous` itself is re-stamped and returned, keeping its
    /// compiled patterns.
    fn refresh(
        &self,
        identifier: &str,
        previous: Option<&Arc<FileTable>>,
        now: Instant,
    ) -> Arc<FileTable> {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        let stamp = self.ttl.is_enabled().then_some(now);

        let resources = match self.loader.resolve(identifier) {
            Ok(resources) => resources,
            Err(e) => {
                warn!(identifier, error = %e, "Could not resolve bundle resources");
                return self.not_found(stamp);
            }
        };
        if resources.is_empty() {
            debug!(identifier, "No bundle found");
            return self.not_found(stamp);
        }

        let mut sources = Vec::with_capacity(resources.len());
        let mut reused_all = true;

        for resource in &resources {
            let name = resource.display_name();
            let modified_at = if self.ttl.is_enabled() {
                match resource.last_modified() {
                    Ok(time) => Some(time),
                    Err(e) => {
                        debug!(resource = %name, error = %e, "Modification time unavailable");
                        None
                    }
                }
            } else {
                None
            };

            let unchanged = previous
                .and_then(|table| table.source(&name))
                .filter(|snapshot| modified_at.is_some() && snapshot.modified_at == modified_at);
            if let Some(snapshot) = unchanged {
                self.skipped_reloads.fetch_add(1, Ordering::Relaxed);
                debug!(resource = %name, "Bundle file unchanged, skipping reload");
                sources.push(snapshot.clone());
                continue;
            }

            reused_all = false;
            match self.loader.parse(resource.as_ref(), identifier) {
                Ok(entries) => sources.push(SourceSnapshot::new(name, modified_at, entries)),
                Err(e) => warn!(identifier, error = %e, "Could not load bundle file"),
            }
        }

        if let Some(previous) = previous {
            let same_sources = previous
                .sources()
                .iter()
                .map(|s| s.name.as_str())
                .eq(sources.iter().map(|s| s.name.as_str()));
            if reused_all && same_sources {
                debug!(identifier, "Re-caching unchanged bundle");
                previous.restamp(stamp);
                return Arc::clone(previous);
            }
        }

        if sources.is_empty() {
            return self.not_found(stamp);
        }

        debug!(identifier, sources = sources.len(), "Loaded bundle");
        Arc::new(FileTable::from_sources(sources, stamp))
    }

    fn not_found(&self, stamp: Option<Instant>) -> Arc<FileTable> {
        self.negative_entries.fetch_add(1, Ordering::Relaxed);
        Arc::new(FileTable::not_found(stamp))
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        self.tables.lock().clear();
    }

    /// Number of cached identifiers, negative entries included.
    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            skipped_reloads: self.skipped_reloads.load(Ordering::Relaxed),
            negative_entries: self.negative_entries.load(Ordering::Relaxed),
        }
    }
}
