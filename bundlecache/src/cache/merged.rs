//! Flattened per-locale view across all base names.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{FileTableCache, FilenameCache};
use crate::locale::Locale;
use crate::properties::Properties;
use crate::table::FileTable;

/// One merged table per locale.
///
/// Only used when tables never expire: once built, a view is kept until
/// the cache is cleared.
#[derive(Default)]
pub struct MergedViewCache {
    views: Mutex<HashMap<Locale, Arc<FileTable>>>,
}

impl MergedViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merged view for `locale`, built on first use.
    ///
    /// Base names are overlaid in configuration order and, within each, the
    /// fallback chain from least to most specific. Later base names and
    /// more specific candidates win.
    pub fn get(
        &self,
        locale: &Locale,
        basenames: &[String],
        filenames: &FilenameCache,
        tables: &FileTableCache,
    ) -> Arc<FileTable> {
        let mut views = self.views.lock();
        if let Some(view) = views.get(locale) {
            return Arc::clone(view);
        }

        let mut entries = Properties::new();
        for basename in basenames {
            let chain = filenames.candidates(basename, locale);
            for identifier in chain.iter().rev() {
                let table = tables.get(identifier);
                entries.extend(
                    table
                        .entries()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone())),
                );
            }
        }

        debug!(locale = %locale, entries = entries.len(), "Built merged bundle view");
        let view = Arc::new(FileTable::merged(entries));
        views.insert(locale.clone(), Arc::clone(&view));
        view
    }

    pub fn clear(&self) {
        self.views.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.views.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
