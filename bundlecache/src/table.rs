//! Loaded bundle file snapshots.
//!
//! A [`FileTable`] holds the parsed contents of one candidate identifier
//! (e.g. `messages_de_AT`), merged across every resource that backs it,
//! together with the metadata the caches need to decide freshness.
//!
//! The entries and source snapshots never change after construction. Two
//! pieces of interior state do:
//!
//! - the cache stamp, renewed when a refresh finds nothing changed
//! - the compiled-pattern cache, filled lazily per `(key, locale)`
//!
//! Each sits behind its own lock, scoped to this one table.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use parking_lot::Mutex;
use tracing::warn;

use crate::format::MessagePattern;
use crate::locale::Locale;
use crate::properties::Properties;

/// Parsed contents of one backing resource.
#[derive(Debug, Clone)]
pub struct SourceSnapshot {
    /// Resource display name, used to match snapshots across refreshes.
    pub name: String,

    /// Modification time at load, `None` if unknown or not read.
    pub modified_at: Option<SystemTime>,

    /// Entries parsed from this resource alone.
    pub entries: Arc<Properties>,
}

impl SourceSnapshot {
    pub fn new(name: impl Into<String>, modified_at: Option<SystemTime>, entries: Properties) -> Self {
        Self {
            name: name.into(),
            modified_at,
            entries: Arc::new(entries),
        }
    }
}

/// Cached contents of one candidate identifier.
#[derive(Debug)]
pub struct FileTable {
    entries: Arc<Properties>,
    sources: Vec<SourceSnapshot>,
    /// `None` never expires.
    cached_at: Mutex<Option<Instant>>,
    patterns: Mutex<HashMap<String, HashMap<Locale, Arc<MessagePattern>>>>,
}

impl FileTable {
    /// Build from per-resource snapshots, later snapshots overriding
    /// earlier ones on key collisions.
    pub fn from_sources(sources: Vec<SourceSnapshot>, cached_at: Option<Instant>) -> Self {
        let entries = match sources.as_slice() {
            [single] => Arc::clone(&single.entries),
            _ => {
                let mut merged = Properties::new();
                for source in &sources {
                    merged.extend(
                        source
                            .entries
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone())),
                    );
                }
                Arc::new(merged)
            }
        };

        Self {
            entries,
            sources,
            cached_at: Mutex::new(cached_at),
            patterns: Mutex::new(HashMap::new()),
        }
    }

    /// A "not found" table: no entries, no sources.
    pub fn not_found(cached_at: Option<Instant>) -> Self {
        Self::from_sources(Vec::new(), cached_at)
    }

    /// A table assembled from other tables, without sources of its own.
    pub fn merged(entries: Properties) -> Self {
        Self {
            entries: Arc::new(entries),
            sources: Vec::new(),
            cached_at: Mutex::new(None),
            patterns: Mutex::new(HashMap::new()),
        }
    }

    /// Look up raw text.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All entries.
    pub fn entries(&self) -> &Properties {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-resource snapshots in merge order.
    pub fn sources(&self) -> &[SourceSnapshot] {
        &self.sources
    }

    /// Snapshot for the resource with the given display name.
    pub fn source(&self, name: &str) -> Option<&SourceSnapshot> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// True for the negative-cache table.
    pub fn is_not_found(&self) -> bool {
        self.sources.is_empty() && self.entries.is_empty()
    }

    /// Latest known modification time across the backing resources.
    pub fn source_modified_at(&self) -> Option<SystemTime> {
        self.sources.iter().filter_map(|s| s.modified_at).max()
    }

    /// When this table was (re)validated. `None` never expires.
    pub fn cached_at(&self) -> Option<Instant> {
        *self.cached_at.lock()
    }

    /// Renew the cache stamp after a refresh found nothing changed.
    pub(crate) fn restamp(&self, cached_at: Option<Instant>) {
        *self.cached_at.lock() = cached_at;
    }

    /// Compiled pattern for `key`, memoized per `(key, locale)`.
    ///
    /// Returns `None` when the key is absent. Text that doesn't compile
    /// is logged and served as a literal pattern.
    pub fn pattern(&self, key: &str, locale: &Locale) -> Option<Arc<MessagePattern>> {
        let text = self.entries.get(key)?;

        let mut patterns = self.patterns.lock();
        if let Some(pattern) = patterns.get(key).and_then(|by_locale| by_locale.get(locale)) {
            return Some(Arc::clone(pattern));
        }

        let pattern = match MessagePattern::compile(text, locale.clone()) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(key, locale = %locale, error = %e, "Invalid message pattern, using literal text");
                MessagePattern::literal(text, locale.clone())
            }
        };
        let pattern = Arc::new(pattern);
        patterns
            .entry(key.to_string())
            .or_default()
            .insert(locale.clone(), Arc::clone(&pattern));
        Some(pattern)
    }

    /// Number of memoized patterns.
    pub fn compiled_pattern_count(&self) -> usize {
        self.patterns.lock().values().map(HashMap::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_not_found_table() {
        let table = FileTable::not_found(None);
        assert!(table.is_not_found());
        assert!(table.is_empty());
        assert_eq!(table.get("anything"), None);
        assert_eq!(table.source_modified_at(), None);
    }

    #[test]
    fn test_single_source_shares_entries() {
        let snapshot = SourceSnapshot::new("a.properties", None, props(&[("k", "v")]));
        let shared = Arc::clone(&snapshot.entries);
        let table = FileTable::from_sources(vec![snapshot], None);

        assert_eq!(table.get("k"), Some("v"));
        assert!(Arc::ptr_eq(&shared, &table.entries));
    }

    #[test]
    fn test_later_sources_override() {
        let table = FileTable::from_sources(
            vec![
                SourceSnapshot::new("a", None, props(&[("k", "first"), ("only_a", "1")])),
                SourceSnapshot::new("b", None, props(&[("k", "second")])),
            ],
            None,
        );

        assert_eq!(table.get("k"), Some("second"));
        assert_eq!(table.get("only_a"), Some("1"));
        assert_eq!(table.len(), 2);
        assert!(table.source("a").is_some());
        assert!(table.source("c").is_none());
    }

    #[test]
    fn test_source_modified_at_is_latest_known() {
        let early = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        let late = SystemTime::UNIX_EPOCH + Duration::from_secs(200);
        let table = FileTable::from_sources(
            vec![
                SourceSnapshot::new("a", Some(late), Properties::new()),
                SourceSnapshot::new("b", None, Properties::new()),
                SourceSnapshot::new("c", Some(early), Properties::new()),
            ],
            None,
        );
        assert_eq!(table.source_modified_at(), Some(late));
    }

    #[test]
    fn test_empty_source_is_not_negative() {
        let table = FileTable::from_sources(
            vec![SourceSnapshot::new("empty.properties", None, Properties::new())],
            None,
        );
        assert!(table.is_empty());
        assert!(!table.is_not_found());
    }

    #[test]
    fn test_restamp() {
        let now = Instant::now();
        let table = FileTable::not_found(Some(now));
        assert_eq!(table.cached_at(), Some(now));

        let later = now + Duration::from_secs(1);
        table.restamp(Some(later));
        assert_eq!(table.cached_at(), Some(later));
    }

    #[test]
    fn test_pattern_is_memoized_per_locale() {
        let table = FileTable::merged(props(&[("greeting", "Hello, {0}!")]));
        let en = Locale::language_only("en");
        let de = Locale::language_only("de");

        let first = table.pattern("greeting", &en).unwrap();
        let second = table.pattern("greeting", &en).unwrap();
        let german = table.pattern("greeting", &de).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!Arc::ptr_eq(&first, &german));
        assert_eq!(german.locale(), &de);
        assert_eq!(table.compiled_pattern_count(), 2);
        assert_eq!(first.render(&[&"World"]), "Hello, World!");
    }

    #[test]
    fn test_pattern_missing_key() {
        let table = FileTable::merged(Properties::new());
        assert!(table.pattern("nope", &Locale::root()).is_none());
        assert_eq!(table.compiled_pattern_count(), 0);
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_literal() {
        let table = FileTable::merged(props(&[("broken", "Hello {name}")]));
        let pattern = table.pattern("broken", &Locale::root()).unwrap();
        assert_eq!(pattern.render(&[&"x"]), "Hello {name}");
    }
}
