//! Key resolution across base names and locales.
//!
//! [`BundleResolver`] ties the caches together. How it searches depends on
//! the TTL:
//!
//! | TTL | Lookup | Base name precedence |
//! |-----|--------|----------------------|
//! | forever | one merged table per locale | later base names win |
//! | expiring | candidate tables one by one | first base name with the key wins |
//!
//! Both modes prefer the most specific locale candidate within a base name.

use std::fmt::{self, Display};
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStats, FileTableCache, FilenameCache, MergedViewCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{CacheTtl, ResolverConfig};
use crate::error::ConfigResult;
use crate::format::MessagePattern;
use crate::load::{EncodingPolicy, TableLoader};
use crate::locale::Locale;
use crate::resource::ResourceLoader;
use crate::table::FileTable;

/// Resolves message keys for locales.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use bundlecache::{BundleResolver, EmbeddedLoader, Locale, ResolverConfig};
///
/// let loader = EmbeddedLoader::new()
///     .with("messages.properties", "greeting=Hello, {0}!")
///     .with("messages_de.properties", "greeting=Hallo, {0}!");
/// let config = ResolverConfig::new()
///     .with_basename("messages")
///     .with_default_locale(Locale::language_only("en"));
/// let resolver = BundleResolver::new(config, Arc::new(loader)).unwrap();
///
/// let de = Locale::new("de", "AT", "");
/// assert_eq!(resolver.resolve_text("greeting", &de).as_deref(), Some("Hallo, {0}!"));
/// assert_eq!(
///     resolver.message("greeting", &[&"Welt"], &de).as_deref(),
///     Some("Hallo, Welt!")
/// );
/// ```
pub struct BundleResolver {
    basenames: Vec<String>,
    ttl: CacheTtl,
    merged: MergedViewCache,
    filenames: FilenameCache,
    tables: FileTableCache,
    parent: Option<Arc<BundleResolver>>,
}

impl BundleResolver {
    /// Create a resolver using the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::EmptyBasename`] if a base name is blank.
    pub fn new(config: ResolverConfig, loader: Arc<dyn ResourceLoader>) -> ConfigResult<Self> {
        Self::with_clock(config, loader, Arc::new(SystemClock))
    }

    /// Create a resolver reading time from `clock`.
    pub fn with_clock(
        config: ResolverConfig,
        loader: Arc<dyn ResourceLoader>,
        clock: Arc<dyn Clock>,
    ) -> ConfigResult<Self> {
        let basenames = config.validated_basenames()?;
        let default_locale = config.effective_default_locale();
        let encodings = EncodingPolicy {
            default_encoding: config.default_encoding,
            file_encodings: config.file_encodings,
        };

        debug!(
            basenames = ?basenames,
            ttl = %config.ttl,
            default_locale = %default_locale,
            "Creating bundle resolver"
        );

        Ok(Self {
            basenames,
            ttl: config.ttl,
            merged: MergedViewCache::new(),
            filenames: FilenameCache::new(default_locale, config.fallback_to_default_locale),
            tables: FileTableCache::new(TableLoader::new(loader, encodings), config.ttl, clock),
            parent: None,
        })
    }

    /// Chain this resolver under `parent`.
    ///
    /// [`BundleResolver::message`] consults the parent for keys this
    /// resolver can't find, and
    /// [`BundleResolver::clear_cache_including_ancestors`] clears it too.
    pub fn with_parent(mut self, parent: Arc<BundleResolver>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn parent(&self) -> Option<&Arc<BundleResolver>> {
        self.parent.as_ref()
    }

    /// Base names in priority order.
    pub fn basenames(&self) -> &[String] {
        &self.basenames
    }

    pub fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    pub fn default_locale(&self) -> &Locale {
        self.filenames.default_locale()
    }

    /// Fallback chain for `basename` and `locale`.
    pub fn candidates(&self, basename: &str, locale: &Locale) -> Arc<Vec<String>> {
        self.filenames.candidates(basename, locale)
    }

    /// Raw text for `key`, `None` if no candidate defines it.
    pub fn resolve_text(&self, key: &str, locale: &Locale) -> Option<String> {
        if !self.ttl.is_enabled() {
            return self.merged_view(locale).get(key).map(str::to_string);
        }

        self.find(locale, |table| table.get(key).map(str::to_string))
    }

    /// Compiled pattern for `key`, memoized per table and locale.
    pub fn resolve_format(&self, key: &str, locale: &Locale) -> Option<Arc<MessagePattern>> {
        if !self.ttl.is_enabled() {
            return self.merged_view(locale).pattern(key, locale);
        }

        self.find(locale, |table| table.pattern(key, locale))
    }

    /// Render `key` with positional arguments.
    ///
    /// Without arguments the raw text is returned unchanged. Keys missing
    /// here are looked up in the parent resolver, if any.
    pub fn message(&self, key: &str, args: &[&dyn Display], locale: &Locale) -> Option<String> {
        let local = if args.is_empty() {
            self.resolve_text(key, locale)
        } else {
            self.resolve_format(key, locale)
                .map(|pattern| pattern.render(args))
        };

        local.or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.message(key, args, locale))
        })
    }

    /// The merged view for `locale`.
    ///
    /// Meaningful only when tables never expire; with an expiring TTL the
    /// view would freeze the first loaded content until the next clear.
    pub fn merged_view(&self, locale: &Locale) -> Arc<FileTable> {
        self.merged
            .get(locale, &self.basenames, &self.filenames, &self.tables)
    }

    /// Drop cached tables and merged views. Fallback chains are kept.
    ///
    /// Tables go first: a merged view built concurrently from pre-clear
    /// tables is then dropped by the second step instead of outliving it.
    pub fn clear_cache(&self) {
        debug!(basenames = ?self.basenames, "Clearing bundle caches");
        self.tables.clear();
        self.merged.clear();
    }

    /// Clear this resolver and every ancestor.
    pub fn clear_cache_including_ancestors(&self) {
        self.clear_cache();
        if let Some(parent) = &self.parent {
            parent.clear_cache_including_ancestors();
        }
    }

    pub fn stats(&self) -> CacheStats {
        self.tables.stats()
    }

    // Walks base names in order, candidates most specific first.
    fn find<T>(&self, locale: &Locale, mut lookup: impl FnMut(&FileTable) -> Option<T>) -> Option<T> {
        for basename in &self.basenames {
            let chain = self.filenames.candidates(basename, locale);
            for identifier in chain.iter() {
                let table = self.tables.get(identifier);
                if let Some(found) = lookup(table.as_ref()) {
                    return Some(found);
                }
            }
        }
        None
    }
}

impl fmt::Display for BundleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BundleResolver: basenames=[{}]", self.basenames.join(", "))
    }
}

impl fmt::Debug for BundleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BundleResolver")
            .field("basenames", &self.basenames)
            .field("ttl", &self.ttl)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
