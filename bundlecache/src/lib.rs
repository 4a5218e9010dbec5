//! Bundlecache - locale-aware, time-bounded caching of message bundles
//!
//! This library resolves message keys against families of `.properties`
//! (or XML properties) files addressed by a base name and a locale. Lookups
//! walk a locale fallback chain (`messages_de_AT` → `messages_de` →
//! `messages`) and are served from layered caches:
//!
//! - fallback chains are memoized per base name and locale
//! - parsed files are cached per candidate with a configurable TTL and
//!   reused when their modification time hasn't changed
//! - with an infinite TTL, one merged table per locale answers every lookup
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bundlecache::{BundleResolver, EmbeddedLoader, Locale, ResolverConfig};
//!
//! let loader = EmbeddedLoader::new().with("app.properties", "title=Inbox ({0})");
//! let resolver = BundleResolver::new(
//!     ResolverConfig::new().with_basename("app"),
//!     Arc::new(loader),
//! )
//! .unwrap();
//!
//! let pattern = resolver.resolve_format("title", &Locale::language_only("en")).unwrap();
//! assert_eq!(pattern.render(&[&3]), "Inbox (3)");
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fallback;
pub mod format;
pub mod load;
pub mod locale;
pub mod logging;
pub mod properties;
pub mod resolver;
pub mod resource;
pub mod table;

pub use cache::CacheStats;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheTtl, ConfigFile, ResolutionMode, ResolverConfig};
pub use error::{
    ConfigError, ConfigResult, LoadError, LoggingError, PatternError, PropertiesError,
    ResolveError,
};
pub use fallback::fallback_chain;
pub use format::MessagePattern;
pub use locale::{InvalidLocale, Locale};
pub use logging::{init_logging, LoggingConfig, LoggingGuard};
pub use resolver::BundleResolver;
pub use resource::{
    EmbeddedLoader, EmbeddedResource, FileResource, FileSystemLoader, PatternLoader, Resource,
    ResourceLoader,
};
pub use table::{FileTable, SourceSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
