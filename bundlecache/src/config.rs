//! Resolver configuration.
//!
//! [`ResolverConfig`] carries everything the bundle caches need: base
//! names, encodings, locale fallback and the cache TTL. It can be built in
//! code or loaded from an INI file through [`ConfigFile`]:
//!
//! ```ini
//! [bundles]
//! basenames = messages, messages_overrides
//! directory = /srv/app/i18n
//! resolution = single
//! default_encoding = UTF-8
//! fallback_to_default_locale = true
//! default_locale = en_US
//! cache_seconds = -1
//!
//! [encodings]
//! messages_de = ISO-8859-1
//!
//! [logging]
//! level = info
//! directory = /var/log/bundlecache
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ini::Ini;

use crate::error::{ConfigError, ConfigResult};
use crate::locale::Locale;
use crate::logging::LoggingConfig;
use crate::resource::{FileSystemLoader, PatternLoader, ResourceLoader};

/// Configuration file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Application directory name inside the platform config directory.
pub const APP_DIR_NAME: &str = "bundlecache";

/// How long a loaded bundle file stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheTtl {
    /// Load once, never revalidate. Enables the merged per-locale view.
    #[default]
    Forever,

    /// Revalidate entries older than the duration.
    ///
    /// A zero duration revalidates on every access.
    Expires(Duration),
}

impl CacheTtl {
    /// Revalidate on every access.
    pub const ALWAYS_REFRESH: Self = Self::Expires(Duration::ZERO);

    /// Convert signed seconds; negative means [`CacheTtl::Forever`].
    pub fn from_secs(secs: i64) -> Self {
        u64::try_from(secs)
            .map(|s| Self::Expires(Duration::from_secs(s)))
            .unwrap_or(Self::Forever)
    }

    /// Convert signed milliseconds; negative means [`CacheTtl::Forever`].
    pub fn from_millis(millis: i64) -> Self {
        u64::try_from(millis)
            .map(|ms| Self::Expires(Duration::from_millis(ms)))
            .unwrap_or(Self::Forever)
    }

    /// True when entries can expire.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Expires(_))
    }

    /// Check whether an entry stamped at `cached_at` is still fresh.
    ///
    /// An entry without a stamp never expires.
    pub fn is_fresh(&self, cached_at: Option<Instant>, now: Instant) -> bool {
        match (self, cached_at) {
            (Self::Forever, _) | (_, None) => true,
            (Self::Expires(ttl), Some(at)) => now.saturating_duration_since(at) < *ttl,
        }
    }
}

impl fmt::Display for CacheTtl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forever => write!(f, "forever"),
            Self::Expires(ttl) if ttl.is_zero() => write!(f, "always refresh"),
            Self::Expires(ttl) => write!(f, "{}ms", ttl.as_millis()),
        }
    }
}

/// Configuration for a [`crate::BundleResolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base names in priority order.
    pub basenames: Vec<String>,

    /// Encoding for text bundles without a per-file override.
    ///
    /// `None` uses UTF-8.
    pub default_encoding: Option<String>,

    /// Per-identifier encoding overrides (`messages_de` → `ISO-8859-1`).
    pub file_encodings: HashMap<String, String>,

    /// Append the default locale's candidates to every fallback chain.
    pub fallback_to_default_locale: bool,

    /// Default locale; `None` reads it from the environment.
    pub default_locale: Option<Locale>,

    /// Staleness window for loaded bundle files.
    pub ttl: CacheTtl,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            basenames: Vec::new(),
            default_encoding: None,
            file_encodings: HashMap::new(),
            fallback_to_default_locale: true,
            default_locale: None,
            ttl: CacheTtl::Forever,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a base name (lowest priority so far).
    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basenames.push(basename.into());
        self
    }

    /// Replace the base names.
    pub fn with_basenames<I, S>(mut self, basenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.basenames = basenames.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.default_encoding = Some(encoding.into());
        self
    }

    /// Set the encoding for one candidate identifier.
    pub fn with_file_encoding(
        mut self,
        identifier: impl Into<String>,
        encoding: impl Into<String>,
    ) -> Self {
        self.file_encodings.insert(identifier.into(), encoding.into());
        self
    }

    pub fn with_fallback_to_default_locale(mut self, fallback: bool) -> Self {
        self.fallback_to_default_locale = fallback;
        self
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = Some(locale);
        self
    }

    pub fn with_ttl(mut self, ttl: CacheTtl) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the TTL in signed seconds (negative caches forever).
    pub fn with_cache_seconds(self, secs: i64) -> Self {
        self.with_ttl(CacheTtl::from_secs(secs))
    }

    /// Base names trimmed, rejecting empty ones.
    pub fn validated_basenames(&self) -> ConfigResult<Vec<String>> {
        self.basenames
            .iter()
            .map(|name| {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    Err(ConfigError::EmptyBasename)
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect()
    }

    /// The configured default locale, or the environment's.
    pub fn effective_default_locale(&self) -> Locale {
        self.default_locale
            .clone()
            .unwrap_or_else(Locale::system_default)
    }
}

/// How bundle locations map to files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// One file per location ([`FileSystemLoader`]).
    #[default]
    Single,
    /// Locations are glob patterns ([`PatternLoader`]).
    Pattern,
}

impl FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "pattern" | "glob" => Ok(Self::Pattern),
            other => Err(format!("expected 'single' or 'pattern', got '{}'", other)),
        }
    }
}

impl fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Pattern => write!(f, "pattern"),
        }
    }
}

/// Contents of the INI configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Resolver settings from `[bundles]` and `[encodings]`.
    pub resolver: ResolverConfig,

    /// Root directory for bundle files. `None` means the working directory.
    pub directory: Option<PathBuf>,

    /// Location resolution mode.
    pub resolution: ResolutionMode,

    /// Settings from `[logging]`.
    pub logging: LoggingConfig,
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    /// Load from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Parse INI text. `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> ConfigResult<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();

        if let Some(bundles) = ini.section(Some("bundles")) {
            if let Some(value) = bundles.get("basenames") {
                config.resolver.basenames = split_list(value);
            }
            if let Some(value) = bundles.get("directory") {
                config.directory = Some(PathBuf::from(value.trim()));
            }
            if let Some(value) = bundles.get("resolution") {
                config.resolution = value
                    .parse()
                    .map_err(|reason| invalid("bundles", "resolution", value, reason))?;
            }
            if let Some(value) = bundles.get("default_encoding") {
                config.resolver.default_encoding = non_empty(value);
            }
            if let Some(value) = bundles.get("fallback_to_default_locale") {
                config.resolver.fallback_to_default_locale =
                    parse_bool("bundles", "fallback_to_default_locale", value)?;
            }
            if let Some(value) = bundles.get("default_locale") {
                let locale = value.parse::<Locale>().map_err(|e| {
                    invalid("bundles", "default_locale", value, e.to_string())
                })?;
                config.resolver.default_locale = Some(locale);
            }
            if let Some(value) = bundles.get("cache_seconds") {
                let secs = value.trim().parse::<i64>().map_err(|_| {
                    invalid("bundles", "cache_seconds", value, "expected an integer".into())
                })?;
                config.resolver.ttl = CacheTtl::from_secs(secs);
            }
        }

        if let Some(encodings) = ini.section(Some("encodings")) {
            for (identifier, encoding) in encodings.iter() {
                config
                    .resolver
                    .file_encodings
                    .insert(identifier.trim().to_string(), encoding.trim().to_string());
            }
        }

        if let Some(logging) = ini.section(Some("logging")) {
            if let Some(value) = logging.get("level") {
                config.logging.level = value.trim().to_string();
            }
            if let Some(value) = logging.get("directory") {
                config.logging.directory = non_empty(value).map(PathBuf::from);
            }
            if let Some(value) = logging.get("file_name") {
                config.logging.file_name = value.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Build the resource loader described by this file.
    pub fn loader(&self) -> Arc<dyn ResourceLoader> {
        let root = self
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        match self.resolution {
            ResolutionMode::Single => Arc::new(FileSystemLoader::new(root)),
            ResolutionMode::Pattern => Arc::new(PatternLoader::new(root)),
        }
    }
}

/// Default configuration file path (`<config dir>/bundlecache/config.ini`).
pub fn config_file_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_bool(section: &str, key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "expected true or false".into())),
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}
