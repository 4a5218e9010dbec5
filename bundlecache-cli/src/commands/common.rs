//! Common types and utilities shared across CLI commands.

use std::path::{Path, PathBuf};

use bundlecache::config::config_file_path;
use bundlecache::{BundleResolver, CacheTtl, ConfigFile, Locale, ResolutionMode};
use clap::Args;

use crate::error::CliError;

/// Bundle selection arguments. CLI values override the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct BundleArgs {
    /// Directory containing the bundle files
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Base name to search (repeat for several, in priority order)
    #[arg(short, long = "basename")]
    pub basenames: Vec<String>,

    /// Treat base names as glob patterns
    #[arg(long)]
    pub pattern: bool,

    /// Default locale for fallback (e.g. en_US)
    #[arg(long)]
    pub default_locale: Option<String>,

    /// Don't fall back to the default locale
    #[arg(long)]
    pub no_fallback: bool,

    /// Cache TTL in seconds (negative caches forever)
    #[arg(long, allow_hyphen_values = true)]
    pub cache_seconds: Option<i64>,
}

/// Load the config file from `path`, or the default location if it exists.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => match config_file_path() {
            Ok(default) if default.exists() => Ok(ConfigFile::load_from(&default)?),
            _ => Ok(ConfigFile::default()),
        },
    }
}

/// Parse a locale argument.
pub fn parse_locale(value: &str) -> Result<Locale, CliError> {
    value
        .parse()
        .map_err(|e| CliError::Config(format!("{}", e)))
}

/// Apply CLI overrides on top of the config file.
pub fn apply_overrides(mut config: ConfigFile, args: &BundleArgs) -> Result<ConfigFile, CliError> {
    if let Some(dir) = &args.dir {
        config.directory = Some(dir.clone());
    }
    if !args.basenames.is_empty() {
        config.resolver.basenames = args.basenames.clone();
    }
    if args.pattern {
        config.resolution = ResolutionMode::Pattern;
    }
    if let Some(locale) = &args.default_locale {
        config.resolver.default_locale = Some(parse_locale(locale)?);
    }
    if args.no_fallback {
        config.resolver.fallback_to_default_locale = false;
    }
    if let Some(secs) = args.cache_seconds {
        config.resolver.ttl = CacheTtl::from_secs(secs);
    }
    Ok(config)
}

/// Build a resolver from the config file and CLI overrides.
pub fn build_resolver(config: ConfigFile, args: &BundleArgs) -> Result<BundleResolver, CliError> {
    let config = apply_overrides(config, args)?;
    if config.resolver.basenames.is_empty() {
        return Err(CliError::Config(
            "No base names configured. \
             Set basenames in config.ini or use --basename"
                .to_string(),
        ));
    }

    let loader = config.loader();
    tracing::debug!(
        directory = ?config.directory,
        resolution = %config.resolution,
        "Building resolver"
    );
    Ok(BundleResolver::new(config.resolver, loader)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_take_precedence() {
        let args = BundleArgs {
            dir: Some(PathBuf::from("/tmp/bundles")),
            basenames: vec!["cli".to_string()],
            pattern: true,
            default_locale: Some("fr_CA".to_string()),
            no_fallback: true,
            cache_seconds: Some(-1),
        };
        let mut config = ConfigFile::default();
        config.resolver.basenames = vec!["from_file".to_string()];
        config.resolver.ttl = CacheTtl::from_secs(30);

        let config = apply_overrides(config, &args).unwrap();
        assert_eq!(config.directory, Some(PathBuf::from("/tmp/bundles")));
        assert_eq!(config.resolver.basenames, vec!["cli"]);
        assert_eq!(config.resolution, ResolutionMode::Pattern);
        assert_eq!(config.resolver.default_locale, Some(Locale::new("fr", "CA", "")));
        assert!(!config.resolver.fallback_to_default_locale);
        assert_eq!(config.resolver.ttl, CacheTtl::Forever);
    }

    #[test]
    fn test_build_resolver_requires_basenames() {
        let err = build_resolver(ConfigFile::default(), &BundleArgs::default()).unwrap_err();
        assert!(err.to_string().contains("--basename"));
    }

    #[test]
    fn test_load_config_from_explicit_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[bundles]\nbasenames = app\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.resolver.basenames, vec!["app"]);
    }
}
