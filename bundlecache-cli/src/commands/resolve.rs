//! Resolve command - render one message key.

use std::fmt::Display;

use bundlecache::{BundleResolver, ConfigFile, Locale};
use console::style;

use super::common::{build_resolver, parse_locale, BundleArgs};
use crate::error::CliError;

/// Arguments for the resolve command.
pub struct ResolveArgs {
    pub key: String,
    pub args: Vec<String>,
    pub locale: Option<String>,
    pub stats: bool,
    pub bundles: BundleArgs,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs, config: ConfigFile) -> Result<(), CliError> {
    let resolver = build_resolver(config, &args.bundles)?;
    let locale = match &args.locale {
        Some(value) => parse_locale(value)?,
        None => resolver.default_locale().clone(),
    };

    println!("{}", render(&resolver, &args.key, &args.args, &locale));

    if args.stats {
        let stats = resolver.stats();
        eprintln!();
        eprintln!("Cache statistics");
        eprintln!("  Hits:            {}", stats.hits);
        eprintln!("  Refreshes:       {}", stats.refreshes);
        eprintln!("  Skipped reloads: {}", stats.skipped_reloads);
        eprintln!("  Not found:       {}", stats.negative_entries);
    }

    Ok(())
}

/// Render `key`, or a `???key???` placeholder if no bundle defines it.
pub fn render(resolver: &BundleResolver, key: &str, args: &[String], locale: &Locale) -> String {
    let args: Vec<&dyn Display> = args.iter().map(|a| a as &dyn Display).collect();
    match resolver.message(key, &args, locale) {
        Some(text) => text,
        None => style(missing_placeholder(key)).yellow().to_string(),
    }
}

fn missing_placeholder(key: &str) -> String {
    format!("???{}???", key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bundlecache::{EmbeddedLoader, ResolverConfig};

    fn resolver() -> BundleResolver {
        let loader = EmbeddedLoader::new()
            .with("app.properties", "greeting=Hello, {0}!\nplain=No args");
        BundleResolver::new(
            ResolverConfig::new()
                .with_basename("app")
                .with_default_locale(Locale::language_only("en")),
            Arc::new(loader),
        )
        .unwrap()
    }

    #[test]
    fn test_render_with_args() {
        let text = render(
            &resolver(),
            "greeting",
            &["World".to_string()],
            &Locale::language_only("en"),
        );
        assert_eq!(text, "Hello, World!");
    }

    #[test]
    fn test_render_without_args() {
        let text = render(&resolver(), "plain", &[], &Locale::language_only("en"));
        assert_eq!(text, "No args");
    }

    #[test]
    fn test_missing_placeholder() {
        assert_eq!(missing_placeholder("nav.home"), "???nav.home???");
        let text = render(&resolver(), "nav.home", &[], &Locale::language_only("en"));
        assert!(text.contains("???nav.home???"));
    }
}
