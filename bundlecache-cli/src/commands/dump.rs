//! Dump command - print every key visible for a locale.

use bundlecache::{BundleResolver, ConfigFile, Locale};

use super::common::{build_resolver, parse_locale, BundleArgs};
use crate::error::CliError;

/// Arguments for the dump command.
pub struct DumpArgs {
    pub locale: Option<String>,
    pub bundles: BundleArgs,
}

/// Run the dump command.
pub fn run(args: DumpArgs, config: ConfigFile) -> Result<(), CliError> {
    let resolver = build_resolver(config, &args.bundles)?;
    let locale = match &args.locale {
        Some(value) => parse_locale(value)?,
        None => resolver.default_locale().clone(),
    };

    for line in dump_lines(&resolver, &locale) {
        println!("{}", line);
    }
    Ok(())
}

/// `key = value` lines of the merged view, sorted by key.
fn dump_lines(resolver: &BundleResolver, locale: &Locale) -> Vec<String> {
    let view = resolver.merged_view(locale);
    let mut entries: Vec<_> = view.entries().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
        .into_iter()
        .map(|(key, value)| format!("{} = {}", key, value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use bundlecache::{EmbeddedLoader, ResolverConfig};

    #[test]
    fn test_dump_lines_sorted_and_merged() {
        let loader = EmbeddedLoader::new()
            .with("app.properties", "b=root\na=root")
            .with("app_de.properties", "b=de");
        let resolver = BundleResolver::new(
            ResolverConfig::new()
                .with_basename("app")
                .with_default_locale(Locale::language_only("en")),
            Arc::new(loader),
        )
        .unwrap();

        let lines = dump_lines(&resolver, &Locale::language_only("de"));
        assert_eq!(lines, vec!["a = root", "b = de"]);
    }
}
