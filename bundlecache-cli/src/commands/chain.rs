//! Chain command - print the candidate files for a locale.

use bundlecache::{fallback_chain, ConfigFile, Locale};

use super::common::{apply_overrides, parse_locale, BundleArgs};
use crate::error::CliError;

/// Arguments for the chain command.
pub struct ChainArgs {
    pub locale: String,
    pub bundles: BundleArgs,
}

/// Run the chain command.
pub fn run(args: ChainArgs, config: ConfigFile) -> Result<(), CliError> {
    let config = apply_overrides(config, &args.bundles)?;
    let locale = parse_locale(&args.locale)?;
    let default_locale = config.resolver.effective_default_locale();

    if config.resolver.basenames.is_empty() {
        return Err(CliError::Config(
            "No base names configured. \
             Set basenames in config.ini or use --basename"
                .to_string(),
        ));
    }

    println!("Locale:         {}", display_locale(&locale));
    println!("Default locale: {}", display_locale(&default_locale));
    println!(
        "Fallback:       {}",
        if config.resolver.fallback_to_default_locale {
            "enabled"
        } else {
            "disabled"
        }
    );

    for basename in config.resolver.validated_basenames()? {
        println!();
        println!("[{}]", basename);
        let chain = fallback_chain(
            &basename,
            &locale,
            &default_locale,
            config.resolver.fallback_to_default_locale,
        );
        for (i, candidate) in chain.iter().enumerate() {
            println!("  {}. {}", i + 1, candidate);
        }
    }

    Ok(())
}

fn display_locale(locale: &Locale) -> String {
    if locale.is_root() {
        "(root)".to_string()
    } else {
        locale.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_locale() {
        assert_eq!(display_locale(&Locale::root()), "(root)");
        assert_eq!(display_locale(&Locale::new("pt", "BR", "")), "pt_BR");
    }
}
