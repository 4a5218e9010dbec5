//! Configuration CLI commands.

use bundlecache::config::config_file_path;
use bundlecache::ConfigFile;
use clap::Subcommand;

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config: &ConfigFile) -> Result<(), CliError> {
    match command {
        ConfigCommands::Path => run_path(),
        ConfigCommands::Show => {
            run_show(config);
            Ok(())
        }
    }
}

/// Show the configuration file path.
fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path()?.display());
    Ok(())
}

/// Print the loaded settings in INI layout.
fn run_show(config: &ConfigFile) {
    let resolver = &config.resolver;

    println!("[bundles]");
    println!("  basenames = {}", or_not_set(&resolver.basenames.join(", ")));
    println!(
        "  directory = {}",
        config
            .directory
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(working directory)".to_string())
    );
    println!("  resolution = {}", config.resolution);
    println!(
        "  default_encoding = {}",
        resolver.default_encoding.as_deref().unwrap_or("UTF-8")
    );
    println!(
        "  fallback_to_default_locale = {}",
        resolver.fallback_to_default_locale
    );
    println!(
        "  default_locale = {}",
        resolver.effective_default_locale()
    );
    println!("  cache = {}", resolver.ttl);

    if !resolver.file_encodings.is_empty() {
        println!();
        println!("[encodings]");
        let mut encodings: Vec<_> = resolver.file_encodings.iter().collect();
        encodings.sort();
        for (identifier, encoding) in encodings {
            println!("  {} = {}", identifier, encoding);
        }
    }

    println!();
    println!("[logging]");
    println!("  level = {}", config.logging.level);
    if let Some(dir) = &config.logging.directory {
        println!("  directory = {}", dir.display());
    }
}

fn or_not_set(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
