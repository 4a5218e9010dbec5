//! Bundlecache CLI - Command-line interface
//!
//! Resolve message keys, inspect locale fallback chains and dump merged
//! bundles from the command line.

mod commands;
mod error;

use std::path::PathBuf;

use bundlecache::{init_logging, ConfigFile};
use clap::{Parser, Subcommand};

use commands::chain::ChainArgs;
use commands::common::{load_config, BundleArgs};
use commands::config::ConfigCommands;
use commands::dump::DumpArgs;
use commands::resolve::ResolveArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "bundlecache")]
#[command(version = bundlecache::VERSION)]
#[command(about = "Resolve and inspect locale-aware message bundles", long_about = None)]
struct Cli {
    /// Configuration file (default: <config dir>/bundlecache/config.ini)
    #[arg(long = "config", global = true)]
    config_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a message key for a locale
    Resolve {
        /// Message key
        key: String,

        /// Positional arguments substituted into {0}, {1}, ...
        args: Vec<String>,

        /// Locale to resolve for (default: configured default locale)
        #[arg(short, long)]
        locale: Option<String>,

        /// Print cache statistics to stderr
        #[arg(long)]
        stats: bool,

        #[command(flatten)]
        bundles: BundleArgs,
    },

    /// Print the candidate bundle files for a locale
    Chain {
        /// Locale to derive the chain for (e.g. de_AT)
        locale: String,

        #[command(flatten)]
        bundles: BundleArgs,
    },

    /// Print every key visible for a locale
    Dump {
        /// Locale to dump (default: configured default locale)
        #[arg(short, long)]
        locale: Option<String>,

        #[command(flatten)]
        bundles: BundleArgs,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config_file.as_deref()) {
        Ok(config) => config,
        Err(e) => e.exit(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    let _guard = match init_logging(&logging) {
        Ok(guard) => guard,
        Err(e) => CliError::from(e).exit(),
    };

    if let Err(e) = run(cli.command, config) {
        e.exit();
    }
}

fn run(command: Commands, config: ConfigFile) -> Result<(), CliError> {
    match command {
        Commands::Resolve {
            key,
            args,
            locale,
            stats,
            bundles,
        } => commands::resolve::run(
            ResolveArgs {
                key,
                args,
                locale,
                stats,
                bundles,
            },
            config,
        ),
        Commands::Chain { locale, bundles } => {
            commands::chain::run(ChainArgs { locale, bundles }, config)
        }
        Commands::Dump { locale, bundles } => {
            commands::dump::run(DumpArgs { locale, bundles }, config)
        }
        Commands::Config { command } => commands::config::run(command, &config),
    }
}
