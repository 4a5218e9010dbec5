//! Error types for bundle loading and configuration.
//!
//! None of these errors escape a lookup. Loading failures are logged and the
//! affected candidate degrades to "no entries", letting the fallback chain
//! continue. Only configuration and logging setup surface errors to callers.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors resolving a bundle location to resource handles.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The location is not a valid glob pattern.
    #[error("Invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// I/O error while enumerating matches.
    ///
    /// The bundled loaders never fail this way: `FileSystemLoader` returns
    /// a handle without touching the disk and `PatternLoader` skips
    /// unreadable matches. Custom [`ResourceLoader`](crate::ResourceLoader)
    /// implementations backed by remote or enumerated stores report their
    /// listing failures here, and the candidate is cached as absent.
    #[error("I/O error resolving {location:?}: {source}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },
}

/// Errors reading or parsing a single resource.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to open or read the resource.
    #[error("Failed to read {resource}: {source}")]
    Read {
        resource: String,
        #[source]
        source: io::Error,
    },

    /// The configured encoding label is not recognised.
    #[error("Unknown encoding {encoding:?} for {resource}")]
    UnknownEncoding { resource: String, encoding: String },

    /// The resource content is not valid in its format.
    #[error("Failed to parse {resource}: {source}")]
    Parse {
        resource: String,
        #[source]
        source: PropertiesError,
    },
}

/// Syntax errors in properties content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertiesError {
    /// A `\u` escape not followed by four hex digits.
    #[error("Malformed \\uXXXX escape on line {line}")]
    MalformedUnicodeEscape { line: usize },

    /// Invalid XML properties document.
    #[error("Invalid XML properties: {0}")]
    Xml(String),

    /// An `<entry>` element without a `key` attribute.
    #[error("XML entry without key attribute")]
    MissingKey,
}

/// Errors compiling a message pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// A `{` without its closing `}`.
    #[error("Unmatched braces in pattern")]
    UnmatchedBrace,

    /// The argument index is not a non-negative integer.
    #[error("Invalid argument index {0:?}")]
    InvalidIndex(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid INI.
    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    /// A base name is empty after trimming.
    #[error("Base name must not be empty")]
    EmptyBasename,

    /// A key holds a value of the wrong shape.
    #[error("Invalid value {value:?} for {section}.{key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// No configuration directory could be determined.
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Errors installing the logging subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create the log directory.
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A global subscriber is already installed.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}
