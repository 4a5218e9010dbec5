//! Resource resolution for bundle files.
//!
//! A [`ResourceLoader`] maps a location such as `i18n/messages_de.properties`
//! to zero, one or many [`Resource`] handles. The bundle cache never touches
//! the filesystem directly; everything goes through these traits so callers
//! can plug in packaged or remote resources.
//!
//! # Available Loaders
//!
//! - [`FileSystemLoader`]: one handle per location, rooted in a directory
//! - [`PatternLoader`]: glob matching, every match becomes a handle
//! - [`EmbeddedLoader`]: in-memory resources without modification times
//!
//! # Multi-match
//!
//! When a loader returns several handles for one location, all of them are
//! loaded and merged in the returned order; later handles override earlier
//! ones on key collisions.

mod embedded;
mod file;
mod pattern;

use std::io::{self, Read};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::ResolveError;

pub use embedded::{EmbeddedLoader, EmbeddedResource};
pub use file::{FileResource, FileSystemLoader};
pub use pattern::PatternLoader;

/// A readable bundle resource.
///
/// # Thread Safety
///
/// Handles are shared across lookup threads and must be `Send + Sync`.
pub trait Resource: Send + Sync {
    /// Whether the resource currently exists.
    fn exists(&self) -> bool;

    /// Last modification time.
    ///
    /// Returns an error when the notion doesn't apply (packaged resources)
    /// or the time can't be read. Callers treat errors as "unknown".
    fn last_modified(&self) -> io::Result<SystemTime>;

    /// Open the resource for reading.
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>>;

    /// Human-readable name for logs and diagnostics.
    ///
    /// Must be stable across resolutions of the same resource; refreshes
    /// use it to match a resource with its previous snapshot.
    fn display_name(&self) -> String;

    /// File name including extension, if the resource has one.
    fn filename(&self) -> Option<String>;
}

/// Resolves locations to resource handles.
///
/// Implementations decide whether a location is a literal path or a
/// pattern. A literal loader returns exactly one handle (which may not
/// exist); a pattern loader returns every match.
pub trait ResourceLoader: Send + Sync {
    /// Resolve a location to its resources, in merge order.
    fn resolve(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>, ResolveError>;
}

/// Read a resource fully into memory.
pub(crate) fn read_all(resource: &dyn Resource) -> io::Result<Vec<u8>> {
    let mut reader = resource.open()?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}
