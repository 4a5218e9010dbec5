//! In-memory resources.
//!
//! Useful for bundles compiled into the binary with `include_str!` and for
//! tests. Embedded resources have no meaningful modification time, so
//! [`Resource::last_modified`] always fails and refreshes re-parse them.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use super::{Resource, ResourceLoader};
use crate::error::ResolveError;

/// A resource held in memory.
#[derive(Debug, Clone)]
pub struct EmbeddedResource {
    location: String,
    content: Option<Arc<[u8]>>,
}

impl EmbeddedResource {
    fn present(location: &str, content: Arc<[u8]>) -> Self {
        Self {
            location: location.to_string(),
            content: Some(content),
        }
    }

    fn missing(location: &str) -> Self {
        Self {
            location: location.to_string(),
            content: None,
        }
    }
}

impl Resource for EmbeddedResource {
    fn exists(&self) -> bool {
        self.content.is_some()
    }

    fn last_modified(&self) -> io::Result<SystemTime> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{} is embedded and has no modification time", self.location),
        ))
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        match &self.content {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.as_ref()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("embedded resource {} not found", self.location),
            )),
        }
    }

    fn display_name(&self) -> String {
        format!("embedded:{}", self.location)
    }

    fn filename(&self) -> Option<String> {
        self.location.rsplit('/').next().map(str::to_string)
    }
}

/// Loader over a map of location → content.
///
/// Resolution is literal: each location yields one handle, existing or not.
/// Content can be replaced at runtime with [`EmbeddedLoader::insert`].
#[derive(Debug, Default)]
pub struct EmbeddedLoader {
    entries: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl EmbeddedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, builder style.
    pub fn with(self, location: impl Into<String>, content: impl AsRef<[u8]>) -> Self {
        self.insert(location, content);
        self
    }

    /// Add or replace a resource.
    pub fn insert(&self, location: impl Into<String>, content: impl AsRef<[u8]>) {
        self.entries
            .write()
            .insert(location.into(), Arc::from(content.as_ref()));
    }

    /// Remove a resource. Returns true if it existed.
    pub fn remove(&self, location: &str) -> bool {
        self.entries.write().remove(location).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Clone for EmbeddedLoader {
    /// Snapshot the current entries into an independent loader.
    fn clone(&self) -> Self {
        Self {
            entries: RwLock::new(self.entries.read().clone()),
        }
    }
}

impl ResourceLoader for EmbeddedLoader {
    fn resolve(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>, ResolveError> {
        let resource = match self.entries.read().get(location) {
            Some(content) => EmbeddedResource::present(location, Arc::clone(content)),
            None => EmbeddedResource::missing(location),
        };
        Ok(vec![Arc::new(resource)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::read_all;

    #[test]
    fn test_resolve_present() {
        let loader = EmbeddedLoader::new().with("app.properties", "k=v");
        let resources = loader.resolve("app.properties").unwrap();

        assert_eq!(resources.len(), 1);
        assert!(resources[0].exists());
        assert_eq!(read_all(resources[0].as_ref()).unwrap(), b"k=v");
        assert_eq!(resources[0].display_name(), "embedded:app.properties");
    }

    #[test]
    fn test_resolve_missing() {
        let loader = EmbeddedLoader::new();
        let resources = loader.resolve("app.properties").unwrap();

        assert_eq!(resources.len(), 1);
        assert!(!resources[0].exists());
        assert!(resources[0].open().is_err());
    }

    #[test]
    fn test_last_modified_is_unsupported() {
        let loader = EmbeddedLoader::new().with("app.properties", "k=v");
        let resource = &loader.resolve("app.properties").unwrap()[0];
        let err = resource.last_modified().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_filename_strips_directories() {
        let loader = EmbeddedLoader::new().with("i18n/app.xml", "<properties/>");
        let resource = &loader.resolve("i18n/app.xml").unwrap()[0];
        assert_eq!(resource.filename().as_deref(), Some("app.xml"));
    }

    #[test]
    fn test_insert_and_remove() {
        let loader = EmbeddedLoader::new();
        assert!(loader.is_empty());

        loader.insert("a.properties", "x=1");
        assert_eq!(loader.len(), 1);
        assert!(loader.remove("a.properties"));
        assert!(!loader.remove("a.properties"));
    }
}
