//! Filesystem-backed resources.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::{Resource, ResourceLoader};
use crate::error::ResolveError;

/// A bundle file on disk.
#[derive(Debug, Clone)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Resource for FileResource {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn last_modified(&self) -> io::Result<SystemTime> {
        self.path.metadata()?.modified()
    }

    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn display_name(&self) -> String {
        self.path.display().to_string()
    }

    fn filename(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// Single-path loader rooted in a directory.
///
/// Every location maps to exactly one [`FileResource`] at
/// `root/location`, whether or not the file exists.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    root: PathBuf,
}

impl FileSystemLoader {
    /// Create a loader resolving locations relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for FileSystemLoader {
    fn resolve(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>, ResolveError> {
        let resource: Arc<dyn Resource> = Arc::new(FileResource::new(self.root.join(location)));
        Ok(vec![resource])
    }
}
