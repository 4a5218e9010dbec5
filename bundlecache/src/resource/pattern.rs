//! Glob-based multi-match resolution.
//!
//! Locations are treated as glob patterns relative to a root directory, so a
//! base name like `plugins/*/messages` gathers one bundle file per plugin.
//! Matches come back in lexical path order, which is also the merge order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use super::{FileResource, Resource, ResourceLoader};
use crate::error::ResolveError;

/// Loader returning every file matching a glob pattern.
#[derive(Debug, Clone)]
pub struct PatternLoader {
    root: PathBuf,
}

impl PatternLoader {
    /// Create a loader resolving patterns relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceLoader for PatternLoader {
    fn resolve(&self, location: &str) -> Result<Vec<Arc<dyn Resource>>, ResolveError> {
        let full = self.root.join(location);
        let pattern = full.to_string_lossy();

        let paths = glob::glob(&pattern).map_err(|e| ResolveError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        let mut resources: Vec<Arc<dyn Resource>> = Vec::new();
        for entry in paths {
            match entry {
                Ok(path) if path.is_file() => resources.push(Arc::new(FileResource::new(path))),
                Ok(_) => {}
                // Unreadable directories are skipped, the remaining matches still count
                Err(e) => warn!(pattern = %pattern, error = %e, "Skipping unreadable match"),
            }
        }

        Ok(resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(temp: &TempDir, rel: &str, content: &str) {
        let path = temp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_no_match_is_empty() {
        let temp = TempDir::new().unwrap();
        let loader = PatternLoader::new(temp.path());
        assert!(loader.resolve("*/messages.properties").unwrap().is_empty());
    }

    #[test]
    fn test_multiple_matches_in_lexical_order() {
        let temp = TempDir::new().unwrap();
        write(&temp, "b/messages.properties", "k=b");
        write(&temp, "a/messages.properties", "k=a");
        write(&temp, "c/other.properties", "k=c");

        let loader = PatternLoader::new(temp.path());
        let resources = loader.resolve("*/messages.properties").unwrap();

        let names: Vec<_> = resources.iter().map(|r| r.display_name()).collect();
        assert_eq!(names.len(), 2);
        assert!(names[0].ends_with("a/messages.properties"));
        assert!(names[1].ends_with("b/messages.properties"));
    }

    #[test]
    fn test_literal_location_matches_single_file() {
        let temp = TempDir::new().unwrap();
        write(&temp, "messages_en.properties", "k=v");

        let loader = PatternLoader::new(temp.path());
        let resources = loader.resolve("messages_en.properties").unwrap();
        assert_eq!(resources.len(), 1);
        assert!(resources[0].exists());
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let temp = TempDir::new().unwrap();
        let loader = PatternLoader::new(temp.path());
        let result = loader.resolve("[messages.properties");
        assert!(matches!(result, Err(ResolveError::InvalidPattern { .. })));
    }
}
