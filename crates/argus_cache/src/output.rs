//! The working output store the rule engine reads generated units from.
//!
//! Units materialized from a cache hit and units freshly produced by the
//! analysis both land here, keyed by their relative names. Names are
//! validated before touching the filesystem so a hostile blob cannot write
//! outside the output root.

use std::path::{Path, PathBuf};

use crate::bundle::unit_name_problem;
use crate::error::CacheError;

/// Directory holding the generated units of the current analysis run.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Creates a handle rooted at the given directory.
    ///
    /// The directory itself is created lazily on the first write.
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Returns the output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the on-disk path for a unit name, validating the name.
    pub fn unit_path(&self, name: &str) -> Result<PathBuf, CacheError> {
        if let Some(reason) = unit_name_problem(name) {
            return Err(CacheError::InvalidUnitName {
                name: name.to_string(),
                reason,
            });
        }
        Ok(self.root.join(name))
    }

    /// Writes a unit under its relative name, creating parent directories.
    pub fn write_unit(&self, name: &str, content: &[u8]) -> Result<(), CacheError> {
        let path = self.unit_path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&path, content).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Reads a unit back by its relative name, or `None` if absent.
    pub fn read_unit(&self, name: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.unit_path(name)?;
        match std::fs::read(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }

    /// Removes a unit if present. Absent units are not an error.
    pub fn remove_unit(&self, name: &str) -> Result<(), CacheError> {
        let path = self.unit_path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }
}
