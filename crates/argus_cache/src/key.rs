//! Version-scoped cache keys for per-file flow-IR entries.

use std::fmt;

/// Fixed namespace segments identifying Argus flow-IR entries in the host
/// platform's key-value cache.
const KEY_NAMESPACE: [&str; 2] = ["argus", "flowir"];

/// The persistence address of one file's cached flow-IR bundle.
///
/// A key is built fresh for every file in every run and never mutated. Its
/// rendered form is the literal lookup string handed to the cache store:
/// `argus:flowir:<fileKey>`, or `argus:flowir:<version>:<fileKey>` when the
/// analyzer plugin reports a version. Including the version means upgrading
/// the plugin invalidates entries written by older versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    plugin_version: Option<String>,
    file_key: String,
}

impl CacheKey {
    /// Builds the cache key for a file.
    ///
    /// `plugin_version` is included as an extra segment only when it is
    /// `Some` and non-empty.
    pub fn for_file(file_key: &str, plugin_version: Option<&str>) -> Self {
        Self {
            plugin_version: plugin_version
                .filter(|v| !v.is_empty())
                .map(str::to_string),
            file_key: file_key.to_string(),
        }
    }

    /// Returns the stable identity of the file this key addresses.
    pub fn file_key(&self) -> &str {
        &self.file_key
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", KEY_NAMESPACE[0], KEY_NAMESPACE[1])?;
        if let Some(version) = &self.plugin_version {
            write!(f, ":{version}")?;
        }
        write!(f, ":{}", self.file_key)
    }
}
