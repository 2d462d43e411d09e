//! Content hashing for stable cache entry addressing.

use std::fmt;

/// A 128-bit XXH3 content hash.
///
/// Used to derive stable on-disk names for cache entries: hashing the
/// rendered cache key yields a filesystem-safe identifier that is identical
/// across process restarts for the same key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Computes the XXH3-128 hash of the given bytes.
    pub fn of(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data))
    }

    /// Returns the hash as a fixed-width lowercase hex string (32 chars).
    pub fn to_hex(self) -> String {
        format!("{:032x}", self.0)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:08x}..)", (self.0 >> 96) as u32)
    }
}
