//! Shared foundational types used across the Argus analyzer.
//!
//! This crate provides core types including content hashing for cache entry
//! addressing and host API version handling.

#![warn(missing_docs)]

pub mod hash;
pub mod version;

pub use hash::ContentHash;
pub use version::{ApiVersion, ParseApiVersionError};
