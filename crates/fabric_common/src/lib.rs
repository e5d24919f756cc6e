//! Shared foundational types used across the fabric routing substrate.
//!
//! This crate provides XXH3 content hashing used for structural hashes and
//! snapshot checksums, and the tile grid coordinate shared by the device
//! model, the router, and diagnostics.

#![warn(missing_docs)]

pub mod coord;
pub mod hash;

pub use coord::TileCoord;
pub use hash::{ContentHash, ContentHasher};
