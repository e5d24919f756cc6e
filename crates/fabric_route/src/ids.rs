//! Opaque ID newtypes for search entities.
//!
//! [`NodeId`] is a thin `u32` wrapper used as an index into a
//! [`SearchArena`](crate::SearchArena). Parent links between routing nodes
//! are stored as node ids rather than references.

use serde::{Deserialize, Serialize};

/// Opaque, copyable ID for a node in one search's arena.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates an ID from a raw `u32` index.
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
