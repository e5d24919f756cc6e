//! Outgoing wire connection records.

use crate::ids::WireId;
use fabric_common::{ContentHasher, TileCoord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One outgoing edge from a (tile, wire) pair.
///
/// The target tile is given relative to the source tile; both offsets are zero
/// when the target wire lives in the same tile. `is_pip` marks edges that are
/// programmable interconnect points, i.e. that need a configuration bit set
/// when the route is committed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct WireConnection {
    /// The wire reached by this edge, in the target tile's namespace.
    pub wire: WireId,
    /// Row delta from the source tile to the target tile.
    pub row_offset: i32,
    /// Column delta from the source tile to the target tile.
    pub column_offset: i32,
    /// Whether traversing this edge uses a PIP.
    pub is_pip: bool,
}

/// An ordered, shareable sequence of outgoing connections.
///
/// Tiles of the same type carry identical sequences for most wires, so the
/// device builder shares them through a [`ConnectionPool`](crate::ConnectionPool).
pub type Connections = Arc<[WireConnection]>;

impl WireConnection {
    /// A connection to `wire` inside the same tile.
    pub fn local(wire: WireId, is_pip: bool) -> Self {
        Self {
            wire,
            row_offset: 0,
            column_offset: 0,
            is_pip,
        }
    }

    /// A connection to `wire` in the tile at the given offset.
    pub fn remote(wire: WireId, row_offset: i32, column_offset: i32, is_pip: bool) -> Self {
        Self {
            wire,
            row_offset,
            column_offset,
            is_pip,
        }
    }

    /// Returns `true` if the target wire is in the source tile.
    pub fn is_local(&self) -> bool {
        self.row_offset == 0 && self.column_offset == 0
    }

    /// Applies this edge's offset to the source tile coordinate.
    pub fn target(&self, from: TileCoord) -> Option<TileCoord> {
        from.offset(self.row_offset, self.column_offset)
    }

    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.write_u32(self.wire.as_raw());
        hasher.write_i32(self.row_offset);
        hasher.write_i32(self.column_offset);
        hasher.write_bool(self.is_pip);
    }
}
