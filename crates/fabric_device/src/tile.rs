//! Configurable tiles and their wire connectivity.

use crate::connection::WireConnection;
use crate::ids::WireId;
use crate::pool::ConnectionPool;
use crate::sink_pin::SinkPin;
use crate::wire_map::WireMap;
use fabric_common::{ContentHash, ContentHasher, TileCoord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cell of the device grid.
///
/// A tile owns the connectivity index of its wires and the sink-pin records of
/// the site pins it hosts. Tiles are built by
/// [`DeviceBuilder`](crate::DeviceBuilder) and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    coord: TileCoord,
    name: String,
    wires: WireMap,
    sinks: BTreeMap<WireId, SinkPin>,
}

impl Tile {
    pub(crate) fn new(
        coord: TileCoord,
        name: String,
        wires: WireMap,
        sinks: BTreeMap<WireId, SinkPin>,
    ) -> Self {
        Self {
            coord,
            name,
            wires,
            sinks,
        }
    }

    /// Returns the tile's grid coordinate.
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Returns the tile's row.
    pub fn row(&self) -> u32 {
        self.coord.row
    }

    /// Returns the tile's column.
    pub fn column(&self) -> u32 {
        self.coord.column
    }

    /// Returns the tile's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tile's connectivity index.
    pub fn wire_map(&self) -> &WireMap {
        &self.wires
    }

    /// Returns the outgoing connections of `wire`.
    ///
    /// A wire that is not indexed in this tile has no outgoing connections, so
    /// the result is an empty slice rather than an error.
    pub fn wire_connections(&self, wire: WireId) -> &[WireConnection] {
        self.wires.get(wire).map(|c| &c[..]).unwrap_or_default()
    }

    /// Returns the sink-pin record of `wire`, if it is a site pin.
    pub fn sink_pin(&self, wire: WireId) -> Option<SinkPin> {
        self.sinks.get(&wire).copied()
    }

    /// Iterates over the tile's sink pins in wire order.
    pub fn sink_pins(&self) -> impl Iterator<Item = (WireId, SinkPin)> + '_ {
        self.sinks.iter().map(|(&wire, &pin)| (wire, pin))
    }

    /// Grid distance to another tile.
    pub fn manhattan_distance(&self, other: &Tile) -> u32 {
        self.coord.manhattan_distance(other.coord)
    }

    /// Structural hash over the coordinate, name, connectivity and sink pins.
    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = ContentHasher::new();
        hasher.write_u32(self.coord.row);
        hasher.write_u32(self.coord.column);
        hasher.write_str(&self.name);
        hasher.write_hash(&self.wires.content_hash());
        hasher.write_u64(self.sinks.len() as u64);
        for (wire, pin) in &self.sinks {
            hasher.write_u32(wire.as_raw());
            pin.hash_into(&mut hasher);
        }
        hasher.finish()
    }

    pub(crate) fn share_connections(&mut self, pool: &mut ConnectionPool) {
        self.wires.share_connections(pool);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(raw: u32) -> WireId {
        WireId::from_raw(raw)
    }

    fn tile_at(row: u32, column: u32) -> Tile {
        let mut wires = WireMap::default();
        wires.put(w(1), vec![WireConnection::remote(w(2), 0, 1, true)]);
        wires.put(w(3), Vec::new());
        let mut sinks = BTreeMap::new();
        sinks.insert(w(1), SinkPin::new(1, 0, w(8)));
        Tile::new(TileCoord::new(row, column), format!("INT_X{column}Y{row}"), wires, sinks)
    }

    #[test]
    fn accessors() {
        let tile = tile_at(4, 6);
        assert_eq!(tile.row(), 4);
        assert_eq!(tile.column(), 6);
        assert_eq!(tile.name(), "INT_X6Y4");
        assert_eq!(tile.wire_map().len(), 2);
    }

    #[test]
    fn connections_of_unindexed_wire_are_empty() {
        let tile = tile_at(0, 0);
        assert_eq!(tile.wire_connections(w(1)).len(), 1);
        assert!(tile.wire_connections(w(3)).is_empty());
        assert!(tile.wire_connections(w(99)).is_empty());
    }

    #[test]
    fn sink_pin_lookup() {
        let tile = tile_at(0, 0);
        let pin = tile.sink_pin(w(1)).unwrap();
        assert_eq!(pin.switch_matrix_sink_wire, w(8));
        assert!(tile.sink_pin(w(3)).is_none());
        assert_eq!(tile.sink_pins().count(), 1);
    }

    #[test]
    fn manhattan_between_tiles() {
        assert_eq!(tile_at(2, 3).manhattan_distance(&tile_at(5, 1)), 5);
    }

    #[test]
    fn content_hash_depends_on_position() {
        let a = tile_at(1, 1);
        let b = tile_at(1, 1);
        let c = tile_at(1, 2);
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }
}
