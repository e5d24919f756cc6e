//! The device grid.

use crate::error::DeviceError;
use crate::pool::ConnectionPool;
use crate::tile::Tile;
use fabric_common::{ContentHash, ContentHasher, TileCoord};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A rectangular grid of tiles, stored row-major.
///
/// Every grid position holds a tile. A device is immutable once built and can
/// be shared across routing threads by reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    name: String,
    rows: u32,
    columns: u32,
    tiles: Vec<Tile>,
}

impl Device {
    pub(crate) fn new(name: String, rows: u32, columns: u32, tiles: Vec<Tile>) -> Self {
        Self {
            name,
            rows,
            columns,
            tiles,
        }
    }

    /// Returns the device (part) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of tile rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Returns the number of tile columns.
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Returns the tile at `(row, column)`, or `None` outside the grid.
    pub fn tile_at(&self, row: u32, column: u32) -> Option<&Tile> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.tiles
            .get(row as usize * self.columns as usize + column as usize)
    }

    /// Returns the tile at `coord`, or `None` outside the grid.
    pub fn tile_at_coord(&self, coord: TileCoord) -> Option<&Tile> {
        self.tile_at(coord.row, coord.column)
    }

    /// Returns `true` if `coord` lies inside the grid.
    pub fn contains(&self, coord: TileCoord) -> bool {
        coord.row < self.rows && coord.column < self.columns
    }

    /// Returns all tiles in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Total number of indexed wires across all tiles.
    pub fn wire_count(&self) -> usize {
        self.tiles.iter().map(|t| t.wire_map().len()).sum()
    }

    /// Total number of connection records across all tiles.
    pub fn connection_count(&self) -> usize {
        self.tiles
            .iter()
            .flat_map(|t| t.wire_map().iter())
            .map(|(_, connections)| connections.len())
            .sum()
    }

    /// Structural hash over the device name, grid size and every tile.
    ///
    /// Tile hashes are computed in parallel.
    pub fn fingerprint(&self) -> ContentHash {
        let tile_hashes: Vec<ContentHash> =
            self.tiles.par_iter().map(Tile::content_hash).collect();

        let mut hasher = ContentHasher::new();
        hasher.write_str(&self.name);
        hasher.write_u32(self.rows);
        hasher.write_u32(self.columns);
        for hash in &tile_hashes {
            hasher.write_hash(hash);
        }
        hasher.finish()
    }

    /// Checks that the tile list matches the grid.
    pub(crate) fn check_grid(&self) -> Result<(), DeviceError> {
        let expected = self.rows as usize * self.columns as usize;
        if self.tiles.len() != expected {
            return Err(DeviceError::Serialization {
                reason: format!(
                    "{}x{} grid needs {expected} tiles, found {}",
                    self.rows,
                    self.columns,
                    self.tiles.len()
                ),
            });
        }
        for (index, tile) in self.tiles.iter().enumerate() {
            let row = (index / self.columns as usize) as u32;
            let column = (index % self.columns as usize) as u32;
            if tile.coord() != TileCoord::new(row, column) {
                return Err(DeviceError::Serialization {
                    reason: format!(
                        "tile {} stored at grid position ({row}, {column})",
                        tile.coord()
                    ),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn share_connections(&mut self, pool: &mut ConnectionPool) {
        for tile in &mut self.tiles {
            tile.share_connections(pool);
        }
    }
}
