//! Single-writer construction of a [`Device`].
//!
//! The builder collects tiles, wire connections and sink pins in any order,
//! then [`build`](DeviceBuilder::build) freezes them: off-grid edges are
//! dropped with a warning, each tile's [`WireMap`] is sized for its live wire
//! count, and equal connection sequences are shared through a
//! [`ConnectionPool`].

use crate::connection::WireConnection;
use crate::device::Device;
use crate::error::DeviceError;
use crate::ids::WireId;
use crate::pool::ConnectionPool;
use crate::sink_pin::SinkPin;
use crate::tile::Tile;
use crate::wire_map::WireMap;
use fabric_common::TileCoord;
use fabric_config::IndexConfig;
use fabric_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::BTreeMap;

/// Name given to grid positions that were never declared with
/// [`DeviceBuilder::add_tile`].
pub const UNNAMED_TILE: &str = "NULL";

#[derive(Default)]
struct PendingTile {
    name: Option<String>,
    wires: BTreeMap<WireId, Vec<WireConnection>>,
    sinks: BTreeMap<WireId, SinkPin>,
}

/// Accumulates the contents of a device grid.
pub struct DeviceBuilder {
    name: String,
    rows: u32,
    columns: u32,
    index: IndexConfig,
    tiles: Vec<PendingTile>,
}

impl DeviceBuilder {
    /// Starts a `rows` x `columns` device named `name`.
    pub fn new(name: impl Into<String>, rows: u32, columns: u32) -> Self {
        let count = rows as usize * columns as usize;
        let mut tiles = Vec::with_capacity(count);
        tiles.resize_with(count, PendingTile::default);
        Self {
            name: name.into(),
            rows,
            columns,
            index: IndexConfig::default(),
            tiles,
        }
    }

    /// Uses the given `[index]` settings for every tile's wire map.
    ///
    /// Each map starts at `initial_capacity` slots, or larger when the tile
    /// indexes more wires than that capacity holds under `load_factor`.
    pub fn with_index_config(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    fn pending(&mut self, coord: TileCoord) -> Result<&mut PendingTile, DeviceError> {
        if coord.row >= self.rows || coord.column >= self.columns {
            return Err(DeviceError::TileOutOfBounds {
                row: coord.row,
                column: coord.column,
                rows: self.rows,
                columns: self.columns,
            });
        }
        let index = coord.row as usize * self.columns as usize + coord.column as usize;
        Ok(&mut self.tiles[index])
    }

    /// Names the tile at `coord`.
    pub fn add_tile(&mut self, coord: TileCoord, name: impl Into<String>) -> Result<(), DeviceError> {
        self.pending(coord)?.name = Some(name.into());
        Ok(())
    }

    /// Indexes `wire` in the tile at `coord` without adding a connection.
    ///
    /// The wire then maps to an empty sequence rather than being absent.
    pub fn add_wire(&mut self, coord: TileCoord, wire: WireId) -> Result<(), DeviceError> {
        self.pending(coord)?.wires.entry(wire).or_default();
        Ok(())
    }

    /// Appends an outgoing connection to `wire` in the tile at `coord`.
    pub fn add_connection(
        &mut self,
        coord: TileCoord,
        wire: WireId,
        connection: WireConnection,
    ) -> Result<(), DeviceError> {
        self.pending(coord)?
            .wires
            .entry(wire)
            .or_default()
            .push(connection);
        Ok(())
    }

    /// Records the sink pin of `wire` in the tile at `coord`, replacing any
    /// earlier record.
    pub fn add_sink_pin(
        &mut self,
        coord: TileCoord,
        wire: WireId,
        pin: SinkPin,
    ) -> Result<(), DeviceError> {
        self.pending(coord)?.sinks.insert(wire, pin);
        Ok(())
    }

    /// Freezes the grid into a [`Device`].
    ///
    /// Connections whose target tile lies outside the grid are dropped and
    /// reported as `D001` warnings; sink pins whose switch-matrix tile lies
    /// outside the grid are kept and reported as `D002` warnings.
    pub fn build(self, sink: &DiagnosticSink) -> Result<Device, DeviceError> {
        let Self {
            name,
            rows,
            columns,
            index,
            tiles: pending_tiles,
        } = self;
        let in_grid = |coord: TileCoord| coord.row < rows && coord.column < columns;

        let mut pool = ConnectionPool::new();
        let mut tiles = Vec::with_capacity(pending_tiles.len());
        for (position, pending) in pending_tiles.into_iter().enumerate() {
            let coord = TileCoord::new(
                (position / columns as usize) as u32,
                (position % columns as usize) as u32,
            );

            let mut wires = WireMap::new(capacity_for(pending.wires.len(), &index)?, index.load_factor)?;
            for (wire, connections) in pending.wires {
                let (kept, dropped): (Vec<_>, Vec<_>) = connections
                    .into_iter()
                    .partition(|c| c.target(coord).is_some_and(in_grid));
                for connection in dropped {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::new(Category::Device, 1),
                            format!(
                                "dropped connection from wire {wire} to wire {}: target tile is off the grid",
                                connection.wire
                            ),
                        )
                        .at(coord)
                        .with_note(format!(
                            "offset is {} rows, {} columns",
                            connection.row_offset, connection.column_offset
                        )),
                    );
                }
                wires.put(wire, pool.intern(kept));
            }

            for (wire, pin) in &pending.sinks {
                if !pin.target(coord).is_some_and(in_grid) {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::new(Category::Device, 2),
                            format!("sink pin of wire {wire} points at a switch matrix off the grid"),
                        )
                        .at(coord)
                        .with_help(format!(
                            "packed offset is {:#010x} ({} columns, {} rows)",
                            pin.switch_matrix_tile_offset,
                            pin.column_delta(),
                            pin.row_delta()
                        )),
                    );
                }
            }

            let tile_name = pending.name.unwrap_or_else(|| UNNAMED_TILE.to_string());
            tiles.push(Tile::new(coord, tile_name, wires, pending.sinks));
        }

        Ok(Device::new(name, rows, columns, tiles))
    }
}

/// Requested capacity for a map holding `live` keys: the configured initial
/// capacity, raised until the threshold holds every key.
fn capacity_for(live: usize, index: &IndexConfig) -> Result<i32, DeviceError> {
    if index.initial_capacity < 0 {
        return Err(DeviceError::InvalidCapacity {
            requested: index.initial_capacity,
        });
    }
    let needed = (live as f64 / f64::from(index.load_factor)).ceil() + 1.0;
    Ok((needed.min(i32::MAX as f64) as i32).max(index.initial_capacity))
}
