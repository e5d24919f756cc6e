//! Fixed entry points from primitive-site pins into the switch matrix.

use crate::ids::WireId;
use fabric_common::{ContentHasher, TileCoord};
use serde::{Deserialize, Serialize};

/// The switch-matrix wire a site pin drives, given relative to the pin's tile.
///
/// The tile offset is packed into one `i32`: the upper 16 bits hold the column
/// delta and the lower 16 bits the row delta, both two's complement.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SinkPin {
    /// Packed column/row delta to the switch-matrix tile.
    pub switch_matrix_tile_offset: i32,
    /// The wire inside the switch-matrix tile.
    pub switch_matrix_sink_wire: WireId,
}

impl SinkPin {
    /// Packs the given deltas.
    pub fn new(column_delta: i16, row_delta: i16, switch_matrix_sink_wire: WireId) -> Self {
        let packed = (i32::from(column_delta) << 16) | i32::from(row_delta as u16);
        Self::from_packed(packed, switch_matrix_sink_wire)
    }

    /// Wraps an already packed offset.
    pub fn from_packed(switch_matrix_tile_offset: i32, switch_matrix_sink_wire: WireId) -> Self {
        Self {
            switch_matrix_tile_offset,
            switch_matrix_sink_wire,
        }
    }

    /// Column delta from the pin's tile to the switch-matrix tile.
    pub fn column_delta(&self) -> i16 {
        (self.switch_matrix_tile_offset >> 16) as i16
    }

    /// Row delta from the pin's tile to the switch-matrix tile.
    pub fn row_delta(&self) -> i16 {
        self.switch_matrix_tile_offset as i16
    }

    /// Applies the decoded offset to the pin's tile coordinate.
    ///
    /// Returns `None` if the result would have a negative row or column.
    pub fn target(&self, from: TileCoord) -> Option<TileCoord> {
        from.offset(i32::from(self.row_delta()), i32::from(self.column_delta()))
    }

    pub(crate) fn hash_into(&self, hasher: &mut ContentHasher) {
        hasher.write_i32(self.switch_matrix_tile_offset);
        hasher.write_u32(self.switch_matrix_sink_wire.as_raw());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_deltas_roundtrip() {
        let pin = SinkPin::new(2, 3, WireId::from_raw(9));
        assert_eq!(pin.column_delta(), 2);
        assert_eq!(pin.row_delta(), 3);
        assert_eq!(pin.switch_matrix_tile_offset, (2 << 16) | 3);
    }

    #[test]
    fn negative_row_delta_keeps_column() {
        let pin = SinkPin::new(2, -1, WireId::from_raw(0));
        assert_eq!(pin.column_delta(), 2);
        assert_eq!(pin.row_delta(), -1);
    }

    #[test]
    fn negative_column_delta() {
        let pin = SinkPin::new(-3, 4, WireId::from_raw(0));
        assert_eq!(pin.column_delta(), -3);
        assert_eq!(pin.row_delta(), 4);
        assert!(pin.switch_matrix_tile_offset < 0);
    }

    #[test]
    fn extreme_deltas() {
        for (c, r) in [(i16::MIN, i16::MAX), (i16::MAX, i16::MIN), (-1, -1), (0, 0)] {
            let pin = SinkPin::new(c, r, WireId::from_raw(1));
            assert_eq!((pin.column_delta(), pin.row_delta()), (c, r));
        }
    }

    #[test]
    fn target_applies_offset() {
        let pin = SinkPin::new(2, -1, WireId::from_raw(4));
        assert_eq!(pin.target(TileCoord::new(10, 5)), Some(TileCoord::new(9, 7)));
        assert_eq!(pin.target(TileCoord::new(0, 5)), None);
    }
}
