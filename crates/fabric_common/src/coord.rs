//! Tile grid coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The (row, column) position of a tile in the device grid.
///
/// Rows and columns are non-negative. Relative offsets (connection deltas,
/// switch-matrix offsets) are signed and applied with [`offset`](Self::offset).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TileCoord {
    /// Grid row.
    pub row: u32,
    /// Grid column.
    pub column: u32,
}

impl TileCoord {
    /// Creates a coordinate.
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Applies a signed delta, returning `None` if the result would leave the
    /// non-negative quadrant or overflow.
    pub fn offset(self, row_delta: i32, column_delta: i32) -> Option<Self> {
        let row = self.row.checked_add_signed(row_delta)?;
        let column = self.column.checked_add_signed(column_delta)?;
        Some(Self { row, column })
    }

    /// Manhattan distance `|Δrow| + |Δcolumn|`.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
