//! Error types for routing-node operations.

use fabric_common::TileCoord;
use fabric_device::WireId;

/// Errors raised while resolving routing nodes against a device.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The (tile, wire) pair has no sink-pin record.
    #[error("wire {wire} in tile {tile} is not a sink pin")]
    NoSinkPin {
        /// The tile that was queried.
        tile: TileCoord,
        /// The wire that was queried.
        wire: WireId,
    },

    /// A decoded switch-matrix offset points outside the device grid.
    #[error("switch-matrix tile ({row}, {column}) is outside the device grid")]
    TileOutOfBounds {
        /// The resolved row, possibly negative.
        row: i64,
        /// The resolved column, possibly negative.
        column: i64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_sink_pin_display() {
        let err = RouteError::NoSinkPin {
            tile: TileCoord::new(3, 4),
            wire: WireId::from_raw(17),
        };
        assert_eq!(err.to_string(), "wire 17 in tile (3, 4) is not a sink pin");
    }

    #[test]
    fn out_of_bounds_display_keeps_sign() {
        let err = RouteError::TileOutOfBounds { row: -1, column: 7 };
        assert_eq!(
            err.to_string(),
            "switch-matrix tile (-1, 7) is outside the device grid"
        );
    }
}
