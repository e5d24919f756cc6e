//! Error types for the device model, its connectivity indices, and snapshots.

use std::path::PathBuf;

/// Errors raised while building, restoring, or persisting a device model.
///
/// A lookup miss is never an error: absent keys and wires without outgoing
/// connections are ordinary results.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// A wire map was requested with a negative capacity.
    #[error("illegal initial capacity: {requested}")]
    InvalidCapacity {
        /// The rejected capacity.
        requested: i32,
    },

    /// A wire map was requested with a load factor outside `(0, 1)`.
    #[error("illegal load factor: {0}")]
    InvalidLoadFactor(f32),

    /// A persisted wire map layout is malformed.
    #[error("invalid wire map layout: {reason}")]
    InvalidLayout {
        /// Description of the inconsistency.
        reason: String,
    },

    /// A raw wire id does not fit the signed key table.
    #[error("wire id {raw} out of range")]
    WireIdOutOfRange {
        /// The rejected raw value.
        raw: u32,
    },

    /// A coordinate lies outside the device grid.
    #[error("tile ({row}, {column}) is outside the {rows}x{columns} device grid")]
    TileOutOfBounds {
        /// Requested row.
        row: u32,
        /// Requested column.
        column: u32,
        /// Number of rows in the device.
        rows: u32,
        /// Number of columns in the device.
        columns: u32,
    },

    /// An I/O error occurred while reading or writing a snapshot.
    #[error("device snapshot I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A snapshot has an invalid or missing header.
    #[error("invalid snapshot header: {reason}")]
    InvalidHeader {
        /// Description of the header problem.
        reason: String,
    },

    /// The snapshot format version does not match the current version.
    #[error("snapshot version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The expected format version.
        expected: u32,
        /// The format version found in the snapshot.
        actual: u32,
    },

    /// The stored checksum does not match the payload.
    #[error("snapshot checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The checksum recorded in the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_capacity_display() {
        let err = DeviceError::InvalidCapacity { requested: -3 };
        assert_eq!(err.to_string(), "illegal initial capacity: -3");
    }

    #[test]
    fn out_of_bounds_display() {
        let err = DeviceError::TileOutOfBounds {
            row: 9,
            column: 2,
            rows: 4,
            columns: 4,
        };
        assert_eq!(
            err.to_string(),
            "tile (9, 2) is outside the 4x4 device grid"
        );
    }

    #[test]
    fn version_mismatch_display() {
        let err = DeviceError::VersionMismatch {
            expected: 2,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("got 1"));
    }

    #[test]
    fn io_display_mentions_path() {
        let err = DeviceError::Io {
            path: PathBuf::from("/tmp/device.fabric"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("device.fabric"));
    }
}
