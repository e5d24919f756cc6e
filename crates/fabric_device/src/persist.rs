//! Binary device snapshots.
//!
//! A snapshot is a 4-byte little-endian header length, a bincode-encoded
//! [`SnapshotHeader`], and the bincode-encoded [`Device`] payload. The header
//! carries magic bytes, the format version, the device name and a checksum of
//! the payload. Wire maps are stored in their table layout, so a snapshot
//! reloads without rehashing.

use crate::device::Device;
use crate::error::DeviceError;
use crate::pool::ConnectionPool;
use fabric_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes identifying a device snapshot.
const SNAPSHOT_MAGIC: [u8; 4] = *b"FABR";

/// Current snapshot format version. Increment on breaking changes to the
/// header or payload format.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Header prepended to every snapshot for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    /// Magic bytes: must be `b"FABR"`.
    pub magic: [u8; 4],

    /// Snapshot format version.
    pub format_version: u32,

    /// Name of the device in the payload.
    pub device_name: String,

    /// Content hash of the payload bytes.
    pub checksum: ContentHash,
}

fn serialization_error(e: impl std::fmt::Display) -> DeviceError {
    DeviceError::Serialization {
        reason: e.to_string(),
    }
}

fn frame(header: &SnapshotHeader, payload: &[u8]) -> Result<Vec<u8>, DeviceError> {
    let header_bytes = bincode::serde::encode_to_vec(header, bincode::config::standard())
        .map_err(serialization_error)?;

    let header_len = header_bytes.len() as u32;
    let mut output = Vec::with_capacity(4 + header_bytes.len() + payload.len());
    output.extend_from_slice(&header_len.to_le_bytes());
    output.extend_from_slice(&header_bytes);
    output.extend_from_slice(payload);
    Ok(output)
}

/// Encodes a device into snapshot bytes.
pub fn encode_device(device: &Device) -> Result<Vec<u8>, DeviceError> {
    let payload = bincode::serde::encode_to_vec(device, bincode::config::standard())
        .map_err(serialization_error)?;
    let header = SnapshotHeader {
        magic: SNAPSHOT_MAGIC,
        format_version: SNAPSHOT_FORMAT_VERSION,
        device_name: device.name().to_string(),
        checksum: ContentHash::from_bytes(&payload),
    };
    frame(&header, &payload)
}

/// Decodes snapshot bytes, validating the header and checksum.
///
/// Connection sequences are re-interned so that tiles share equal sequences
/// exactly as a freshly built device does.
pub fn decode_device(raw: &[u8]) -> Result<Device, DeviceError> {
    let invalid = |reason: &str| DeviceError::InvalidHeader {
        reason: reason.to_string(),
    };

    let len_bytes: [u8; 4] = raw
        .get(..4)
        .and_then(|b| b.try_into().ok())
        .ok_or_else(|| invalid("missing header length"))?;
    let header_len = u32::from_le_bytes(len_bytes) as usize;
    let header_bytes = raw
        .get(4..4 + header_len)
        .ok_or_else(|| invalid("truncated header"))?;

    let (header, _): (SnapshotHeader, usize) =
        bincode::serde::decode_from_slice(header_bytes, bincode::config::standard())
            .map_err(|e| DeviceError::InvalidHeader {
                reason: e.to_string(),
            })?;

    if header.magic != SNAPSHOT_MAGIC {
        return Err(invalid("not a device snapshot"));
    }
    if header.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(DeviceError::VersionMismatch {
            expected: SNAPSHOT_FORMAT_VERSION,
            actual: header.format_version,
        });
    }

    let payload = &raw[4 + header_len..];
    let actual = ContentHash::from_bytes(payload);
    if actual != header.checksum {
        return Err(DeviceError::ChecksumMismatch {
            expected: header.checksum.to_string(),
            actual: actual.to_string(),
        });
    }

    let (mut device, _): (Device, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())
            .map_err(serialization_error)?;
    device.check_grid()?;
    if device.name() != header.device_name {
        return Err(DeviceError::InvalidHeader {
            reason: format!(
                "header names device `{}` but payload holds `{}`",
                header.device_name,
                device.name()
            ),
        });
    }

    device.share_connections(&mut ConnectionPool::new());
    Ok(device)
}

/// Writes a snapshot of `device` to `path`.
pub fn save_device(device: &Device, path: &Path) -> Result<(), DeviceError> {
    let bytes = encode_device(device)?;
    std::fs::write(path, bytes).map_err(|e| DeviceError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Reads and validates a snapshot from `path`.
pub fn load_device(path: &Path) -> Result<Device, DeviceError> {
    let raw = std::fs::read(path).map_err(|e| DeviceError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_device(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::DeviceBuilder;
    use crate::{SinkPin, WireConnection, WireId};
    use fabric_common::TileCoord;
    use fabric_diagnostics::DiagnosticSink;
    use std::sync::Arc;

    fn w(raw: u32) -> WireId {
        WireId::from_raw(raw)
    }

    fn sample_device() -> Device {
        let mut builder = DeviceBuilder::new("xc-snap", 2, 3);
        for column in 0..3 {
            let coord = TileCoord::new(0, column);
            builder.add_tile(coord, format!("INT_X{column}Y0")).unwrap();
            builder
                .add_connection(coord, w(1), WireConnection::remote(w(4), 1, 0, true))
                .unwrap();
            builder
                .add_connection(coord, w(2), WireConnection::local(w(1), false))
                .unwrap();
        }
        builder
            .add_sink_pin(TileCoord::new(1, 1), w(7), SinkPin::new(1, -1, w(3)))
            .unwrap();
        builder.build(&DiagnosticSink::new()).unwrap()
    }

    #[test]
    fn encode_decode_roundtrip() {
        let device = sample_device();
        let bytes = encode_device(&device).unwrap();
        let restored = decode_device(&bytes).unwrap();
        assert_eq!(restored, device);
        assert_eq!(restored.fingerprint(), device.fingerprint());
        assert_eq!(
            restored.tile_at(1, 1).unwrap().sink_pin(w(7)),
            Some(SinkPin::new(1, -1, w(3)))
        );
    }

    #[test]
    fn decoded_sequences_are_shared() {
        let restored = decode_device(&encode_device(&sample_device()).unwrap()).unwrap();
        let a = restored.tile_at(0, 0).unwrap().wire_map().get(w(1)).unwrap();
        let b = restored.tile_at(0, 2).unwrap().wire_map().get(w(1)).unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn table_layout_survives() {
        let device = sample_device();
        let restored = decode_device(&encode_device(&device).unwrap()).unwrap();
        let before = device.tile_at(0, 1).unwrap().wire_map().to_layout();
        let after = restored.tile_at(0, 1).unwrap().wire_map().to_layout();
        assert_eq!(before, after);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("device.fabric");
        let device = sample_device();
        save_device(&device, &path).unwrap();
        let loaded = load_device(&path).unwrap();
        assert_eq!(loaded, device);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_device(&dir.path().join("absent.fabric")).unwrap_err();
        assert!(matches!(err, DeviceError::Io { .. }));
    }

    #[test]
    fn corrupt_payload_detected() {
        let mut bytes = encode_device(&sample_device()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let err = decode_device(&bytes).unwrap_err();
        assert!(matches!(err, DeviceError::ChecksumMismatch { .. }));
    }

    #[test]
    fn bad_magic_rejected() {
        let header = SnapshotHeader {
            magic: *b"NOPE",
            format_version: SNAPSHOT_FORMAT_VERSION,
            device_name: "x".to_string(),
            checksum: ContentHash::from_bytes(b""),
        };
        let bytes = frame(&header, b"").unwrap();
        let err = decode_device(&bytes).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidHeader { .. }));
    }

    #[test]
    fn version_mismatch_rejected() {
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            format_version: SNAPSHOT_FORMAT_VERSION + 1,
            device_name: "x".to_string(),
            checksum: ContentHash::from_bytes(b""),
        };
        let bytes = frame(&header, b"").unwrap();
        let err = decode_device(&bytes).unwrap_err();
        assert!(matches!(
            err,
            DeviceError::VersionMismatch { expected, actual }
                if expected == SNAPSHOT_FORMAT_VERSION && actual == SNAPSHOT_FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn truncated_input_rejected() {
        assert!(matches!(
            decode_device(&[1, 0]),
            Err(DeviceError::InvalidHeader { .. })
        ));
        assert!(matches!(
            decode_device(&[200, 0, 0, 0, 1, 2]),
            Err(DeviceError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn garbage_payload_is_serialization_error() {
        let payload = [0xFFu8; 8];
        let header = SnapshotHeader {
            magic: SNAPSHOT_MAGIC,
            format_version: SNAPSHOT_FORMAT_VERSION,
            device_name: "x".to_string(),
            checksum: ContentHash::from_bytes(&payload),
        };
        let bytes = frame(&header, &payload).unwrap();
        assert!(matches!(
            decode_device(&bytes),
            Err(DeviceError::Serialization { .. })
        ));
    }
}
