//! Wire identifiers.
//!
//! A [`WireId`] names a wire within one tile's wire namespace. Persisted key
//! tables store wire ids as `i32` and reserve `-1` for "no key"; conversion
//! from such a key goes through [`WireId::from_key`], which rejects every
//! negative value, so the sentinel can never become a valid identifier.
//! Deserialization goes through [`TryFrom<u32>`], which rejects raw values
//! above [`WireId::MAX_RAW`] for the same reason.

use crate::error::DeviceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The raw key value marking an empty slot in a persisted key table.
pub const EMPTY_KEY: i32 = -1;

/// Opaque, copyable ID for a wire within a tile's namespace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u32")]
pub struct WireId(u32);

impl WireId {
    /// The largest raw value a wire id may take.
    pub const MAX_RAW: u32 = i32::MAX as u32;

    /// Creates an ID from a raw `u32` index.
    ///
    /// # Panics
    ///
    /// Panics if `index` exceeds [`MAX_RAW`](Self::MAX_RAW); use
    /// [`TryFrom<u32>`] for unchecked input.
    pub fn from_raw(index: u32) -> Self {
        assert!(index <= Self::MAX_RAW, "wire id {index} out of range");
        Self(index)
    }

    /// Converts a signed key-table entry, returning `None` for the empty
    /// sentinel and any other negative value.
    pub fn from_key(key: i32) -> Option<Self> {
        u32::try_from(key).ok().map(Self)
    }

    /// Returns the raw `u32` index.
    pub fn as_raw(self) -> u32 {
        self.0
    }

    /// Returns the signed key-table representation (never negative).
    pub fn to_key(self) -> i32 {
        self.0 as i32
    }
}

impl TryFrom<u32> for WireId {
    type Error = DeviceError;

    fn try_from(raw: u32) -> Result<Self, DeviceError> {
        if raw > Self::MAX_RAW {
            return Err(DeviceError::WireIdOutOfRange { raw });
        }
        Ok(Self(raw))
    }
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = WireId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(id.to_key(), 42);
    }

    #[test]
    fn sentinel_is_not_a_wire() {
        assert_eq!(WireId::from_key(EMPTY_KEY), None);
        assert_eq!(WireId::from_key(i32::MIN), None);
        assert_eq!(WireId::from_key(0), Some(WireId::from_raw(0)));
        assert_eq!(
            WireId::from_key(i32::MAX),
            Some(WireId::from_raw(WireId::MAX_RAW))
        );
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(WireId::from_raw(1));
        set.insert(WireId::from_raw(2));
        set.insert(WireId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = WireId::from_raw(55);
        let json = serde_json::to_string(&id).unwrap();
        let restored: WireId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn try_from_rejects_negative_keys() {
        assert_eq!(WireId::try_from(7u32).unwrap(), WireId::from_raw(7));
        assert!(WireId::try_from(WireId::MAX_RAW).is_ok());
        assert!(matches!(
            WireId::try_from(WireId::MAX_RAW + 1),
            Err(DeviceError::WireIdOutOfRange { raw: 2_147_483_648 })
        ));
        assert!(WireId::try_from(u32::MAX).is_err());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn from_raw_panics_above_max() {
        WireId::from_raw(u32::MAX);
    }

    #[test]
    fn deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<WireId>("4294967295").is_err());
        assert!(serde_json::from_str::<WireId>("2147483648").is_err());
        let max: WireId = serde_json::from_str("2147483647").unwrap();
        assert_eq!(max.to_key(), i32::MAX);
    }

    #[test]
    fn bincode_rejects_out_of_range() {
        let config = bincode::config::standard();
        let bytes = bincode::serde::encode_to_vec(u32::MAX, config).unwrap();
        let decoded: Result<(WireId, usize), _> = bincode::serde::decode_from_slice(&bytes, config);
        assert!(decoded.is_err());
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", WireId::from_raw(1234)), "1234");
    }
}
