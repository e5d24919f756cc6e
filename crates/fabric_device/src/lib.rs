//! Device model and per-tile wire connectivity index.
//!
//! The central type is [`WireMap`], a compact open-addressing map from wire id
//! to the ordered outgoing connections of that wire. Every [`Tile`] of a
//! [`Device`] owns one. Devices are assembled with [`DeviceBuilder`], which
//! shares equal connection sequences through a [`ConnectionPool`], and can be
//! persisted as binary snapshots with [`save_device`]/[`load_device`].

#![warn(missing_docs)]

pub mod builder;
pub mod connection;
pub mod device;
pub mod error;
pub mod ids;
pub mod persist;
pub mod pool;
pub mod sink_pin;
pub mod tile;
pub mod wire_map;

pub use builder::{DeviceBuilder, UNNAMED_TILE};
pub use connection::{Connections, WireConnection};
pub use device::Device;
pub use error::DeviceError;
pub use ids::{WireId, EMPTY_KEY};
pub use persist::{
    decode_device, encode_device, load_device, save_device, SnapshotHeader,
    SNAPSHOT_FORMAT_VERSION,
};
pub use pool::ConnectionPool;
pub use sink_pin::SinkPin;
pub use tile::Tile;
pub use wire_map::{LayoutRestore, WireMap, WireMapLayout, MAX_CAPACITY, MIN_CAPACITY};
