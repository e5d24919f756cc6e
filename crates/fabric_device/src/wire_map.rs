//! Compact open-addressing map from wire id to outgoing connections.
//!
//! Every tile owns one [`WireMap`]. A device holds millions of wires spread over
//! tens of thousands of tiles, most tiles using a few hundred keys out of a
//! namespace of thousands, so the map stores its keys in a dense `i32` table
//! (`-1` marks an empty slot) beside a parallel table of shared connection
//! sequences. There is no per-entry allocation.
//!
//! # Probing
//!
//! A key starts at `key & (capacity - 1)` and collisions advance by 3 slots.
//! When the index runs past the end it wraps with `i & 3`. Capacity is a
//! power of two no smaller than 4 and the stride is below 4, so `i & 3` equals
//! `i - capacity`, and with an odd stride the walk reaches every slot.
//!
//! # Derived views
//!
//! [`keys`](WireMap::keys), [`sequences`](WireMap::sequences) and
//! [`content_hash`](WireMap::content_hash) are computed lazily and cached.
//! Each cached value is stamped with the modification counter at build time
//! and is only reused while the stamp is current; [`put`](WireMap::put) bumps
//! the counter. The caches may be dropped at any time with
//! [`release_cached_views`](WireMap::release_cached_views).

use crate::connection::Connections;
use crate::error::DeviceError;
use crate::ids::{WireId, EMPTY_KEY};
use crate::pool::ConnectionPool;
use fabric_common::{ContentHash, ContentHasher};
use fabric_config::IndexConfig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The largest slot count a wire map grows to.
pub const MAX_CAPACITY: usize = 1 << 30;

/// The smallest slot count of a wire map.
pub const MIN_CAPACITY: usize = 4;

const PROBE_STRIDE: usize = 3;

/// A per-tile map from [`WireId`] to its ordered outgoing [`Connections`].
///
/// Capacity is always a power of two and never shrinks. Once occupancy exceeds
/// `capacity * load_factor` the table doubles and every live entry is
/// re-inserted before [`put`](Self::put) returns.
///
/// Equality and hashing are structural: two maps are equal when they hold the
/// same keys and, per key, the same connection sequence. Table layout and
/// insertion order do not matter.
pub struct WireMap {
    keys: Box<[i32]>,
    values: Box<[Option<Connections>]>,
    len: usize,
    threshold: usize,
    load_factor: f32,
    modification: u64,
    cache: Mutex<ViewCache>,
}

#[derive(Default)]
struct ViewCache {
    keys: Option<Stamped<Arc<HashSet<WireId>>>>,
    sequences: Option<Stamped<Arc<Vec<Connections>>>>,
    hash: Option<Stamped<ContentHash>>,
}

struct Stamped<T> {
    modification: u64,
    value: T,
}

/// How [`WireMap::from_layout`] restored a persisted table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LayoutRestore {
    /// The key and value arrays were adopted as stored.
    Verbatim,
    /// The stored slots were inconsistent with the probe sequence, so the
    /// logical entries were re-inserted into a fresh table.
    Rebuilt,
}

/// The persisted form of a [`WireMap`].
///
/// `keys` and `values` are parallel arrays of length `capacity`; an empty slot
/// has key `-1` and no sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMapLayout {
    /// Slot count, a power of two no smaller than 4.
    pub capacity: u32,
    /// Growth threshold as a fraction of capacity.
    pub load_factor: f32,
    /// Key table, `-1` for empty slots.
    pub keys: Vec<i32>,
    /// Value table, parallel to `keys`.
    pub values: Vec<Option<Connections>>,
}

#[derive(Serialize)]
struct LayoutRef<'a> {
    capacity: u32,
    load_factor: f32,
    keys: &'a [i32],
    values: &'a [Option<Connections>],
}

fn threshold_for(capacity: usize, load_factor: f32) -> usize {
    let threshold = (capacity as f64 * f64::from(load_factor)) as usize;
    // At least one slot must stay empty or a miss would probe forever.
    threshold.min(capacity - 1)
}

fn valid_load_factor(load_factor: f32) -> bool {
    load_factor > 0.0 && load_factor < 1.0
}

impl WireMap {
    /// Creates an empty map able to hold at least `capacity` slots.
    ///
    /// The capacity is rounded up to the next power of two (minimum 4) and
    /// clamped to [`MAX_CAPACITY`]. Fails if `capacity` is negative or the load
    /// factor is not strictly between 0 and 1.
    pub fn new(capacity: i32, load_factor: f32) -> Result<Self, DeviceError> {
        if capacity < 0 {
            return Err(DeviceError::InvalidCapacity {
                requested: capacity,
            });
        }
        if !valid_load_factor(load_factor) {
            return Err(DeviceError::InvalidLoadFactor(load_factor));
        }
        let requested = (capacity as usize).min(MAX_CAPACITY);
        let capacity = requested.next_power_of_two().max(MIN_CAPACITY);
        Ok(Self::empty(capacity, load_factor))
    }

    /// Creates an empty map with the default load factor.
    pub fn with_capacity(capacity: i32) -> Result<Self, DeviceError> {
        Self::new(capacity, IndexConfig::DEFAULT_LOAD_FACTOR)
    }

    /// Creates an empty map sized by an `[index]` configuration section.
    pub fn from_config(config: &IndexConfig) -> Result<Self, DeviceError> {
        Self::new(config.initial_capacity, config.load_factor)
    }

    fn empty(capacity: usize, load_factor: f32) -> Self {
        Self {
            keys: vec![EMPTY_KEY; capacity].into_boxed_slice(),
            values: vec![None; capacity].into_boxed_slice(),
            len: 0,
            threshold: threshold_for(capacity, load_factor),
            load_factor,
            modification: 0,
            cache: Mutex::new(ViewCache::default()),
        }
    }

    /// Returns the number of keys in the map.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the slot count of the backing tables.
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Returns the load factor the map was created with.
    pub fn load_factor(&self) -> f32 {
        self.load_factor
    }

    /// Returns the occupancy above which the next insert grows the table.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Returns the modification counter, bumped by every [`put`](Self::put).
    pub fn modification_count(&self) -> u64 {
        self.modification
    }

    fn slot_for(&self, key: i32) -> usize {
        let capacity = self.keys.len();
        let mut i = key as usize & (capacity - 1);
        while self.keys[i] != key && self.keys[i] != EMPTY_KEY {
            i += PROBE_STRIDE;
            if i >= capacity {
                i &= 3;
            }
        }
        i
    }

    /// Returns the connections stored for `key`, or `None` if it was never
    /// inserted.
    pub fn get(&self, key: WireId) -> Option<&Connections> {
        let i = self.slot_for(key.to_key());
        if self.keys[i] == EMPTY_KEY {
            return None;
        }
        self.values[i].as_ref()
    }

    /// Returns `true` if `key` has an entry.
    pub fn contains_key(&self, key: WireId) -> bool {
        self.keys[self.slot_for(key.to_key())] != EMPTY_KEY
    }

    /// Inserts or overwrites the connections for `key`.
    ///
    /// Grows and rehashes before returning when occupancy exceeds the
    /// threshold.
    ///
    /// # Panics
    ///
    /// Panics if the map is full at [`MAX_CAPACITY`].
    pub fn put(&mut self, key: WireId, connections: impl Into<Connections>) {
        let key = key.to_key();
        let i = self.slot_for(key);
        if self.keys[i] == EMPTY_KEY {
            self.len += 1;
        }
        self.keys[i] = key;
        self.values[i] = Some(connections.into());
        self.modification += 1;

        if self.len > self.threshold {
            self.grow();
        }
        assert!(
            self.len < self.keys.len(),
            "wire map exhausted its maximum capacity of {MAX_CAPACITY} slots"
        );
    }

    fn grow(&mut self) {
        let mut capacity = self.keys.len();
        while self.len > threshold_for(capacity, self.load_factor) && capacity < MAX_CAPACITY {
            capacity *= 2;
        }
        if capacity == self.keys.len() {
            return;
        }

        let old_keys = std::mem::replace(
            &mut self.keys,
            vec![EMPTY_KEY; capacity].into_boxed_slice(),
        );
        let old_values = std::mem::replace(&mut self.values, vec![None; capacity].into_boxed_slice());
        self.threshold = threshold_for(capacity, self.load_factor);

        for (key, value) in old_keys.iter().zip(old_values.into_vec()) {
            if *key != EMPTY_KEY {
                let i = self.slot_for(*key);
                self.keys[i] = *key;
                self.values[i] = value;
            }
        }
    }

    /// Iterates over `(key, connections)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (WireId, &Connections)> {
        self.keys
            .iter()
            .zip(self.values.iter())
            .filter_map(|(&key, value)| Some((WireId::from_key(key)?, value.as_ref()?)))
    }

    fn lock_cache(&self) -> MutexGuard<'_, ViewCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached<T: Clone>(
        &self,
        slot: impl Fn(&mut ViewCache) -> &mut Option<Stamped<T>>,
        build: impl FnOnce() -> T,
    ) -> T {
        let modification = self.modification;
        {
            let mut cache = self.lock_cache();
            if let Some(stamped) = slot(&mut *cache) {
                if stamped.modification == modification {
                    return stamped.value.clone();
                }
            }
        }
        // Built outside the lock; a racing reader may build the same value.
        let value = build();
        let mut cache = self.lock_cache();
        *slot(&mut *cache) = Some(Stamped {
            modification,
            value: value.clone(),
        });
        value
    }

    /// Returns the set of keys.
    ///
    /// The set is cached until the next [`put`](Self::put).
    pub fn keys(&self) -> Arc<HashSet<WireId>> {
        self.cached(
            |cache| &mut cache.keys,
            || Arc::new(self.iter().map(|(key, _)| key).collect()),
        )
    }

    /// Returns every stored connection sequence, in table order.
    ///
    /// The list is cached until the next [`put`](Self::put).
    pub fn sequences(&self) -> Arc<Vec<Connections>> {
        self.cached(
            |cache| &mut cache.sequences,
            || Arc::new(self.iter().map(|(_, value)| Arc::clone(value)).collect()),
        )
    }

    /// Returns the structural hash of the map's content.
    ///
    /// Independent of table layout and insertion order. The hash is cached
    /// and, like the views, invalidated by every [`put`](Self::put).
    pub fn content_hash(&self) -> ContentHash {
        self.cached(|cache| &mut cache.hash, || self.compute_hash())
    }

    fn compute_hash(&self) -> ContentHash {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(key, _)| *key);

        let mut hasher = ContentHasher::new();
        hasher.write_u64(entries.len() as u64);
        for (key, connections) in entries {
            hasher.write_u32(key.as_raw());
            hasher.write_u64(connections.len() as u64);
            for connection in connections.iter() {
                connection.hash_into(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Drops every cached view; the next request rebuilds it.
    pub fn release_cached_views(&self) {
        *self.lock_cache() = ViewCache::default();
    }

    /// Replaces every stored sequence with its pooled, shared equivalent.
    ///
    /// The content is unchanged, so the modification counter is not bumped.
    pub(crate) fn share_connections(&mut self, pool: &mut ConnectionPool) {
        for value in self.values.iter_mut().flatten() {
            *value = pool.intern_shared(value);
        }
    }

    /// Captures the table in its persisted form.
    pub fn to_layout(&self) -> WireMapLayout {
        WireMapLayout {
            capacity: self.keys.len() as u32,
            load_factor: self.load_factor,
            keys: self.keys.to_vec(),
            values: self.values.to_vec(),
        }
    }

    /// Restores a map from its persisted form.
    ///
    /// The stored tables are adopted verbatim when every live key sits on its
    /// own probe path and occupancy is within the threshold. Otherwise the
    /// logical entries are re-inserted into a fresh table of the same
    /// capacity, later duplicates overwriting earlier ones.
    pub fn from_layout(layout: WireMapLayout) -> Result<(Self, LayoutRestore), DeviceError> {
        let capacity = layout.capacity as usize;
        if !capacity.is_power_of_two() || !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
            return Err(invalid_layout(format!(
                "capacity {capacity} is not a power of two between {MIN_CAPACITY} and {MAX_CAPACITY}"
            )));
        }
        if layout.keys.len() != capacity || layout.values.len() != capacity {
            return Err(invalid_layout(format!(
                "expected {capacity} slots, found {} keys and {} values",
                layout.keys.len(),
                layout.values.len()
            )));
        }
        if !valid_load_factor(layout.load_factor) {
            return Err(DeviceError::InvalidLoadFactor(layout.load_factor));
        }

        let mut len = 0;
        for (slot, (&key, value)) in layout.keys.iter().zip(&layout.values).enumerate() {
            match (key, value) {
                (EMPTY_KEY, None) => {}
                (EMPTY_KEY, Some(_)) => {
                    return Err(invalid_layout(format!("empty slot {slot} holds connections")));
                }
                (key, _) if key < 0 => {
                    return Err(invalid_layout(format!("slot {slot} holds negative key {key}")));
                }
                (key, None) => {
                    return Err(invalid_layout(format!(
                        "key {key} in slot {slot} has no connections"
                    )));
                }
                (_, Some(_)) => len += 1,
            }
        }

        let mut map = Self::empty(capacity, layout.load_factor);
        map.keys = layout.keys.into_boxed_slice();
        map.values = layout.values.into_boxed_slice();
        map.len = len;

        let consistent = len <= map.threshold
            && map
                .keys
                .iter()
                .enumerate()
                .all(|(slot, &key)| key == EMPTY_KEY || map.slot_for(key) == slot);
        if consistent {
            return Ok((map, LayoutRestore::Verbatim));
        }

        let mut rebuilt = Self::empty(capacity, map.load_factor);
        for (key, value) in map.keys.iter().zip(map.values.into_vec()) {
            if let (Some(key), Some(value)) = (WireId::from_key(*key), value) {
                rebuilt.put(key, value);
            }
        }
        Ok((rebuilt, LayoutRestore::Rebuilt))
    }
}

fn invalid_layout(reason: String) -> DeviceError {
    DeviceError::InvalidLayout { reason }
}

impl Default for WireMap {
    fn default() -> Self {
        Self::empty(
            IndexConfig::DEFAULT_INITIAL_CAPACITY as usize,
            IndexConfig::DEFAULT_LOAD_FACTOR,
        )
    }
}

impl Clone for WireMap {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            values: self.values.clone(),
            len: self.len,
            threshold: self.threshold,
            load_factor: self.load_factor,
            modification: self.modification,
            cache: Mutex::new(ViewCache::default()),
        }
    }
}

impl PartialEq for WireMap {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| theirs == value))
    }
}

impl Eq for WireMap {}

impl Hash for WireMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.content_hash().hash(state);
    }
}

impl fmt::Debug for WireMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(key, _)| *key);
        f.debug_struct("WireMap")
            .field("len", &self.len)
            .field("capacity", &self.keys.len())
            .field("entries", &entries)
            .finish()
    }
}

impl Serialize for WireMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        LayoutRef {
            capacity: self.keys.len() as u32,
            load_factor: self.load_factor,
            keys: &self.keys,
            values: &self.values,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WireMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let layout = WireMapLayout::deserialize(deserializer)?;
        WireMap::from_layout(layout)
            .map(|(map, _)| map)
            .map_err(serde::de::Error::custom)
    }
}
