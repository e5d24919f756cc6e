//! Deduplication of connection sequences across tiles.

use crate::connection::{Connections, WireConnection};
use std::collections::HashSet;
use std::sync::Arc;

/// Interns connection sequences so that equal sequences share one allocation.
///
/// Tiles of the same type expose the same outgoing edges for most of their
/// wires. Interning through a pool during device construction (and after
/// snapshot decoding) keeps one copy of each distinct sequence.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    sequences: HashSet<Connections>,
}

impl ConnectionPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns an owned sequence, returning the pooled copy.
    ///
    /// If an equal sequence was interned before, the existing allocation is
    /// returned and `connections` is dropped.
    pub fn intern(&mut self, connections: Vec<WireConnection>) -> Connections {
        if let Some(existing) = self.sequences.get(connections.as_slice()) {
            return Arc::clone(existing);
        }
        let shared: Connections = connections.into();
        self.sequences.insert(Arc::clone(&shared));
        shared
    }

    /// Interns an already shared sequence, returning the pooled copy.
    pub fn intern_shared(&mut self, connections: &Connections) -> Connections {
        if let Some(existing) = self.sequences.get(connections.as_ref()) {
            return Arc::clone(existing);
        }
        self.sequences.insert(Arc::clone(connections));
        Arc::clone(connections)
    }

    /// Returns the number of distinct sequences in the pool.
    pub fn unique_count(&self) -> usize {
        self.sequences.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WireId;

    fn conn(wire: u32) -> WireConnection {
        WireConnection::local(WireId::from_raw(wire), true)
    }

    #[test]
    fn equal_sequences_share_allocation() {
        let mut pool = ConnectionPool::new();
        let a = pool.intern(vec![conn(1), conn(2)]);
        let b = pool.intern(vec![conn(1), conn(2)]);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(pool.unique_count(), 1);
    }

    #[test]
    fn different_sequences_stay_distinct() {
        let mut pool = ConnectionPool::new();
        let a = pool.intern(vec![conn(1), conn(2)]);
        let b = pool.intern(vec![conn(2), conn(1)]);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.unique_count(), 2);
    }

    #[test]
    fn empty_sequence_interned_once() {
        let mut pool = ConnectionPool::new();
        let a = pool.intern(Vec::new());
        let b = pool.intern(Vec::new());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.is_empty());
    }

    #[test]
    fn shared_input_is_pooled() {
        let mut pool = ConnectionPool::new();
        let first: Connections = vec![conn(7)].into();
        let second: Connections = vec![conn(7)].into();
        let a = pool.intern_shared(&first);
        let b = pool.intern_shared(&second);
        assert!(Arc::ptr_eq(&a, &first));
        assert!(Arc::ptr_eq(&b, &first));
        assert_eq!(pool.unique_count(), 1);
    }
}
