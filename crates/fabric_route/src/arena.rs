//! Per-search node storage.
//!
//! The [`SearchArena`] owns every [`Node`] one search creates. Nodes are only
//! appended, so a [`NodeId`] stays valid until the arena is dropped, and
//! parent links can be followed back to the search root.

use crate::ids::NodeId;
use crate::node::Node;
use std::ops::{Index, IndexMut};

/// Dense, append-only storage for the nodes of one search.
#[derive(Debug, Clone, Default)]
pub struct SearchArena<'d> {
    nodes: Vec<Node<'d>>,
}

impl<'d> SearchArena<'d> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Stores `node` and returns its id.
    pub fn alloc(&mut self, node: Node<'d>) -> NodeId {
        let id = NodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id was not issued by this arena.
    pub fn get(&self, id: NodeId) -> &Node<'d> {
        &self.nodes[id.as_raw() as usize]
    }

    /// Returns the node with the given id mutably.
    ///
    /// # Panics
    ///
    /// Panics if the id was not issued by this arena.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<'d> {
        &mut self.nodes[id.as_raw() as usize]
    }

    /// Returns the number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node has been stored.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over `(id, node)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<'d>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from_raw(i as u32), node))
    }

    /// Returns the ids from the search root down to `id`, following parent
    /// links.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.get(current).parent() {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }
}

impl<'d> Index<NodeId> for SearchArena<'d> {
    type Output = Node<'d>;

    fn index(&self, id: NodeId) -> &Node<'d> {
        self.get(id)
    }
}

impl<'d> IndexMut<NodeId> for SearchArena<'d> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<'d> {
        self.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_common::TileCoord;
    use fabric_device::{Device, DeviceBuilder, WireId};
    use fabric_diagnostics::DiagnosticSink;

    fn device() -> Device {
        DeviceBuilder::new("xc-arena", 2, 2)
            .build(&DiagnosticSink::new())
            .unwrap()
    }

    #[test]
    fn alloc_and_get() {
        let device = device();
        let mut arena = SearchArena::new();
        assert!(arena.is_empty());
        let tile = device.tile_at(0, 1).unwrap();
        let id = arena.alloc(Node::new(tile, WireId::from_raw(3)));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(id).wire(), WireId::from_raw(3));
        assert_eq!(arena[id].coord(), TileCoord::new(0, 1));
    }

    #[test]
    fn mutate_through_index() {
        let device = device();
        let mut arena = SearchArena::new();
        let id = arena.alloc(Node::new(device.tile_at(0, 0).unwrap(), WireId::from_raw(0)));
        arena[id].set_cost(8);
        assert_eq!(arena.get(id).cost(), 8);
    }

    #[test]
    fn path_follows_parents() {
        let device = device();
        let tile = device.tile_at(1, 1).unwrap();
        let mut arena = SearchArena::new();
        let root = arena.alloc(Node::new(tile, WireId::from_raw(0)));
        let mid = arena.alloc(Node::with_parent(tile, WireId::from_raw(1), Some(root), 1));
        let _side = arena.alloc(Node::with_parent(tile, WireId::from_raw(9), Some(root), 1));
        let leaf = arena.alloc(Node::with_parent(tile, WireId::from_raw(2), Some(mid), 2));
        assert_eq!(arena.path(leaf), vec![root, mid, leaf]);
        assert_eq!(arena.path(root), vec![root]);
    }

    #[test]
    fn iter_in_allocation_order() {
        let device = device();
        let tile = device.tile_at(0, 0).unwrap();
        let mut arena = SearchArena::new();
        for raw in [5, 6, 7] {
            arena.alloc(Node::new(tile, WireId::from_raw(raw)));
        }
        let wires: Vec<u32> = arena.iter().map(|(_, n)| n.wire().as_raw()).collect();
        assert_eq!(wires, vec![5, 6, 7]);
        let ids: Vec<u32> = arena.iter().map(|(id, _)| id.as_raw()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
