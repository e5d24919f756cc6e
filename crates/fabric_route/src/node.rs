//! Routing nodes: (tile, wire) search vertices with cost and ancestry.
//!
//! A [`Node`] is transient search state. Its identity is the [`NodeKey`]
//! (tile coordinate plus wire); cost, history, level, parent and PIP flag are
//! bookkeeping that two derivations of the same vertex may disagree on, so
//! they take no part in equality or hashing. Ordering for the open set is by
//! cost alone and is exposed through [`Node::compare_order`] rather than
//! `Ord`, which would contradict that equality.

use crate::error::RouteError;
use crate::ids::NodeId;
use fabric_common::TileCoord;
use fabric_device::{Device, SinkPin, Tile, WireConnection, WireId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// The identity of a routing vertex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeKey {
    /// The tile holding the wire.
    pub coord: TileCoord,
    /// The wire within that tile.
    pub wire: WireId,
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.coord, self.wire)
    }
}

/// A (tile, wire) vertex reached during a routing search.
///
/// The node borrows its tile from the device, so it cannot outlive it, and
/// captures the wire's outgoing connections at construction.
#[derive(Clone, Copy)]
pub struct Node<'d> {
    tile: &'d Tile,
    wire: WireId,
    cost: i32,
    history: i32,
    level: u32,
    parent: Option<NodeId>,
    is_pip: bool,
    connections: &'d [WireConnection],
}

impl<'d> Node<'d> {
    /// A root node with zero cost and no parent.
    pub fn new(tile: &'d Tile, wire: WireId) -> Self {
        Self::with_pip(tile, wire, None, 0, false)
    }

    /// A node reached from `parent` at hop `level`.
    pub fn with_parent(tile: &'d Tile, wire: WireId, parent: Option<NodeId>, level: u32) -> Self {
        Self::with_pip(tile, wire, parent, level, false)
    }

    /// A node reached from `parent` at hop `level` through an edge whose PIP
    /// flag is `is_pip`.
    pub fn with_pip(
        tile: &'d Tile,
        wire: WireId,
        parent: Option<NodeId>,
        level: u32,
        is_pip: bool,
    ) -> Self {
        Self {
            tile,
            wire,
            cost: 0,
            history: 0,
            level,
            parent,
            is_pip,
            connections: tile.wire_connections(wire),
        }
    }

    /// Returns the tile this node lives in.
    pub fn tile(&self) -> &'d Tile {
        self.tile
    }

    /// Returns the wire this node stands for.
    pub fn wire(&self) -> WireId {
        self.wire
    }

    /// Returns the tile coordinate.
    pub fn coord(&self) -> TileCoord {
        self.tile.coord()
    }

    /// Returns the identity of this vertex.
    pub fn key(&self) -> NodeKey {
        NodeKey {
            coord: self.tile.coord(),
            wire: self.wire,
        }
    }

    /// Returns the search cost.
    pub fn cost(&self) -> i32 {
        self.cost
    }

    /// Sets the search cost.
    pub fn set_cost(&mut self, cost: i32) {
        self.cost = cost;
    }

    /// Returns the congestion history penalty.
    pub fn history(&self) -> i32 {
        self.history
    }

    /// Sets the congestion history penalty.
    pub fn set_history(&mut self, history: i32) {
        self.history = history;
    }

    /// Returns the hop count from the search root.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Sets the hop count.
    pub fn set_level(&mut self, level: u32) {
        self.level = level;
    }

    /// Returns the node this one was reached from.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Sets the parent link.
    pub fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    /// Returns `true` if the edge from the parent is a PIP.
    pub fn is_pip(&self) -> bool {
        self.is_pip
    }

    /// Sets the PIP flag.
    pub fn set_pip(&mut self, is_pip: bool) {
        self.is_pip = is_pip;
    }

    /// Candidate next hops: the wire's outgoing connections.
    pub fn expand(&self) -> &'d [WireConnection] {
        self.connections
    }

    /// Returns this wire's sink-pin record, if any.
    pub fn sink_pin(&self) -> Option<SinkPin> {
        self.tile.sink_pin(self.wire)
    }

    /// Builds the child reached through `connection`.
    ///
    /// `self_id` is this node's id in the search arena. The child is one level
    /// deeper, carries the connection's PIP flag and starts at zero cost.
    /// Returns `None` when the target tile is not part of `device`.
    pub fn follow(
        &self,
        self_id: NodeId,
        connection: &WireConnection,
        device: &'d Device,
    ) -> Option<Node<'d>> {
        let target = connection.target(self.coord())?;
        let tile = device.tile_at_coord(target)?;
        Some(Node::with_pip(
            tile,
            connection.wire,
            Some(self_id),
            self.level + 1,
            connection.is_pip,
        ))
    }

    /// Orders nodes by cost only.
    pub fn compare_order(&self, other: &Node<'_>) -> Ordering {
        self.cost.cmp(&other.cost)
    }

    /// Resolves this site-pin wire to the switch-matrix wire it feeds.
    ///
    /// The sink-pin offset is applied to this node's tile; the result is a
    /// zero-cost, level-0, parentless node in the target tile.
    pub fn resolve_switch_matrix_sink(&self, device: &'d Device) -> Result<Node<'d>, RouteError> {
        let pin = self.sink_pin().ok_or(RouteError::NoSinkPin {
            tile: self.coord(),
            wire: self.wire,
        })?;
        let row = i64::from(self.tile.row()) + i64::from(pin.row_delta());
        let column = i64::from(self.tile.column()) + i64::from(pin.column_delta());
        let tile = u32::try_from(row)
            .ok()
            .zip(u32::try_from(column).ok())
            .and_then(|(r, c)| device.tile_at(r, c))
            .ok_or(RouteError::TileOutOfBounds { row, column })?;
        Ok(Node::new(tile, pin.switch_matrix_sink_wire))
    }

    /// Manhattan distance between the two nodes' tiles.
    pub fn distance_to(&self, other: &Node<'_>) -> u32 {
        self.distance_to_tile(other.tile)
    }

    /// Manhattan distance from this node's tile to `tile`.
    pub fn distance_to_tile(&self, tile: &Tile) -> u32 {
        self.tile.manhattan_distance(tile)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Node<'_> {}

impl Hash for Node<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key())
            .field("cost", &self.cost)
            .field("history", &self.history)
            .field("level", &self.level)
            .field("parent", &self.parent)
            .field("is_pip", &self.is_pip)
            .finish()
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.tile.name(),
            self.wire,
            self.cost,
            self.level
        )
    }
}
