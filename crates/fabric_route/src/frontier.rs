//! Open set and visited map of one routing search.
//!
//! Every vertex moves through `Open -> Expanded`. A re-derivation of a known
//! vertex is recognized through its [`NodeKey`]: if it is strictly cheaper it
//! becomes the vertex's best node and the vertex is re-opened, otherwise it
//! is discarded. Superseded heap entries are skipped lazily by
//! [`Frontier::pop`].

use crate::arena::SearchArena;
use crate::ids::NodeId;
use crate::node::{Node, NodeKey};
use fabric_device::Device;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// Where a vertex stands in the search.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VisitState {
    /// Waiting in the open set.
    Open,
    /// Popped and handed to the caller for expansion.
    Expanded,
}

/// The result of offering a node to the frontier.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PushOutcome {
    /// First derivation of the vertex; it is now open.
    Opened(NodeId),
    /// A cheaper derivation of a known vertex; it replaced the old best node.
    Improved(NodeId),
    /// A derivation no cheaper than the known best; nothing was stored.
    Discarded,
}

#[derive(Debug)]
struct Visit {
    best: NodeId,
    cost: i32,
    state: VisitState,
}

/// A heap entry; ties on cost pop in insertion order.
#[derive(Debug, PartialEq, Eq)]
struct OpenEntry {
    cost: i32,
    sequence: u64,
    id: NodeId,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default)
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The open set and visited map of a single search.
#[derive(Debug, Default)]
pub struct Frontier<'d> {
    arena: SearchArena<'d>,
    open: BinaryHeap<OpenEntry>,
    visits: HashMap<NodeKey, Visit>,
    sequence: u64,
}

impl<'d> Frontier<'d> {
    /// Creates an empty frontier.
    pub fn new() -> Self {
        Self {
            arena: SearchArena::new(),
            open: BinaryHeap::new(),
            visits: HashMap::new(),
            sequence: 0,
        }
    }

    /// Offers a node to the open set.
    pub fn push(&mut self, node: Node<'d>) -> PushOutcome {
        let key = node.key();
        let known = match self.visits.get(&key) {
            Some(visit) if node.cost() >= visit.cost => return PushOutcome::Discarded,
            Some(_) => true,
            None => false,
        };

        let cost = node.cost();
        let id = self.arena.alloc(node);
        self.visits.insert(
            key,
            Visit {
                best: id,
                cost,
                state: VisitState::Open,
            },
        );
        self.open.push(OpenEntry {
            cost,
            sequence: self.sequence,
            id,
        });
        self.sequence += 1;

        if known {
            PushOutcome::Improved(id)
        } else {
            PushOutcome::Opened(id)
        }
    }

    /// Removes and returns the cheapest open node, marking it expanded.
    ///
    /// Entries superseded by a cheaper derivation are skipped.
    pub fn pop(&mut self) -> Option<NodeId> {
        while let Some(entry) = self.open.pop() {
            let key = self.arena.get(entry.id).key();
            let Some(visit) = self.visits.get_mut(&key) else {
                continue;
            };
            if visit.best != entry.id || visit.state == VisitState::Expanded {
                continue; // Stale entry
            }
            visit.state = VisitState::Expanded;
            return Some(entry.id);
        }
        None
    }

    /// Pushes every child of node `id` that lies on `device`.
    ///
    /// `cost_fn` receives the parent and the zero-cost child and returns the
    /// child's cost. Returns the number of children that were opened or
    /// improved.
    pub fn expand_with(
        &mut self,
        id: NodeId,
        device: &'d Device,
        mut cost_fn: impl FnMut(&Node<'d>, &Node<'d>) -> i32,
    ) -> usize {
        let parent = *self.arena.get(id);
        let mut accepted = 0;
        for connection in parent.expand() {
            let Some(mut child) = parent.follow(id, connection, device) else {
                continue;
            };
            child.set_cost(cost_fn(&parent, &child));
            if self.push(child) != PushOutcome::Discarded {
                accepted += 1;
            }
        }
        accepted
    }

    /// Returns the state of a vertex, or `None` if it was never pushed.
    pub fn state(&self, key: &NodeKey) -> Option<VisitState> {
        self.visits.get(key).map(|visit| visit.state)
    }

    /// Returns the cheapest known node for a vertex.
    pub fn best(&self, key: &NodeKey) -> Option<NodeId> {
        self.visits.get(key).map(|visit| visit.best)
    }

    /// Returns a stored node.
    pub fn node(&self, id: NodeId) -> &Node<'d> {
        self.arena.get(id)
    }

    /// Root-first ids of the path to `id`.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        self.arena.path(id)
    }

    /// Returns the arena holding every node this search created.
    pub fn arena(&self) -> &SearchArena<'d> {
        &self.arena
    }

    /// Number of distinct vertices seen.
    pub fn visited_count(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if no open entry remains, stale or not.
    pub fn is_exhausted(&self) -> bool {
        self.open.is_empty()
    }
}
