//! Routing nodes and search-ordering machinery.
//!
//! A [`Node`] is one (tile, wire) vertex of the routing graph as seen by a
//! search: it borrows its tile from the [`Device`](fabric_device::Device),
//! carries cost, history and hop level, and links to its parent through a
//! [`NodeId`] into the search's [`SearchArena`]. A [`Frontier`] orders open
//! nodes by cost and recognizes re-derivations of the same vertex. Between
//! negotiated-congestion rounds a [`CongestionMap`] raises history costs on
//! overused vertices and reports whether another round is needed.

#![warn(missing_docs)]

pub mod arena;
pub mod congestion;
pub mod error;
pub mod frontier;
pub mod ids;
pub mod node;

pub use arena::SearchArena;
pub use congestion::{CongestionMap, RoundOutcome};
pub use error::RouteError;
pub use frontier::{Frontier, PushOutcome, VisitState};
pub use ids::NodeId;
pub use node::{Node, NodeKey};
