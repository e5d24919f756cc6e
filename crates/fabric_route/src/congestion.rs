//! Congestion tracking for negotiated congestion routing.
//!
//! Tracks how many nets use each routing vertex and maintains history costs
//! that grow every round a vertex stays overused, steering later searches
//! away from contested wires. [`CongestionMap::finish_round`] is the barrier
//! between rounds: it decides whether the routing has converged, should be
//! retried, or has run out of rounds.

use crate::arena::SearchArena;
use crate::ids::NodeId;
use crate::node::{Node, NodeKey};
use fabric_config::RouterConfig;
use fabric_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::HashMap;

/// How many overused vertices a non-convergence warning lists.
const REPORTED_OVERUSE: usize = 5;

/// What the driver should do after a round.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RoundOutcome {
    /// No vertex is overused; the routing is legal.
    Converged,
    /// Some vertices are overused; history was raised and demand cleared for
    /// the next round.
    Continue,
    /// Still overused after the configured number of rounds.
    GaveUp,
}

/// Per-vertex congestion state across negotiated-congestion rounds.
///
/// Present demand counts the nets currently using each vertex; history is the
/// accumulated overflow of earlier rounds. Both feed [`node_cost`](Self::node_cost).
#[derive(Debug, Clone)]
pub struct CongestionMap {
    /// Present demand: number of nets currently using each vertex.
    demand: HashMap<NodeKey, u32>,
    /// Accumulated overflow of each vertex across rounds.
    history: HashMap<NodeKey, i32>,
    config: RouterConfig,
    rounds: u32,
}

impl CongestionMap {
    /// Creates a congestion map with the default router settings.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Creates a congestion map using a `[router]` configuration section.
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            demand: HashMap::new(),
            history: HashMap::new(),
            config,
            rounds: 0,
        }
    }

    /// Returns the router settings in use.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Returns the number of rounds finished so far.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Records that a net is using the given vertex.
    pub fn add_usage(&mut self, key: NodeKey) {
        *self.demand.entry(key).or_insert(0) += 1;
    }

    /// Removes a net's usage of the given vertex.
    pub fn remove_usage(&mut self, key: NodeKey) {
        if let Some(d) = self.demand.get_mut(&key) {
            *d = d.saturating_sub(1);
            if *d == 0 {
                self.demand.remove(&key);
            }
        }
    }

    /// Records usage of every vertex on the path from the search root to
    /// `sink`.
    pub fn add_path(&mut self, arena: &SearchArena<'_>, sink: NodeId) {
        for id in arena.path(sink) {
            self.add_usage(arena.get(id).key());
        }
    }

    /// Returns the number of nets using the given vertex.
    pub fn demand(&self, key: &NodeKey) -> u32 {
        self.demand.get(key).copied().unwrap_or(0)
    }

    /// Penalty for one more net taking the vertex.
    ///
    /// Zero while the vertex has spare capacity, then
    /// `present_factor * (1 + demand - capacity)`.
    pub fn present_penalty(&self, key: &NodeKey) -> i32 {
        let demand = self.demand(key);
        let capacity = self.config.wire_capacity;
        if demand < capacity {
            return 0;
        }
        let overflow = i32::try_from(demand - capacity + 1).unwrap_or(i32::MAX);
        self.config.present_factor.saturating_mul(overflow)
    }

    /// Returns the accumulated history of the vertex.
    pub fn history(&self, key: &NodeKey) -> i32 {
        self.history.get(key).copied().unwrap_or(0)
    }

    /// Cost of routing through the vertex: base cost plus present penalty
    /// plus weighted history.
    pub fn node_cost(&self, key: &NodeKey) -> i32 {
        self.config
            .base_cost
            .saturating_add(self.present_penalty(key))
            .saturating_add(self.config.history_factor.saturating_mul(self.history(key)))
    }

    /// Copies the vertex's history onto `node`.
    pub fn apply_history(&self, node: &mut Node<'_>) {
        node.set_history(self.history(&node.key()));
    }

    /// Returns whether any vertex is overused (demand > capacity).
    pub fn has_congestion(&self) -> bool {
        self.demand.values().any(|&d| d > self.config.wire_capacity)
    }

    /// Returns the number of overused vertices.
    pub fn overused_count(&self) -> usize {
        self.demand
            .values()
            .filter(|&&d| d > self.config.wire_capacity)
            .count()
    }

    /// Returns the overused vertices in key order.
    pub fn overused(&self) -> Vec<NodeKey> {
        let mut keys: Vec<NodeKey> = self
            .demand
            .iter()
            .filter(|(_, &d)| d > self.config.wire_capacity)
            .map(|(&key, _)| key)
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Adds each overused vertex's overflow to its history.
    pub fn update_history(&mut self) {
        for (&key, &demand) in &self.demand {
            if demand > self.config.wire_capacity {
                let overflow =
                    i32::try_from(demand - self.config.wire_capacity).unwrap_or(i32::MAX);
                let entry = self.history.entry(key).or_insert(0);
                *entry = entry.saturating_add(overflow);
            }
        }
    }

    /// Clears all demand counters; history is kept.
    pub fn reset_demand(&mut self) {
        self.demand.clear();
    }

    /// Closes the current round.
    ///
    /// On convergence the demand is kept so the caller can inspect the final
    /// usage. Otherwise history is raised; if rounds remain the demand is
    /// cleared for the rip-up and [`RoundOutcome::Continue`] is returned,
    /// else an `R001` warning is emitted and [`RoundOutcome::GaveUp`] returned.
    pub fn finish_round(&mut self, sink: &DiagnosticSink) -> RoundOutcome {
        self.rounds += 1;
        if !self.has_congestion() {
            return RoundOutcome::Converged;
        }

        self.update_history();

        if self.rounds < self.config.max_iterations {
            self.reset_demand();
            return RoundOutcome::Continue;
        }

        let overused = self.overused();
        let mut diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Routing, 1),
            format!(
                "routing did not converge after {} iterations ({} overused resources)",
                self.rounds,
                overused.len()
            ),
        );
        if let Some(first) = overused.first() {
            diag = diag.at(first.coord);
        }
        for key in overused.iter().take(REPORTED_OVERUSE) {
            diag = diag.with_note(format!(
                "wire {} in tile {} has demand {}",
                key.wire,
                key.coord,
                self.demand(key)
            ));
        }
        sink.emit(diag.with_help("raise router.max_iterations or router.history_factor"));
        RoundOutcome::GaveUp
    }
}

impl Default for CongestionMap {
    fn default() -> Self {
        Self::new()
    }
}
