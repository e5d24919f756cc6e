//! Configuration types deserialized from `fabric.toml`.

use serde::Deserialize;

/// The top-level configuration parsed from `fabric.toml`.
///
/// Every section is optional; missing sections and keys take their defaults.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FabricConfig {
    /// Sizing of per-tile connectivity indices.
    #[serde(default)]
    pub index: IndexConfig,
    /// Negotiated-congestion router parameters.
    #[serde(default)]
    pub router: RouterConfig,
}

/// Sizing parameters for a wire connectivity index.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Requested initial slot count; rounded up to a power of two, minimum 4.
    pub initial_capacity: i32,
    /// Occupancy fraction above which the table doubles. Must be in `(0, 1)`.
    pub load_factor: f32,
}

impl IndexConfig {
    /// Default requested slot count.
    pub const DEFAULT_INITIAL_CAPACITY: i32 = 16;
    /// Default load factor.
    pub const DEFAULT_LOAD_FACTOR: f32 = 0.85;
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            load_factor: Self::DEFAULT_LOAD_FACTOR,
        }
    }
}

/// Parameters of negotiated-congestion routing.
///
/// The cost of occupying a routing resource is
/// `base_cost + present_penalty + history_factor * history`. The present
/// penalty is zero while the resource has spare capacity and
/// `present_factor * (1 + demand - wire_capacity)` once it is full; `history`
/// grows by the overuse at the end of every round in which the resource was
/// overused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Rounds of rip-up and reroute before giving up.
    pub max_iterations: u32,
    /// Cost of occupying an uncongested resource.
    pub base_cost: i32,
    /// Weight of the present-demand penalty.
    pub present_factor: i32,
    /// Weight of accumulated history.
    pub history_factor: i32,
    /// Number of nets a single resource may carry.
    pub wire_capacity: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            base_cost: 1,
            present_factor: 1,
            history_factor: 1,
            wire_capacity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FabricConfig::default();
        assert_eq!(config.index.initial_capacity, 16);
        assert_eq!(config.index.load_factor, 0.85);
        assert_eq!(config.router.max_iterations, 50);
        assert_eq!(config.router.wire_capacity, 1);
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config: FabricConfig = toml::from_str("[router]\nmax_iterations = 8\n").unwrap();
        assert_eq!(config.router.max_iterations, 8);
        assert_eq!(config.router.history_factor, 1);
        assert_eq!(config.index, IndexConfig::default());
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<FabricConfig, _> = toml::from_str("[index]\nbuckets = 3\n");
        assert!(result.is_err());
    }
}
