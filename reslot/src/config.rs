use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use treasure_rs::alloc::Strategy;
use treasure_rs::entities::CapacityPolicy;
use treasure_rs::milp::BnbConfig;
use treasure_rs::pricing::PriceTable;

/// Configuration for the reslot optimizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReslotConfig {
    /// Base prices of treasures and gems. Missing entries use the built-in prices
    pub prices: PriceTable,
    /// Record file with the combinations to choose from. If undefined, every legal combination is enumerated
    pub combinations_file: Option<PathBuf>,
    /// Whether combinations exceeding the sockets of their treasure are kept in the catalog
    pub capacity_policy: CapacityPolicy,
    pub strategy: Strategy,
    /// Fall back to the greedy strategy if the optimal one fails
    pub fallback_to_greedy: bool,
    /// Limits of the branch-and-bound solver used by the optimal strategy
    pub solver: BnbConfig,
}

impl Default for ReslotConfig {
    fn default() -> Self {
        Self {
            prices: PriceTable::default(),
            combinations_file: None,
            capacity_policy: CapacityPolicy::Retain,
            strategy: Strategy::Optimal,
            fallback_to_greedy: true,
            solver: BnbConfig::default(),
        }
    }
}
