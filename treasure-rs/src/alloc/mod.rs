mod greedy;
mod optimal;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{Allocation, Catalog, Ledger};

#[doc(inline)]
pub use greedy::GreedyProfitAllocator;
#[doc(inline)]
pub use optimal::{OptimalAllocator, Plan};

/// Fills the open treasures of a [`Ledger`] with its loose gems.
pub trait Allocator {
    fn name(&self) -> &str;

    /// Allocates as much of `ledger` as the strategy sees fit.
    /// Everything placed in the returned [`Allocation`] is removed from `ledger`.
    /// On error, `ledger` is left untouched.
    fn allocate(&mut self, catalog: &Catalog, ledger: &mut Ledger) -> Result<Allocation, AllocError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("no feasible allocation exists")]
    Infeasible,
    #[error("{solver} failed: {reason}")]
    Solver { solver: String, reason: String },
    #[error("planned combination is not available in the ledger: {0}")]
    PlanMismatch(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Exact maximization of the total sale value
    #[default]
    Optimal,
    /// Highest profit first
    Greedy,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Optimal => f.write_str("optimal"),
            Strategy::Greedy => f.write_str("greedy"),
        }
    }
}
