//! Pricing, ranking and allocation of gems slotted into treasures.

/// Allocation strategies: greedy by profit and exact by integer programming
pub mod alloc;

/// Comparison of two allocations, treasure by treasure
pub mod diff;

/// Gems, treasures, combinations and the stock they are drawn from
pub mod entities;

/// Reading and writing combination records and presets
pub mod io;

/// Small integer programming model and the branch-and-bound solver used by the exact allocator
pub mod milp;

/// Sale price evaluation
pub mod pricing;

/// Helper functions which do not belong to any specific module
pub mod util;
