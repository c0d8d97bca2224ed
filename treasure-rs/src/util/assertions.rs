use itertools::Itertools;
use log::error;

use crate::entities::{Allocation, Catalog, Ledger, LedgerSnapshot, TreasureKind};
use crate::milp::MilpProblem;

//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks

/// Per treasure: combinations are stored by descending final price with matching `index`,
/// and `rank` is a permutation ordering them by descending profit.
pub fn catalog_is_ranked(catalog: &Catalog) -> bool {
    TreasureKind::ALL.into_iter().all(|t| {
        let combos = catalog.iter_for(t).collect_vec();

        let indexed = combos.iter().enumerate().all(|(i, c)| c.index == i)
            && combos
                .windows(2)
                .all(|w| w[0].final_price() >= w[1].final_price());

        let by_rank = combos.iter().sorted_by_key(|c| c.rank).collect_vec();
        let ranked = by_rank.iter().enumerate().all(|(i, c)| c.rank == i)
            && by_rank.windows(2).all(|w| w[0].profit() >= w[1].profit());

        if !(indexed && ranked) {
            error!("combinations of {t} are not ranked correctly");
        }
        indexed && ranked
    })
}

/// The allocation uses no more gems or treasures than the snapshot holds.
pub fn allocation_fits_snapshot(allocation: &Allocation, snapshot: &LedgerSnapshot) -> bool {
    let gems_fit = snapshot.gems.covers(&allocation.gem_usage());
    let treasures_fit = allocation
        .treasure_usage()
        .iter()
        .zip(snapshot.treasures.iter())
        .all(|(used, available)| used <= available);
    gems_fit && treasures_fit
}

/// `after` holds exactly what `before` held minus what `allocation` used.
pub fn ledger_accounts_for(
    before: &LedgerSnapshot,
    allocation: &Allocation,
    after: &Ledger,
) -> bool {
    let mut restored = after.clone();
    allocation.iter().for_each(|t| restored.unslot(t));
    restored.snapshot() == *before
}

/// Every constraint of `problem` is satisfied and every variable is within its bounds.
pub fn solution_is_feasible(problem: &MilpProblem, values: &[u64]) -> bool {
    values.len() == problem.n_variables() && problem.is_feasible(values)
}
