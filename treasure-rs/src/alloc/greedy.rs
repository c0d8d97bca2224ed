use log::info;
use thousands::Separable;

use crate::alloc::{AllocError, Allocator};
use crate::entities::{Allocation, Catalog, Ledger, SortKey};

/// Walks all combinations by descending profit and takes each one as many times as the
/// ledger allows, until no open treasure remains.
///
/// Fast, but not optimal: a high-profit combination may consume gems that would have been
/// worth more in another treasure.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyProfitAllocator;

impl GreedyProfitAllocator {
    /// Infallible version of [`Allocator::allocate`]
    pub fn fill(catalog: &Catalog, ledger: &mut Ledger) -> Allocation {
        let mut allocation = Allocation::default();

        for combo in catalog.all_combinations(SortKey::Profit) {
            if ledger.open_treasures() == 0 {
                break;
            }
            while let Some(filled) = ledger.try_consume(&combo) {
                allocation.push(filled);
            }
        }

        info!(
            "[GREEDY] filled {} treasures, total value {}",
            allocation.len(),
            allocation.total_price().separate_with_commas()
        );
        allocation
    }
}

impl Allocator for GreedyProfitAllocator {
    fn name(&self) -> &str {
        "greedy"
    }

    fn allocate(&mut self, catalog: &Catalog, ledger: &mut Ledger) -> Result<Allocation, AllocError> {
        Ok(GreedyProfitAllocator::fill(catalog, ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CapacityPolicy, GemCounts, GemKind, TreasureKind};
    use crate::pricing::PriceModel;
    use crate::util::assertions::ledger_accounts_for;

    #[test]
    fn flagon_takes_two_rubies() {
        let records = vec![
            (
                TreasureKind::Flagon,
                GemCounts::from_pairs(&[(GemKind::Ruby, 1), (GemKind::Sapphire, 1)]),
            ),
            (
                TreasureKind::Flagon,
                GemCounts::from_pairs(&[(GemKind::Ruby, 2)]),
            ),
        ];
        let catalog = Catalog::build(PriceModel::default(), records, CapacityPolicy::Retain);

        let mut ledger = Ledger::new();
        ledger.add_treasure(TreasureKind::Flagon, 1).unwrap();
        ledger.add_gem(GemKind::Ruby, 2).unwrap();
        ledger.add_gem(GemKind::Sapphire, 1).unwrap();
        let before = ledger.snapshot();

        let allocation = GreedyProfitAllocator.allocate(&catalog, &mut ledger).unwrap();
        assert_eq!(allocation.len(), 1);
        assert_eq!(allocation.total_price(), 6720);
        assert_eq!(ledger.gem_count(GemKind::Sapphire), 1);
        assert_eq!(ledger.open_treasures(), 0);
        assert!(ledger_accounts_for(&before, &allocation, &ledger));
    }

    #[test]
    fn leftover_treasures_are_sold_empty() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let mut ledger = Ledger::new();
        ledger.add_treasure(TreasureKind::ChaliceOfAtonement, 3).unwrap();
        ledger.add_gem(GemKind::Emerald, 2).unwrap();

        let allocation = GreedyProfitAllocator::fill(&catalog, &mut ledger);
        assert_eq!(allocation.len(), 3);
        assert_eq!(allocation.gem_usage().get(GemKind::Emerald), 2);
        assert_eq!(allocation.iter().filter(|t| t.gems.is_empty()).count(), 2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn empty_ledger_yields_empty_allocation() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let mut ledger = Ledger::new();
        ledger.add_gem(GemKind::Ruby, 4).unwrap();
        let allocation = GreedyProfitAllocator::fill(&catalog, &mut ledger);
        assert!(allocation.is_empty());
        assert_eq!(ledger.gem_count(GemKind::Ruby), 4);
    }
}
