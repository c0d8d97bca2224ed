use serde::{Deserialize, Serialize};

use crate::entities::Allocation;

/// Filled treasures present on one side of a comparison but not matched on the other.
///
/// Matching is a first-match multiset difference: every baseline entry is paired with the first
/// unpaired equal candidate entry, in list order. Equal entries are interchangeable, so the
/// pairing order does not affect the leftovers' totals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDiff {
    pub baseline_leftovers: Allocation,
    pub candidate_leftovers: Allocation,
}

impl ListDiff {
    /// `true` if both lists hold the same filled treasures
    pub fn is_empty(&self) -> bool {
        self.baseline_leftovers.is_empty() && self.candidate_leftovers.is_empty()
    }

    pub fn baseline_total(&self) -> u64 {
        self.baseline_leftovers.total_price()
    }

    pub fn candidate_total(&self) -> u64 {
        self.candidate_leftovers.total_price()
    }
}

pub fn diff(baseline: &Allocation, candidate: &Allocation) -> ListDiff {
    let mut paired = vec![false; candidate.len()];
    let mut baseline_leftovers = Allocation::default();

    for b in baseline.iter() {
        let matched = candidate
            .treasures()
            .iter()
            .zip(paired.iter())
            .position(|(c, &p)| !p && c == b);
        match matched {
            Some(j) => paired[j] = true,
            None => baseline_leftovers.push(*b),
        }
    }

    let candidate_leftovers = candidate
        .iter()
        .zip(paired)
        .filter(|(_, p)| !p)
        .map(|(c, _)| *c)
        .collect();

    ListDiff {
        baseline_leftovers,
        candidate_leftovers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{FilledTreasure, GemCounts, GemKind, TreasureKind};
    use crate::pricing::PriceModel;

    fn filled(treasure: TreasureKind, gems: &[(GemKind, u32)]) -> FilledTreasure {
        FilledTreasure::new(treasure, GemCounts::from_pairs(gems), &PriceModel::default())
    }

    fn sample() -> Allocation {
        Allocation::new(vec![
            filled(TreasureKind::Flagon, &[(GemKind::Ruby, 2)]),
            filled(TreasureKind::Flagon, &[(GemKind::Ruby, 2)]),
            filled(TreasureKind::GoldenLynx, &[(GemKind::Emerald, 1)]),
            filled(TreasureKind::ElegantMask, &[]),
        ])
    }

    #[test]
    fn identical_lists_have_no_leftovers() {
        let a = sample();
        let d = diff(&a, &a);
        assert!(d.is_empty());
        assert_eq!(d.baseline_total(), 0);
        assert_eq!(d.candidate_total(), 0);
    }

    #[test]
    fn order_does_not_matter() {
        let a = sample();
        let reversed = Allocation::new(a.treasures().iter().rev().copied().collect());
        assert!(diff(&a, &reversed).is_empty());
    }

    #[test]
    fn duplicates_are_matched_once() {
        let baseline = sample();
        let candidate = Allocation::new(vec![
            filled(TreasureKind::Flagon, &[(GemKind::Ruby, 2)]),
            filled(TreasureKind::Flagon, &[(GemKind::Ruby, 1), (GemKind::Sapphire, 1)]),
            filled(TreasureKind::ElegantMask, &[]),
        ]);
        let d = diff(&baseline, &candidate);

        assert_eq!(d.baseline_leftovers.len(), 2);
        assert_eq!(
            d.baseline_leftovers.treasures()[0],
            filled(TreasureKind::Flagon, &[(GemKind::Ruby, 2)])
        );
        assert_eq!(d.baseline_leftovers.treasures()[1].treasure, TreasureKind::GoldenLynx);
        assert_eq!(d.candidate_leftovers.len(), 1);
        assert_eq!(d.candidate_total(), 5940);
        assert_eq!(d.baseline_total(), 6720 + d.baseline_leftovers.treasures()[1].final_price());
    }

    #[test]
    fn same_gems_in_another_treasure_differ() {
        let baseline = Allocation::new(vec![filled(TreasureKind::ElegantBangle, &[(GemKind::Ruby, 2)])]);
        let candidate = Allocation::new(vec![filled(TreasureKind::Flagon, &[(GemKind::Ruby, 2)])]);
        let d = diff(&baseline, &candidate);
        assert_eq!(d.baseline_leftovers.len(), 1);
        assert_eq!(d.candidate_leftovers.len(), 1);
    }
}
