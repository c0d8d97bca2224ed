use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::entities::{Combination, GemCounts, N_TREASURES, TreasureKind};
use crate::pricing::{PriceModel, Pricing};

/// A treasure with gems slotted in, ready to be sold.
/// Two filled treasures are equal when they hold the same gems in the same kind of treasure.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FilledTreasure {
    pub treasure: TreasureKind,
    pub gems: GemCounts,
    pub pricing: Pricing,
}

impl FilledTreasure {
    pub fn new(treasure: TreasureKind, gems: GemCounts, model: &PriceModel) -> Self {
        Self {
            treasure,
            gems,
            pricing: model.evaluate(treasure, &gems),
        }
    }

    pub fn final_price(&self) -> u64 {
        self.pricing.final_price
    }
}

impl From<&Combination> for FilledTreasure {
    fn from(c: &Combination) -> Self {
        Self {
            treasure: c.treasure,
            gems: c.gems,
            pricing: c.pricing,
        }
    }
}

impl PartialEq for FilledTreasure {
    fn eq(&self, other: &Self) -> bool {
        self.treasure == other.treasure && self.gems == other.gems
    }
}

impl Eq for FilledTreasure {}

impl Display for FilledTreasure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} (P={}, G={}): {} ({})",
            self.treasure,
            self.pricing.final_price,
            self.pricing.profit,
            self.pricing.gem_price,
            self.gems.color_counts(),
            self.gems
        )
    }
}

/// Ordered list of filled treasures
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    treasures: Vec<FilledTreasure>,
}

impl Allocation {
    pub fn new(treasures: Vec<FilledTreasure>) -> Self {
        Self { treasures }
    }

    pub fn push(&mut self, treasure: FilledTreasure) {
        self.treasures.push(treasure);
    }

    pub fn treasures(&self) -> &[FilledTreasure] {
        &self.treasures
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilledTreasure> {
        self.treasures.iter()
    }

    pub fn len(&self) -> usize {
        self.treasures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.treasures.is_empty()
    }

    pub fn clear(&mut self) {
        self.treasures.clear();
    }

    /// Sum of the final prices of all filled treasures
    pub fn total_price(&self) -> u64 {
        self.treasures.iter().map(|t| t.final_price()).sum()
    }

    /// All gems used across the allocation
    pub fn gem_usage(&self) -> GemCounts {
        self.treasures
            .iter()
            .fold(GemCounts::EMPTY, |acc, t| acc.saturating_add(&t.gems))
    }

    /// Number of treasures used per [`TreasureKind::id`]
    pub fn treasure_usage(&self) -> [usize; N_TREASURES] {
        let mut usage = [0; N_TREASURES];
        self.treasures
            .iter()
            .for_each(|t| usage[t.treasure.id()] += 1);
        usage
    }
}

impl FromIterator<FilledTreasure> for Allocation {
    fn from_iter<I: IntoIterator<Item = FilledTreasure>>(iter: I) -> Self {
        Allocation::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Allocation {
    type Item = &'a FilledTreasure;
    type IntoIter = std::slice::Iter<'a, FilledTreasure>;

    fn into_iter(self) -> Self::IntoIter {
        self.treasures.iter()
    }
}
