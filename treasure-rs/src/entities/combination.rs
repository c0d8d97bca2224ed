use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::entities::{GemCounts, SlotShape, TreasureKind};
use crate::pricing::{PriceModel, Pricing};

/// A specific set of gems slotted into a specific kind of treasure, with its derived prices.
/// Combinations are created and ranked by the [`Catalog`](crate::entities::Catalog).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub treasure: TreasureKind,
    pub gems: GemCounts,
    pub pricing: Pricing,
    /// Position among the combinations of the same treasure, sorted by descending profit
    pub rank: usize,
    /// Position among the combinations of the same treasure, sorted by descending final price
    pub index: usize,
    /// Insertion order within the catalog, used to break ties
    #[serde(skip)]
    pub(crate) seq: usize,
}

impl Combination {
    /// Creates an unranked combination. `rank` and `index` are assigned by the catalog.
    pub fn new(treasure: TreasureKind, gems: GemCounts, model: &PriceModel) -> Self {
        Self {
            treasure,
            pricing: model.evaluate(treasure, &gems),
            gems,
            rank: usize::MAX,
            index: usize::MAX,
            seq: 0,
        }
    }

    pub fn final_price(&self) -> u64 {
        self.pricing.final_price
    }

    pub fn profit(&self) -> u64 {
        self.pricing.profit
    }

    /// `true` if the gems fit the sockets of the treasure
    pub fn fits(&self) -> bool {
        fits_capacity(self.treasure, &self.gems)
    }
}

pub fn fits_capacity(treasure: TreasureKind, gems: &GemCounts) -> bool {
    let cap = treasure.capacity();
    gems.shape_total(SlotShape::Circle) <= cap.circles
        && gems.shape_total(SlotShape::Square) <= cap.squares
}

impl Display for Combination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: [{},{}]={} (P={}, G={}): {} ({})",
            self.treasure,
            self.index,
            self.rank,
            self.final_price(),
            self.profit(),
            self.pricing.gem_price,
            self.gems.color_counts(),
            self.gems
        )
    }
}
