//! Evaluation of the sale price of a treasure with a given set of gems slotted in.
//!
//! ```text
//! treasure_price = base price of the treasure
//! gem_price      = sum of the base prices of the gems
//! final_price    = round_half_up((treasure_price + gem_price) * multiplier)
//! profit         = final_price - (treasure_price + gem_price)
//! ```
//!
//! Multipliers are exact tenths, so the whole computation is done in integer arithmetic.
//! A value ending in exactly `.5` always rounds up.

mod tier;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{GemCounts, GemKind, N_GEMS, N_TREASURES, TreasureKind};

#[doc(inline)]
pub use tier::Tier;

/// Base prices of treasures and gems, as read from a configuration file.
/// Entries absent from the maps fall back to the built-in defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    pub treasures: BTreeMap<TreasureKind, u64>,
    pub gems: BTreeMap<GemKind, u64>,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            treasures: TreasureKind::ALL
                .into_iter()
                .map(|t| (t, t.default_price()))
                .collect(),
            gems: GemKind::ALL
                .into_iter()
                .map(|g| (g, default_gem_price(g)))
                .collect(),
        }
    }
}

pub fn default_gem_price(gem: GemKind) -> u64 {
    match gem {
        GemKind::Ruby => 800,
        GemKind::Sapphire => 600,
        GemKind::YellowDiamond => 1500,
        GemKind::Emerald => 1200,
        GemKind::Alexandrite => 2000,
        GemKind::RedBeryl => 2500,
    }
}

/// Resolved, immutable price lookup. Built once and shared by reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceModel {
    treasure_prices: [u64; N_TREASURES],
    gem_prices: [u64; N_GEMS],
}

/// Result of [`PriceModel::evaluate`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pricing {
    pub treasure_price: u64,
    pub gem_price: u64,
    pub final_price: u64,
    pub profit: u64,
    pub tier: Tier,
}

impl PriceModel {
    pub fn new(table: &PriceTable) -> Self {
        let treasure_prices = TreasureKind::ALL.map(|t| {
            table
                .treasures
                .get(&t)
                .copied()
                .unwrap_or_else(|| t.default_price())
        });
        let gem_prices = GemKind::ALL.map(|g| {
            table
                .gems
                .get(&g)
                .copied()
                .unwrap_or_else(|| default_gem_price(g))
        });
        Self {
            treasure_prices,
            gem_prices,
        }
    }

    pub fn treasure_price(&self, treasure: TreasureKind) -> u64 {
        self.treasure_prices[treasure.id()]
    }

    pub fn gem_price(&self, gem: GemKind) -> u64 {
        self.gem_prices[gem.id()]
    }

    /// Sum of the base prices of all gems in `gems`
    pub fn gem_cost(&self, gems: &GemCounts) -> u64 {
        gems.iter()
            .map(|(g, qty)| self.gem_price(g) * qty as u64)
            .sum()
    }

    /// Evaluates the sale price of `treasure` holding `gems`.
    /// Socket capacity is not checked here.
    pub fn evaluate(&self, treasure: TreasureKind, gems: &GemCounts) -> Pricing {
        let treasure_price = self.treasure_price(treasure);
        let gem_price = self.gem_cost(gems);
        let tier = Tier::of(&gems.color_counts());
        let final_price = apply_multiplier(treasure_price + gem_price, tier);

        Pricing {
            treasure_price,
            gem_price,
            final_price,
            profit: final_price - (treasure_price + gem_price),
            tier,
        }
    }
}

impl Default for PriceModel {
    fn default() -> Self {
        PriceModel::new(&PriceTable::default())
    }
}

/// `round_half_up(base * tier.multiplier())`
pub fn apply_multiplier(base: u64, tier: Tier) -> u64 {
    (base * tier.tenths() + 5) / 10
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use GemKind::*;

    fn counts(pairs: &[(GemKind, u32)]) -> GemCounts {
        GemCounts::from_pairs(pairs)
    }

    #[test]
    fn flagon_with_two_rubies() {
        let model = PriceModel::default();
        let p = model.evaluate(TreasureKind::Flagon, &counts(&[(Ruby, 2)]));
        assert_eq!(p.tier, Tier::Duo);
        assert_eq!(p.treasure_price, 4000);
        assert_eq!(p.gem_price, 1600);
        assert_eq!(p.final_price, 6720);
        assert_eq!(p.profit, 1120);
    }

    #[test]
    fn flagon_with_ruby_and_sapphire() {
        let model = PriceModel::default();
        let p = model.evaluate(TreasureKind::Flagon, &counts(&[(Ruby, 1), (Sapphire, 1)]));
        assert_eq!(p.tier, Tier::TwoColors);
        assert_eq!(p.gem_price, 1400);
        assert_eq!(p.final_price, 5940);
        assert_eq!(p.profit, 540);
    }

    #[test_case(4015, Tier::TwoColors, 4417; "half rounds up")]
    #[test_case(4025, Tier::TwoColors, 4428; "half rounds up on odd")]
    #[test_case(4014, Tier::TwoColors, 4415; "below half")]
    #[test_case(5, Tier::FiveColors, 10; "exact")]
    #[test_case(5, Tier::Trio, 7; "seven point zero")]
    #[test_case(15, Tier::TwoDuos, 23; "twenty two point five")]
    fn rounding_boundary(base: u64, tier: Tier, expected: u64) {
        assert_eq!(apply_multiplier(base, tier), expected);
    }

    #[test]
    fn empty_treasure_sells_at_base_price() {
        let model = PriceModel::default();
        let p = model.evaluate(TreasureKind::ElegantCrown, &GemCounts::EMPTY);
        assert_eq!(p.tier, Tier::NoBonus);
        assert_eq!(p.final_price, 19000);
        assert_eq!(p.profit, 0);
    }

    #[test]
    fn five_colors_doubles_the_price() {
        let model = PriceModel::default();
        let gems = counts(&[
            (Ruby, 1),
            (Sapphire, 1),
            (Emerald, 1),
            (Alexandrite, 1),
            (YellowDiamond, 1),
        ]);
        let p = model.evaluate(TreasureKind::ElegantCrown, &gems);
        assert_eq!(p.tier, Tier::FiveColors);
        assert_eq!(p.final_price, 2 * (19000 + model.gem_cost(&gems)));
    }

    #[test]
    fn partial_price_table_falls_back_to_defaults() {
        let mut table = PriceTable::default();
        table.gems.remove(&Ruby);
        table.treasures.insert(TreasureKind::Flagon, 5000);
        let model = PriceModel::new(&table);
        assert_eq!(model.gem_price(Ruby), 800);
        assert_eq!(model.treasure_price(TreasureKind::Flagon), 5000);
    }
}
