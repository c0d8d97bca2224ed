use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entities::{
    Combination, GemCounts, GemKind, N_GEMS, N_TREASURES, SlotShape, TreasureKind,
    fits_capacity,
};
use crate::pricing::PriceModel;
use crate::util::assertions::catalog_is_ranked;

/// Ordering of catalog listings. Both orderings are descending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Profit,
    FinalPrice,
}

/// What to do with a combination that does not fit the sockets of its treasure
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// Keep the combination and report the violation
    #[default]
    Retain,
    /// Drop the combination and report the violation
    Exclude,
}

/// A combination that holds more gems of a shape than its treasure has sockets for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacityViolation {
    pub treasure: TreasureKind,
    pub gems: GemCounts,
    pub retained: bool,
}

impl Display for CapacityViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let cap = self.treasure.capacity();
        write!(
            f,
            "gem combination for '{}' is illegal: {} circle(s) for {} socket(s), {} square(s) for {} socket(s) ({})",
            self.treasure,
            self.gems.shape_total(SlotShape::Circle),
            cap.circles,
            self.gems.shape_total(SlotShape::Square),
            cap.squares,
            if self.retained { "retained" } else { "excluded" }
        )
    }
}

/// All known gem combinations, grouped per treasure and ranked.
///
/// Built once and read by every allocator.
/// Within a treasure, combinations are stored in `index` order (descending final price).
/// Ties in either ordering are broken by insertion order.
#[derive(Clone, Debug)]
pub struct Catalog {
    model: PriceModel,
    combinations: [Vec<Combination>; N_TREASURES],
    violations: Vec<CapacityViolation>,
}

impl Catalog {
    /// Builds a catalog from raw `(treasure, gems)` records, in the order they are given.
    pub fn build(
        model: PriceModel,
        records: impl IntoIterator<Item = (TreasureKind, GemCounts)>,
        policy: CapacityPolicy,
    ) -> Self {
        let mut grouped: [Vec<GemCounts>; N_TREASURES] = Default::default();
        records
            .into_iter()
            .for_each(|(t, gems)| grouped[t.id()].push(gems));

        let built = TreasureKind::ALL
            .par_iter()
            .map(|&t| rank_treasure(&model, t, &grouped[t.id()], policy))
            .collect::<Vec<_>>();

        let mut combinations: [Vec<Combination>; N_TREASURES] = Default::default();
        let mut violations = vec![];
        for (t, (combos, t_violations)) in TreasureKind::ALL.into_iter().zip(built) {
            combinations[t.id()] = combos;
            violations.extend(t_violations);
        }

        for v in violations.iter() {
            warn!("[CATALOG] {v}");
        }

        let catalog = Self {
            model,
            combinations,
            violations,
        };

        info!(
            "[CATALOG] {} combinations over {} treasures ({} capacity violations)",
            catalog.len(),
            catalog.treasures_present(),
            catalog.violations.len()
        );
        debug_assert!(catalog_is_ranked(&catalog));

        catalog
    }

    /// Builds a catalog containing every legal combination of every treasure,
    /// including the one without any gems.
    pub fn enumerate(model: PriceModel) -> Self {
        let records = TreasureKind::ALL
            .into_iter()
            .flat_map(|t| legal_gem_sets(t).map(move |gems| (t, gems)))
            .collect_vec();
        Catalog::build(model, records, CapacityPolicy::Retain)
    }

    /// Every combination of every treasure, sorted by `key`.
    /// Ties keep treasure declaration order, then insertion order.
    pub fn all_combinations(&self, key: SortKey) -> Vec<Combination> {
        let mut all = self
            .combinations
            .iter()
            .flat_map(|combos| combos.iter().sorted_by_key(|c| c.seq))
            .cloned()
            .collect_vec();
        all.sort_by(|a, b| {
            compare_key(a, b, key)
                .then(a.treasure.cmp(&b.treasure))
                .then(a.seq.cmp(&b.seq))
        });
        all
    }

    /// The combinations of `treasure`, sorted by `key`
    pub fn combinations_for(&self, treasure: TreasureKind, key: SortKey) -> Vec<Combination> {
        let mut combos = self.combinations[treasure.id()].clone();
        combos.sort_by(|a, b| compare(a, b, key));
        combos
    }

    /// Iterates over all combinations without copying, per treasure in `index` order
    pub fn iter(&self) -> impl Iterator<Item = &Combination> {
        self.combinations.iter().flatten()
    }

    /// Iterates over the combinations of `treasure` in `index` order
    pub fn iter_for(&self, treasure: TreasureKind) -> impl Iterator<Item = &Combination> {
        self.combinations[treasure.id()].iter()
    }

    /// First combination of `treasure` holding exactly `gems`
    pub fn find(&self, treasure: TreasureKind, gems: &GemCounts) -> Option<&Combination> {
        self.iter_for(treasure).find(|c| c.gems == *gems)
    }

    pub fn model(&self) -> &PriceModel {
        &self.model
    }

    pub fn violations(&self) -> &[CapacityViolation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.combinations.iter().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn treasures_present(&self) -> usize {
        self.combinations.iter().filter(|c| !c.is_empty()).count()
    }
}

fn compare_key(a: &Combination, b: &Combination, key: SortKey) -> Ordering {
    match key {
        SortKey::Profit => b.profit().cmp(&a.profit()),
        SortKey::FinalPrice => b.final_price().cmp(&a.final_price()),
    }
}

/// Descending on `key`, ascending on insertion order
fn compare(a: &Combination, b: &Combination, key: SortKey) -> Ordering {
    compare_key(a, b, key).then(a.seq.cmp(&b.seq))
}

fn rank_treasure(
    model: &PriceModel,
    treasure: TreasureKind,
    gem_sets: &[GemCounts],
    policy: CapacityPolicy,
) -> (Vec<Combination>, Vec<CapacityViolation>) {
    let mut violations = vec![];
    let mut combos = vec![];

    for (seq, gems) in gem_sets.iter().enumerate() {
        if !fits_capacity(treasure, gems) {
            let retained = policy == CapacityPolicy::Retain;
            violations.push(CapacityViolation {
                treasure,
                gems: *gems,
                retained,
            });
            if !retained {
                continue;
            }
        }
        let mut combo = Combination::new(treasure, *gems, model);
        combo.seq = seq;
        combos.push(combo);
    }

    combos.sort_by(|a, b| compare(a, b, SortKey::Profit));
    combos.iter_mut().enumerate().for_each(|(i, c)| c.rank = i);

    combos.sort_by(|a, b| compare(a, b, SortKey::FinalPrice));
    combos.iter_mut().enumerate().for_each(|(i, c)| c.index = i);

    (combos, violations)
}

/// All gem sets fitting the sockets of `treasure`: every multiset of circle gems up to the
/// circle capacity, combined with every multiset of square gems up to the square capacity.
pub fn legal_gem_sets(treasure: TreasureKind) -> impl Iterator<Item = GemCounts> {
    let cap = treasure.capacity();
    let circles = shape_multisets(SlotShape::Circle, cap.circles);
    let squares = shape_multisets(SlotShape::Square, cap.squares);
    circles
        .into_iter()
        .cartesian_product(squares)
        .map(|(c, s)| c.saturating_add(&s))
}

fn shape_multisets(shape: SlotShape, max_size: u32) -> Vec<GemCounts> {
    let kinds = GemKind::with_shape(shape).collect_vec();
    (0..=max_size as usize)
        .flat_map(|size| {
            kinds
                .iter()
                .copied()
                .combinations_with_replacement(size)
                .map(|gems| {
                    let mut counts = [0u32; N_GEMS];
                    gems.iter().for_each(|g| counts[g.id()] += 1);
                    GemCounts::new(counts)
                })
                .collect_vec()
        })
        .collect()
}
