use std::fmt::{Display, Formatter};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{
    Allocation, Combination, Entity, FilledTreasure, GemCounts, GemKind, N_TREASURES,
    TreasureKind, UnknownEntity, resolve_name,
};

/// Reasons a [`Ledger`] refuses a modification. A refused modification leaves the ledger untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("not enough {gem}: {available} in stock, {requested} requested")]
    InsufficientGems {
        gem: GemKind,
        available: u32,
        requested: u64,
    },
    #[error("not enough {treasure}: {available} in stock, {requested} requested")]
    InsufficientTreasures {
        treasure: TreasureKind,
        available: usize,
        requested: u64,
    },
    #[error("quantity {0} exceeds the ledger's range")]
    Overflow(i64),
    #[error(transparent)]
    UnknownEntity(#[from] UnknownEntity),
}

/// Stock of loose gems and open (empty) treasures.
///
/// Every allocation strategy mutates the stock exclusively through [`Ledger::try_consume`],
/// which is all-or-nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    gems: GemCounts,
    treasures: [usize; N_TREASURES],
}

/// Immutable copy of a [`Ledger`]'s state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub gems: GemCounts,
    pub treasures: [usize; N_TREASURES],
}

impl LedgerSnapshot {
    pub fn gem_count(&self, gem: GemKind) -> u32 {
        self.gems.get(gem)
    }

    pub fn treasure_count(&self, treasure: TreasureKind) -> usize {
        self.treasures[treasure.id()]
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger by taking every gem out of every treasure in `allocation`.
    pub fn from_allocation(allocation: &Allocation) -> Self {
        let mut ledger = Ledger::new();
        allocation.iter().for_each(|t| ledger.unslot(t));
        ledger
    }

    /// Returns a filled treasure to the stock: the treasure is opened and its gems become loose.
    pub fn unslot(&mut self, filled: &FilledTreasure) {
        self.treasures[filled.treasure.id()] += 1;
        self.gems = self.gems.saturating_add(&filled.gems);
    }

    /// Adds `delta` units of `gem` (removes them if negative).
    pub fn add_gem(&mut self, gem: GemKind, delta: i64) -> Result<(), LedgerError> {
        let available = self.gems.get(gem);
        let updated = (available as i64)
            .checked_add(delta)
            .ok_or(LedgerError::Overflow(delta))?;
        if updated < 0 {
            return Err(LedgerError::InsufficientGems {
                gem,
                available,
                requested: delta.unsigned_abs(),
            });
        }
        let updated = u32::try_from(updated).map_err(|_| LedgerError::Overflow(delta))?;
        self.gems.set(gem, updated);
        Ok(())
    }

    /// Adds `delta` open treasures of kind `treasure` (removes them if negative).
    pub fn add_treasure(&mut self, treasure: TreasureKind, delta: i64) -> Result<(), LedgerError> {
        let available = self.treasures[treasure.id()];
        let updated = (available as i64)
            .checked_add(delta)
            .ok_or(LedgerError::Overflow(delta))?;
        if updated < 0 {
            return Err(LedgerError::InsufficientTreasures {
                treasure,
                available,
                requested: delta.unsigned_abs(),
            });
        }
        self.treasures[treasure.id()] = updated as usize;
        Ok(())
    }

    /// Adds (or removes if negative) `delta` units of whatever gem or treasure `name` resolves to.
    pub fn add_by_name(&mut self, name: &str, delta: i64) -> Result<Entity, LedgerError> {
        let entity = resolve_name(name)?;
        match entity {
            Entity::Gem(gem) => self.add_gem(gem, delta)?,
            Entity::Treasure(treasure) => self.add_treasure(treasure, delta)?,
        }
        Ok(entity)
    }

    /// Slots the gems of `combination` into one open treasure of the matching kind.
    ///
    /// Succeeds only if such a treasure is open and every required gem is in stock.
    /// On success the gems and the treasure leave the ledger; on failure nothing changes.
    pub fn try_consume(&mut self, combination: &Combination) -> Option<FilledTreasure> {
        let t_id = combination.treasure.id();
        if self.treasures[t_id] == 0 {
            return None;
        }
        let remaining = self.gems.checked_sub(&combination.gems)?;

        self.gems = remaining;
        self.treasures[t_id] -= 1;
        debug!("consumed {combination}");

        Some(FilledTreasure::from(combination))
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            gems: self.gems,
            treasures: self.treasures,
        }
    }

    pub fn gems(&self) -> &GemCounts {
        &self.gems
    }

    pub fn gem_count(&self, gem: GemKind) -> u32 {
        self.gems.get(gem)
    }

    pub fn treasure_count(&self, treasure: TreasureKind) -> usize {
        self.treasures[treasure.id()]
    }

    /// Total number of open treasures, all kinds combined
    pub fn open_treasures(&self) -> usize {
        self.treasures.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.open_treasures() == 0 && self.gems.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Ledger::default();
    }
}

impl From<LedgerSnapshot> for Ledger {
    fn from(snapshot: LedgerSnapshot) -> Self {
        Self {
            gems: snapshot.gems,
            treasures: snapshot.treasures,
        }
    }
}

impl Display for Ledger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Gem Count: {}", self.gems.total())?;
        for (gem, qty) in self.gems.iter() {
            writeln!(f, "    {gem}: {qty}")?;
        }
        write!(f, "Treasure Count: {}", self.open_treasures())?;
        for t in TreasureKind::ALL {
            let qty = self.treasure_count(t);
            if qty > 0 {
                write!(f, "\n    {t} x{qty}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceModel;
    use GemKind::*;

    fn flagon_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_treasure(TreasureKind::Flagon, 2).unwrap();
        ledger.add_gem(Ruby, 3).unwrap();
        ledger.add_gem(Sapphire, 1).unwrap();
        ledger
    }

    fn two_rubies() -> Combination {
        Combination::new(
            TreasureKind::Flagon,
            GemCounts::from_pairs(&[(Ruby, 2)]),
            &PriceModel::default(),
        )
    }

    #[test]
    fn consume_deducts_gems_and_one_treasure() {
        let mut ledger = flagon_ledger();
        let before = ledger.snapshot();
        let filled = ledger.try_consume(&two_rubies()).unwrap();

        assert_eq!(filled.treasure, TreasureKind::Flagon);
        assert_eq!(filled.final_price(), 6720);
        assert_eq!(ledger.gem_count(Ruby), before.gem_count(Ruby) - 2);
        assert_eq!(ledger.gem_count(Sapphire), before.gem_count(Sapphire));
        assert_eq!(
            ledger.treasure_count(TreasureKind::Flagon),
            before.treasure_count(TreasureKind::Flagon) - 1
        );
    }

    #[test]
    fn failed_consume_leaves_ledger_untouched() {
        let mut ledger = flagon_ledger();
        ledger.try_consume(&two_rubies()).unwrap();
        // one ruby left, the second attempt must fail on gems
        let before = ledger.clone();
        assert!(ledger.try_consume(&two_rubies()).is_none());
        assert_eq!(ledger, before);

        // no treasure of the requested kind
        let lamp = Combination::new(
            TreasureKind::ButterflyLamp,
            GemCounts::EMPTY,
            &PriceModel::default(),
        );
        assert!(ledger.try_consume(&lamp).is_none());
        assert_eq!(ledger, before);
    }

    #[test]
    fn add_refuses_negative_stock() {
        let mut ledger = flagon_ledger();
        let before = ledger.clone();

        let err = ledger.add_gem(Sapphire, -2).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientGems { available: 1, requested: 2, .. }));
        let err = ledger.add_treasure(TreasureKind::Flagon, -3).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientTreasures { available: 2, .. }));
        assert_eq!(ledger, before);

        ledger.add_treasure(TreasureKind::Flagon, -2).unwrap();
        assert_eq!(ledger.open_treasures(), 0);
    }

    #[test]
    fn add_by_name_resolves_aliases() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.add_by_name("rb", 2).unwrap(), Entity::Gem(RedBeryl));
        assert_eq!(
            ledger.add_by_name("Golden Lynx", 1).unwrap(),
            Entity::Treasure(TreasureKind::GoldenLynx)
        );
        let before = ledger.clone();
        assert!(matches!(
            ledger.add_by_name("opal", 1),
            Err(LedgerError::UnknownEntity(_))
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn unslot_reverses_consume() {
        let mut ledger = flagon_ledger();
        let before = ledger.clone();
        let filled = ledger.try_consume(&two_rubies()).unwrap();
        ledger.unslot(&filled);
        assert_eq!(ledger, before);
    }
}
