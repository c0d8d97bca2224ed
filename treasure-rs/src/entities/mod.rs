mod allocation;
mod catalog;
mod combination;
mod gem;
mod ledger;
mod treasure;

use thiserror::Error;

#[doc(inline)]
pub use allocation::{Allocation, FilledTreasure};
#[doc(inline)]
pub use catalog::{CapacityPolicy, CapacityViolation, Catalog, SortKey};
#[doc(inline)]
pub use combination::{Combination, fits_capacity};
#[doc(inline)]
pub use gem::{Color, ColorCounts, GemCounts, GemKind, N_COLORS, N_GEMS, SlotShape};
#[doc(inline)]
pub use ledger::{Ledger, LedgerError, LedgerSnapshot};
#[doc(inline)]
pub use treasure::{Capacity, N_TREASURES, TreasureKind};

/// A name that matches neither a gem nor a treasure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown gem or treasure name: '{0}'")]
pub struct UnknownEntity(pub String);

/// Anything that can be stocked in a [`Ledger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Gem(GemKind),
    Treasure(TreasureKind),
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Gem(g) => g.fmt(f),
            Entity::Treasure(t) => t.fmt(f),
        }
    }
}

/// Resolves a canonical name or alias to a gem, or failing that, to a treasure.
pub fn resolve_name(name: &str) -> Result<Entity, UnknownEntity> {
    GemKind::resolve(name)
        .map(Entity::Gem)
        .or_else(|| TreasureKind::resolve(name).map(Entity::Treasure))
        .ok_or_else(|| UnknownEntity(name.to_string()))
}
