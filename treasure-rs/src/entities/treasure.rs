use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::UnknownEntity;
use crate::entities::gem::SlotShape;

/// Number of distinct [`TreasureKind`]s
pub const N_TREASURES: usize = 10;

/// Treasure with gem sockets. Sold as a whole, its price depends on the gems slotted into it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TreasureKind {
    ButterflyLamp,
    ChaliceOfAtonement,
    ElegantBangle,
    ElegantCrown,
    ElegantMask,
    ExtravagantClock,
    Flagon,
    GoldenLynx,
    OrnateNecklace,
    SplendidBangle,
}

/// Number of sockets per [`SlotShape`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub circles: u32,
    pub squares: u32,
}

impl Capacity {
    pub fn of(&self, shape: SlotShape) -> u32 {
        match shape {
            SlotShape::Circle => self.circles,
            SlotShape::Square => self.squares,
        }
    }
}

impl TreasureKind {
    pub const ALL: [TreasureKind; N_TREASURES] = [
        TreasureKind::ButterflyLamp,
        TreasureKind::ChaliceOfAtonement,
        TreasureKind::ElegantBangle,
        TreasureKind::ElegantCrown,
        TreasureKind::ElegantMask,
        TreasureKind::ExtravagantClock,
        TreasureKind::Flagon,
        TreasureKind::GoldenLynx,
        TreasureKind::OrnateNecklace,
        TreasureKind::SplendidBangle,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TreasureKind::ButterflyLamp => "Butterfly Lamp",
            TreasureKind::ChaliceOfAtonement => "Chalice of Atonement",
            TreasureKind::ElegantBangle => "Elegant Bangle",
            TreasureKind::ElegantCrown => "Elegant Crown",
            TreasureKind::ElegantMask => "Elegant Mask",
            TreasureKind::ExtravagantClock => "Extravagant Clock",
            TreasureKind::Flagon => "Flagon",
            TreasureKind::GoldenLynx => "Golden Lynx",
            TreasureKind::OrnateNecklace => "Ornate Necklace",
            TreasureKind::SplendidBangle => "Splendid Bangle",
        }
    }

    pub fn capacity(self) -> Capacity {
        let (circles, squares) = match self {
            TreasureKind::ButterflyLamp => (3, 0),
            TreasureKind::ChaliceOfAtonement => (0, 3),
            TreasureKind::ElegantBangle => (2, 0),
            TreasureKind::ElegantCrown => (2, 3),
            TreasureKind::ElegantMask => (3, 0),
            TreasureKind::ExtravagantClock => (1, 1),
            TreasureKind::Flagon => (2, 0),
            TreasureKind::GoldenLynx => (2, 1),
            TreasureKind::OrnateNecklace => (2, 2),
            TreasureKind::SplendidBangle => (0, 2),
        };
        Capacity { circles, squares }
    }

    /// Base price used when the price table does not override it
    pub fn default_price(self) -> u64 {
        match self {
            TreasureKind::ButterflyLamp => 6000,
            TreasureKind::ChaliceOfAtonement => 7000,
            TreasureKind::ElegantBangle => 5000,
            TreasureKind::ElegantCrown => 19000,
            TreasureKind::ElegantMask => 5000,
            TreasureKind::ExtravagantClock => 9000,
            TreasureKind::Flagon => 4000,
            TreasureKind::GoldenLynx => 15000,
            TreasureKind::OrnateNecklace => 11000,
            TreasureKind::SplendidBangle => 4000,
        }
    }

    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            TreasureKind::ButterflyLamp => &["bl", "butterflylamp"],
            TreasureKind::ChaliceOfAtonement => &["coa", "chaliceofatonement"],
            TreasureKind::ElegantBangle => &["eb", "elegantbangle"],
            TreasureKind::ElegantCrown => &["ec", "elegantcrown"],
            TreasureKind::ElegantMask => &["em", "elegantmask"],
            TreasureKind::ExtravagantClock => &["exc", "extravagantclock"],
            TreasureKind::Flagon => &["f"],
            TreasureKind::GoldenLynx => &["gl", "goldenlynx"],
            TreasureKind::OrnateNecklace => &["on", "ornatenecklace"],
            TreasureKind::SplendidBangle => &["sb", "splendidbangle"],
        }
    }

    pub fn resolve(input: &str) -> Option<TreasureKind> {
        let input = input.trim().to_lowercase();
        TreasureKind::ALL.into_iter().find(|t| {
            t.name().to_lowercase() == input || t.aliases().iter().any(|a| *a == input)
        })
    }
}

impl Display for TreasureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreasureKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreasureKind::resolve(s).ok_or_else(|| UnknownEntity(s.to_string()))
    }
}
