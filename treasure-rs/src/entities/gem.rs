use std::fmt::{Display, Formatter};
use std::ops::Index;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::entities::UnknownEntity;

/// Number of distinct [`GemKind`]s
pub const N_GEMS: usize = 6;
/// Number of distinct [`Color`]s
pub const N_COLORS: usize = 5;

/// Gem that can be slotted into a [`Treasure`](crate::entities::TreasureKind).
/// Declaration order matches the column order of combination records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GemKind {
    Ruby,
    Sapphire,
    YellowDiamond,
    Emerald,
    Alexandrite,
    RedBeryl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Yellow,
    Green,
    Purple,
}

/// Shape of a gem socket. Every gem fits exactly one shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotShape {
    Circle,
    Square,
}

impl GemKind {
    pub const ALL: [GemKind; N_GEMS] = [
        GemKind::Ruby,
        GemKind::Sapphire,
        GemKind::YellowDiamond,
        GemKind::Emerald,
        GemKind::Alexandrite,
        GemKind::RedBeryl,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            GemKind::Ruby => "Ruby",
            GemKind::Sapphire => "Sapphire",
            GemKind::YellowDiamond => "Yellow Diamond",
            GemKind::Emerald => "Emerald",
            GemKind::Alexandrite => "Alexandrite",
            GemKind::RedBeryl => "Red Beryl",
        }
    }

    pub fn color(self) -> Color {
        match self {
            GemKind::Ruby | GemKind::RedBeryl => Color::Red,
            GemKind::Sapphire => Color::Blue,
            GemKind::YellowDiamond => Color::Yellow,
            GemKind::Emerald => Color::Green,
            GemKind::Alexandrite => Color::Purple,
        }
    }

    pub fn shape(self) -> SlotShape {
        match self {
            GemKind::Ruby | GemKind::Sapphire | GemKind::YellowDiamond => SlotShape::Circle,
            GemKind::Emerald | GemKind::Alexandrite | GemKind::RedBeryl => SlotShape::Square,
        }
    }

    /// Short names accepted on top of the (case-insensitive) canonical name
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            GemKind::Ruby => &["r"],
            GemKind::Sapphire => &["s"],
            GemKind::YellowDiamond => &["y", "yd", "yellowdiamond"],
            GemKind::Emerald => &["e"],
            GemKind::Alexandrite => &["a"],
            GemKind::RedBeryl => &["rb", "redberyl"],
        }
    }

    /// Resolves a canonical name or alias, ignoring case and surrounding whitespace.
    pub fn resolve(input: &str) -> Option<GemKind> {
        let input = input.trim().to_lowercase();
        GemKind::ALL.into_iter().find(|g| {
            g.name().to_lowercase() == input || g.aliases().iter().any(|a| *a == input)
        })
    }

    /// All gems fitting a socket of the given shape, in declaration order
    pub fn with_shape(shape: SlotShape) -> impl Iterator<Item = GemKind> {
        GemKind::ALL.into_iter().filter(move |g| g.shape() == shape)
    }
}

impl Display for GemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GemKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GemKind::resolve(s).ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

impl Color {
    pub const ALL: [Color; N_COLORS] = [
        Color::Red,
        Color::Blue,
        Color::Yellow,
        Color::Green,
        Color::Purple,
    ];

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn initial(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
            Color::Green => 'G',
            Color::Purple => 'P',
        }
    }
}

/// Quantity of every [`GemKind`], indexed by [`GemKind::id`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GemCounts([u32; N_GEMS]);

impl GemCounts {
    pub const EMPTY: GemCounts = GemCounts([0; N_GEMS]);

    pub fn new(counts: [u32; N_GEMS]) -> Self {
        GemCounts(counts)
    }

    /// Builds counts from a list of `(gem, quantity)` pairs, summing duplicates.
    pub fn from_pairs(pairs: &[(GemKind, u32)]) -> Self {
        let mut counts = GemCounts::EMPTY;
        for &(gem, qty) in pairs {
            counts.0[gem.id()] += qty;
        }
        counts
    }

    pub fn get(&self, gem: GemKind) -> u32 {
        self.0[gem.id()]
    }

    pub fn set(&mut self, gem: GemKind, qty: u32) {
        self.0[gem.id()] = qty;
    }

    pub fn as_array(&self) -> &[u32; N_GEMS] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (GemKind, u32)> + '_ {
        GemKind::ALL.into_iter().map(|g| (g, self.get(g)))
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Number of gems occupying sockets of the given shape
    pub fn shape_total(&self, shape: SlotShape) -> u32 {
        GemKind::with_shape(shape).map(|g| self.get(g)).sum()
    }

    /// Gems pooled per color. Ruby and Red Beryl both count as red.
    pub fn color_counts(&self) -> ColorCounts {
        let mut colors = [0; N_COLORS];
        for (gem, qty) in self.iter() {
            colors[gem.color().id()] += qty;
        }
        ColorCounts(colors)
    }

    /// `true` if every quantity in `self` is at least the one in `other`
    pub fn covers(&self, other: &GemCounts) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a >= b)
    }

    /// Element-wise subtraction, `None` if any quantity would drop below zero.
    pub fn checked_sub(&self, other: &GemCounts) -> Option<GemCounts> {
        let mut result = *self;
        for (r, o) in result.0.iter_mut().zip(other.0.iter()) {
            *r = r.checked_sub(*o)?;
        }
        Some(result)
    }

    pub fn saturating_add(&self, other: &GemCounts) -> GemCounts {
        let mut result = *self;
        for (r, o) in result.0.iter_mut().zip(other.0.iter()) {
            *r = r.saturating_add(*o);
        }
        result
    }
}

impl Index<GemKind> for GemCounts {
    type Output = u32;

    fn index(&self, gem: GemKind) -> &u32 {
        &self.0[gem.id()]
    }
}

impl Display for GemCounts {
    /// Lists every gem by name, repeated per unit: `Ruby, Ruby, Sapphire`
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = self
            .iter()
            .flat_map(|(gem, qty)| std::iter::repeat_n(gem.name(), qty as usize))
            .join(", ");
        f.write_str(&names)
    }
}

/// Quantity of gems per [`Color`], indexed by [`Color::id`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ColorCounts(pub [u32; N_COLORS]);

impl ColorCounts {
    pub fn get(&self, color: Color) -> u32 {
        self.0[color.id()]
    }

    /// Number of colors present at least once
    pub fn distinct(&self) -> usize {
        self.0.iter().filter(|&&n| n > 0).count()
    }

    /// Number of colors present exactly `n` times
    pub fn exactly(&self, n: u32) -> usize {
        self.0.iter().filter(|&&c| c == n).count()
    }
}

impl Display for ColorCounts {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = Color::ALL
            .iter()
            .map(|c| format!("{}{}", c.initial(), self.get(*c)))
            .join(" ");
        f.write_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_case_insensitively() {
        assert_eq!(GemKind::resolve("Ruby"), Some(GemKind::Ruby));
        assert_eq!(GemKind::resolve("  YD "), Some(GemKind::YellowDiamond));
        assert_eq!(GemKind::resolve("yellow diamond"), Some(GemKind::YellowDiamond));
        assert_eq!(GemKind::resolve("RedBeryl"), Some(GemKind::RedBeryl));
        assert_eq!(GemKind::resolve("diamond"), None);
        assert!("opal".parse::<GemKind>().is_err());
    }

    #[test]
    fn red_gems_share_a_color() {
        let counts = GemCounts::from_pairs(&[(GemKind::Ruby, 1), (GemKind::RedBeryl, 2)]);
        let colors = counts.color_counts();
        assert_eq!(colors.get(Color::Red), 3);
        assert_eq!(colors.distinct(), 1);
        assert_eq!(counts.shape_total(SlotShape::Circle), 1);
        assert_eq!(counts.shape_total(SlotShape::Square), 2);
    }

    #[test]
    fn checked_sub_refuses_negative() {
        let stock = GemCounts::from_pairs(&[(GemKind::Emerald, 1)]);
        let need = GemCounts::from_pairs(&[(GemKind::Emerald, 2)]);
        assert!(stock.checked_sub(&need).is_none());
        assert!(!stock.covers(&need));
        assert_eq!(need.checked_sub(&stock), Some(stock));
    }

    #[test]
    fn display_repeats_names() {
        let counts = GemCounts::from_pairs(&[(GemKind::Sapphire, 1), (GemKind::Ruby, 2)]);
        assert_eq!(counts.to_string(), "Ruby, Ruby, Sapphire");
        assert_eq!(counts.color_counts().to_string(), "R2 B1 Y0 G0 P0");
    }
}
