use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::entities::ColorCounts;

/// Bonus tier selected by the color distribution of the slotted gems.
/// Variants are declared in precedence order: the first matching tier wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    FiveColors,
    Quintet,
    DuoTrio,
    Quartet,
    FourColors,
    TwoDuos,
    Trio,
    ThreeColors,
    Duo,
    TwoColors,
    NoBonus,
}

impl Tier {
    pub fn of(colors: &ColorCounts) -> Tier {
        let distinct = colors.distinct();
        let duos = colors.exactly(2);
        let trios = colors.exactly(3);

        if distinct == 5 {
            Tier::FiveColors
        } else if colors.exactly(5) == 1 {
            Tier::Quintet
        } else if duos == 1 && trios == 1 {
            Tier::DuoTrio
        } else if colors.exactly(4) == 1 {
            Tier::Quartet
        } else if distinct == 4 {
            Tier::FourColors
        } else if duos == 2 {
            Tier::TwoDuos
        } else if trios == 1 {
            Tier::Trio
        } else if distinct == 3 {
            Tier::ThreeColors
        } else if duos == 1 {
            Tier::Duo
        } else if distinct == 2 {
            Tier::TwoColors
        } else {
            Tier::NoBonus
        }
    }

    /// Multiplier in tenths, kept integral so prices are computed exactly.
    pub fn tenths(self) -> u64 {
        match self {
            Tier::FiveColors => 20,
            Tier::Quintet => 19,
            Tier::DuoTrio => 18,
            Tier::Quartet => 17,
            Tier::FourColors => 16,
            Tier::TwoDuos => 15,
            Tier::Trio => 14,
            Tier::ThreeColors => 13,
            Tier::Duo => 12,
            Tier::TwoColors => 11,
            Tier::NoBonus => 10,
        }
    }

    pub fn multiplier(self) -> f64 {
        self.tenths() as f64 / 10.0
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::FiveColors => "Five Colors",
            Tier::Quintet => "Quintet",
            Tier::DuoTrio => "Duo & Trio",
            Tier::Quartet => "Quartet",
            Tier::FourColors => "Four Colors",
            Tier::TwoDuos => "Two Duos",
            Tier::Trio => "Trio",
            Tier::ThreeColors => "Three Colors",
            Tier::Duo => "Duo",
            Tier::TwoColors => "Two Colors",
            Tier::NoBonus => "No Bonus",
        }
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (x{:.1})", self.label(), self.multiplier())
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    // colors in R, B, Y, G, P order
    #[test_case([1, 1, 1, 1, 1], Tier::FiveColors; "five colors")]
    #[test_case([5, 0, 0, 0, 0], Tier::Quintet; "quintet")]
    #[test_case([2, 3, 0, 0, 0], Tier::DuoTrio; "duo and trio")]
    #[test_case([4, 0, 0, 0, 0], Tier::Quartet; "quartet")]
    #[test_case([4, 1, 0, 0, 0], Tier::Quartet; "quartet with a single")]
    #[test_case([1, 1, 1, 1, 0], Tier::FourColors; "four colors")]
    #[test_case([2, 1, 1, 1, 0], Tier::FourColors; "four colors beat a duo")]
    #[test_case([2, 2, 0, 0, 0], Tier::TwoDuos; "two duos")]
    #[test_case([2, 2, 1, 0, 0], Tier::TwoDuos; "two duos beat three colors")]
    #[test_case([3, 0, 0, 0, 0], Tier::Trio; "trio")]
    #[test_case([3, 1, 1, 0, 0], Tier::Trio; "trio beats three colors")]
    #[test_case([1, 1, 1, 0, 0], Tier::ThreeColors; "three colors")]
    #[test_case([2, 0, 0, 0, 0], Tier::Duo; "duo")]
    #[test_case([2, 1, 0, 0, 0], Tier::Duo; "duo beats two colors")]
    #[test_case([1, 1, 0, 0, 0], Tier::TwoColors; "two colors")]
    #[test_case([1, 0, 0, 0, 0], Tier::NoBonus; "single gem")]
    #[test_case([0, 0, 0, 0, 0], Tier::NoBonus; "empty")]
    fn tier_precedence(colors: [u32; 5], expected: Tier) {
        assert_eq!(Tier::of(&ColorCounts(colors)), expected);
    }

    #[test]
    fn tenths_are_strictly_decreasing_in_precedence_order() {
        let tiers = [
            Tier::FiveColors,
            Tier::Quintet,
            Tier::DuoTrio,
            Tier::Quartet,
            Tier::FourColors,
            Tier::TwoDuos,
            Tier::Trio,
            Tier::ThreeColors,
            Tier::Duo,
            Tier::TwoColors,
            Tier::NoBonus,
        ];
        assert!(tiers.windows(2).all(|w| w[0].tenths() > w[1].tenths()));
        assert_eq!(Tier::FiveColors.multiplier(), 2.0);
    }
}
