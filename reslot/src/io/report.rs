//! Plain text rendering of catalogs, lists and comparisons

use std::fmt;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use thousands::Separable;
use treasure_rs::diff::ListDiff;
use treasure_rs::entities::{Allocation, Catalog, SortKey, TreasureKind};

use crate::session::{PresetReport, Session};

/// Combinations of `treasures`, sorted by `key`, at most `limit` per treasure
pub fn catalog_listing(
    catalog: &Catalog,
    treasures: &[TreasureKind],
    key: SortKey,
    limit: Option<usize>,
) -> String {
    CatalogListing {
        catalog,
        treasures,
        key,
        limit,
    }
    .to_string()
}

pub fn list(title: &str, allocation: &Allocation) -> String {
    ListView { title, allocation }.to_string()
}

pub fn list_diff(diff: &ListDiff) -> String {
    DiffView(diff).to_string()
}

/// Starting list, new list, unused inventory, comparison and result line of a session
pub fn session(session: &Session) -> String {
    SessionView(session).to_string()
}

pub fn preset_reports(reports: &[PresetReport]) -> String {
    PresetReportsView(reports).to_string()
}

struct CatalogListing<'a> {
    catalog: &'a Catalog,
    treasures: &'a [TreasureKind],
    key: SortKey,
    limit: Option<usize>,
}

impl Display for CatalogListing<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for &t in self.treasures {
            let combinations = self.catalog.combinations_for(t, self.key);
            let shown = self.limit.unwrap_or(combinations.len()).min(combinations.len());
            writeln!(f, "{t} ({} of {} combinations)", shown, combinations.len())?;
            for c in combinations.iter().take(shown) {
                writeln!(f, "    {c}")?;
            }
        }
        Ok(())
    }
}

struct ListView<'a> {
    title: &'a str,
    allocation: &'a Allocation,
}

impl Display for ListView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {} treasures, total {}",
            self.title,
            self.allocation.len(),
            self.allocation.total_price().separate_with_commas()
        )?;
        for filled in self.allocation.iter().sorted_by_key(|filled| filled.treasure) {
            writeln!(f, "    {filled}")?;
        }
        Ok(())
    }
}

struct DiffView<'a>(&'a ListDiff);

impl Display for DiffView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let diff = self.0;
        if diff.is_empty() {
            return writeln!(f, "LIST DIFF: No difference.");
        }
        writeln!(f, "LIST DIFF:")?;
        ListView {
            title: "  only in starting list",
            allocation: &diff.baseline_leftovers,
        }
        .fmt(f)?;
        ListView {
            title: "  only in new list",
            allocation: &diff.candidate_leftovers,
        }
        .fmt(f)
    }
}

struct SessionView<'a, 'c>(&'a Session<'c>);

impl Display for SessionView<'_, '_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let session = self.0;
        if let Some(preset) = session.preset() {
            writeln!(f, "Preset: {preset}")?;
        }
        ListView {
            title: "STARTING LIST",
            allocation: session.starting_list(),
        }
        .fmt(f)?;
        ListView {
            title: "NEW LIST",
            allocation: session.new_list(),
        }
        .fmt(f)?;
        if !session.leftover().is_empty() {
            writeln!(f, "UNUSED:\n{}", session.leftover())?;
        }
        DiffView(&session.compare()).fmt(f)?;
        writeln!(f, "{}", session.result_line())
    }
}

struct PresetReportsView<'a>(&'a [PresetReport]);

impl Display for PresetReportsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for r in self.0 {
            let verdict = if r.result >= r.goal { "ok" } else { "BELOW GOAL" };
            writeln!(
                f,
                "{:<28} [{}] Goal: {}, Result: {} ({verdict})",
                r.preset,
                r.strategy,
                r.goal.separate_with_commas(),
                r.result.separate_with_commas()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use treasure_rs::alloc::Strategy;
    use treasure_rs::diff::diff;
    use treasure_rs::entities::{FilledTreasure, GemCounts, GemKind};
    use treasure_rs::pricing::PriceModel;

    use super::*;
    use crate::config::ReslotConfig;

    #[test]
    fn flagon_listing() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let text = catalog_listing(&catalog, &[TreasureKind::Flagon], SortKey::FinalPrice, Some(1));
        let lines = text.lines().collect_vec();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Flagon (1 of "));
        assert!(lines[1].trim_start().starts_with("Flagon: [0,"));
    }

    #[test]
    fn session_report() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let mut session = Session::new(&catalog, &ReslotConfig::default());
        session.add("flagon", 1).unwrap();
        session.add("ruby", 2).unwrap();
        session.optimize().unwrap();

        let text = super::session(&session);
        assert!(text.contains("NEW LIST: 1 treasures, total 6,720"));
        assert!(text.contains("LIST DIFF:\n"));
        assert!(text.ends_with("Goal: 0, Result: 6,720\n"));

        let filled = FilledTreasure::new(
            TreasureKind::Flagon,
            GemCounts::from_pairs(&[(GemKind::Ruby, 2)]),
            catalog.model(),
        );
        let same = Allocation::new(vec![filled]);
        let d = diff(&same, session.new_list());
        assert_eq!(list_diff(&d), "LIST DIFF: No difference.\n");
    }

    #[test]
    fn preset_verdicts() {
        let reports = vec![
            PresetReport {
                preset: "met".to_string(),
                strategy: Strategy::Optimal,
                goal: 10_000,
                result: 12_500,
            },
            PresetReport {
                preset: "missed".to_string(),
                strategy: Strategy::Greedy,
                goal: 10_000,
                result: 9_000,
            },
        ];
        let text = preset_reports(&reports);
        let lines = text.lines().collect_vec();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[optimal] Goal: 10,000, Result: 12,500 (ok)"));
        assert!(lines[1].ends_with("[greedy] Goal: 10,000, Result: 9,000 (BELOW GOAL)"));
        assert!(preset_reports(&[]).is_empty());
    }
}
