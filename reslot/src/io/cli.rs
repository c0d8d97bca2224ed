use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use treasure_rs::alloc::Strategy;
use treasure_rs::entities::SortKey;

use crate::session::parse_adjustment;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info",
        global = true
    )]
    pub log_level: LevelFilter,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the combinations of one or all treasures
    Catalog {
        /// Treasure name or alias, all treasures if omitted
        #[arg(short, long)]
        treasure: Option<String>,
        #[arg(short, long, value_enum, default_value = "profit")]
        sort: SortArg,
        /// Maximum number of combinations listed per treasure
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Empty the treasures of a preset and fill them again
    Optimize {
        /// Bundled preset name or alias
        #[arg(short, long, conflicts_with = "preset_file")]
        preset: Option<String>,
        /// Record file to use as preset
        #[arg(long, value_name = "FILE")]
        preset_file: Option<PathBuf>,
        /// Inventory adjustment applied before optimizing, can be repeated
        #[arg(short, long, value_name = "NAME=QTY", value_parser = parse_adjustment)]
        add: Vec<(String, i64)>,
        /// Overrides the strategy of the config
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyArg>,
        /// Write the results as JSON
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Write the new list as a record file, loadable with --preset-file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },
    /// Optimize every bundled preset and compare the results to their goals
    Test {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Profit,
    FinalPrice,
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Profit => SortKey::Profit,
            SortArg::FinalPrice => SortKey::FinalPrice,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Optimal,
    Greedy,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Optimal => Strategy::Optimal,
            StrategyArg::Greedy => Strategy::Greedy,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn optimize_with_adjustments() {
        let cli = Cli::parse_from([
            "reslot", "optimize", "--preset", "bmd", "-a", "ruby=2", "--add", "flagon=-1", "-s",
            "greedy", "-l", "warn",
        ]);
        assert_eq!(cli.log_level, LevelFilter::Warn);
        match cli.command {
            Command::Optimize {
                preset, add, strategy, ..
            } => {
                assert_eq!(preset.as_deref(), Some("bmd"));
                assert_eq!(add, vec![("ruby".to_string(), 2), ("flagon".to_string(), -1)]);
                assert_eq!(strategy, Some(StrategyArg::Greedy));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn catalog_arguments() {
        let cli = Cli::parse_from(["reslot", "catalog", "--treasure", "f", "--sort", "final-price"]);
        match cli.command {
            Command::Catalog { treasure, sort, limit } => {
                assert_eq!(treasure.as_deref(), Some("f"));
                assert_eq!(sort, SortArg::FinalPrice);
                assert_eq!(limit, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
