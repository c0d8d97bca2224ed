use serde::Serialize;
use treasure_rs::alloc::Strategy;
use treasure_rs::diff::ListDiff;
use treasure_rs::entities::{Allocation, LedgerSnapshot};

use crate::config::ReslotConfig;
use crate::session::{PresetReport, Session};

/// JSON output of the `optimize` command
#[derive(Serialize, Clone)]
pub struct OptimizeOutput {
    pub preset: Option<String>,
    pub strategy: Strategy,
    pub goal: u64,
    pub result: u64,
    pub starting_list: Allocation,
    pub inventory: LedgerSnapshot,
    pub new_list: Allocation,
    pub unused: LedgerSnapshot,
    pub diff: ListDiff,
    pub config: ReslotConfig,
}

impl OptimizeOutput {
    pub fn new(session: &Session, strategy: Strategy, config: ReslotConfig) -> Self {
        Self {
            preset: session.preset().map(str::to_string),
            strategy,
            goal: session.goal(),
            result: session.result(),
            starting_list: session.starting_list().clone(),
            inventory: session.inventory().snapshot(),
            new_list: session.new_list().clone(),
            unused: session.leftover().snapshot(),
            diff: session.compare(),
            config,
        }
    }
}

/// JSON output of the `test` command
#[derive(Serialize, Clone)]
pub struct TestOutput {
    pub presets: Vec<PresetReport>,
    pub config: ReslotConfig,
}
