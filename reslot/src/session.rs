use anyhow::{Result, anyhow};
use log::{info, warn};
use serde::Serialize;
use thousands::Separable;
use treasure_rs::alloc::{
    AllocError, Allocator, GreedyProfitAllocator, OptimalAllocator, Strategy,
};
use treasure_rs::diff::{ListDiff, diff};
use treasure_rs::entities::{Allocation, Catalog, Entity, Ledger, LedgerError};
use treasure_rs::milp::BnbConfig;

use crate::config::ReslotConfig;
use crate::presets::{BUNDLED_PRESETS, BundledPreset};

/// Interactive state around one catalog: a starting list (usually a preset), the inventory
/// derived from it and the new list computed by the last optimization.
///
/// Optimizing works on a copy of the inventory, so it can be repeated with other settings.
/// Gems and treasures the new list does not use are kept in [`Session::leftover`].
#[derive(Debug)]
pub struct Session<'a> {
    catalog: &'a Catalog,
    strategy: Strategy,
    fallback_to_greedy: bool,
    solver: BnbConfig,
    preset: Option<String>,
    starting: Allocation,
    inventory: Ledger,
    new_list: Allocation,
    leftover: Ledger,
}

impl<'a> Session<'a> {
    pub fn new(catalog: &'a Catalog, config: &ReslotConfig) -> Self {
        Self {
            catalog,
            strategy: config.strategy,
            fallback_to_greedy: config.fallback_to_greedy,
            solver: config.solver,
            preset: None,
            starting: Allocation::default(),
            inventory: Ledger::new(),
            new_list: Allocation::default(),
            leftover: Ledger::new(),
        }
    }

    /// Replaces everything with `starting`. Its treasures are emptied into the inventory.
    pub fn load_preset(&mut self, name: &str, starting: Allocation) {
        self.reset();
        self.inventory = Ledger::from_allocation(&starting);
        self.starting = starting;
        self.preset = Some(name.to_string());
        info!(
            "[SESSION] loaded preset '{}': {} treasures, total {}",
            name,
            self.starting.len(),
            self.goal().separate_with_commas()
        );
    }

    /// Loads one of the [`BUNDLED_PRESETS`] by name or alias
    pub fn load_bundled(&mut self, name: &str) -> Result<()> {
        let preset = BundledPreset::find(name).ok_or_else(|| {
            let known = BUNDLED_PRESETS.iter().map(|p| p.name).collect::<Vec<_>>();
            anyhow!("unknown preset '{name}', expected one of {known:?}")
        })?;
        let starting = preset.parse().to_allocation(self.catalog.model());
        self.load_preset(preset.name, starting);
        Ok(())
    }

    /// Adds `qty` units (removes them if negative) of the gem or treasure `name` resolves to.
    ///
    /// A zero quantity changes nothing and returns `Ok(None)`.
    /// Any actual change means the inventory no longer corresponds to the loaded preset.
    pub fn add(&mut self, name: &str, qty: i64) -> Result<Option<Entity>, LedgerError> {
        if qty == 0 {
            return Ok(None);
        }
        let entity = self.inventory.add_by_name(name, qty)?;
        if let Some(preset) = self.preset.take() {
            info!("[SESSION] inventory modified, preset '{preset}' no longer active");
        }
        info!("[SESSION] {qty:+} {entity}");
        Ok(Some(entity))
    }

    /// Fills the open treasures of the inventory with its gems using the configured strategy.
    ///
    /// If the optimal strategy fails and falling back is enabled, the greedy strategy is used instead.
    /// Returns the strategy that produced the new list.
    pub fn optimize(&mut self) -> Result<Strategy, AllocError> {
        let mut working = self.inventory.clone();
        let (new_list, used) = match self.strategy {
            Strategy::Greedy => (
                GreedyProfitAllocator::fill(self.catalog, &mut working),
                Strategy::Greedy,
            ),
            Strategy::Optimal => {
                let mut optimal =
                    OptimalAllocator::with_config(self.solver).with_start(self.starting.clone());
                match optimal.allocate(self.catalog, &mut working) {
                    Ok(allocation) => (allocation, Strategy::Optimal),
                    Err(e) if self.fallback_to_greedy => {
                        warn!("[SESSION] optimal allocation failed ({e}), falling back to greedy");
                        (GreedyProfitAllocator::fill(self.catalog, &mut working), Strategy::Greedy)
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        self.new_list = new_list;
        self.leftover = working;
        info!("[SESSION] {}", self.result_line());
        Ok(used)
    }

    /// Clears the starting list, the inventory and the new list
    pub fn reset(&mut self) {
        self.preset = None;
        self.starting.clear();
        self.inventory.clear();
        self.new_list.clear();
        self.leftover.clear();
    }

    /// Differences between the starting list and the new list
    pub fn compare(&self) -> ListDiff {
        diff(&self.starting, &self.new_list)
    }

    /// Total value of the starting list
    pub fn goal(&self) -> u64 {
        self.starting.total_price()
    }

    /// Total value of the new list
    pub fn result(&self) -> u64 {
        self.new_list.total_price()
    }

    pub fn result_line(&self) -> String {
        format!(
            "Goal: {}, Result: {}",
            self.goal().separate_with_commas(),
            self.result().separate_with_commas()
        )
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn set_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy;
    }

    /// Name of the loaded preset, as long as the inventory was not modified
    pub fn preset(&self) -> Option<&str> {
        self.preset.as_deref()
    }

    pub fn starting_list(&self) -> &Allocation {
        &self.starting
    }

    pub fn inventory(&self) -> &Ledger {
        &self.inventory
    }

    pub fn new_list(&self) -> &Allocation {
        &self.new_list
    }

    pub fn leftover(&self) -> &Ledger {
        &self.leftover
    }
}

/// Outcome of optimizing one bundled preset
#[derive(Clone, Debug, Serialize)]
pub struct PresetReport {
    pub preset: String,
    pub strategy: Strategy,
    pub goal: u64,
    pub result: u64,
}

/// Loads and optimizes every bundled preset in turn
pub fn test_presets(catalog: &Catalog, config: &ReslotConfig) -> Result<Vec<PresetReport>> {
    let mut session = Session::new(catalog, config);
    let mut reports = vec![];
    for preset in BUNDLED_PRESETS.iter() {
        session.load_bundled(preset.name)?;
        let strategy = session.optimize()?;
        if session.result() < session.goal() {
            warn!("[SESSION] '{}': result below goal ({})", preset.name, session.result_line());
        }
        reports.push(PresetReport {
            preset: preset.name.to_string(),
            strategy,
            goal: session.goal(),
            result: session.result(),
        });
    }
    Ok(reports)
}

/// Parses an inventory adjustment of the form `NAME=QTY`, `QTY` may be negative
pub fn parse_adjustment(input: &str) -> Result<(String, i64), String> {
    let (name, qty) = input
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=QTY, got '{input}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in '{input}'"));
    }
    let qty = qty
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid quantity in '{input}': {e}"))?;
    Ok((name.to_string(), qty))
}
