use itertools::Itertools;
use log::{debug, info, warn};
use thousands::Separable;

use crate::alloc::{AllocError, Allocator, GreedyProfitAllocator};
use crate::entities::{
    Allocation, Catalog, Combination, GemKind, Ledger, LedgerSnapshot, TreasureKind,
};
use crate::milp::{BnbConfig, BranchAndBound, MilpError, MilpProblem, MilpSolver, MilpStatus};
use crate::util::assertions::{allocation_fits_snapshot, ledger_accounts_for};

/// Combinations to take from a ledger and how many times, in catalog order
pub type Plan = Vec<(Combination, u64)>;

/// Maximizes the total sale value of the allocation by integer programming.
///
/// One variable per usable combination counts how many treasures receive it.
/// Each treasure kind and each gem kind bounds the sum of the variables drawing from it.
/// The greedy allocation is handed to the solver as a starting point,
/// so the result is never worse than [`GreedyProfitAllocator`], even when a search limit is hit.
/// A known allocation can be supplied with [`OptimalAllocator::with_start`] to raise that floor.
#[derive(Clone, Debug)]
pub struct OptimalAllocator<S: MilpSolver = BranchAndBound> {
    solver: S,
    start: Option<Allocation>,
}

impl OptimalAllocator<BranchAndBound> {
    /// Allocator backed by the bundled [`BranchAndBound`] solver
    pub fn with_config(config: BnbConfig) -> Self {
        Self::new(BranchAndBound::new(config))
    }
}

impl<S: MilpSolver> OptimalAllocator<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            start: None,
        }
    }

    /// Uses `start` as the starting point whenever it fits the ledger and beats the greedy allocation
    pub fn with_start(mut self, start: Allocation) -> Self {
        self.start = Some(start);
        self
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Computes the best plan for `snapshot` without modifying anything.
    pub fn plan(&mut self, catalog: &Catalog, snapshot: &LedgerSnapshot) -> Result<Plan, AllocError> {
        let candidates = candidates(catalog, snapshot);
        let (problem, rows) =
            build_problem(&candidates, snapshot).map_err(|e| self.solver_error(e.to_string()))?;
        let hint = self.starting_point(catalog, snapshot, &candidates, &problem);

        debug!(
            "[OPT] {} variables, {} constraints ({} treasure and {} gem rows)",
            problem.n_variables(),
            problem.constraints().len(),
            rows.treasures,
            rows.gems
        );

        let solution = self.solver.solve(&problem, Some(&hint));
        match &solution.status {
            MilpStatus::Optimal => {}
            MilpStatus::Feasible => {
                warn!(
                    "[OPT] {} stopped at a search limit, the allocation may not be optimal",
                    self.solver.name()
                )
            }
            MilpStatus::Infeasible => return Err(AllocError::Infeasible),
            MilpStatus::Error(reason) => return Err(self.solver_error(reason.clone())),
        }
        if !problem.is_feasible(&solution.values) {
            return Err(self.solver_error("returned assignment violates the constraints"));
        }

        let plan = candidates
            .into_iter()
            .zip(solution.values)
            .filter(|(_, qty)| *qty > 0)
            .map(|(c, qty)| (c.clone(), qty))
            .collect_vec();

        info!(
            "[OPT] {} solution: {} treasures, total value {}",
            solution.status,
            plan.iter().map(|(_, qty)| qty).sum::<u64>(),
            solution.objective.separate_with_commas()
        );
        Ok(plan)
    }

    fn starting_point(
        &self,
        catalog: &Catalog,
        snapshot: &LedgerSnapshot,
        candidates: &[&Combination],
        problem: &MilpProblem,
    ) -> Vec<u64> {
        let mut ledger = Ledger::from(*snapshot);
        let greedy = GreedyProfitAllocator::fill(catalog, &mut ledger);
        let greedy_hint = as_hint(&greedy, candidates);

        match &self.start {
            Some(start) if allocation_fits_snapshot(start, snapshot) => {
                let start_hint = as_hint(start, candidates);
                if problem.evaluate(&start_hint) > problem.evaluate(&greedy_hint) {
                    debug!("[OPT] starting from the supplied allocation");
                    start_hint
                } else {
                    greedy_hint
                }
            }
            Some(_) => {
                debug!("[OPT] supplied allocation does not fit the ledger, starting from greedy");
                greedy_hint
            }
            None => greedy_hint,
        }
    }

    fn solver_error(&self, reason: impl Into<String>) -> AllocError {
        AllocError::Solver {
            solver: self.solver.name().to_string(),
            reason: reason.into(),
        }
    }
}

impl<S: MilpSolver> Allocator for OptimalAllocator<S> {
    fn name(&self) -> &str {
        "optimal"
    }

    fn allocate(&mut self, catalog: &Catalog, ledger: &mut Ledger) -> Result<Allocation, AllocError> {
        let snapshot = ledger.snapshot();
        let plan = self.plan(catalog, &snapshot)?;

        //applied to a copy first, the ledger only changes if the whole plan fits
        let mut working = ledger.clone();
        let mut allocation = Allocation::default();
        for (combo, qty) in plan.iter() {
            for _ in 0..*qty {
                let filled = working
                    .try_consume(combo)
                    .ok_or_else(|| AllocError::PlanMismatch(combo.to_string()))?;
                allocation.push(filled);
            }
        }
        //a search cut short may leave treasures open that the remaining gems can still fill
        if working.open_treasures() > 0 {
            debug!("[OPT] {} treasures left open, completing greedily", working.open_treasures());
            for filled in GreedyProfitAllocator::fill(catalog, &mut working).iter() {
                allocation.push(*filled);
            }
        }
        *ledger = working;

        debug_assert!(allocation_fits_snapshot(&allocation, &snapshot));
        debug_assert!(ledger_accounts_for(&snapshot, &allocation, ledger));
        Ok(allocation)
    }
}

/// Combinations worth a variable: their treasure is open, their gems are in stock,
/// and no other combination of the same treasure is at least as valuable with a subset of the gems.
fn candidates<'a>(catalog: &'a Catalog, snapshot: &LedgerSnapshot) -> Vec<&'a Combination> {
    let mut candidates = vec![];
    let mut dominated = 0;
    for t in TreasureKind::ALL {
        if snapshot.treasure_count(t) == 0 {
            continue;
        }
        let usable = catalog
            .iter_for(t)
            .filter(|c| snapshot.gems.covers(&c.gems))
            .collect_vec();
        for (i, c) in usable.iter().enumerate() {
            let is_dominated = usable
                .iter()
                .enumerate()
                .any(|(k, other)| k != i && dominates(other, c, k < i));
            if is_dominated {
                dominated += 1;
            } else {
                candidates.push(*c);
            }
        }
    }
    debug!(
        "[OPT] {} candidate combinations, {} dominated",
        candidates.len(),
        dominated
    );
    candidates
}

/// `a` uses no gem more than `b` and sells for at least as much.
/// Exact ties are resolved in favor of the earlier combination.
fn dominates(a: &Combination, b: &Combination, a_is_earlier: bool) -> bool {
    let weakly = b.gems.covers(&a.gems) && a.final_price() >= b.final_price();
    let strictly = a.gems != b.gems || a.final_price() > b.final_price();
    weakly && (strictly || a_is_earlier)
}

struct RowCounts {
    treasures: usize,
    gems: usize,
}

fn build_problem(
    candidates: &[&Combination],
    snapshot: &LedgerSnapshot,
) -> Result<(MilpProblem, RowCounts), MilpError> {
    let mut problem = MilpProblem::new();
    for c in candidates.iter() {
        let open = snapshot.treasure_count(c.treasure) as u64;
        problem.add_variable(open, c.final_price() as i64);
    }

    //treasure rows first: their supports are disjoint, which the bound exploits
    let mut rows = RowCounts {
        treasures: 0,
        gems: 0,
    };
    for t in TreasureKind::ALL {
        let terms = candidates
            .iter()
            .positions(|c| c.treasure == t)
            .map(|j| (j, 1))
            .collect_vec();
        if !terms.is_empty() {
            problem.add_constraint(terms, saturate(snapshot.treasure_count(t) as u64))?;
            rows.treasures += 1;
        }
    }
    for g in GemKind::ALL {
        let terms = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.gems.get(g) > 0)
            .map(|(j, c)| (j, c.gems.get(g) as u64))
            .collect_vec();
        if !terms.is_empty() {
            problem.add_constraint(terms, saturate(snapshot.gem_count(g) as u64))?;
            rows.gems += 1;
        }
    }
    Ok((problem, rows))
}

fn saturate(capacity: u64) -> i64 {
    i64::try_from(capacity).unwrap_or(i64::MAX)
}

/// `allocation` expressed in the candidate variables.
/// Dominated combinations are replaced by a candidate dominating them, which keeps the hint
/// feasible and does not lower its value.
fn as_hint(allocation: &Allocation, candidates: &[&Combination]) -> Vec<u64> {
    let mut hint = vec![0; candidates.len()];
    for filled in allocation.iter() {
        let replacement = candidates.iter().position(|c| {
            c.treasure == filled.treasure
                && filled.gems.covers(&c.gems)
                && c.final_price() >= filled.final_price()
        });
        match replacement {
            Some(j) => hint[j] += 1,
            None => warn!("[OPT] no candidate stands in for {filled}"),
        }
    }
    hint
}

#[cfg(test)]
mod tests {
    use rand::prelude::SmallRng;
    use rand::{Rng, SeedableRng};
    use test_case::test_case;

    use super::*;
    use crate::entities::{CapacityPolicy, FilledTreasure, GemCounts};
    use crate::pricing::PriceModel;

    fn clock_and_flagon_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add_treasure(TreasureKind::ExtravagantClock, 1).unwrap();
        ledger.add_treasure(TreasureKind::Flagon, 1).unwrap();
        ledger.add_gem(GemKind::Ruby, 2).unwrap();
        ledger.add_gem(GemKind::Sapphire, 1).unwrap();
        ledger.add_gem(GemKind::Alexandrite, 1).unwrap();
        ledger
    }

    #[test]
    fn beats_greedy_when_profit_misleads() {
        // ruby and alexandrite earn the most profit in the clock (1180),
        // which leaves the flagon with ruby and sapphire instead of two rubies
        let catalog = Catalog::enumerate(PriceModel::default());

        let mut greedy_ledger = clock_and_flagon_ledger();
        let greedy = GreedyProfitAllocator::fill(&catalog, &mut greedy_ledger);
        assert_eq!(greedy.total_price(), 12980 + 5940);

        let mut ledger = clock_and_flagon_ledger();
        let optimal = OptimalAllocator::with_config(BnbConfig::default())
            .allocate(&catalog, &mut ledger)
            .unwrap();
        assert_eq!(optimal.total_price(), 12760 + 6720);
        assert!(optimal.total_price() > greedy.total_price());
        assert!(ledger.is_empty());
    }

    #[test]
    fn dominated_combinations_are_dropped() {
        let two_rubies = GemCounts::from_pairs(&[(GemKind::Ruby, 2)]);
        let records = vec![
            (TreasureKind::Flagon, two_rubies),
            (TreasureKind::Flagon, GemCounts::EMPTY),
            (TreasureKind::Flagon, two_rubies),
            (TreasureKind::ElegantCrown, GemCounts::EMPTY),
        ];
        let catalog = Catalog::build(PriceModel::default(), records, CapacityPolicy::Retain);
        let mut ledger = Ledger::new();
        ledger.add_treasure(TreasureKind::Flagon, 1).unwrap();
        ledger.add_gem(GemKind::Ruby, 2).unwrap();

        let candidates = candidates(&catalog, &ledger.snapshot());
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.treasure == TreasureKind::Flagon));
        assert!(candidates.iter().any(|c| c.gems.get(GemKind::Ruby) == 2));
        assert!(candidates.iter().any(|c| c.gems.is_empty()));
    }

    #[test]
    fn plan_does_not_touch_the_ledger() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let ledger = clock_and_flagon_ledger();
        let plan = OptimalAllocator::with_config(BnbConfig::default())
            .plan(&catalog, &ledger.snapshot())
            .unwrap();
        assert_eq!(plan.iter().map(|(_, qty)| qty).sum::<u64>(), 2);
        assert_eq!(ledger, clock_and_flagon_ledger());
    }

    #[test]
    fn nothing_open_yields_empty_allocation() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let mut ledger = Ledger::new();
        ledger.add_gem(GemKind::Emerald, 3).unwrap();
        let allocation = OptimalAllocator::with_config(BnbConfig::default())
            .allocate(&catalog, &mut ledger)
            .unwrap();
        assert!(allocation.is_empty());
        assert_eq!(ledger.gem_count(GemKind::Emerald), 3);
    }

    #[test]
    fn supplied_start_is_a_floor() {
        let catalog = Catalog::enumerate(PriceModel::default());
        let ledger = clock_and_flagon_ledger();
        let sapphire_alexandrite =
            GemCounts::from_pairs(&[(GemKind::Sapphire, 1), (GemKind::Alexandrite, 1)]);
        let two_rubies = GemCounts::from_pairs(&[(GemKind::Ruby, 2)]);
        let clock = catalog
            .find(TreasureKind::ExtravagantClock, &sapphire_alexandrite)
            .unwrap();
        let flagon = catalog.find(TreasureKind::Flagon, &two_rubies).unwrap();
        let start = Allocation::new(vec![FilledTreasure::from(clock), FilledTreasure::from(flagon)]);
        let mut solver = OptimalAllocator::with_config(BnbConfig {
            node_limit: Some(0),
            ..BnbConfig::default()
        })
        .with_start(start);
        // the search is cut off immediately, only the starting point is returned
        let allocation = solver.allocate(&catalog, &mut ledger.clone()).unwrap();
        assert_eq!(allocation.total_price(), 19480);

        let greedy = GreedyProfitAllocator::fill(&catalog, &mut ledger.clone());
        assert!(allocation.total_price() > greedy.total_price());
    }

    #[test_case(3; "seed 3")]
    #[test_case(11; "seed 11")]
    #[test_case(2024; "seed 2024")]
    fn never_worse_than_greedy(seed: u64) {
        let catalog = Catalog::enumerate(PriceModel::default());
        let mut rng = SmallRng::seed_from_u64(seed);
        for _ in 0..4 {
            let mut ledger = Ledger::new();
            for _ in 0..3 {
                let t = TreasureKind::ALL[rng.random_range(0..TreasureKind::ALL.len())];
                ledger.add_treasure(t, rng.random_range(1..=2)).unwrap();
            }
            for g in GemKind::ALL {
                ledger.add_gem(g, rng.random_range(0..=3)).unwrap();
            }
            let snapshot = ledger.snapshot();

            let greedy = GreedyProfitAllocator::fill(&catalog, &mut Ledger::from(snapshot));
            let mut solver = OptimalAllocator::with_config(BnbConfig {
                time_limit_ms: Some(2_000),
                ..BnbConfig::default()
            });
            let optimal = solver.allocate(&catalog, &mut ledger).unwrap();

            assert!(optimal.total_price() >= greedy.total_price());
            assert!(allocation_fits_snapshot(&optimal, &snapshot));
            assert!(ledger_accounts_for(&snapshot, &optimal, &ledger));
        }
    }
}
