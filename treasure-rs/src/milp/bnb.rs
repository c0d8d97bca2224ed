use std::time::{Duration, Instant};

use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thousands::Separable;

use crate::milp::bound::LagrangianBound;
use crate::milp::{MilpProblem, MilpSolution, MilpSolver, MilpStatus};
use crate::util::assertions::solution_is_feasible;

/// Slack added to the relaxation before flooring it to an integer objective
const BOUND_TOLERANCE: f64 = 1e-4;
/// Number of nodes between two checks of the clock
const TIME_CHECK_INTERVAL: u64 = 1024;

/// Search limits of [`BranchAndBound`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BnbConfig {
    /// Maximum number of nodes explored, `None` for no limit
    pub node_limit: Option<u64>,
    /// Maximum wall-clock time of a solve in milliseconds, `None` for no limit
    pub time_limit_ms: Option<u64>,
    /// Subgradient iterations used to tune the bound at the root
    pub subgradient_iterations: usize,
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            node_limit: Some(5_000_000),
            time_limit_ms: Some(10_000),
            subgradient_iterations: 200,
        }
    }
}

/// Statistics of the last solve
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BnbStats {
    pub nodes: u64,
    pub pruned: u64,
    pub incumbent_updates: u64,
    pub root_bound: f64,
    pub elapsed: Duration,
}

/// Depth-first branch-and-bound for packing-form problems.
///
/// Variables are branched on in order of decreasing reduced cost, trying the largest
/// feasible value first. Nodes are pruned with a [`LagrangianBound`] tuned at the root.
/// Since lowering a variable never breaks a constraint, every node is itself a feasible
/// assignment, and an incumbent always exists: hitting a limit yields [`MilpStatus::Feasible`].
#[derive(Clone, Debug, Default)]
pub struct BranchAndBound {
    config: BnbConfig,
    stats: BnbStats,
}

impl BranchAndBound {
    pub fn new(config: BnbConfig) -> Self {
        Self {
            config,
            stats: BnbStats::default(),
        }
    }

    pub fn config(&self) -> &BnbConfig {
        &self.config
    }

    pub fn stats(&self) -> &BnbStats {
        &self.stats
    }
}

impl MilpSolver for BranchAndBound {
    fn name(&self) -> &str {
        "branch-and-bound"
    }

    fn solve(&mut self, problem: &MilpProblem, hint: Option<&[u64]>) -> MilpSolution {
        let start = Instant::now();
        self.stats = BnbStats::default();

        if let Some(i) = problem.constraints().iter().position(|c| c.upper_bound < 0) {
            debug!("[BNB] constraint {i} has a negative right hand side");
            return MilpSolution::infeasible();
        }
        let out_of_range = problem.variables().iter().any(|v| {
            i64::try_from(v.upper_bound)
                .ok()
                .and_then(|ub| ub.checked_mul(v.objective))
                .is_none()
        });
        if out_of_range {
            return MilpSolution::error("objective coefficients out of range");
        }

        let n = problem.n_variables();
        let mut incumbent = vec![0; n];
        let mut incumbent_obj = 0;
        let mut hinted = false;
        if let Some(hint) = hint {
            if problem.is_feasible(hint) {
                hinted = true;
                let obj = problem.evaluate(hint);
                if obj > incumbent_obj {
                    incumbent = hint.to_vec();
                    incumbent_obj = obj;
                }
            } else {
                warn!("[BNB] ignoring infeasible hint");
            }
        }

        let residual = problem
            .constraints()
            .iter()
            .map(|c| c.upper_bound as u64)
            .collect_vec();
        //variables that can only lower the objective stay at zero
        let fixed = problem
            .variables()
            .iter()
            .map(|v| v.upper_bound == 0 || v.objective <= 0)
            .collect_vec();

        let bound = LagrangianBound::new(
            problem,
            &fixed,
            &residual,
            incumbent_obj,
            self.config.subgradient_iterations,
        );

        let order = (0..n)
            .filter(|&j| !fixed[j])
            .sorted_by(|&a, &b| {
                bound
                    .reduced_cost(b)
                    .total_cmp(&bound.reduced_cost(a))
                    .then(problem.variables()[b].objective.cmp(&problem.variables()[a].objective))
                    .then(a.cmp(&b))
            })
            .collect_vec();

        let mut search = Search {
            problem,
            bound: &bound,
            order,
            fixed,
            residual,
            values: vec![0; n],
            objective: 0,
            incumbent,
            incumbent_obj,
            stats: BnbStats {
                root_bound: bound.root_bound(),
                ..BnbStats::default()
            },
            start,
            node_limit: self.config.node_limit,
            time_limit: self.config.time_limit_ms.map(Duration::from_millis),
            aborted: false,
        };
        search.dive(0);

        let Search {
            incumbent,
            incumbent_obj,
            aborted,
            mut stats,
            ..
        } = search;
        stats.elapsed = start.elapsed();

        let status = match aborted {
            false => MilpStatus::Optimal,
            true if hinted || stats.incumbent_updates > 0 => MilpStatus::Feasible,
            true => {
                warn!("[BNB] search limit reached before any solution was found");
                self.stats = stats;
                return MilpSolution::error("search limit reached without a solution");
            }
        };
        info!(
            "[BNB] {status}: objective {}, root bound {:.0}, {} nodes ({} pruned) in {}ms",
            incumbent_obj.separate_with_commas(),
            stats.root_bound,
            stats.nodes.separate_with_commas(),
            stats.pruned.separate_with_commas(),
            stats.elapsed.as_millis()
        );
        debug_assert!(solution_is_feasible(problem, &incumbent));

        self.stats = stats;
        MilpSolution {
            status,
            values: incumbent,
            objective: incumbent_obj,
        }
    }
}

struct Search<'a> {
    problem: &'a MilpProblem,
    bound: &'a LagrangianBound,
    /// Branching order, variables fixed at the root are excluded
    order: Vec<usize>,
    fixed: Vec<bool>,
    residual: Vec<u64>,
    values: Vec<u64>,
    objective: i64,
    incumbent: Vec<u64>,
    incumbent_obj: i64,
    stats: BnbStats,
    start: Instant,
    node_limit: Option<u64>,
    time_limit: Option<Duration>,
    aborted: bool,
}

impl Search<'_> {
    fn dive(&mut self, depth: usize) {
        self.stats.nodes += 1;

        //every node is a feasible assignment, unassigned variables being zero
        if self.objective > self.incumbent_obj {
            self.incumbent_obj = self.objective;
            self.incumbent.copy_from_slice(&self.values);
            self.stats.incumbent_updates += 1;
        }
        if depth == self.order.len() {
            return;
        }
        if self.limit_reached() {
            self.aborted = true;
            return;
        }

        let remaining = self.bound.evaluate(&self.residual, &self.fixed);
        let best_reachable = (self.objective as f64 + remaining + BOUND_TOLERANCE).floor();
        if best_reachable <= self.incumbent_obj as f64 {
            self.stats.pruned += 1;
            return;
        }

        let j = self.order[depth];
        let max = self.bound.max_value(j, &self.residual);
        self.fixed[j] = true;
        for v in (0..=max).rev() {
            self.assign(j, v);
            self.dive(depth + 1);
            self.unassign(j, v);
            if self.aborted {
                break;
            }
        }
        self.fixed[j] = false;
    }

    fn assign(&mut self, j: usize, v: u64) {
        for &(i, a) in self.bound.column(j) {
            self.residual[i] -= a * v;
        }
        self.values[j] = v;
        self.objective += self.problem.variables()[j].objective * v as i64;
    }

    fn unassign(&mut self, j: usize, v: u64) {
        for &(i, a) in self.bound.column(j) {
            self.residual[i] += a * v;
        }
        self.values[j] = 0;
        self.objective -= self.problem.variables()[j].objective * v as i64;
    }

    fn limit_reached(&self) -> bool {
        let nodes_exceeded = self.node_limit.is_some_and(|limit| self.stats.nodes > limit);
        let time_exceeded = self.stats.nodes % TIME_CHECK_INTERVAL == 0
            && self
                .time_limit
                .is_some_and(|limit| self.start.elapsed() > limit);
        nodes_exceeded || time_exceeded
    }
}
