use itertools::Itertools;
use log::debug;

use crate::milp::MilpProblem;

/// Residual capacities below this are considered exhausted
const CAP_EPSILON: f64 = 1e-9;

/// Lagrangian upper bound for packing problems.
///
/// Constraints with pairwise disjoint supports are kept as hard constraints ("groups"),
/// each of which is relaxed to a fractional knapsack.
/// All other constraints are moved into the objective with a multiplier `λ >= 0`.
/// For any `λ >= 0` this yields a valid upper bound on the subproblem, the multipliers are tuned
/// once at the root by subgradient optimization.
#[derive(Clone, Debug)]
pub(super) struct LagrangianBound {
    /// Multiplier per constraint, always zero for group constraints
    lambda: Vec<f64>,
    /// `objective_j - Σ λ_i a_ij` per variable
    reduced: Vec<f64>,
    groups: Vec<Group>,
    /// Variables not covered by any group
    free: Vec<usize>,
    dualized: Vec<usize>,
    /// Per constraint: its terms
    rows: Vec<Vec<(usize, u64)>>,
    /// Per variable: the constraints it appears in, with its coefficient
    columns: Vec<Vec<(usize, u64)>>,
    upper: Vec<u64>,
    objective: Vec<f64>,
    root_bound: f64,
}

#[derive(Clone, Debug)]
struct Group {
    constraint: usize,
    /// Sorted by descending reduced cost per unit of weight
    members: Vec<(usize, u64)>,
}

impl LagrangianBound {
    /// Builds the relaxation for the problem restricted to the variables that are not `fixed`,
    /// and tunes the multipliers against the `incumbent` objective.
    pub fn new(
        problem: &MilpProblem,
        fixed: &[bool],
        residual: &[u64],
        incumbent: i64,
        iterations: usize,
    ) -> Self {
        let n = problem.n_variables();
        let mut columns = vec![vec![]; n];
        for (i, c) in problem.constraints().iter().enumerate() {
            for &(j, a) in c.terms.iter() {
                columns[j].push((i, a));
            }
        }

        let mut grouped = vec![false; n];
        let mut groups = vec![];
        let mut dualized = vec![];
        for (i, c) in problem.constraints().iter().enumerate() {
            if c.terms.iter().all(|&(j, _)| !grouped[j]) {
                c.terms.iter().for_each(|&(j, _)| grouped[j] = true);
                groups.push(Group {
                    constraint: i,
                    members: c.terms.clone(),
                });
            } else {
                dualized.push(i);
            }
        }
        let free = (0..n).filter(|&j| !grouped[j]).collect_vec();

        let objective = problem
            .variables()
            .iter()
            .map(|v| v.objective as f64)
            .collect_vec();

        let mut bound = Self {
            lambda: vec![0.0; problem.constraints().len()],
            reduced: objective.clone(),
            groups,
            free,
            dualized,
            rows: problem
                .constraints()
                .iter()
                .map(|c| c.terms.clone())
                .collect(),
            columns,
            upper: problem.variables().iter().map(|v| v.upper_bound).collect(),
            objective,
            root_bound: f64::INFINITY,
        };
        bound.sort_groups();
        bound.tune(fixed, residual, incumbent, iterations);
        bound
    }

    /// Bound at the root, after tuning
    pub fn root_bound(&self) -> f64 {
        self.root_bound
    }

    pub fn reduced_cost(&self, j: usize) -> f64 {
        self.reduced[j]
    }

    pub fn column(&self, j: usize) -> &[(usize, u64)] {
        &self.columns[j]
    }

    /// Largest value variable `j` can take without exceeding its bound or any residual capacity
    pub fn max_value(&self, j: usize, residual: &[u64]) -> u64 {
        self.columns[j]
            .iter()
            .map(|&(i, a)| residual[i] / a)
            .fold(self.upper[j], u64::min)
    }

    /// Upper bound on the objective that the non-`fixed` variables can still add,
    /// given the residual capacity of every constraint.
    pub fn evaluate(&self, residual: &[u64], fixed: &[bool]) -> f64 {
        self.relax(residual, fixed, None)
    }

    fn relax(&self, residual: &[u64], fixed: &[bool], mut x: Option<&mut [f64]>) -> f64 {
        let mut bound = self
            .dualized
            .iter()
            .map(|&i| self.lambda[i] * residual[i] as f64)
            .sum::<f64>();

        for group in self.groups.iter() {
            let mut cap = residual[group.constraint] as f64;
            for &(j, w) in group.members.iter() {
                if cap <= CAP_EPSILON || self.reduced[j] <= 0.0 {
                    //members are sorted, nothing profitable follows
                    break;
                }
                if fixed[j] {
                    continue;
                }
                let take = (self.max_value(j, residual) as f64).min(cap / w as f64);
                bound += take * self.reduced[j];
                cap -= take * w as f64;
                if let Some(x) = x.as_deref_mut() {
                    x[j] = take;
                }
            }
        }

        for &j in self.free.iter() {
            if !fixed[j] && self.reduced[j] > 0.0 {
                let take = self.max_value(j, residual) as f64;
                bound += take * self.reduced[j];
                if let Some(x) = x.as_deref_mut() {
                    x[j] = take;
                }
            }
        }

        bound
    }

    /// Subgradient optimization of the multipliers with a Polyak step towards `incumbent`.
    fn tune(&mut self, fixed: &[bool], residual: &[u64], incumbent: i64, iterations: usize) {
        let target = incumbent as f64;
        let mut best_lambda = self.lambda.clone();
        let mut best_bound = f64::INFINITY;
        let mut theta = 2.0;
        let mut stalled = 0;
        let mut x = vec![0.0; self.upper.len()];

        for _ in 0..iterations {
            x.iter_mut().for_each(|v| *v = 0.0);
            let bound = self.relax(residual, fixed, Some(x.as_mut_slice()));

            if bound < best_bound - CAP_EPSILON {
                best_bound = bound;
                best_lambda.clone_from(&self.lambda);
                stalled = 0;
            } else {
                stalled += 1;
                if stalled >= 5 {
                    theta /= 2.0;
                    stalled = 0;
                }
            }
            if best_bound < target + 1.0 || self.dualized.is_empty() {
                //the incumbent is already proven optimal, or there is nothing to tune
                break;
            }

            let subgradient = self
                .dualized
                .iter()
                .map(|&i| {
                    let used = self.rows[i]
                        .iter()
                        .map(|&(j, a)| a as f64 * x[j])
                        .sum::<f64>();
                    let g = residual[i] as f64 - used;
                    //a multiplier at zero cannot decrease further
                    if self.lambda[i] <= 0.0 && g > 0.0 { 0.0 } else { g }
                })
                .collect_vec();
            let norm = subgradient.iter().map(|g| g * g).sum::<f64>();
            if norm <= CAP_EPSILON {
                break;
            }

            let step = theta * (bound - target) / norm;
            for (k, &i) in self.dualized.iter().enumerate() {
                self.lambda[i] = (self.lambda[i] - step * subgradient[k]).max(0.0);
            }
            self.update_reduced_costs();
        }

        self.lambda = best_lambda;
        self.update_reduced_costs();
        self.root_bound = self.relax(residual, fixed, None);
        debug!(
            "[BNB] lagrangian root bound {:.1} over {} groups and {} dualized constraints",
            self.root_bound,
            self.groups.len(),
            self.dualized.len()
        );
    }

    fn update_reduced_costs(&mut self) {
        for j in 0..self.reduced.len() {
            self.reduced[j] = self.objective[j]
                - self.columns[j]
                    .iter()
                    .map(|&(i, a)| self.lambda[i] * a as f64)
                    .sum::<f64>();
        }
        self.sort_groups();
    }

    fn sort_groups(&mut self) {
        let reduced = &self.reduced;
        for group in self.groups.iter_mut() {
            group.members.sort_by(|&(j1, w1), &(j2, w2)| {
                let r1 = reduced[j1] / w1 as f64;
                let r2 = reduced[j2] / w2 as f64;
                r2.total_cmp(&r1).then(j1.cmp(&j2))
            });
        }
    }
}
