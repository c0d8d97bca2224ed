//! Bounded integer programs in packing form:
//!
//! ```text
//! maximize    Σ objective_j · x_j
//! subject to  Σ a_ij · x_j <= b_i     for every constraint i   (a_ij >= 0)
//!             0 <= x_j <= upper_j,    x_j integer
//! ```
//!
//! Every coefficient is non-negative, so lowering any variable never breaks a constraint.
//! In particular, the all-zero assignment is feasible whenever every `b_i >= 0`.

mod bnb;
mod bound;

use std::fmt::{Display, Formatter};

use thiserror::Error;

#[doc(inline)]
pub use bnb::{BnbConfig, BnbStats, BranchAndBound};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Variable {
    pub upper_bound: u64,
    pub objective: i64,
}

/// `Σ coefficient · x_variable <= upper_bound`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Constraint {
    pub terms: Vec<(usize, u64)>,
    pub upper_bound: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MilpError {
    #[error("constraint {constraint} refers to unknown variable {variable}")]
    UnknownVariable { constraint: usize, variable: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MilpProblem {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl MilpProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable and returns its index
    pub fn add_variable(&mut self, upper_bound: u64, objective: i64) -> usize {
        self.variables.push(Variable {
            upper_bound,
            objective,
        });
        self.variables.len() - 1
    }

    /// Adds a constraint and returns its index.
    /// Terms with a zero coefficient are dropped, duplicate variables are merged.
    pub fn add_constraint(
        &mut self,
        terms: impl IntoIterator<Item = (usize, u64)>,
        upper_bound: i64,
    ) -> Result<usize, MilpError> {
        let constraint = self.constraints.len();
        let mut merged: Vec<(usize, u64)> = vec![];
        for (variable, coeff) in terms {
            if variable >= self.variables.len() {
                return Err(MilpError::UnknownVariable {
                    constraint,
                    variable,
                });
            }
            if coeff == 0 {
                continue;
            }
            match merged.iter_mut().find(|(v, _)| *v == variable) {
                Some((_, c)) => *c += coeff,
                None => merged.push((variable, coeff)),
            }
        }
        self.constraints.push(Constraint {
            terms: merged,
            upper_bound,
        });
        Ok(constraint)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn n_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn evaluate(&self, values: &[u64]) -> i64 {
        self.variables
            .iter()
            .zip(values)
            .map(|(var, &x)| var.objective * x as i64)
            .sum()
    }

    /// Left hand side of every constraint for the given assignment
    pub fn activities(&self, values: &[u64]) -> Vec<u64> {
        self.constraints
            .iter()
            .map(|c| c.terms.iter().map(|&(j, a)| a * values[j]).sum())
            .collect()
    }

    pub fn is_feasible(&self, values: &[u64]) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(var, &x)| x <= var.upper_bound)
            && self
                .constraints
                .iter()
                .zip(self.activities(values))
                .all(|(c, lhs)| (lhs as i128) <= c.upper_bound as i128)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MilpStatus {
    /// Proven optimal
    Optimal,
    /// Best assignment found before a search limit was hit
    Feasible,
    Infeasible,
    Error(String),
}

impl Display for MilpStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MilpStatus::Optimal => f.write_str("optimal"),
            MilpStatus::Feasible => f.write_str("feasible"),
            MilpStatus::Infeasible => f.write_str("infeasible"),
            MilpStatus::Error(reason) => write!(f, "error ({reason})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MilpSolution {
    pub status: MilpStatus,
    /// One value per variable. Empty unless the status is `Optimal` or `Feasible`.
    pub values: Vec<u64>,
    pub objective: i64,
}

impl MilpSolution {
    pub fn infeasible() -> Self {
        Self {
            status: MilpStatus::Infeasible,
            values: vec![],
            objective: 0,
        }
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            status: MilpStatus::Error(reason.into()),
            values: vec![],
            objective: 0,
        }
    }

    pub fn has_values(&self) -> bool {
        matches!(self.status, MilpStatus::Optimal | MilpStatus::Feasible)
    }
}

/// Anything able to solve a [`MilpProblem`]
pub trait MilpSolver {
    fn name(&self) -> &str;

    /// Maximizes `problem`. A feasible `hint` is used as the starting incumbent,
    /// so the returned objective is never below the one of the hint.
    fn solve(&mut self, problem: &MilpProblem, hint: Option<&[u64]>) -> MilpSolution;
}
