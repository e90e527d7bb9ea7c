//! What a solve reports back: the [`SolveResult`] and the [`SolveSummary`] around it.
mod model;
mod unsat_core;

pub use model::Model;
pub use unsat_core::UnsatCore;

use crate::engine::solve::SolveStatistics;
use crate::engine::SolverStatistics;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SolveResult {
    /// The last model which was found.
    Satisfiable(Model),
    /// There is no model; the core is given if the solve had assumptions.
    Unsatisfiable(Option<UnsatCore>),
    /// The solve stopped before it could decide the problem.
    Unknown {
        /// A termination condition or the interrupt handle stopped the solve.
        interrupted: bool,
        /// A [`SolveLimits`](crate::engine::solve::SolveLimits) limit was reached.
        exhausted: bool,
    },
}

impl SolveResult {
    pub fn is_satisfiable(&self) -> bool {
        matches!(self, SolveResult::Satisfiable(_))
    }

    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, SolveResult::Unsatisfiable(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SolveResult::Unknown { .. })
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            SolveResult::Satisfiable(model) => Some(model),
            _ => None,
        }
    }
}

/// The outcome of [`SequentialSolve::solve`](crate::engine::solve::SequentialSolve::solve).
#[derive(Clone, Debug)]
pub struct SolveSummary {
    pub result: SolveResult,
    pub num_models: u64,
    /// Whether the search space was exhausted: every model was enumerated or there is none.
    pub exhausted: bool,
    pub statistics: SolveStatistics,
    pub solver_statistics: SolverStatistics,
}
