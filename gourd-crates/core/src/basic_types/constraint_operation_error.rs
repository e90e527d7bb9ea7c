use thiserror::Error;

use super::Variable;
#[cfg(doc)]
use crate::engine::Solver;

/// Errors related to adding constraints to the [`Solver`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// Error which indicates that adding the clause led to infeasibility at the root.
    #[error("Adding the clause failed because it is infeasible at the root")]
    InfeasibleClause,
    /// Error which indicates that a constraint was added while the [`Solver`] was already in an
    /// infeasible state.
    #[error("Adding constraint failed because the solver is in an infeasible state")]
    InfeasibleState,
    /// Error which indicates that adding a weight constraint led to infeasibility at the root.
    #[error("Adding the weight constraint failed because it is infeasible at the root")]
    InfeasibleWeightConstraint,
    /// Error which indicates that the head of a weight constraint also occurs in its body.
    #[error("The head {0} of the weight constraint also occurs in its body")]
    HeadInBody(Variable),
    /// Error which indicates that the weights of a weight constraint do not fit into an `i64`
    /// once they are normalised.
    #[error("The weights of the weight constraint overflow")]
    WeightOverflow,
    /// Error which indicates that adding a loop formula led to infeasibility at the root.
    #[error("Adding the loop formula failed because it is infeasible at the root")]
    InfeasibleLoopFormula,
    /// Error which indicates that a constraint refers to a variable the [`Solver`] does not know.
    #[error("The constraint refers to the unknown variable {0}")]
    UnknownVariable(Variable),
}
