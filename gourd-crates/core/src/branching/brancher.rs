use std::fmt::Debug;

use super::SelectionContext;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::engine::constraints::ConstraintType;
use crate::engine::Assignments;
#[cfg(doc)]
use crate::engine::Solver;

/// A branching strategy.
///
/// The brancher only proposes decisions; the [`Solver`] assigns them. A brancher which returns
/// `None` while some variable is still unassigned is a bug.
pub trait Brancher: Debug + Send {
    /// Returns the next decision, or `None` if every variable is assigned.
    ///
    /// The [`SelectionContext`] is only mutable to give access to the random generator.
    fn next_decision(&mut self, context: &mut SelectionContext<'_>) -> Option<Literal>;

    /// Called for every variable which is registered with the solver.
    fn on_new_variable(&mut self, _variable: Variable) {}

    /// Called when a clause with at least two literals is added, unless the clause was created
    /// with the `NoHeuristic` flag.
    fn on_new_constraint(&mut self, _literals: &[Literal], _constraint_type: ConstraintType) {}

    /// Called once a conflict has been analysed.
    fn on_conflict(&mut self) {}

    /// Called for every literal which is resolved on during conflict analysis.
    fn on_appearance_in_conflict_literal(&mut self, _literal: Literal) {}

    /// Called for every literal which is unassigned during backtracking.
    fn on_unassign_literal(&mut self, _literal: Literal) {}

    fn on_restart(&mut self) {}

    /// Called with the total assignment whenever a model is found.
    fn on_solution(&mut self, _assignments: &Assignments) {}

    /// Raises the preference for `literal` by `amount` activity increments.
    fn bump(&mut self, _literal: Literal, _amount: f64) {}

    /// A brancher for a solver running in another thread.
    fn clone_for(&self) -> Box<dyn Brancher>;
}
