use std::fmt::Debug;

use downcast_rs::impl_downcast;
use downcast_rs::Downcast;

use super::propagator_list::propagate_all;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::engine::constraints::ClauseCreateFlags;
use crate::engine::constraints::ClauseCreator;
use crate::engine::constraints::ConstraintType;
use crate::engine::constraints::LoopFormula;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::engine::Solver;
#[cfg(doc)]
use crate::termination::InterruptHandle;

/// The priority reserved for the [`MessageHandler`](super::MessageHandler), which has to run
/// before any other propagator.
pub const PRIORITY_RESERVED_MESSAGE: u32 = 0;
/// The priority reserved for unfounded set checkers.
pub const PRIORITY_RESERVED_UFS: u32 = 10;
/// Propagators with at least this priority are general propagators; they run in insertion order
/// once every simple propagator has reached its fixpoint.
pub const PRIORITY_CLASS_GENERAL: u32 = 1024;

// Allows `PropagatorList::find` to hand back the concrete type of a propagator.
impl_downcast!(PostPropagator);

/// A propagator which runs after unit propagation has reached a fixpoint.
///
/// Post-propagators are kept in a [`PropagatorList`](super::PropagatorList) ordered by
/// [`PostPropagator::priority`]. Propagators below [`PRIORITY_CLASS_GENERAL`] are *simple* and
/// are ordered by ascending priority, the others are *general* and keep their insertion order.
///
/// A propagator never drives propagation itself: it enqueues consequences (or adds clauses) on
/// the [`PostPropagationContext`] and lets [`PostPropagationContext::propagate_preceding`] bring
/// unit propagation and the propagators in front of it back to a fixpoint.
pub trait PostPropagator: Downcast + Debug + Send {
    fn name(&self) -> &str;

    fn priority(&self) -> u32;

    /// Performs a single round of propagation.
    fn propagate(&mut self, context: &mut PostPropagationContext<'_>) -> PropagationStatus;

    /// Propagates until neither this propagator nor any propagator in front of it derives
    /// anything new.
    fn propagate_fixpoint(&mut self, context: &mut PostPropagationContext<'_>) -> PropagationStatus {
        loop {
            let num_assigned = context.assignments().num_assigned();
            self.propagate(context)?;
            if context.assignments().num_assigned() == num_assigned {
                return Ok(());
            }
            context.propagate_preceding()?;
        }
    }

    /// Discards any state which was built for the current propagation round. Called when a
    /// propagator in front of this one failed.
    fn reset(&mut self) {}

    /// Called once the assignment is total and conflict-free.
    ///
    /// Returning `false` means the assignment is not a model; the propagator is expected to have
    /// added the constraints which exclude it.
    fn is_model(&mut self, _context: &mut PostPropagationContext<'_>) -> bool {
        true
    }

    /// Called after the solver backtracked; `assignments` is the new state.
    fn undo_level(&mut self, _assignments: &Assignments) {}

    /// A copy for a solver running in another thread, or `None` if the propagator cannot be
    /// copied.
    fn clone_for(&self) -> Option<Box<dyn PostPropagator>> {
        None
    }
}

/// What a [`PostPropagator`] can do to the solver it runs in.
#[derive(Debug)]
pub struct PostPropagationContext<'a> {
    pub(crate) solver: &'a mut Solver,
    /// The propagators in front of the running one.
    pub(crate) preceding: &'a mut [Box<dyn PostPropagator>],
}

impl PostPropagationContext<'_> {
    pub fn assignments(&self) -> &Assignments {
        &self.solver.assignments
    }

    pub fn decision_level(&self) -> usize {
        self.solver.assignments.decision_level()
    }

    /// Makes `literal` true with the given antecedent; returns `false` if it is already false.
    ///
    /// Reasons which do not fit into an [`Antecedent`] should be added as clauses with
    /// [`PostPropagationContext::add_clause`] instead.
    pub fn enqueue(&mut self, literal: Literal, antecedent: Antecedent) -> bool {
        self.solver.assignments.enqueue(literal, antecedent)
    }

    /// Adds a learnt clause, asserting its literal if it is unit. A falsified clause is returned
    /// as the conflict.
    pub fn add_clause(
        &mut self,
        literals: impl IntoIterator<Item = Literal>,
        constraint_type: ConstraintType,
    ) -> PropagationStatus {
        let result = ClauseCreator::create(
            self.solver,
            literals,
            ClauseCreateFlags::empty(),
            constraint_type,
        );
        if result.ok {
            Ok(())
        } else {
            Err(self.solver.take_pending_conflict())
        }
    }

    /// Adds the loop formula `atom -> (b1 ∨ … ∨ bk)` for every atom.
    pub fn add_loop_formula(
        &mut self,
        atoms: Vec<Literal>,
        bodies: Vec<Literal>,
    ) -> PropagationStatus {
        LoopFormula::create(self.solver, atoms, bodies)
    }

    /// Runs unit propagation and every propagator in front of the running one to a fixpoint.
    pub fn propagate_preceding(&mut self) -> PropagationStatus {
        propagate_all(self.solver, self.preceding)
    }

    /// Whether an interrupt was requested through the solver's [`InterruptHandle`].
    pub fn is_interrupted(&self) -> bool {
        self.solver.interrupt_handle().is_raised()
    }
}
