use super::Clause;
use super::ConstraintInfo;
use super::ConstraintScore;
use super::LoopFormula;
use super::WeightConstraint;
use crate::basic_types::Conflict;
use crate::basic_types::Literal;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::Assignments;
use crate::engine::WatchLists;
use crate::gourd_assert_moderate;

/// The handle of a constraint in the [`ConstraintStore`].
///
/// A handle stays valid until its constraint is destroyed, after which it may be reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId {
    index: u32,
}

impl ConstraintId {
    pub(crate) fn from_index(index: usize) -> ConstraintId {
        ConstraintId {
            index: index as u32,
        }
    }
}

impl StorageKey for ConstraintId {
    fn index(&self) -> usize {
        self.index as usize
    }

    fn create_from_index(index: usize) -> Self {
        ConstraintId::from_index(index)
    }
}

impl std::fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.index)
    }
}

/// Whether a generic watch should stay in its list after the constraint was notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WatchStatus {
    Keep,
    Remove,
}

/// The part of the solver a constraint may change while it propagates.
#[derive(Debug)]
pub(crate) struct PropagationContext<'a> {
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) watch_lists: &'a mut WatchLists,
}

/// The built-in constraint kinds which are stored explicitly.
#[derive(Debug)]
pub(crate) enum ConstraintKind {
    Clause(Clause),
    Weight(WeightConstraint),
    Loop(LoopFormula),
}

impl ConstraintKind {
    /// Notifies the constraint that the literal `trigger` of one of its generic watches became
    /// true. Clauses are propagated directly by unit propagation and never get here.
    pub(crate) fn propagate_generic(
        &mut self,
        constraint: ConstraintId,
        trigger: Literal,
        data: u32,
        context: &mut PropagationContext<'_>,
    ) -> Result<WatchStatus, Conflict> {
        match self {
            ConstraintKind::Clause(_) => {
                unreachable!("clauses only have clause watches")
            }
            ConstraintKind::Weight(weight) => weight.propagate(constraint, trigger, data, context),
            ConstraintKind::Loop(loop_formula) => {
                loop_formula.propagate(constraint, trigger, data, context)
            }
        }
    }

    /// Propagates what follows from the assignment under which the constraint was stored.
    pub(crate) fn initialise(
        &mut self,
        constraint: ConstraintId,
        context: &mut PropagationContext<'_>,
    ) -> Result<(), Conflict> {
        match self {
            ConstraintKind::Clause(_) => Ok(()),
            ConstraintKind::Weight(weight) => weight.initialise(constraint, context),
            ConstraintKind::Loop(loop_formula) => loop_formula.initialise(constraint, context),
        }
    }

    /// Appends the reason of `literal`, which this constraint implied.
    pub(crate) fn reason(
        &self,
        literal: Literal,
        assignments: &Assignments,
        reason: &mut Vec<Literal>,
    ) {
        match self {
            ConstraintKind::Clause(clause) => clause.reason(literal, reason),
            ConstraintKind::Weight(weight) => weight.reason(literal, assignments, reason),
            ConstraintKind::Loop(loop_formula) => {
                loop_formula.reason(literal, assignments, reason)
            }
        }
    }

    /// Called for a level this constraint registered an undo hook on.
    pub(crate) fn undo_level(&mut self, constraint: ConstraintId, assignments: &mut Assignments) {
        match self {
            ConstraintKind::Clause(clause) => clause.undo_level(constraint, assignments),
            ConstraintKind::Weight(weight) => weight.undo_level(constraint, assignments),
            ConstraintKind::Loop(_) => {}
        }
    }

    /// Whether the constraint is the antecedent of an assigned literal.
    pub(crate) fn is_locked(&self, constraint: ConstraintId, assignments: &Assignments) -> bool {
        match self {
            ConstraintKind::Clause(clause) => clause.is_locked(constraint, assignments),
            ConstraintKind::Weight(weight) => weight.is_locked(constraint, assignments),
            ConstraintKind::Loop(loop_formula) => loop_formula.is_locked(constraint, assignments),
        }
    }

    /// Simplifies the constraint at the root; returns `true` if it can be removed.
    pub(crate) fn simplify(&mut self, assignments: &Assignments) -> bool {
        match self {
            ConstraintKind::Clause(clause) => clause.simplify(assignments),
            ConstraintKind::Weight(weight) => weight.simplify(assignments),
            ConstraintKind::Loop(loop_formula) => loop_formula.simplify(assignments),
        }
    }

    /// Adds the watches of the constraint.
    pub(crate) fn attach(&self, constraint: ConstraintId, watch_lists: &mut WatchLists) {
        match self {
            ConstraintKind::Clause(clause) => {
                let [first, second] = clause.watched();
                watch_lists.watch_clause(first, second, constraint);
                watch_lists.watch_clause(second, first, constraint);
            }
            ConstraintKind::Weight(weight) => weight.attach(constraint, watch_lists),
            ConstraintKind::Loop(loop_formula) => loop_formula.attach(constraint, watch_lists),
        }
    }

    /// Removes every watch of the constraint.
    pub(crate) fn detach(&self, constraint: ConstraintId, watch_lists: &mut WatchLists) {
        match self {
            ConstraintKind::Clause(clause) => {
                for watched in clause.watched() {
                    watch_lists.unwatch_clause(watched, constraint);
                }
            }
            ConstraintKind::Weight(weight) => weight.detach(constraint, watch_lists),
            ConstraintKind::Loop(loop_formula) => loop_formula.detach(constraint, watch_lists),
        }
    }

    /// A copy for a solver on another thread, if the constraint can be copied at all.
    pub(crate) fn clone_for(&self) -> Option<ConstraintKind> {
        match self {
            ConstraintKind::Clause(clause) => Some(ConstraintKind::Clause(clause.clone_for())),
            ConstraintKind::Weight(weight) => Some(ConstraintKind::Weight(weight.clone_for())),
            ConstraintKind::Loop(_) => None,
        }
    }

    /// The literals the constraint ranges over.
    pub(crate) fn literals(&self) -> Vec<Literal> {
        match self {
            ConstraintKind::Clause(clause) => clause.literals().to_vec(),
            ConstraintKind::Weight(weight) => weight.literals().collect(),
            ConstraintKind::Loop(loop_formula) => loop_formula.literals().collect(),
        }
    }

    pub(crate) fn as_clause(&self) -> Option<&Clause> {
        match self {
            ConstraintKind::Clause(clause) => Some(clause),
            _ => None,
        }
    }

    pub(crate) fn as_clause_mut(&mut self) -> Option<&mut Clause> {
        match self {
            ConstraintKind::Clause(clause) => Some(clause),
            _ => None,
        }
    }
}

/// A constraint together with the bookkeeping of the learnt database.
#[derive(Debug)]
pub(crate) struct StoredConstraint {
    pub(crate) info: ConstraintInfo,
    pub(crate) score: ConstraintScore,
    pub(crate) kind: ConstraintKind,
}

impl StoredConstraint {
    pub(crate) fn is_learnt(&self) -> bool {
        self.info.constraint_type().is_learnt()
    }
}

/// The slab which owns every explicitly stored constraint of a solver.
///
/// Destroyed slots are kept on a free list and handed out again by later additions.
#[derive(Debug, Default)]
pub(crate) struct ConstraintStore {
    slots: KeyedVec<ConstraintId, Option<StoredConstraint>>,
    free: Vec<ConstraintId>,
    num_learnt: usize,
}

impl ConstraintStore {
    pub(crate) fn add(&mut self, constraint: StoredConstraint) -> ConstraintId {
        if constraint.is_learnt() {
            self.num_learnt += 1;
        }
        match self.free.pop() {
            Some(id) => {
                gourd_assert_moderate!(self.slots[id].is_none());
                self.slots[id] = Some(constraint);
                id
            }
            None => self.slots.push(Some(constraint)),
        }
    }

    /// Removes the constraint, releasing its slot; the caller is responsible for its watches.
    pub(crate) fn remove(&mut self, id: ConstraintId) -> StoredConstraint {
        let constraint = self.slots[id]
            .take()
            .unwrap_or_else(|| panic!("constraint {id} was already removed"));
        if constraint.is_learnt() {
            self.num_learnt -= 1;
        }
        self.free.push(id);
        constraint
    }

    /// Detaches the constraint from the watch lists and removes it.
    pub(crate) fn destroy(&mut self, id: ConstraintId, watch_lists: &mut WatchLists) {
        let constraint = self.remove(id);
        constraint.kind.detach(id, watch_lists);
    }

    pub(crate) fn get(&self, id: ConstraintId) -> &StoredConstraint {
        self.slots[id]
            .as_ref()
            .unwrap_or_else(|| panic!("constraint {id} does not exist"))
    }

    pub(crate) fn get_mut(&mut self, id: ConstraintId) -> &mut StoredConstraint {
        self.slots[id]
            .as_mut()
            .unwrap_or_else(|| panic!("constraint {id} does not exist"))
    }

    pub(crate) fn contains(&self, id: ConstraintId) -> bool {
        self.slots.get(id).is_some_and(Option::is_some)
    }

    /// Every stored constraint with its handle.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (ConstraintId, &StoredConstraint)> + '_ {
        self.slots
            .keys()
            .zip(self.slots.iter())
            .filter_map(|(id, slot)| slot.as_ref().map(|constraint| (id, constraint)))
    }

    pub(crate) fn ids(&self) -> Vec<ConstraintId> {
        self.iter().map(|(id, _)| id).collect()
    }

    pub(crate) fn learnt_ids(&self) -> Vec<ConstraintId> {
        self.iter()
            .filter(|(_, constraint)| constraint.is_learnt())
            .map(|(id, _)| id)
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub(crate) fn num_learnt(&self) -> usize {
        self.num_learnt
    }

    pub(crate) fn num_static(&self) -> usize {
        self.len() - self.num_learnt
    }
}
