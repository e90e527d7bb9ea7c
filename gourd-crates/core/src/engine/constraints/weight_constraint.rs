use bitfield_struct::bitfield;
use enum_map::Enum;
use enum_map::EnumMap;
use enumset::EnumSet;
use enumset::EnumSetType;

use super::constraint_store::PropagationContext;
use super::ConstraintId;
use super::ConstraintInfo;
use super::ConstraintKind;
use super::ConstraintType;
use super::WatchStatus;
use super::WeightLitsRep;
use crate::basic_types::Conflict;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::basic_types::WeightedLiteral;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::engine::Solver;
use crate::engine::WatchLists;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;

/// The position of the head in the index space of a weight constraint; body literal `j` has
/// index `j + 1`.
const HEAD: usize = 0;

/// One direction of `W ↔ Σ wⱼ·xⱼ ≥ B`.
#[derive(Debug, EnumSetType, Enum)]
pub(crate) enum SubConstraint {
    /// Counts the true body literals; derives `W` once the bound is met and, if `W` is false,
    /// falsifies every literal which would meet it.
    FalseBodyOrHead,
    /// Counts the false body literals; derives `¬W` once the bound is out of reach and, if `W`
    /// is true, forces every literal without which the bound can no longer be met.
    TrueBodyOrNotHead,
}

impl SubConstraint {
    fn other(self) -> SubConstraint {
        match self {
            SubConstraint::FalseBodyOrHead => SubConstraint::TrueBodyOrNotHead,
            SubConstraint::TrueBodyOrNotHead => SubConstraint::FalseBodyOrHead,
        }
    }

    const fn into_bits(self) -> u8 {
        self as _
    }

    const fn from_bits(value: u8) -> SubConstraint {
        match value {
            0 => SubConstraint::FalseBodyOrHead,
            _ => SubConstraint::TrueBodyOrNotHead,
        }
    }
}

/// The payload of the generic watches of a weight constraint.
#[bitfield(u32)]
struct WatchData {
    #[bits(8)]
    sub: SubConstraint,
    #[bits(24)]
    index: u32,
}

impl WatchData {
    fn of(sub: SubConstraint, index: usize) -> u32 {
        WatchData::new()
            .with_sub(sub)
            .with_index(index as u32)
            .into_bits()
    }
}

/// A processed literal: it was folded into the slack of `sub` if `counted` is set.
#[derive(Clone, Copy, Debug)]
struct UndoEntry {
    index: u32,
    sub: SubConstraint,
    counted: bool,
}

/// The pseudo-boolean constraint `W ↔ Σ wⱼ·xⱼ ≥ B` over a normalised literal list.
///
/// Both sub-constraints keep a slack which drops below zero once they propagate their head.
/// Literals only count once their watch was processed; an assigned but unprocessed literal is
/// treated as free, which keeps reasons small. The processed literals are kept on one undo
/// stack in processing order so that backtracking restores both slacks exactly.
#[derive(Debug)]
pub(crate) struct WeightConstraint {
    head: Literal,
    literals: Box<[WeightedLiteral]>,
    bound: i64,
    /// Unset when the head was fixed at the root; it is then processed on initialisation.
    watch_head: bool,
    slack: EnumMap<SubConstraint, i64>,
    active: EnumSet<SubConstraint>,
    processed: Box<[bool]>,
    undo: Vec<UndoEntry>,
    /// Where backward propagation resumes.
    bp_index: usize,
}

impl WeightConstraint {
    fn new(head: Literal, literals: Box<[WeightedLiteral]>, bound: i64, watch_head: bool) -> Self {
        gourd_assert_simple!(literals.len() < (1 << 24) - 1);
        gourd_assert_moderate!(literals
            .iter()
            .all(|literal| literal.literal.variable() != head.variable()));

        let reach = literals.iter().map(|literal| literal.weight).sum::<i64>();
        let num_literals = literals.len();
        WeightConstraint {
            head,
            literals,
            bound,
            watch_head,
            slack: EnumMap::from_fn(|sub| match sub {
                SubConstraint::FalseBodyOrHead => bound - 1,
                SubConstraint::TrueBodyOrNotHead => reach - bound,
            }),
            active: EnumSet::all(),
            processed: vec![false; num_literals + 1].into_boxed_slice(),
            undo: vec![],
            bp_index: 0,
        }
    }

    /// Adds `head ↔ Σ wⱼ·xⱼ ≥ bound` to the solver, which has to be at the root.
    ///
    /// Trivial constraints become unit clauses, bound one becomes a disjunction and a bound equal
    /// to the reach becomes a conjunction. Only the remaining constraints are stored as weight
    /// constraints.
    pub(crate) fn create(
        solver: &mut Solver,
        head: Literal,
        literals: impl IntoIterator<Item = WeightedLiteral>,
        bound: i64,
    ) -> Result<(), ConstraintOperationError> {
        gourd_assert_simple!(solver.assignments.decision_level() == 0);
        let mut rep = WeightLitsRep::create(literals, bound)?;
        rep.propagate_root(&solver.assignments);

        fn infeasible<E>(_: E) -> ConstraintOperationError {
            ConstraintOperationError::InfeasibleWeightConstraint
        }

        if rep.is_sat() {
            return solver.add_clause([head]).map_err(infeasible);
        }
        if rep.is_unsat() {
            return solver.add_clause([!head]).map_err(infeasible);
        }

        let body = rep
            .literals()
            .iter()
            .map(|literal| literal.literal)
            .collect::<Vec<_>>();
        if rep.bound() == 1 {
            solver
                .add_clause(std::iter::once(!head).chain(body.iter().copied()))
                .map_err(infeasible)?;
            for &literal in body.iter() {
                solver.add_clause([head, !literal]).map_err(infeasible)?;
            }
            return Ok(());
        }
        if rep.bound() == rep.reach() {
            for &literal in body.iter() {
                solver.add_clause([!head, literal]).map_err(infeasible)?;
            }
            return solver
                .add_clause(std::iter::once(head).chain(body.iter().map(|&literal| !literal)))
                .map_err(infeasible);
        }

        let watch_head = !solver.assignments.is_assigned(head);
        let (literals, bound) = rep.into_parts();
        let constraint =
            WeightConstraint::new(head, literals.into_boxed_slice(), bound, watch_head);
        let id = solver.store_constraint(
            ConstraintInfo::of_type(ConstraintType::Static),
            ConstraintKind::Weight(constraint),
        );
        solver.initialise_constraint(id).map_err(infeasible)
    }

    fn head_literal(&self, sub: SubConstraint) -> Literal {
        match sub {
            SubConstraint::FalseBodyOrHead => self.head,
            SubConstraint::TrueBodyOrNotHead => !self.head,
        }
    }

    /// The literal whose truth makes `index` count towards `sub`.
    fn trigger(&self, index: usize, sub: SubConstraint) -> Literal {
        if index == HEAD {
            return !self.head_literal(sub);
        }
        let literal = self.literals[index - 1].literal;
        match sub {
            SubConstraint::FalseBodyOrHead => literal,
            SubConstraint::TrueBodyOrNotHead => !literal,
        }
    }

    fn weight(&self, index: usize) -> i64 {
        if index == HEAD {
            0
        } else {
            self.literals[index - 1].weight
        }
    }

    /// Processes a head which was fixed before the constraint was stored.
    pub(crate) fn initialise(
        &mut self,
        constraint: ConstraintId,
        context: &mut PropagationContext<'_>,
    ) -> Result<(), Conflict> {
        if self.watch_head || !context.assignments.is_assigned(self.head) {
            return Ok(());
        }
        let sub = if context.assignments.is_true(self.head) {
            SubConstraint::TrueBodyOrNotHead
        } else {
            SubConstraint::FalseBodyOrHead
        };
        let trigger = self.trigger(HEAD, sub);
        self.propagate(constraint, trigger, WatchData::of(sub, HEAD), context)
            .map(|_| ())
    }

    pub(crate) fn propagate(
        &mut self,
        constraint: ConstraintId,
        trigger: Literal,
        data: u32,
        context: &mut PropagationContext<'_>,
    ) -> Result<WatchStatus, Conflict> {
        let data = WatchData::from_bits(data);
        let index = data.index() as usize;
        let sub = data.sub();
        gourd_assert_moderate!(trigger == self.trigger(index, sub));

        if self.processed[index] {
            return Ok(WatchStatus::Keep);
        }
        self.processed[index] = true;

        let level = context.assignments.level(trigger.variable());
        let opens_level = self.undo.last().map_or(true, |entry| {
            let previous = self.trigger(entry.index as usize, entry.sub);
            context.assignments.level(previous.variable()) < level
        });
        if opens_level {
            context.assignments.register_undo(level, constraint);
        }

        if index == HEAD {
            let _ = self.active.remove(sub.other());
            self.undo.push(UndoEntry {
                index: index as u32,
                sub,
                counted: true,
            });
            return self
                .propagate_backward(constraint, sub, context)
                .map(|_| WatchStatus::Keep);
        }

        let counted = self.active.contains(sub);
        self.undo.push(UndoEntry {
            index: index as u32,
            sub,
            counted,
        });
        if !counted {
            return Ok(WatchStatus::Keep);
        }

        self.slack[sub] -= self.weight(index);
        if self.slack[sub] < 0 {
            let implied = self.head_literal(sub);
            if !context
                .assignments
                .enqueue(implied, Antecedent::Constraint(constraint))
            {
                let mut nogood = vec![!implied];
                self.counted_literals(sub, None, context.assignments, &mut nogood);
                return Err(Conflict::Nogood(nogood));
            }
        }

        if self.processed[HEAD] && self.active.contains(sub) {
            self.propagate_backward(constraint, sub, context)?;
        }
        Ok(WatchStatus::Keep)
    }

    /// Forces every literal which alone would exceed the slack of `sub`.
    fn propagate_backward(
        &mut self,
        constraint: ConstraintId,
        sub: SubConstraint,
        context: &mut PropagationContext<'_>,
    ) -> Result<(), Conflict> {
        let slack = self.slack[sub];
        while self.bp_index < self.literals.len() && self.literals[self.bp_index].weight > slack {
            let index = self.bp_index + 1;
            let trigger = self.trigger(index, sub);
            if !self.processed[index]
                && !context.assignments.is_false(trigger)
                && !context
                    .assignments
                    .enqueue(!trigger, Antecedent::Constraint(constraint))
            {
                let mut nogood = vec![trigger];
                self.counted_literals(sub, None, context.assignments, &mut nogood);
                return Err(Conflict::Nogood(nogood));
            }
            self.bp_index += 1;
        }
        Ok(())
    }

    /// Appends the true literals counted towards `sub`, optionally only those assigned before
    /// the trail position `before`. Root literals are left out.
    fn counted_literals(
        &self,
        sub: SubConstraint,
        before: Option<usize>,
        assignments: &Assignments,
        out: &mut Vec<Literal>,
    ) {
        for entry in self.undo.iter().filter(|entry| entry.sub == sub && entry.counted) {
            let literal = self.trigger(entry.index as usize, sub);
            gourd_assert_moderate!(assignments.is_true(literal));
            if assignments.level(literal.variable()) == 0 {
                continue;
            }
            if before.is_some_and(|position| {
                assignments.trail_position(literal.variable()) >= position
            }) {
                continue;
            }
            out.push(literal);
        }
    }

    pub(crate) fn reason(&self, literal: Literal, assignments: &Assignments, out: &mut Vec<Literal>) {
        let sub = if literal == self.head {
            SubConstraint::FalseBodyOrHead
        } else if literal == !self.head {
            SubConstraint::TrueBodyOrNotHead
        } else {
            let Some(body) = self
                .literals
                .iter()
                .find(|body| body.literal.variable() == literal.variable())
            else {
                panic!("{literal} does not occur in the weight constraint")
            };
            if body.literal == literal {
                SubConstraint::TrueBodyOrNotHead
            } else {
                SubConstraint::FalseBodyOrHead
            }
        };
        self.counted_literals(
            sub,
            Some(assignments.trail_position(literal.variable())),
            assignments,
            out,
        );
    }

    /// Pops every processed literal which is no longer assigned.
    pub(crate) fn undo_level(&mut self, _constraint: ConstraintId, assignments: &mut Assignments) {
        while let Some(entry) = self.undo.last().copied() {
            let index = entry.index as usize;
            if assignments.is_assigned(self.trigger(index, entry.sub)) {
                break;
            }
            let _ = self.undo.pop();
            self.processed[index] = false;
            if index == HEAD {
                let _ = self.active.insert(entry.sub.other());
            } else if entry.counted {
                self.slack[entry.sub] += self.weight(index);
            }
        }
        self.bp_index = 0;
    }

    pub(crate) fn is_locked(&self, constraint: ConstraintId, assignments: &Assignments) -> bool {
        self.literals()
            .filter(|&literal| assignments.is_assigned(literal))
            .any(|literal| {
                assignments.antecedent(literal.variable()) == Antecedent::Constraint(constraint)
            })
    }

    /// Whether every literal of the constraint is fixed at the root.
    pub(crate) fn simplify(&mut self, assignments: &Assignments) -> bool {
        self.literals()
            .all(|literal| assignments.is_root_assigned(literal))
    }

    pub(crate) fn attach(&self, constraint: ConstraintId, watch_lists: &mut WatchLists) {
        for (position, literal) in self.literals.iter().enumerate() {
            let index = position + 1;
            watch_lists.watch_generic(
                literal.literal,
                constraint,
                WatchData::of(SubConstraint::FalseBodyOrHead, index),
            );
            watch_lists.watch_generic(
                !literal.literal,
                constraint,
                WatchData::of(SubConstraint::TrueBodyOrNotHead, index),
            );
        }
        if self.watch_head {
            watch_lists.watch_generic(
                self.head,
                constraint,
                WatchData::of(SubConstraint::TrueBodyOrNotHead, HEAD),
            );
            watch_lists.watch_generic(
                !self.head,
                constraint,
                WatchData::of(SubConstraint::FalseBodyOrHead, HEAD),
            );
        }
    }

    pub(crate) fn detach(&self, constraint: ConstraintId, watch_lists: &mut WatchLists) {
        for literal in self.literals() {
            watch_lists.unwatch_generic(literal, constraint);
            watch_lists.unwatch_generic(!literal, constraint);
        }
    }

    /// An unprocessed copy; the new owner replays its root assignment on it.
    pub(crate) fn clone_for(&self) -> WeightConstraint {
        WeightConstraint::new(self.head, self.literals.clone(), self.bound, self.watch_head)
    }

    /// The head (unless it is a constant) followed by the body literals.
    pub(crate) fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        std::iter::once(self.head)
            .filter(|head| !head.variable().is_sentinel())
            .chain(self.literals.iter().map(|literal| literal.literal))
    }
}
