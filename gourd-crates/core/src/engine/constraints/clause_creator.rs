use std::cmp::Reverse;

use enumset::EnumSet;
use enumset::EnumSetType;

use super::Clause;
use super::ConstraintId;
use super::ConstraintInfo;
use super::ConstraintKind;
use super::ConstraintType;
use super::SharedLiterals;
use crate::basic_types::Conflict;
use crate::basic_types::Literal;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::engine::Solver;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;

/// Modifies how [`ClauseCreator`] handles a clause.
#[derive(Debug, EnumSetType)]
pub enum ClauseCreateFlag {
    /// The literals are already ordered; [`ClauseCreator::end`] does not prepare them again.
    NoPrepare,
    /// Store the clause as an explicit constraint even if it has at most three literals.
    Explicit,
    /// Drop clauses which are satisfied.
    NotSat,
    /// Drop clauses which are satisfied at the root.
    NotRootSat,
    /// Drop clauses which are conflicting instead of raising the conflict.
    NotConflict,
    /// Do not notify the brancher of the new clause.
    NoHeuristic,
}

pub type ClauseCreateFlags = EnumSet<ClauseCreateFlag>;

/// The classification of a prepared clause with respect to the current assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseStatus {
    /// Every literal is false.
    Empty,
    /// Exactly one literal is unassigned and the others are false.
    Unit,
    /// Some literal is true, or the clause contains a complementary pair.
    Satisfied,
    /// At least two literals are unassigned.
    General,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClauseCreationResult {
    pub status: ClauseStatus,
    /// The handle of the clause if it was stored explicitly.
    pub constraint: Option<ConstraintId>,
    /// Unset if the clause is conflicting; the conflict is pending in the solver.
    pub ok: bool,
}

impl ClauseCreationResult {
    fn dropped(status: ClauseStatus, ok: bool) -> ClauseCreationResult {
        ClauseCreationResult {
            status,
            constraint: None,
            ok,
        }
    }
}

/// Builds clauses and adds them to a [`Solver`].
///
/// The literals of a prepared clause are ordered such that its first two literals are the
/// best choice for the watched literals: true literals first (lowest level first), then the
/// unassigned ones, then the false ones by decreasing level. The status of the clause can be
/// read off the first two literals.
#[derive(Clone, Debug, Default)]
pub struct ClauseCreator {
    literals: Vec<Literal>,
    constraint_type: ConstraintType,
    /// Set by [`ClauseCreator::prepare`] if the clause contains a complementary pair.
    tautology: bool,
}

impl ClauseCreator {
    pub fn start(&mut self, constraint_type: ConstraintType) -> &mut Self {
        self.literals.clear();
        self.constraint_type = constraint_type;
        self.tautology = false;
        self
    }

    pub fn add(&mut self, literal: Literal) -> &mut Self {
        self.literals.push(literal);
        self
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.constraint_type
    }

    /// Removes duplicate literals and orders the rest for watch selection. With
    /// `full_simplify`, literals which are false at the root are removed as well.
    pub fn prepare(&mut self, solver: &Solver, full_simplify: bool) -> ClauseStatus {
        let assignments = &solver.assignments;

        self.literals.sort_unstable();
        self.literals.dedup();
        self.tautology = self
            .literals
            .windows(2)
            .any(|pair| pair[0] == !pair[1]);

        if full_simplify {
            if self
                .literals
                .iter()
                .any(|&literal| assignments.is_root_true(literal))
            {
                self.tautology = true;
            }
            self.literals
                .retain(|&literal| !assignments.is_root_false(literal));
        }

        sort_for_watching(&mut self.literals, assignments);
        self.current_status(solver)
    }

    fn current_status(&self, solver: &Solver) -> ClauseStatus {
        if self.tautology {
            ClauseStatus::Satisfied
        } else {
            ClauseCreator::status(solver, &self.literals)
        }
    }

    /// Adds the clause which was built since the last [`ClauseCreator::start`].
    pub fn end(&mut self, solver: &mut Solver, flags: ClauseCreateFlags) -> ClauseCreationResult {
        if !flags.contains(ClauseCreateFlag::NoPrepare) {
            let _ = self.prepare(solver, false);
        }
        if self.tautology {
            return ClauseCreationResult::dropped(ClauseStatus::Satisfied, true);
        }
        create_prepared(
            solver,
            ClausePayload::Owned(&self.literals),
            flags,
            self.constraint_type,
        )
    }

    /// Prepares and adds `literals` in one go.
    pub fn create(
        solver: &mut Solver,
        literals: impl IntoIterator<Item = Literal>,
        flags: ClauseCreateFlags,
        constraint_type: ConstraintType,
    ) -> ClauseCreationResult {
        let mut creator = ClauseCreator::default();
        let _ = creator.start(constraint_type);
        for literal in literals {
            let _ = creator.add(literal);
        }
        creator.end(solver, flags)
    }

    /// Adds a clause whose literals are shared with other solvers.
    ///
    /// The literals are expected to be free of duplicates. The current assignment may already
    /// falsify the clause, in which case the conflict becomes pending. Short clauses are stored
    /// in the watch lists unless [`ClauseCreateFlag::Explicit`] is given; otherwise the clause
    /// holds on to `shared`.
    pub fn integrate(
        solver: &mut Solver,
        shared: SharedLiterals,
        flags: ClauseCreateFlags,
        constraint_type: ConstraintType,
    ) -> ClauseCreationResult {
        gourd_assert_moderate!({
            let mut literals = shared.literals().to_vec();
            literals.sort_unstable();
            literals.windows(2).all(|pair| pair[0] != pair[1])
        });

        let mut literals = shared.literals().to_vec();
        sort_for_watching(&mut literals, &solver.assignments);

        let payload = if literals.len() <= 3 && !flags.contains(ClauseCreateFlag::Explicit) {
            ClausePayload::Owned(&literals)
        } else {
            ClausePayload::Shared {
                literals: &literals,
                shared,
            }
        };
        create_prepared(solver, payload, flags, constraint_type)
    }

    /// The status of the prepared `literals` under the current assignment.
    pub fn status(solver: &Solver, literals: &[Literal]) -> ClauseStatus {
        let assignments = &solver.assignments;
        match literals {
            [] => ClauseStatus::Empty,
            [first, ..] if assignments.is_true(*first) => ClauseStatus::Satisfied,
            [first, ..] if assignments.is_false(*first) => ClauseStatus::Empty,
            [_] => ClauseStatus::Unit,
            [_, second, ..] if assignments.is_false(*second) => ClauseStatus::Unit,
            _ => ClauseStatus::General,
        }
    }
}

/// Orders `literals` as described on [`ClauseCreator`].
fn sort_for_watching(literals: &mut [Literal], assignments: &Assignments) {
    literals.sort_by_cached_key(|&literal| match assignments.value(literal) {
        Some(true) => (0, assignments.level(literal.variable()) as isize),
        None => (1, 0),
        Some(false) => (2, -(assignments.level(literal.variable()) as isize)),
    });
}

enum ClausePayload<'a> {
    Owned(&'a [Literal]),
    Shared {
        literals: &'a [Literal],
        shared: SharedLiterals,
    },
}

impl ClausePayload<'_> {
    fn literals(&self) -> &[Literal] {
        match self {
            ClausePayload::Owned(literals) => literals,
            ClausePayload::Shared { literals, .. } => literals,
        }
    }
}

fn create_prepared(
    solver: &mut Solver,
    payload: ClausePayload<'_>,
    flags: ClauseCreateFlags,
    constraint_type: ConstraintType,
) -> ClauseCreationResult {
    let literals = payload.literals().to_vec();
    let status = ClauseCreator::status(solver, &literals);

    match status {
        ClauseStatus::Satisfied => {
            let root_satisfied = solver.assignments.is_root_true(literals[0]);
            if flags.contains(ClauseCreateFlag::NotSat)
                || (flags.contains(ClauseCreateFlag::NotRootSat) && root_satisfied)
            {
                return ClauseCreationResult::dropped(status, true);
            }
            if literals.len() == 1 {
                if !root_satisfied {
                    solver.add_pending_implication(literals[0], 0, Antecedent::None);
                }
                return ClauseCreationResult::dropped(status, true);
            }
            let constraint = store(solver, payload, flags, constraint_type);
            ClauseCreationResult {
                status,
                constraint,
                ok: true,
            }
        }
        ClauseStatus::Empty => {
            if flags.contains(ClauseCreateFlag::NotConflict) {
                return ClauseCreationResult::dropped(status, false);
            }
            let constraint = if literals.len() >= 2 && solver.assignments.decision_level() > 0 {
                store(solver, payload, flags, constraint_type)
            } else {
                None
            };
            solver.pending_conflict = Some(Conflict::from_falsified_clause(&literals));
            ClauseCreationResult {
                status,
                constraint,
                ok: false,
            }
        }
        ClauseStatus::Unit => {
            let implied = literals[0];
            let current_level = solver.assignments.decision_level();
            // The other literals are sorted by decreasing level, so the second one is the last
            // to become false.
            let implying_level = if literals.len() == 1 {
                0
            } else {
                solver.assignments.level(literals[1].variable())
            };
            if implying_level == 0 {
                if current_level == 0 {
                    let _ = solver.assignments.enqueue(implied, Antecedent::None);
                } else {
                    let _ = solver
                        .assignments
                        .enqueue(implied, Antecedent::Literal(Literal::TRUE));
                    solver.add_pending_implication(
                        implied,
                        0,
                        Antecedent::Literal(Literal::TRUE),
                    );
                }
                return ClauseCreationResult::dropped(status, true);
            }

            let constraint = store(solver, payload, flags, constraint_type);
            let antecedent = match (constraint, literals.len()) {
                (Some(id), _) => Antecedent::Constraint(id),
                (None, 2) => Antecedent::Literal(!literals[1]),
                (None, _) => Antecedent::Literals(!literals[1], !literals[2]),
            };
            let enqueued = solver.assignments.enqueue(implied, antecedent);
            gourd_assert_simple!(enqueued);
            if implying_level < current_level {
                solver.add_pending_implication(implied, implying_level, antecedent);
            }
            ClauseCreationResult {
                status,
                constraint,
                ok: true,
            }
        }
        ClauseStatus::General => {
            let constraint = store(solver, payload, flags, constraint_type);
            ClauseCreationResult {
                status,
                constraint,
                ok: true,
            }
        }
    }
}

/// Stores a clause with at least two literals; returns its handle if it is stored explicitly.
fn store(
    solver: &mut Solver,
    payload: ClausePayload<'_>,
    flags: ClauseCreateFlags,
    constraint_type: ConstraintType,
) -> Option<ConstraintId> {
    let literals = payload.literals();
    gourd_assert_simple!(literals.len() >= 2);

    if !flags.contains(ClauseCreateFlag::NoHeuristic) {
        solver.brancher.on_new_constraint(literals, constraint_type);
    }

    let explicit = flags.contains(ClauseCreateFlag::Explicit);
    match (literals.len(), &payload) {
        (2, ClausePayload::Owned(_)) if !explicit => {
            solver.watch_lists.add_binary(literals[0], literals[1]);
            solver.statistics.num_binary_clauses += 1;
            return None;
        }
        (3, ClausePayload::Owned(_)) if !explicit => {
            solver
                .watch_lists
                .add_ternary(literals[0], literals[1], literals[2]);
            solver.statistics.num_ternary_clauses += 1;
            return None;
        }
        _ => {}
    }

    let watched = [literals[0], literals[1]];
    let contract_from = solver.options.contraction_keep;
    let contract = constraint_type.is_learnt()
        && solver.options.contraction_limit > 0
        && literals.len() > solver.options.contraction_limit
        && contract_from >= 2
        && contract_from < literals.len()
        && literals[2..]
            .iter()
            .all(|&literal| solver.assignments.is_false(literal));
    let clause = match payload {
        ClausePayload::Owned(literals) => {
            let mut literals = literals.to_vec();
            if contract {
                // Hidden literals are exposed again front to back while backtracking.
                literals[2..].sort_by_key(|literal| {
                    Reverse(solver.assignments.level(literal.variable()))
                });
            }
            Clause::new(literals)
        }
        ClausePayload::Shared { shared, .. } => Clause::new_shared(shared, watched),
    };

    let id = solver.store_constraint(
        ConstraintInfo::of_type(constraint_type),
        ConstraintKind::Clause(clause),
    );
    if contract {
        if let Some(clause) = solver.constraints.get_mut(id).kind.as_clause_mut() {
            clause.contract(contract_from, id, &mut solver.assignments);
        }
    }
    Some(id)
}
