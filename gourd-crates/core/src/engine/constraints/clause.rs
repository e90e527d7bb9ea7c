use super::ConstraintId;
use super::SharedLiterals;
use crate::basic_types::Literal;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;

/// A clause with at least two literals which is stored in the constraint store.
///
/// A local clause owns its literals and watches the first two of them. Long learnt clauses can
/// be contracted: the literals from position `active` onwards are false and hidden from
/// propagation until backtracking unassigns them again. A shared clause keeps its watched
/// literals next to a handle to the shared literal array, which it never reorders.
#[derive(Debug)]
pub(crate) struct Clause {
    literals: ClauseLiterals,
}

#[derive(Debug)]
enum ClauseLiterals {
    Local {
        literals: Box<[Literal]>,
        /// The number of literals visible to propagation.
        active: u32,
    },
    Shared {
        literals: SharedLiterals,
        watched: [Literal; 2],
    },
}

/// The outcome of visiting a clause after one of its watched literals became false.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ClausePropagation {
    /// The other watched literal is true; it becomes the blocker of the watch.
    Satisfied { blocker: Literal },
    /// The watch moved to `new_watch`; the current watch must be dropped.
    Moved { new_watch: Literal },
    /// Every other literal is false, so the given literal is implied.
    Unit(Literal),
    /// Every literal is false.
    Conflict,
}

impl Clause {
    /// Creates a clause whose first two literals are watched.
    pub(crate) fn new(literals: Vec<Literal>) -> Clause {
        gourd_assert_simple!(literals.len() >= 2);
        let active = literals.len() as u32;
        Clause {
            literals: ClauseLiterals::Local {
                literals: literals.into_boxed_slice(),
                active,
            },
        }
    }

    pub(crate) fn new_shared(literals: SharedLiterals, watched: [Literal; 2]) -> Clause {
        gourd_assert_moderate!(watched
            .iter()
            .all(|watch| literals.literals().contains(watch)));
        Clause {
            literals: ClauseLiterals::Shared { literals, watched },
        }
    }

    /// Every literal of the clause, including the hidden ones.
    pub(crate) fn literals(&self) -> &[Literal] {
        match &self.literals {
            ClauseLiterals::Local { literals, .. } => literals,
            ClauseLiterals::Shared { literals, .. } => literals.literals(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.literals().len()
    }

    pub(crate) fn watched(&self) -> [Literal; 2] {
        match &self.literals {
            ClauseLiterals::Local { literals, .. } => [literals[0], literals[1]],
            ClauseLiterals::Shared { watched, .. } => *watched,
        }
    }

    /// The number of literals visible to propagation.
    pub(crate) fn num_active(&self) -> usize {
        match &self.literals {
            ClauseLiterals::Local { active, .. } => *active as usize,
            ClauseLiterals::Shared { literals, .. } => literals.len(),
        }
    }

    pub(crate) fn is_contracted(&self) -> bool {
        self.num_active() < self.len()
    }

    pub(crate) fn shared_literals(&self) -> Option<&SharedLiterals> {
        match &self.literals {
            ClauseLiterals::Local { .. } => None,
            ClauseLiterals::Shared { literals, .. } => Some(literals),
        }
    }

    /// Visits the clause after its watched literal `false_literal` became false.
    pub(crate) fn propagate(
        &mut self,
        false_literal: Literal,
        assignments: &Assignments,
    ) -> ClausePropagation {
        match &mut self.literals {
            ClauseLiterals::Local { literals, active } => {
                let literals = &mut literals[..*active as usize];
                if literals[0] == false_literal {
                    literals.swap(0, 1);
                }
                gourd_assert_moderate!(literals[1] == false_literal);

                let other = literals[0];
                if assignments.is_true(other) {
                    return ClausePropagation::Satisfied { blocker: other };
                }

                for i in 2..literals.len() {
                    if !assignments.is_false(literals[i]) {
                        literals.swap(1, i);
                        return ClausePropagation::Moved {
                            new_watch: literals[1],
                        };
                    }
                }

                if assignments.is_false(other) {
                    ClausePropagation::Conflict
                } else {
                    ClausePropagation::Unit(other)
                }
            }
            ClauseLiterals::Shared { literals, watched } => {
                if watched[0] == false_literal {
                    watched.swap(0, 1);
                }
                gourd_assert_moderate!(watched[1] == false_literal);

                let other = watched[0];
                if assignments.is_true(other) {
                    return ClausePropagation::Satisfied { blocker: other };
                }

                if let Some(&new_watch) = literals.literals().iter().find(|&&literal| {
                    literal != other && literal != false_literal && !assignments.is_false(literal)
                }) {
                    watched[1] = new_watch;
                    return ClausePropagation::Moved { new_watch };
                }

                if assignments.is_false(other) {
                    ClausePropagation::Conflict
                } else {
                    ClausePropagation::Unit(other)
                }
            }
        }
    }

    /// Appends the reason of the implied `literal`: the complements of every other literal.
    pub(crate) fn reason(&self, literal: Literal, reason: &mut Vec<Literal>) {
        reason.extend(
            self.literals()
                .iter()
                .filter(|&&other| other != literal)
                .map(|&other| !other),
        );
    }

    /// Whether the clause is the antecedent of one of its literals.
    pub(crate) fn is_locked(&self, constraint: ConstraintId, assignments: &Assignments) -> bool {
        self.watched().iter().any(|&watched| {
            assignments.is_true(watched)
                && assignments.antecedent(watched.variable()) == Antecedent::Constraint(constraint)
        })
    }

    /// Hides every literal after the first `keep` ones. The hidden literals have to be false
    /// and ordered by decreasing decision level.
    pub(crate) fn contract(
        &mut self,
        keep: usize,
        constraint: ConstraintId,
        assignments: &mut Assignments,
    ) {
        let ClauseLiterals::Local { literals, active } = &mut self.literals else {
            return;
        };
        if keep < 2 || keep >= literals.len() {
            return;
        }
        gourd_assert_moderate!(literals[keep..]
            .iter()
            .all(|&literal| assignments.is_false(literal)));
        gourd_assert_moderate!(literals[keep..].windows(2).all(|pair| {
            assignments.level(pair[0].variable()) >= assignments.level(pair[1].variable())
        }));

        *active = keep as u32;
        assignments.register_undo(assignments.level(literals[keep].variable()), constraint);
    }

    /// Exposes the hidden literals which became unassigned.
    pub(crate) fn undo_level(&mut self, constraint: ConstraintId, assignments: &mut Assignments) {
        let ClauseLiterals::Local { literals, active } = &mut self.literals else {
            return;
        };
        let mut num_active = *active as usize;
        while num_active < literals.len() && assignments.is_unassigned(literals[num_active]) {
            num_active += 1;
        }
        *active = num_active as u32;

        if num_active < literals.len() {
            assignments.register_undo(assignments.level(literals[num_active].variable()), constraint);
        }
    }

    /// Removes the literals which are false at the root; returns `true` if the clause is
    /// satisfied at the root.
    ///
    /// Expects propagation to be complete at the root, so the watched literals of a clause which
    /// is not satisfied are unassigned and keep their positions.
    pub(crate) fn simplify(&mut self, assignments: &Assignments) -> bool {
        match &mut self.literals {
            ClauseLiterals::Local { literals, active } => {
                if literals
                    .iter()
                    .any(|&literal| assignments.is_root_true(literal))
                {
                    return true;
                }
                if literals
                    .iter()
                    .any(|&literal| assignments.is_root_false(literal))
                {
                    let remaining = literals
                        .iter()
                        .copied()
                        .filter(|&literal| !assignments.is_root_false(literal))
                        .collect::<Box<[Literal]>>();
                    *literals = remaining;
                }
                *active = literals.len() as u32;
                false
            }
            ClauseLiterals::Shared { literals, .. } => literals.simplify(assignments),
        }
    }

    /// A detached copy of the clause for another solver.
    pub(crate) fn clone_for(&self) -> Clause {
        match &self.literals {
            ClauseLiterals::Local { literals, .. } => Clause::new(literals.to_vec()),
            ClauseLiterals::Shared { literals, watched } => Clause {
                literals: ClauseLiterals::Shared {
                    literals: literals.share(),
                    watched: *watched,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::constraints::ConstraintType;

    fn setup(n: usize) -> (Assignments, Vec<Literal>) {
        let mut assignments = Assignments::default();
        let literals = (0..n)
            .map(|_| Literal::positive(assignments.grow()))
            .collect();
        (assignments, literals)
    }

    #[test]
    fn the_watch_moves_to_a_non_false_literal() {
        let (mut assignments, lits) = setup(4);
        let mut clause = Clause::new(lits.clone());

        assignments.new_decision(!lits[0]);
        assignments.new_decision(!lits[2]);

        assert_eq!(
            ClausePropagation::Moved { new_watch: lits[3] },
            clause.propagate(lits[0], &assignments)
        );
        assert_eq!([lits[1], lits[3]], clause.watched());
    }

    #[test]
    fn the_last_non_false_literal_is_implied() {
        let (mut assignments, lits) = setup(4);
        let mut clause = Clause::new(lits.clone());

        assignments.new_decision(!lits[2]);
        assignments.new_decision(!lits[3]);
        assignments.new_decision(!lits[1]);

        assert_eq!(
            ClausePropagation::Unit(lits[0]),
            clause.propagate(lits[1], &assignments)
        );

        let _ = assignments.enqueue(lits[0], Antecedent::Constraint(ConstraintId::from_index(0)));
        assert!(clause.is_locked(ConstraintId::from_index(0), &assignments));

        let mut reason = vec![];
        clause.reason(lits[0], &mut reason);
        assert_eq!(vec![!lits[1], !lits[2], !lits[3]], reason);
    }

    #[test]
    fn a_true_watch_becomes_the_blocker() {
        let (mut assignments, lits) = setup(3);
        let mut clause = Clause::new(lits.clone());

        assignments.new_decision(lits[0]);
        assignments.new_decision(!lits[1]);

        assert_eq!(
            ClausePropagation::Satisfied { blocker: lits[0] },
            clause.propagate(lits[1], &assignments)
        );
    }

    #[test]
    fn shared_clauses_keep_the_array_order() {
        let (mut assignments, lits) = setup(4);
        let shared = SharedLiterals::new(&lits, ConstraintType::Conflict);
        let mut clause = Clause::new_shared(shared.share(), [lits[0], lits[1]]);

        assignments.new_decision(!lits[1]);
        assignments.new_decision(!lits[2]);

        assert_eq!(
            ClausePropagation::Moved { new_watch: lits[3] },
            clause.propagate(lits[1], &assignments)
        );
        assert_eq!(&lits[..], shared.literals());

        assignments.new_decision(!lits[3]);
        assert_eq!(
            ClausePropagation::Unit(lits[0]),
            clause.propagate(lits[3], &assignments)
        );
    }

    #[test]
    fn contracted_literals_reappear_after_backtracking() {
        let (mut assignments, lits) = setup(6);
        let constraint = ConstraintId::from_index(0);
        // lits[5] on level 1, lits[4] on level 2, ... lits[2] on level 4
        for &literal in lits[2..].iter().rev() {
            assignments.new_decision(!literal);
        }
        assignments.new_decision(!lits[1]);

        let mut clause = Clause::new(lits.clone());
        clause.contract(3, constraint, &mut assignments);
        assert_eq!(3, clause.num_active());
        assert!(clause.is_contracted());

        // Backtrack to level 2: lits[3] (level 3) becomes unassigned, lits[4] stays false.
        let hooks = assignments.take_undo_hooks(2);
        assert_eq!(vec![constraint], hooks);
        let _ = assignments.synchronise(2).count();
        clause.undo_level(constraint, &mut assignments);
        assert_eq!(4, clause.num_active());

        let hooks = assignments.take_undo_hooks(0);
        assert_eq!(vec![constraint], hooks);
        let _ = assignments.synchronise(0).count();
        clause.undo_level(constraint, &mut assignments);
        assert_eq!(6, clause.num_active());
        assert!(!clause.is_contracted());
    }

    #[test]
    fn simplification_drops_root_false_literals() {
        let (mut assignments, lits) = setup(4);
        let _ = assignments.enqueue(!lits[3], Antecedent::None);

        let mut clause = Clause::new(lits.clone());
        assert!(!clause.simplify(&assignments));
        assert_eq!(&lits[..3], clause.literals());

        let _ = assignments.enqueue(lits[2], Antecedent::None);
        assert!(clause.simplify(&assignments));
    }
}
