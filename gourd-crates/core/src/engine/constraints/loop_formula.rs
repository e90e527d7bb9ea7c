use super::constraint_store::PropagationContext;
use super::ClauseCreateFlags;
use super::ClauseCreator;
use super::ConstraintId;
use super::ConstraintInfo;
use super::ConstraintKind;
use super::ConstraintType;
use super::WatchStatus;
use crate::basic_types::Conflict;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::engine::Solver;
use crate::engine::WatchLists;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;

/// Watch data of an atom; bodies use their watch slot (0 or 1).
const ATOM: u32 = 2;

/// The loop formula `aᵢ → (b₁ ∨ … ∨ bₖ)` for every atom `aᵢ` of an unfounded set, where the
/// bodies are its external supports.
///
/// All atoms share one pair of watched bodies. Once at most one body is not false, a true atom
/// forces it; once every body is false, every atom is falsified.
#[derive(Debug)]
pub(crate) struct LoopFormula {
    atoms: Box<[Literal]>,
    bodies: Box<[Literal]>,
    /// The positions in `bodies` of the watched bodies.
    watched: [usize; 2],
}

impl LoopFormula {
    fn new(atoms: Vec<Literal>, mut bodies: Vec<Literal>, assignments: &Assignments) -> Self {
        gourd_assert_simple!(bodies.len() >= 2);
        // Prefer bodies which are not false, then the false ones assigned last.
        bodies.sort_by_cached_key(|&body| match assignments.value(body) {
            Some(true) | None => (0, 0),
            Some(false) => (1, -(assignments.level(body.variable()) as isize)),
        });
        LoopFormula {
            atoms: atoms.into_boxed_slice(),
            bodies: bodies.into_boxed_slice(),
            watched: [0, 1],
        }
    }

    /// Adds the loop formula to the solver as a learnt constraint. Formulas with fewer than two
    /// bodies are added as clauses.
    pub(crate) fn create(
        solver: &mut Solver,
        atoms: Vec<Literal>,
        bodies: Vec<Literal>,
    ) -> PropagationStatus {
        if bodies.len() < 2 {
            for &atom in atoms.iter() {
                let result = ClauseCreator::create(
                    solver,
                    std::iter::once(!atom).chain(bodies.iter().copied()),
                    ClauseCreateFlags::empty(),
                    ConstraintType::Loop,
                );
                if !result.ok {
                    return Err(solver.take_pending_conflict());
                }
            }
            return Ok(());
        }

        let loop_formula = LoopFormula::new(atoms, bodies, &solver.assignments);
        let id = solver.store_constraint(
            ConstraintInfo::of_type(ConstraintType::Loop),
            ConstraintKind::Loop(loop_formula),
        );
        solver.initialise_constraint(id)
    }

    /// Propagates whatever follows from the assignment the formula was created under.
    pub(crate) fn initialise(
        &mut self,
        constraint: ConstraintId,
        context: &mut PropagationContext<'_>,
    ) -> Result<(), Conflict> {
        let non_false = self.non_false_bodies(context.assignments);
        match non_false.as_slice() {
            [] => self.falsify_atoms(constraint, context),
            [body] => {
                let true_atom = self
                    .atoms
                    .iter()
                    .copied()
                    .find(|&atom| context.assignments.is_true(atom));
                match true_atom {
                    Some(atom) => self.force_body(constraint, *body, atom, context),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    /// Up to two bodies which are not false.
    fn non_false_bodies(&self, assignments: &Assignments) -> Vec<Literal> {
        self.bodies
            .iter()
            .copied()
            .filter(|&body| !assignments.is_false(body))
            .take(2)
            .collect()
    }

    pub(crate) fn propagate(
        &mut self,
        constraint: ConstraintId,
        trigger: Literal,
        data: u32,
        context: &mut PropagationContext<'_>,
    ) -> Result<WatchStatus, Conflict> {
        if data == ATOM {
            let non_false = self.non_false_bodies(context.assignments);
            match non_false.as_slice() {
                [] => {
                    let mut nogood = vec![trigger];
                    nogood.extend(self.bodies.iter().map(|&body| !body));
                    return Err(Conflict::Nogood(nogood));
                }
                [body] => self.force_body(constraint, *body, trigger, context)?,
                _ => {}
            }
            return Ok(WatchStatus::Keep);
        }

        let slot = data as usize;
        gourd_assert_moderate!(trigger == !self.bodies[self.watched[slot]]);
        let other = self.watched[1 - slot];
        let replacement = (0..self.bodies.len()).find(|&position| {
            position != self.watched[0]
                && position != self.watched[1]
                && !context.assignments.is_false(self.bodies[position])
        });
        if let Some(position) = replacement {
            self.watched[slot] = position;
            context
                .watch_lists
                .watch_generic(!self.bodies[position], constraint, data);
            return Ok(WatchStatus::Remove);
        }

        let other_body = self.bodies[other];
        if context.assignments.is_false(other_body) {
            self.falsify_atoms(constraint, context)?;
        } else if context.assignments.is_unassigned(other_body) {
            if let Some(atom) = self
                .atoms
                .iter()
                .copied()
                .find(|&atom| context.assignments.is_true(atom))
            {
                self.force_body(constraint, other_body, atom, context)?;
            }
        }
        Ok(WatchStatus::Keep)
    }

    /// Forces the only body which is not false because `atom` is true.
    fn force_body(
        &self,
        constraint: ConstraintId,
        body: Literal,
        atom: Literal,
        context: &mut PropagationContext<'_>,
    ) -> Result<(), Conflict> {
        if context
            .assignments
            .enqueue(body, Antecedent::Constraint(constraint))
        {
            return Ok(());
        }
        let mut nogood = vec![atom];
        nogood.extend(self.bodies.iter().map(|&other| !other));
        Err(Conflict::Nogood(nogood))
    }

    /// Falsifies every atom once all bodies are false.
    fn falsify_atoms(
        &self,
        constraint: ConstraintId,
        context: &mut PropagationContext<'_>,
    ) -> Result<(), Conflict> {
        for &atom in self.atoms.iter() {
            if !context
                .assignments
                .enqueue(!atom, Antecedent::Constraint(constraint))
            {
                let mut nogood = vec![atom];
                nogood.extend(self.bodies.iter().map(|&body| !body));
                return Err(Conflict::Nogood(nogood));
            }
        }
        Ok(())
    }

    pub(crate) fn reason(&self, literal: Literal, assignments: &Assignments, out: &mut Vec<Literal>) {
        if self.atoms.contains(&!literal) {
            out.extend(self.bodies.iter().map(|&body| !body));
            return;
        }

        gourd_assert_moderate!(self.bodies.contains(&literal));
        let position = assignments.trail_position(literal.variable());
        let Some(atom) = self.atoms.iter().copied().find(|&atom| {
            assignments.is_true(atom) && assignments.trail_position(atom.variable()) < position
        }) else {
            panic!("{literal} was forced by a loop formula without a true atom")
        };
        out.push(atom);
        out.extend(
            self.bodies
                .iter()
                .filter(|&&body| body != literal)
                .map(|&body| !body),
        );
    }

    pub(crate) fn is_locked(&self, constraint: ConstraintId, assignments: &Assignments) -> bool {
        let implied_by_this = |literal: Literal| {
            assignments.is_true(literal)
                && assignments.antecedent(literal.variable()) == Antecedent::Constraint(constraint)
        };
        self.atoms.iter().any(|&atom| implied_by_this(!atom))
            || self.bodies.iter().any(|&body| implied_by_this(body))
    }

    /// Whether the formula holds at the root.
    pub(crate) fn simplify(&mut self, assignments: &Assignments) -> bool {
        self.atoms
            .iter()
            .all(|&atom| assignments.is_root_false(atom))
            || self
                .bodies
                .iter()
                .any(|&body| assignments.is_root_true(body))
    }

    pub(crate) fn attach(&self, constraint: ConstraintId, watch_lists: &mut WatchLists) {
        for (slot, &position) in self.watched.iter().enumerate() {
            watch_lists.watch_generic(!self.bodies[position], constraint, slot as u32);
        }
        for &atom in self.atoms.iter() {
            watch_lists.watch_generic(atom, constraint, ATOM);
        }
    }

    pub(crate) fn detach(&self, constraint: ConstraintId, watch_lists: &mut WatchLists) {
        for &position in self.watched.iter() {
            watch_lists.unwatch_generic(!self.bodies[position], constraint);
        }
        for &atom in self.atoms.iter() {
            watch_lists.unwatch_generic(atom, constraint);
        }
    }

    pub(crate) fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.atoms.iter().chain(self.bodies.iter()).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decide(solver: &mut Solver, literal: Literal) -> PropagationStatus {
        solver.assignments.new_decision(literal);
        solver.propagate()
    }

    #[test]
    fn the_last_body_is_forced_by_a_true_atom() {
        let mut solver = Solver::default();
        let [a, b, x, y, z] = std::array::from_fn(|_| solver.new_literal());
        solver
            .add_loop_formula(vec![a, b], vec![x, y, z])
            .expect("feasible");

        assert!(decide(&mut solver, !x).is_ok());
        assert!(decide(&mut solver, b).is_ok());
        assert!(solver.assignments.is_unassigned(y));

        assert!(decide(&mut solver, !z).is_ok());
        assert!(solver.assignments.is_true(y));
        assert_eq!(vec![b, !x, !z], solver.reason(y));
    }

    #[test]
    fn all_false_bodies_falsify_every_atom() {
        let mut solver = Solver::default();
        let [a, b, x, y] = std::array::from_fn(|_| solver.new_literal());
        solver
            .add_loop_formula(vec![a, b], vec![x, y])
            .expect("feasible");

        assert!(decide(&mut solver, !y).is_ok());
        assert!(decide(&mut solver, !x).is_ok());
        assert!(solver.assignments.is_false(a));
        assert!(solver.assignments.is_false(b));
        assert_eq!(vec![!x, !y], solver.reason(!a));
    }

    #[test]
    fn a_true_atom_without_support_is_a_conflict() {
        let mut solver = Solver::default();
        let [a, x, y] = std::array::from_fn(|_| solver.new_literal());
        solver.assignments.new_decision(!x);
        solver.assignments.new_decision(!y);
        solver.assignments.new_decision(a);
        solver.assignments.skip_propagation();

        let mut nogood = LoopFormula::create(&mut solver, vec![a], vec![x, y])
            .expect_err("the formula is violated");
        if let Conflict::Nogood(literals) = &mut nogood {
            literals.sort();
        }
        let mut expected = vec![a, !x, !y];
        expected.sort();
        assert_eq!(Conflict::Nogood(expected), nogood);
    }

    #[test]
    fn a_single_body_becomes_a_clause() {
        let mut solver = Solver::default();
        let [a, x] = std::array::from_fn(|_| solver.new_literal());
        solver
            .add_loop_formula(vec![a], vec![x])
            .expect("feasible");

        assert_eq!(0, solver.constraints.len());
        assert!(decide(&mut solver, a).is_ok());
        assert!(solver.assignments.is_true(x));
    }
}
