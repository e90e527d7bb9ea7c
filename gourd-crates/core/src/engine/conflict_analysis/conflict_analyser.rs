use super::LearnedClauseMinimiser;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::branching::Brancher;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::constraints::ConstraintStore;
use crate::engine::learning::LearnedConstraintManager;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;

/// The parts of the solver conflict analysis reads and updates.
#[derive(Debug)]
pub(crate) struct ConflictAnalysisContext<'a> {
    pub(crate) assignments: &'a Assignments,
    pub(crate) constraints: &'a mut ConstraintStore,
    pub(crate) brancher: &'a mut dyn Brancher,
    pub(crate) learned_constraints: &'a mut LearnedConstraintManager,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ConflictAnalysisResult {
    /// The learned clause. Its first literal is false only on the current level (the
    /// asserting literal), the second one has the highest level among the rest.
    pub(crate) learned_literals: Vec<Literal>,
    pub(crate) backjump_level: usize,
}

/// First-UIP conflict analysis with recursive minimisation of the learned clause.
#[derive(Clone, Debug, Default)]
pub(crate) struct ConflictAnalyser {
    seen: KeyedVec<Variable, bool>,
    minimiser: LearnedClauseMinimiser,
}

impl ConflictAnalyser {
    pub(crate) fn minimiser(&self) -> &LearnedClauseMinimiser {
        &self.minimiser
    }

    /// Resolves the `conflict` (a set of true literals) with the reasons on the trail until a
    /// single literal of the current decision level remains.
    ///
    /// At least one literal of the conflict has to lie on the current level, which is above
    /// the root.
    pub(crate) fn analyse(
        &mut self,
        conflict: Vec<Literal>,
        context: &mut ConflictAnalysisContext<'_>,
    ) -> ConflictAnalysisResult {
        let assignments = context.assignments;
        let current_level = assignments.decision_level();
        gourd_assert_simple!(current_level > 0);
        gourd_assert_moderate!(conflict
            .iter()
            .any(|literal| assignments.level(literal.variable()) == current_level));
        self.seen.accommodate(
            Variable::create_from_index(assignments.num_variables().saturating_sub(1)),
            false,
        );

        // Position 0 is reserved for the asserting literal.
        let mut learned_literals = vec![Literal::FALSE];
        let mut num_on_current_level = 0;
        let mut to_clear = vec![];
        let mut reason = conflict;
        let mut trail_position = assignments.trail().len();

        let asserting = loop {
            for &literal in reason.iter() {
                let variable = literal.variable();
                if self.seen[variable] || assignments.level(variable) == 0 {
                    continue;
                }
                self.seen[variable] = true;
                to_clear.push(variable);
                context.brancher.on_appearance_in_conflict_literal(literal);

                if assignments.level(variable) == current_level {
                    num_on_current_level += 1;
                } else {
                    learned_literals.push(!literal);
                }
            }

            let next = loop {
                trail_position -= 1;
                let literal = assignments.trail()[trail_position];
                if self.seen[literal.variable()] {
                    break literal;
                }
            };
            num_on_current_level -= 1;
            if num_on_current_level == 0 {
                break next;
            }

            let antecedent = assignments.antecedent(next.variable());
            reason.clear();
            antecedent.reason(next, context.constraints, assignments, &mut reason);
            if let Antecedent::Constraint(constraint) = antecedent {
                context.learned_constraints.on_conflict_participation(
                    constraint,
                    context.constraints,
                    assignments,
                );
            }
        };
        learned_literals[0] = !asserting;

        for variable in to_clear {
            self.seen[variable] = false;
        }

        self.minimiser
            .remove_dominated_literals(&mut learned_literals, context);
        move_highest_level_to_second(&mut learned_literals, assignments);

        let backjump_level = learned_literals
            .get(1)
            .map_or(0, |literal| assignments.level(literal.variable()));
        ConflictAnalysisResult {
            learned_literals,
            backjump_level,
        }
    }

    /// Computes the assumptions which together force `failed` false, where `failed` is an
    /// assumption. Every decision on the trail has to be an assumption.
    ///
    /// The returned literals are the blamed assumptions, `failed` being the first.
    pub(crate) fn analyse_final(
        &mut self,
        failed: Literal,
        constraints: &ConstraintStore,
        assignments: &Assignments,
    ) -> Vec<Literal> {
        gourd_assert_simple!(assignments.is_false(failed));
        let mut core = vec![failed];
        if assignments.level(failed.variable()) == 0 {
            return core;
        }
        self.seen.accommodate(
            Variable::create_from_index(assignments.num_variables().saturating_sub(1)),
            false,
        );

        self.seen[failed.variable()] = true;
        let mut reason = vec![];
        let first_decision = assignments.level_start(1);
        for &literal in assignments.trail()[first_decision..].iter().rev() {
            let variable = literal.variable();
            if !self.seen[variable] {
                continue;
            }
            self.seen[variable] = false;

            let antecedent = assignments.antecedent(variable);
            if antecedent.is_none() {
                core.push(literal);
                continue;
            }
            reason.clear();
            antecedent.reason(literal, constraints, assignments, &mut reason);
            for &reason_literal in reason.iter() {
                if assignments.level(reason_literal.variable()) > 0 {
                    self.seen[reason_literal.variable()] = true;
                }
            }
        }
        core
    }
}

fn move_highest_level_to_second(literals: &mut [Literal], assignments: &Assignments) {
    if literals.len() < 3 {
        return;
    }
    let level = |literal: &Literal| assignments.level(literal.variable());
    let highest = (1..literals.len())
        .max_by_key(|&index| level(&literals[index]))
        .unwrap_or(1);
    literals.swap(1, highest);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Solver;

    fn analyse(solver: &mut Solver, conflict: Vec<Literal>) -> ConflictAnalysisResult {
        let mut analyser = ConflictAnalyser::default();
        let mut context = ConflictAnalysisContext {
            assignments: &solver.assignments,
            constraints: &mut solver.constraints,
            brancher: solver.brancher.as_mut(),
            learned_constraints: &mut solver.learned_constraints,
        };
        analyser.analyse(conflict, &mut context)
    }

    #[test]
    fn the_first_unique_implication_point_is_asserted() {
        let mut solver = Solver::default();
        let [a, b, c, d, e] = std::array::from_fn(|_| solver.new_literal());
        // a -> c, b ∧ c -> d, b ∧ c -> e, and d ∧ e is the conflict.
        solver.add_clause([!a, c]).expect("feasible");
        solver.add_clause([!b, !c, d]).expect("feasible");
        solver.add_clause([!b, !c, e]).expect("feasible");

        solver.assignments.new_decision(b);
        assert!(solver.propagate().is_ok());
        solver.assignments.new_decision(a);
        assert!(solver.propagate().is_ok());
        assert!(solver.assignments.is_true(d) && solver.assignments.is_true(e));

        let result = analyse(&mut solver, vec![d, e]);

        assert_eq!(vec![!c, !b], result.learned_literals);
        assert_eq!(1, result.backjump_level);
    }

    #[test]
    fn implied_literals_are_minimised_away() {
        let mut solver = Solver::default();
        let [a, b, x, y] = std::array::from_fn(|_| solver.new_literal());
        // a -> b on level 1, then x -> y on level 2 with y ∧ a ∧ b conflicting.
        solver.add_clause([!a, b]).expect("feasible");
        solver.add_clause([!x, y]).expect("feasible");

        solver.assignments.new_decision(a);
        assert!(solver.propagate().is_ok());
        solver.assignments.new_decision(x);
        assert!(solver.propagate().is_ok());

        let result = analyse(&mut solver, vec![y, a, b]);

        assert_eq!(vec![!y, !a], result.learned_literals);
        assert_eq!(1, result.backjump_level);
    }

    #[test]
    fn final_analysis_blames_the_responsible_assumptions() {
        let mut solver = Solver::default();
        let [a, b, c, d] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!a, !b, !d]).expect("feasible");

        solver.assignments.new_decision(a);
        solver.assignments.new_decision(c);
        solver.assignments.new_decision(b);
        assert!(solver.propagate().is_ok());
        assert!(solver.assignments.is_false(d));

        let mut analyser = ConflictAnalyser::default();
        let mut core = analyser.analyse_final(d, &solver.constraints, &solver.assignments);
        core.sort();

        let mut expected = vec![d, a, b];
        expected.sort();
        assert_eq!(expected, core);
    }
}
