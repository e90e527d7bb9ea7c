use log::warn;

use super::Brancher;
use super::SelectionContext;
use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyValueHeap;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::Assignments;

/// The parameters of a [`VsidsBrancher`].
#[derive(Debug, Clone, Copy)]
pub struct VsidsOptions {
    /// How much the activity of a variable grows when it appears in a conflict, initially.
    pub increment: f64,
    /// Once an activity would reach this value, every activity is divided by it.
    pub max_threshold: f64,
    /// After every conflict the increment is multiplied by `1 / decay_factor`.
    pub decay_factor: f64,
    /// The probability with which a decision is made on a random unassigned variable.
    pub random_frequency: f64,
}

impl Default for VsidsOptions {
    fn default() -> Self {
        Self {
            increment: 1.0,
            max_threshold: 1e100,
            decay_factor: 0.95,
            random_frequency: 0.0,
        }
    }
}

/// Branches on the variable which appeared in the most recent conflicts
/// ([VSIDS](https://dl.acm.org/doi/pdf/10.1145/378239.379017)) and assigns it the value it had
/// when it was last unassigned (phase saving). Variables which were never assigned are tried
/// false first.
#[derive(Debug, Clone)]
pub struct VsidsBrancher {
    options: VsidsOptions,
    heap: KeyValueHeap<Variable, f64>,
    increment: f64,
    phases: KeyedVec<Variable, bool>,
}

impl Default for VsidsBrancher {
    fn default() -> Self {
        VsidsBrancher::new(VsidsOptions::default())
    }
}

impl VsidsBrancher {
    pub fn new(options: VsidsOptions) -> VsidsBrancher {
        VsidsBrancher {
            options,
            heap: KeyValueHeap::default(),
            increment: options.increment,
            phases: KeyedVec::default(),
        }
    }

    pub fn activity(&self, variable: Variable) -> f64 {
        if (variable.index() as usize) < self.phases.len() {
            self.heap.get_value(variable)
        } else {
            0.0
        }
    }

    pub fn saved_phase(&self, variable: Variable) -> Option<bool> {
        self.phases.get(variable).copied()
    }

    fn accommodate(&mut self, variable: Variable) {
        while self.phases.len() <= variable.index() as usize {
            let new_variable = self.phases.push(false);
            self.heap.grow(new_variable, 0.0);
        }
    }

    fn bump_activity(&mut self, variable: Variable, amount: f64) {
        self.accommodate(variable);
        let activity = self.heap.get_value(variable);
        if activity + amount >= self.options.max_threshold {
            self.heap.divide_values(self.options.max_threshold);
            self.increment /= self.options.max_threshold;
            self.heap
                .increment(variable, amount / self.options.max_threshold);
        } else {
            self.heap.increment(variable, amount);
        }
    }

    fn random_decision(&mut self, context: &mut SelectionContext<'_>) -> Option<Variable> {
        if self.options.random_frequency <= 0.0 || context.num_variables() <= 1 {
            return None;
        }
        if !context.random().generate_bool(self.options.random_frequency) {
            return None;
        }
        let num_variables = context.num_variables();
        let index = context.random().generate_usize_in_range(1..num_variables);
        let variable = Variable::create_from_index(index);
        (!context.is_variable_assigned(variable)).then_some(variable)
    }

    fn phase_literal(&self, variable: Variable) -> Literal {
        Literal::new(variable, self.phases.get(variable).copied().unwrap_or(false))
    }
}

impl Brancher for VsidsBrancher {
    fn next_decision(&mut self, context: &mut SelectionContext<'_>) -> Option<Literal> {
        if let Some(variable) = self.random_decision(context) {
            self.accommodate(variable);
            return Some(self.phase_literal(variable));
        }

        // Assigned variables are only removed from the heap once they reach the top.
        while let Some((candidate, _)) = self.heap.peek_max() {
            if context.is_variable_assigned(candidate) {
                let _ = self.heap.pop_max();
            } else {
                return Some(self.phase_literal(candidate));
            }
        }

        if (self.phases.len()..context.num_variables())
            .any(|index| !context.is_variable_assigned(Variable::create_from_index(index)))
        {
            warn!("The brancher was not told about every variable of the solver");
            let variable = (self.phases.len()..context.num_variables())
                .map(Variable::create_from_index)
                .find(|&variable| !context.is_variable_assigned(variable))?;
            self.accommodate(variable);
            return Some(self.phase_literal(variable));
        }
        None
    }

    fn on_new_variable(&mut self, variable: Variable) {
        self.accommodate(variable);
    }

    fn on_conflict(&mut self) {
        self.increment *= 1.0 / self.options.decay_factor;
    }

    fn on_appearance_in_conflict_literal(&mut self, literal: Literal) {
        self.bump_activity(literal.variable(), self.increment);
    }

    fn on_unassign_literal(&mut self, literal: Literal) {
        let variable = literal.variable();
        self.accommodate(variable);
        self.phases[variable] = literal.is_positive();
        self.heap.restore_key(variable);
    }

    fn on_solution(&mut self, assignments: &Assignments) {
        let num_variables = self.phases.len().min(assignments.num_variables());
        for index in 0..num_variables {
            let variable = Variable::create_from_index(index);
            if let Some(value) = assignments.value(Literal::positive(variable)) {
                self.phases[variable] = value;
            }
        }
    }

    fn bump(&mut self, literal: Literal, amount: f64) {
        self.bump_activity(literal.variable(), amount * self.increment);
        self.phases[literal.variable()] = literal.is_positive();
    }

    fn clone_for(&self) -> Box<dyn Brancher> {
        let mut brancher = VsidsBrancher::new(self.options);
        for variable in self.phases.keys() {
            brancher.accommodate(variable);
            brancher.heap.increment(variable, self.heap.get_value(variable));
        }
        Box::new(brancher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::TestRandom;

    fn assignments_with(num_variables: usize) -> (Assignments, Vec<Variable>) {
        let mut assignments = Assignments::default();
        let variables = (0..num_variables).map(|_| assignments.grow()).collect();
        (assignments, variables)
    }

    fn decide(brancher: &mut VsidsBrancher, assignments: &Assignments) -> Option<Literal> {
        let mut random = TestRandom {
            usizes: vec![],
            bools: vec![],
        };
        brancher.next_decision(&mut SelectionContext::new(assignments, &mut random))
    }

    #[test]
    fn the_most_active_unassigned_variable_is_chosen_false_first() {
        let (mut assignments, variables) = assignments_with(3);
        let mut brancher = VsidsBrancher::default();
        variables
            .iter()
            .for_each(|&variable| brancher.on_new_variable(variable));

        brancher.on_appearance_in_conflict_literal(Literal::positive(variables[1]));
        brancher.on_conflict();
        brancher.on_appearance_in_conflict_literal(Literal::positive(variables[2]));

        assert_eq!(Some(Literal::negative(variables[2])), decide(&mut brancher, &assignments));

        assignments.new_decision(Literal::negative(variables[2]));
        assert_eq!(Some(Literal::negative(variables[1])), decide(&mut brancher, &assignments));
    }

    #[test]
    fn unassigned_variables_return_with_their_saved_phase() {
        let (mut assignments, variables) = assignments_with(1);
        let mut brancher = VsidsBrancher::default();
        brancher.on_new_variable(variables[0]);

        let literal = Literal::positive(variables[0]);
        assignments.new_decision(literal);
        assert_eq!(None, decide(&mut brancher, &assignments));

        for unassigned in assignments.synchronise(0).collect::<Vec<_>>() {
            brancher.on_unassign_literal(unassigned);
        }
        assert_eq!(Some(literal), decide(&mut brancher, &assignments));
    }

    #[test]
    fn activities_are_rescaled_before_they_overflow() {
        let mut brancher = VsidsBrancher::new(VsidsOptions {
            max_threshold: 100.0,
            ..Default::default()
        });
        let (_, variables) = assignments_with(2);
        brancher.on_new_variable(variables[1]);

        brancher.bump(Literal::positive(variables[0]), 60.0);
        brancher.bump(Literal::positive(variables[1]), 30.0);
        brancher.bump(Literal::positive(variables[0]), 60.0);

        assert!(brancher.activity(variables[0]) < 100.0);
        assert!(brancher.activity(variables[0]) > brancher.activity(variables[1]));
    }

    #[test]
    fn random_decisions_pick_an_unassigned_variable() {
        let (assignments, variables) = assignments_with(3);
        let mut brancher = VsidsBrancher::new(VsidsOptions {
            random_frequency: 0.5,
            ..Default::default()
        });
        let mut random = TestRandom {
            usizes: vec![2],
            bools: vec![true],
        };

        let decision =
            brancher.next_decision(&mut SelectionContext::new(&assignments, &mut random));

        assert_eq!(Some(Literal::negative(variables[1])), decision);
    }
}
