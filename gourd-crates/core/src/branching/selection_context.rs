use crate::basic_types::Literal;
use crate::basic_types::Random;
use crate::basic_types::Variable;
use crate::engine::Assignments;

/// The view of the solver a [`Brancher`](super::Brancher) gets when it has to make a decision.
#[derive(Debug)]
pub struct SelectionContext<'a> {
    assignments: &'a Assignments,
    random: &'a mut dyn Random,
}

impl<'a> SelectionContext<'a> {
    pub fn new(assignments: &'a Assignments, random: &'a mut dyn Random) -> Self {
        SelectionContext {
            assignments,
            random,
        }
    }

    pub fn random(&mut self) -> &mut dyn Random {
        self.random
    }

    pub fn assignments(&self) -> &Assignments {
        self.assignments
    }

    pub fn num_variables(&self) -> usize {
        self.assignments.num_variables()
    }

    pub fn is_variable_assigned(&self, variable: Variable) -> bool {
        self.assignments.is_assigned(Literal::positive(variable))
    }

    pub fn is_literal_true(&self, literal: Literal) -> bool {
        self.assignments.is_true(literal)
    }
}
