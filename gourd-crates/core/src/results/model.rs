use std::fmt::Display;

use crate::basic_types::Literal;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::containers::StorageKey;
use crate::engine::Assignments;

/// A truth value for every variable of a solver, taken from a total assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    truth_values: KeyedVec<Variable, bool>,
}

impl Model {
    /// Variables which are unassigned are taken to be false.
    pub(crate) fn from_assignments(assignments: &Assignments) -> Model {
        let mut truth_values = KeyedVec::new();
        for index in 0..assignments.num_variables() {
            let variable = Variable::create_from_index(index);
            let _ = truth_values.push(assignments.is_true(Literal::positive(variable)));
        }
        Model { truth_values }
    }

    /// The number of variables, not counting the sentinel.
    pub fn num_variables(&self) -> usize {
        self.truth_values.len().saturating_sub(1)
    }

    pub fn value(&self, literal: Literal) -> bool {
        self.truth_values[literal.variable()] == literal.is_positive()
    }

    /// One literal per variable (except the sentinel) which is true in the model.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.truth_values
            .keys()
            .skip(1)
            .map(|variable| Literal::new(variable, self.truth_values[variable]))
    }

    /// The literals over `variables` which are true in the model.
    pub fn project<'a>(
        &'a self,
        variables: impl IntoIterator<Item = Variable> + 'a,
    ) -> impl Iterator<Item = Literal> + 'a {
        variables
            .into_iter()
            .map(|variable| Literal::new(variable, self.truth_values[variable]))
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for literal in self.literals() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{literal}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_variables_are_false() {
        let mut assignments = Assignments::default();
        let x = Literal::positive(assignments.grow());
        let y = Literal::positive(assignments.grow());
        let _ = assignments.enqueue(x, crate::engine::Antecedent::None);

        let model = Model::from_assignments(&assignments);

        assert_eq!(2, model.num_variables());
        assert!(model.value(x));
        assert!(model.value(!y));
        assert!(model.value(Literal::TRUE));
        assert_eq!(vec![x, !y], model.literals().collect::<Vec<_>>());
    }
}
