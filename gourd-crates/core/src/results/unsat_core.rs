use std::fmt::Display;

use crate::basic_types::Literal;

/// A subset of the assumptions of an unsatisfiable solve under which the problem is still
/// unsatisfiable.
///
/// The core is not necessarily minimal. An empty core means the problem is unsatisfiable
/// without any assumption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsatCore {
    literals: Box<[Literal]>,
}

impl UnsatCore {
    pub(crate) fn new(mut literals: Vec<Literal>) -> UnsatCore {
        literals.sort_unstable();
        literals.dedup();
        UnsatCore {
            literals: literals.into(),
        }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }
}

impl Display for UnsatCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{literal}")?;
        }
        write!(f, "]")
    }
}
