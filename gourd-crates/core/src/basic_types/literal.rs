use std::fmt::Debug;
use std::fmt::Display;
use std::ops::Not;

use crate::containers::StorageKey;
use crate::gourd_assert_moderate;

/// A boolean variable, identified by its index in the solver.
///
/// The variable with index 0 is the [`Variable::SENTINEL`]; every solver assigns it to true at
/// the root, which gives [`Literal::TRUE`] and [`Literal::FALSE`] a fixed meaning.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    index: u32,
}

impl Variable {
    pub const SENTINEL: Variable = Variable { index: 0 };

    pub const fn new(index: u32) -> Variable {
        Variable { index }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_sentinel(&self) -> bool {
        self.index == 0
    }
}

impl StorageKey for Variable {
    fn index(&self) -> usize {
        self.index as usize
    }

    fn create_from_index(index: usize) -> Self {
        Variable::new(index as u32)
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.index)
    }
}

impl Debug for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}

/// A [`Variable`] together with a sign.
///
/// The literal is stored as `2 * variable + negated`, so the positive and negative literal of a
/// variable are adjacent and a literal can be used to index per-literal tables directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    code: u32,
}

impl Literal {
    /// The literal which is true in every solver.
    pub const TRUE: Literal = Literal { code: 0 };
    /// The literal which is false in every solver.
    pub const FALSE: Literal = Literal { code: 1 };

    pub fn new(variable: Variable, is_positive: bool) -> Literal {
        Literal {
            code: variable.index * 2 + (!is_positive) as u32,
        }
    }

    pub fn positive(variable: Variable) -> Literal {
        Literal::new(variable, true)
    }

    pub fn negative(variable: Variable) -> Literal {
        Literal::new(variable, false)
    }

    pub fn variable(&self) -> Variable {
        Variable::new(self.code >> 1)
    }

    pub fn is_positive(&self) -> bool {
        self.code & 1 == 0
    }

    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }

    /// The integer encoding of this literal; see [`Literal::from_code`].
    pub fn to_code(&self) -> u32 {
        self.code
    }

    pub fn from_code(code: u32) -> Literal {
        gourd_assert_moderate!(code < u32::MAX);
        Literal { code }
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        Literal {
            code: self.code ^ 1,
        }
    }
}

impl StorageKey for Literal {
    fn index(&self) -> usize {
        self.code as usize
    }

    fn create_from_index(index: usize) -> Self {
        Literal::from_code(index as u32)
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_positive() {
            write!(f, "{}", self.variable())
        } else {
            write!(f, "~{}", self.variable())
        }
    }
}

impl Debug for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self}")
    }
}
