use std::fmt::Display;

use super::Literal;

/// A literal paired with the weight it contributes to a weight constraint when it is true.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WeightedLiteral {
    pub literal: Literal,
    pub weight: i64,
}

impl WeightedLiteral {
    pub fn new(literal: Literal, weight: i64) -> WeightedLiteral {
        WeightedLiteral { literal, weight }
    }
}

impl From<Literal> for WeightedLiteral {
    fn from(literal: Literal) -> Self {
        WeightedLiteral { literal, weight: 1 }
    }
}

impl Display for WeightedLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.literal, self.weight)
    }
}
