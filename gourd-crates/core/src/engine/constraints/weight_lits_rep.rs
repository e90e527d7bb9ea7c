use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::basic_types::WeightedLiteral;
use crate::engine::Assignments;

/// The normal form of `Σ wᵢ·lᵢ ≥ bound`.
///
/// Every weight is positive and at most the bound, every variable occurs at most once, and the
/// literals are ordered by non-increasing weight. Normalising preserves the set of models and
/// normalising a normal form again changes nothing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeightLitsRep {
    literals: Vec<WeightedLiteral>,
    bound: i64,
    reach: i64,
}

impl WeightLitsRep {
    /// Fails with [`ConstraintOperationError::WeightOverflow`] if a weight, the bound or the sum
    /// of the weights leaves the range of `i64` on the way.
    pub fn create(
        literals: impl IntoIterator<Item = WeightedLiteral>,
        bound: i64,
    ) -> Result<Self, ConstraintOperationError> {
        let overflow = || ConstraintOperationError::WeightOverflow;

        let mut bound = bound;
        let mut positive = Vec::new();
        for literal in literals.into_iter().filter(|literal| literal.weight != 0) {
            if literal.weight < 0 {
                // w·l = w - w·¬l
                bound = bound.checked_sub(literal.weight).ok_or_else(overflow)?;
                let weight = literal.weight.checked_neg().ok_or_else(overflow)?;
                positive.push(WeightedLiteral::new(!literal.literal, weight));
            } else {
                positive.push(literal);
            }
        }

        // Complementary literals end up next to each other.
        positive.sort_by_key(|literal| literal.literal.to_code());
        let mut merged: Vec<WeightedLiteral> = Vec::with_capacity(positive.len());
        for literal in positive {
            match merged.last_mut() {
                Some(last) if last.literal == literal.literal => {
                    last.weight = last
                        .weight
                        .checked_add(literal.weight)
                        .ok_or_else(overflow)?;
                }
                Some(last) if last.literal == !literal.literal => {
                    // w₁·l + w₂·¬l = min(w₁, w₂) + |w₁ - w₂|·(heavier literal)
                    let common = last.weight.min(literal.weight);
                    bound = bound.checked_sub(common).ok_or_else(overflow)?;
                    if last.weight < literal.weight {
                        last.literal = literal.literal;
                    }
                    last.weight = (last.weight - literal.weight).abs();
                    if last.weight == 0 {
                        let _ = merged.pop();
                    }
                }
                _ => merged.push(literal),
            }
        }

        let mut rep = WeightLitsRep {
            literals: merged,
            bound,
            reach: 0,
        };
        rep.normalise();
        // Clamping only lowers weights, so a reach which fits stays in range afterwards.
        let exact_reach = rep
            .literals
            .iter()
            .try_fold(0_i64, |sum, literal| sum.checked_add(literal.weight));
        if exact_reach.is_none() {
            return Err(overflow());
        }
        Ok(rep)
    }

    /// Clamps the weights to the bound, restores the order and recomputes the reach.
    fn normalise(&mut self) {
        if self.bound > 0 {
            for literal in self.literals.iter_mut() {
                literal.weight = literal.weight.min(self.bound);
            }
        }
        self.literals
            .sort_by(|first, second| second.weight.cmp(&first.weight));
        self.reach = self
            .literals
            .iter()
            .fold(0_i64, |sum, literal| sum.saturating_add(literal.weight));
    }

    /// Removes the literals which are assigned at the root, folding the true ones into the bound.
    pub fn propagate_root(&mut self, assignments: &Assignments) {
        let mut bound = self.bound;
        self.literals.retain(|literal| {
            if assignments.is_root_true(literal.literal) {
                bound = bound.saturating_sub(literal.weight);
                false
            } else {
                !assignments.is_root_false(literal.literal)
            }
        });
        self.bound = bound;
        self.normalise();
    }

    pub fn literals(&self) -> &[WeightedLiteral] {
        &self.literals
    }

    pub fn bound(&self) -> i64 {
        self.bound
    }

    /// The largest achievable sum.
    pub fn reach(&self) -> i64 {
        self.reach
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Whether every assignment satisfies the constraint.
    pub fn is_sat(&self) -> bool {
        self.bound <= 0
    }

    /// Whether no assignment satisfies the constraint.
    pub fn is_unsat(&self) -> bool {
        self.reach < self.bound
    }

    /// Whether some literal weighs more than one, i.e. the constraint is not a cardinality
    /// constraint.
    pub fn has_weights(&self) -> bool {
        self.literals
            .first()
            .is_some_and(|literal| literal.weight > 1)
    }

    pub(crate) fn into_parts(self) -> (Vec<WeightedLiteral>, i64) {
        (self.literals, self.bound)
    }

    /// Whether `literal` occurs, in either polarity.
    pub fn contains_variable(&self, literal: Literal) -> bool {
        self.literals
            .iter()
            .any(|weighted| weighted.literal.variable() == literal.variable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Variable;
    use crate::engine::Antecedent;

    fn lit(index: u32) -> Literal {
        Literal::positive(Variable::new(index))
    }

    fn weighted(literal: Literal, weight: i64) -> WeightedLiteral {
        WeightedLiteral::new(literal, weight)
    }

    fn normal_form(
        literals: impl IntoIterator<Item = WeightedLiteral>,
        bound: i64,
    ) -> WeightLitsRep {
        WeightLitsRep::create(literals, bound).expect("weights in range")
    }

    #[test]
    fn negative_weights_are_flipped_into_the_bound() {
        let rep = normal_form([weighted(lit(1), 2), weighted(lit(2), -3)], 1);

        assert_eq!(4, rep.bound());
        assert_eq!(
            &[weighted(!lit(2), 3), weighted(lit(1), 2)],
            rep.literals()
        );
    }

    #[test]
    fn duplicates_are_merged_and_complements_resolved() {
        let rep = normal_form(
            [
                weighted(lit(1), 2),
                weighted(lit(1), 1),
                weighted(lit(2), 4),
                weighted(!lit(2), 1),
                weighted(lit(3), 2),
                weighted(!lit(3), 2),
            ],
            6,
        );

        // x1 weighs 3; 4·x2 + ¬x2 = 1 + 3·x2; 2·x3 + 2·¬x3 = 2.
        assert_eq!(3, rep.bound());
        assert_eq!(&[weighted(lit(1), 3), weighted(lit(2), 3)], rep.literals());
        assert_eq!(6, rep.reach());
    }

    #[test]
    fn weights_are_clamped_to_the_bound() {
        let rep = normal_form(
            [weighted(lit(1), 10), weighted(lit(2), 1), weighted(lit(3), 2)],
            3,
        );

        assert_eq!(
            &[weighted(lit(1), 3), weighted(lit(3), 2), weighted(lit(2), 1)],
            rep.literals()
        );
        assert!(rep.has_weights());
        assert!(!rep.is_sat());
        assert!(!rep.is_unsat());
    }

    #[test]
    fn normalising_twice_changes_nothing() {
        let rep = normal_form(
            [
                weighted(lit(4), 2),
                weighted(!lit(1), -5),
                weighted(lit(2), 2),
                weighted(!lit(2), 3),
                weighted(lit(3), 0),
                weighted(lit(5), 1),
            ],
            4,
        );
        let again = normal_form(rep.literals().iter().copied(), rep.bound());

        assert_eq!(rep, again);
    }

    #[test]
    fn root_assignments_are_folded_into_the_bound() {
        let mut assignments = Assignments::default();
        let literals = (0..3)
            .map(|_| Literal::positive(assignments.grow()))
            .collect::<Vec<_>>();
        let _ = assignments.enqueue(literals[0], Antecedent::None);
        let _ = assignments.enqueue(!literals[1], Antecedent::None);

        let mut rep = normal_form(
            literals.iter().map(|&literal| weighted(literal, 2)),
            4,
        );
        rep.propagate_root(&assignments);

        assert_eq!(2, rep.bound());
        assert_eq!(&[weighted(literals[2], 2)], rep.literals());
        assert_eq!(2, rep.reach());
    }

    #[test]
    fn trivial_constraints_are_recognised() {
        assert!(normal_form([weighted(lit(1), 1)], 0).is_sat());
        assert!(normal_form([weighted(lit(1), 1), weighted(lit(2), 1)], 3).is_unsat());
    }

    #[test]
    fn the_most_negative_weight_is_rejected() {
        assert_eq!(
            Err(ConstraintOperationError::WeightOverflow),
            WeightLitsRep::create([weighted(lit(1), i64::MIN)], 0)
        );
    }

    #[test]
    fn weights_which_sum_beyond_the_range_are_rejected() {
        assert_eq!(
            Err(ConstraintOperationError::WeightOverflow),
            WeightLitsRep::create([weighted(lit(1), i64::MAX), weighted(lit(1), 1)], 1)
        );
        assert_eq!(
            Err(ConstraintOperationError::WeightOverflow),
            WeightLitsRep::create(
                [weighted(lit(1), i64::MAX), weighted(lit(2), i64::MAX)],
                i64::MAX
            )
        );
    }

    #[test]
    fn large_weights_within_the_range_are_accepted() {
        let rep = normal_form([weighted(lit(1), i64::MAX), weighted(lit(2), -1)], 5);

        assert_eq!(6, rep.bound());
        assert_eq!(&[weighted(lit(1), 6), weighted(!lit(2), 1)], rep.literals());
        assert_eq!(7, rep.reach());
    }
}
