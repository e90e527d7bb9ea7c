use super::constraints::ConstraintId;
use super::constraints::ConstraintStore;
use super::Assignments;
use crate::basic_types::Literal;
use crate::gourd_assert_moderate;

/// Why a literal became true.
///
/// The reason of a literal is the set of literals which were true when it was assigned and which
/// together imply it. Binary and ternary clauses store their reason inline, every other
/// constraint is referenced by its [`ConstraintId`] and asked for the reason on demand. An
/// antecedent is only meaningful while its literal stays on the trail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Antecedent {
    /// The literal is a decision, an assumption or a fact.
    #[default]
    None,
    /// The literal was implied by a binary clause; the stored literal is its reason.
    Literal(Literal),
    /// The literal was implied by a ternary clause; the stored literals are its reason.
    Literals(Literal, Literal),
    Constraint(ConstraintId),
}

impl Antecedent {
    pub fn is_none(&self) -> bool {
        matches!(self, Antecedent::None)
    }

    pub fn constraint(&self) -> Option<ConstraintId> {
        match self {
            Antecedent::Constraint(constraint) => Some(*constraint),
            _ => None,
        }
    }

    /// Appends the reason of `literal` to `reason`.
    pub(crate) fn reason(
        &self,
        literal: Literal,
        constraints: &ConstraintStore,
        assignments: &Assignments,
        reason: &mut Vec<Literal>,
    ) {
        gourd_assert_moderate!(assignments.is_true(literal));
        match *self {
            Antecedent::None => {
                panic!("Asked for the reason of {literal}, which has no antecedent")
            }
            Antecedent::Literal(p) => reason.push(p),
            Antecedent::Literals(p, q) => {
                reason.push(p);
                reason.push(q);
            }
            Antecedent::Constraint(constraint) => {
                constraints
                    .get(constraint)
                    .kind
                    .reason(literal, assignments, reason)
            }
        }
    }

    /// Whether every literal in the reason of `literal` is `removable`. Literals without a
    /// reason can never be removed.
    pub(crate) fn minimize(
        &self,
        literal: Literal,
        constraints: &ConstraintStore,
        assignments: &Assignments,
        mut removable: impl FnMut(Literal) -> bool,
    ) -> bool {
        match *self {
            Antecedent::None => false,
            Antecedent::Literal(p) => removable(p),
            Antecedent::Literals(p, q) => removable(p) && removable(q),
            Antecedent::Constraint(_) => {
                let mut reason = vec![];
                self.reason(literal, constraints, assignments, &mut reason);
                reason.into_iter().all(removable)
            }
        }
    }
}
