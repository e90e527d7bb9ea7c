//! The constraints which live in the constraint store of a [`Solver`]: clauses (possibly shared
//! between solvers), weight constraints and loop formulas.
#![allow(clippy::double_parens, reason = "originates inside the bitfield macro")]

mod clause;
mod clause_creator;
mod constraint_store;
mod loop_formula;
mod shared_literals;
mod weight_constraint;
mod weight_lits_rep;

use bitfield_struct::bitfield;
pub(crate) use clause::Clause;
pub(crate) use clause::ClausePropagation;
pub use clause_creator::ClauseCreateFlag;
pub use clause_creator::ClauseCreateFlags;
pub use clause_creator::ClauseCreationResult;
pub use clause_creator::ClauseCreator;
pub use clause_creator::ClauseStatus;
pub use constraint_store::ConstraintId;
pub(crate) use constraint_store::ConstraintKind;
pub(crate) use constraint_store::ConstraintStore;
pub(crate) use constraint_store::PropagationContext;
pub(crate) use constraint_store::StoredConstraint;
pub(crate) use constraint_store::WatchStatus;
pub(crate) use loop_formula::LoopFormula;
pub use shared_literals::SharedLiterals;
pub use shared_literals::SharedLiteralsError;
pub(crate) use weight_constraint::WeightConstraint;
pub use weight_lits_rep::WeightLitsRep;

#[cfg(doc)]
use crate::engine::Solver;

/// Where a constraint comes from; everything except [`ConstraintType::Static`] is learnt and may
/// be removed again by the solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstraintType {
    /// A constraint of the problem.
    #[default]
    Static = 0,
    /// Learnt from a conflict.
    Conflict = 1,
    /// Learnt from an unfounded set.
    Loop = 2,
    /// Any other learnt constraint, e.g. a blocking clause added during enumeration.
    Other = 3,
}

impl ConstraintType {
    pub fn is_learnt(self) -> bool {
        self != ConstraintType::Static
    }

    pub(crate) const fn into_bits(self) -> u8 {
        self as _
    }

    pub(crate) const fn from_bits(value: u8) -> ConstraintType {
        match value {
            0 => ConstraintType::Static,
            1 => ConstraintType::Conflict,
            2 => ConstraintType::Loop,
            _ => ConstraintType::Other,
        }
    }
}

/// The flags of a stored constraint.
#[bitfield(u32)]
#[derive(PartialEq, Eq)]
pub struct ConstraintInfo {
    #[bits(8)]
    pub constraint_type: ConstraintType,
    /// Set for constraints which only hold under the current assumptions.
    pub tagged: bool,
    /// Set for constraints over auxiliary variables.
    pub auxiliary: bool,
    /// A protected constraint survives the next database reduction.
    pub protected: bool,
    #[bits(21)]
    __: u32,
}

impl ConstraintInfo {
    pub fn of_type(constraint_type: ConstraintType) -> ConstraintInfo {
        ConstraintInfo::new().with_constraint_type(constraint_type)
    }
}

/// The score used to decide which learnt constraints to keep.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ConstraintScore {
    pub activity: f32,
    /// The literal block distance; lower is better.
    pub lbd: u32,
}
