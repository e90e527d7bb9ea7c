use std::sync::Arc;

use thiserror::Error;

use super::ConstraintType;
use crate::basic_types::Literal;
use crate::engine::Assignments;

/// The literals of a clause which can be shared between solvers running on different threads.
///
/// The literal array is immutable while it is shared; every solver wraps it in its own clause
/// which keeps the watched literals locally. A solver which holds the only reference may
/// simplify the literals in place, otherwise simplification works on a private copy.
#[derive(Debug)]
pub struct SharedLiterals {
    inner: Arc<SharedClause>,
}

#[derive(Debug, Clone)]
struct SharedClause {
    constraint_type: ConstraintType,
    literals: Box<[Literal]>,
}

/// Errors raised when decoding the wire format of [`SharedLiterals`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedLiteralsError {
    #[error("the encoded clause has no header")]
    MissingHeader,
    #[error("the header announces {expected} literals but {actual} follow")]
    LengthMismatch { expected: usize, actual: usize },
}

impl SharedLiterals {
    pub fn new(literals: &[Literal], constraint_type: ConstraintType) -> SharedLiterals {
        SharedLiterals {
            inner: Arc::new(SharedClause {
                constraint_type,
                literals: literals.into(),
            }),
        }
    }

    /// Another handle to the same literals.
    pub fn share(&self) -> SharedLiterals {
        SharedLiterals {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn literals(&self) -> &[Literal] {
        &self.inner.literals
    }

    pub fn len(&self) -> usize {
        self.inner.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.literals.is_empty()
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.inner.constraint_type
    }

    /// The number of handles to these literals.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }

    /// Removes the literals which are false at the root; returns `true` if a literal is true at
    /// the root, in which case nothing is removed.
    ///
    /// The shared array is only changed when this handle is its sole owner; otherwise this
    /// handle is pointed to a fresh copy.
    pub(crate) fn simplify(&mut self, assignments: &Assignments) -> bool {
        if self
            .literals()
            .iter()
            .any(|&literal| assignments.is_root_true(literal))
        {
            return true;
        }
        if !self
            .literals()
            .iter()
            .any(|&literal| assignments.is_root_false(literal))
        {
            return false;
        }

        let remaining = self
            .literals()
            .iter()
            .copied()
            .filter(|&literal| !assignments.is_root_false(literal))
            .collect::<Box<[Literal]>>();

        match Arc::get_mut(&mut self.inner) {
            Some(shared_clause) => shared_clause.literals = remaining,
            None => {
                self.inner = Arc::new(SharedClause {
                    constraint_type: self.inner.constraint_type,
                    literals: remaining,
                })
            }
        }
        false
    }

    /// Writes the clause as a header `len << 2 | type` followed by the literal codes.
    pub fn encode(&self) -> Vec<u32> {
        let header = ((self.len() as u32) << 2) | self.constraint_type().into_bits() as u32;
        std::iter::once(header)
            .chain(self.literals().iter().map(|literal| literal.to_code()))
            .collect()
    }

    pub fn decode(words: &[u32]) -> Result<SharedLiterals, SharedLiteralsError> {
        let (&header, codes) = words
            .split_first()
            .ok_or(SharedLiteralsError::MissingHeader)?;

        let expected = (header >> 2) as usize;
        if expected != codes.len() {
            return Err(SharedLiteralsError::LengthMismatch {
                expected,
                actual: codes.len(),
            });
        }

        let constraint_type = ConstraintType::from_bits((header & 0b11) as u8);
        let literals = codes
            .iter()
            .map(|&code| Literal::from_code(code))
            .collect::<Vec<_>>();
        Ok(SharedLiterals::new(&literals, constraint_type))
    }
}
