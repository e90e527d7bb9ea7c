use super::Literal;

/// The outcome of a failed propagation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conflict {
    /// A set of literals which are all true but cannot be true together.
    Nogood(Vec<Literal>),
    /// The search was asked to stop; the assignment itself is consistent.
    Interrupted,
}

impl Conflict {
    pub(crate) fn from_falsified_clause(clause: &[Literal]) -> Conflict {
        Conflict::Nogood(clause.iter().map(|&literal| !literal).collect())
    }
}

pub type PropagationStatus = Result<(), Conflict>;
