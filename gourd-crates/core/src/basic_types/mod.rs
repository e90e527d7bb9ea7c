mod conflict;
mod constraint_operation_error;
mod literal;
pub mod moving_averages;
mod random;
pub mod sequence_generators;
mod trail;
mod weighted_literal;

pub use conflict::Conflict;
pub use conflict::PropagationStatus;
pub use constraint_operation_error::ConstraintOperationError;
pub use literal::Literal;
pub use literal::Variable;
pub use random::Random;
pub(crate) use random::shuffle;
#[cfg(test)]
pub(crate) use random::tests::TestRandom;
pub(crate) use trail::Trail;
pub use weighted_literal::WeightedLiteral;
