//! Propagation after a literal became true.
//!
//! Unit propagation visits the watch lists of every enqueued literal: binary and ternary clauses
//! are handled inline, other clauses through their two watched literals, and weight constraints
//! and loop formulas through generic watches. Once unit propagation reaches a fixpoint the
//! [`PostPropagator`]s of the solver run, see [`PropagatorList`].

mod message_handler;
mod post_propagator;
mod propagator_list;
mod unit_propagation;

pub use message_handler::MessageHandler;
pub use post_propagator::PostPropagationContext;
pub use post_propagator::PostPropagator;
pub use post_propagator::PRIORITY_CLASS_GENERAL;
pub use post_propagator::PRIORITY_RESERVED_MESSAGE;
pub use post_propagator::PRIORITY_RESERVED_UFS;
pub use propagator_list::PropagatorList;
pub(crate) use unit_propagation::propagate_units;
