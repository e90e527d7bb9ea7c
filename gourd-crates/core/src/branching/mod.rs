//! Decision making: a [`Brancher`] picks the next decision literal whenever propagation reached a
//! fixpoint without a conflict. The solver keeps the brancher informed about everything which
//! could change its preferences: new variables and constraints, conflicts, unassignments and
//! restarts.
mod brancher;
mod selection_context;
mod vsids_brancher;

pub use brancher::Brancher;
pub use selection_context::SelectionContext;
pub use vsids_brancher::VsidsBrancher;
pub use vsids_brancher::VsidsOptions;
