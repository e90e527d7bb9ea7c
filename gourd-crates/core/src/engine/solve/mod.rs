//! The solve loop around [`Solver::search`](crate::engine::Solver::search).
//!
//! [`BasicSolve`] restarts the search, reduces the learnt database and grows its ceiling
//! according to [`SolveParams`]. [`SequentialSolve`] runs a [`BasicSolve`] against an
//! [`Enumerator`], which decides whether to stop at the first model or to block it and look for
//! more.
mod basic_solve;
mod dynamic_restart;
mod enumerator;
mod params;
mod sequential_solve;

pub use basic_solve::BasicSolve;
pub use basic_solve::SolveStatistics;
pub use basic_solve::SolveStatus;
pub(crate) use dynamic_restart::DynamicRestart;
pub use enumerator::EnumerationMode;
pub use enumerator::Enumerator;
pub use enumerator::ModelEnumerator;
pub use params::ReduceParams;
pub use params::RestartParams;
pub use params::RestartPolicy;
pub use params::SeqRepeat;
pub use params::SolveLimits;
pub use params::SolveParams;
pub use sequential_solve::SequentialSolve;
