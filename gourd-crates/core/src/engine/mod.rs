//! The CDCL engine: the assignment and its trail, the constraint store with the built-in
//! constraint kinds, propagation, conflict analysis, the learnt database and the [`Solver`]
//! which ties them together, plus the [`solve`] loop on top of it.
mod antecedent;
mod assignments;
mod conflict_analysis;
pub mod constraints;
pub mod learning;
pub mod propagation;
pub mod solve;
mod solver;
mod solver_statistics;
mod watch_lists;

pub use antecedent::Antecedent;
pub use assignments::Assignments;
pub use solver::SearchResult;
pub use solver::Solver;
pub use solver::SolverOptions;
pub use solver_statistics::EngineStatistics;
pub use solver_statistics::SolverStatistics;
pub(crate) use watch_lists::WatchLists;
