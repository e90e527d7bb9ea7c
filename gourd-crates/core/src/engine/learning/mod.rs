//! The database of learnt constraints: activity and LBD bookkeeping, and the removal of the
//! least useful learnt constraints.
mod learned_constraint_manager;
mod learning_options;

pub(crate) use learned_constraint_manager::compute_lbd;
pub use learned_constraint_manager::LearnedConstraintManager;
pub use learned_constraint_manager::LearnedConstraintStatistics;
pub use learning_options::LearnedConstraintSortingStrategy;
pub use learning_options::LearningOptions;
