//! The propagation and learning core of the Gourd boolean constraint solver.
//!
//! A [`Solver`] holds clauses, weight (pseudo-boolean) constraints and loop formulas over
//! boolean [`Variable`]s and searches for a model with conflict-driven clause learning. The
//! search is usually driven through [`SequentialSolve`](engine::solve::SequentialSolve), which
//! adds restarts, learnt database management and model enumeration:
//!
//! ```rust
//! # use gourd_core::engine::solve::ModelEnumerator;
//! # use gourd_core::engine::solve::SequentialSolve;
//! # use gourd_core::termination::Indefinite;
//! # use gourd_core::Solver;
//! let mut solver = Solver::default();
//! let a = solver.new_literal();
//! let b = solver.new_literal();
//! solver.add_clause([a, b]).expect("the clause is feasible");
//! solver.add_clause([!a]).expect("the clause is feasible");
//!
//! let summary = SequentialSolve::default().solve(
//!     &mut solver,
//!     &[],
//!     &mut ModelEnumerator::default(),
//!     &mut Indefinite,
//! );
//!
//! let model = summary.result.model().expect("the problem is satisfiable");
//! assert!(model.value(b));
//! ```
#[doc(hidden)]
pub mod asserts;
pub mod basic_types;
pub mod branching;
pub mod containers;
pub mod engine;
pub mod results;
pub mod statistics;
pub mod termination;

pub use rand;

pub use crate::basic_types::ConstraintOperationError;
pub use crate::basic_types::Literal;
pub use crate::basic_types::Variable;
pub use crate::basic_types::WeightedLiteral;
pub use crate::engine::Solver;
pub use crate::engine::SolverOptions;
