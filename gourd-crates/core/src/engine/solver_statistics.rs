use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::create_statistics_struct;
use crate::engine::learning::LearnedConstraintStatistics;

create_statistics_struct!(
    /// Counters of the search performed by a [`Solver`](crate::engine::Solver).
    EngineStatistics {
        num_decisions: u64,
        num_conflicts: u64,
        num_propagations: u64,
        num_binary_clauses: u64,
        num_ternary_clauses: u64,
        num_learned_constraints: u64,
        num_unit_constraints_learned: u64,
        /// The literals removed from learnt clauses by minimisation.
        num_minimised_literals: u64,
        average_learned_clause_length: CumulativeMovingAverage<u64>,
        average_backjump_distance: CumulativeMovingAverage<u64>,
    }
);

create_statistics_struct!(
    /// A snapshot of everything a [`Solver`](crate::engine::Solver) counts.
    SolverStatistics {
        engine: EngineStatistics,
        learned_constraints: LearnedConstraintStatistics,
    }
);
