//! Conflict analysis: turns a conflict into a learned clause and the level to backjump to, or,
//! for conflicts involving assumptions only, into the subset of assumptions to blame.
mod conflict_analyser;
mod learned_clause_minimiser;

pub(crate) use conflict_analyser::ConflictAnalyser;
pub(crate) use conflict_analyser::ConflictAnalysisContext;
pub(crate) use conflict_analyser::ConflictAnalysisResult;
pub(crate) use learned_clause_minimiser::LearnedClauseMinimiser;
