use std::fmt::Debug;

use log::debug;

use crate::basic_types::Literal;
use crate::engine::constraints::ClauseCreateFlag;
use crate::engine::constraints::ClauseCreator;
use crate::engine::constraints::ConstraintType;
use crate::engine::Solver;
use crate::results::Model;

/// Decides what happens after each model of a [`SequentialSolve`](super::SequentialSolve).
pub trait Enumerator: Debug {
    /// Called for every model; returns whether the solve should look for another one.
    fn on_model(&mut self, model: &Model) -> bool;

    /// Excludes the model the solver currently holds so that the next search finds a different
    /// one. Returns `false` if no other model can exist.
    fn exclude_model(&mut self, solver: &mut Solver) -> bool;

    /// Whether [`Enumerator::exclude_model`] may be called during the solve. The constraints it
    /// adds are then scoped to that solve and are gone once it returns.
    fn excludes_models(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnumerationMode {
    /// Stop at the first model.
    #[default]
    First,
    /// Enumerate every model, or at most `limit` of them.
    All { limit: Option<u64> },
}

/// Enumerates models by blocking the decisions which led to each of them.
///
/// Every decision on the trail of a model (assumptions included) is negated into a blocking
/// clause, which makes the models pairwise different on the decision variables. Since every
/// variable is either decided or implied by the decisions, no model is reported twice.
///
/// The first assumption of an enumerating [`SequentialSolve`](super::SequentialSolve) is its
/// step literal, so every blocking clause contains the negated step literal and is disabled
/// together with it when the solve ends.
#[derive(Clone, Debug, Default)]
pub struct ModelEnumerator {
    mode: EnumerationMode,
    models: Vec<Model>,
}

impl ModelEnumerator {
    pub fn new(mode: EnumerationMode) -> ModelEnumerator {
        ModelEnumerator {
            mode,
            models: vec![],
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn num_models(&self) -> u64 {
        self.models.len() as u64
    }
}

impl Enumerator for ModelEnumerator {
    fn on_model(&mut self, model: &Model) -> bool {
        self.models.push(model.clone());
        match self.mode {
            EnumerationMode::First => false,
            EnumerationMode::All { limit } => match limit {
                Some(limit) => self.num_models() < limit,
                None => true,
            },
        }
    }

    fn excludes_models(&self) -> bool {
        self.mode != EnumerationMode::First
    }

    fn exclude_model(&mut self, solver: &mut Solver) -> bool {
        let assignments = solver.assignments();
        let blocking_clause = (1..=assignments.decision_level())
            .filter_map(|level| assignments.literals_on_level(level).first().copied())
            .filter(|literal| assignments.is_decision(literal.variable()))
            .map(|literal| !literal)
            .collect::<Vec<Literal>>();
        debug!(
            "Blocking model {} with {} decisions",
            self.models.len(),
            blocking_clause.len()
        );
        if blocking_clause.is_empty() {
            return false;
        }

        // The clause is false under the current assignment; the conflict is resolved by the
        // next search.
        let _ = ClauseCreator::create(
            solver,
            blocking_clause,
            ClauseCreateFlag::NoHeuristic.into(),
            ConstraintType::Static,
        );
        true
    }
}
