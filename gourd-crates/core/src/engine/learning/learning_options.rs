use std::fmt::Display;

/// Options which govern how the scores of learnt constraints evolve.
#[derive(Debug, Clone, Copy)]
pub struct LearningOptions {
    /// Activities are rescaled once a bump would push one of them above this value.
    pub max_activity: f32,
    /// The factor by which activities decay after every conflict.
    pub activity_decay_factor: f32,
    /// Constraints whose LBD is at most this value are no longer bumped.
    pub lbd_threshold: u32,
    /// A constraint whose LBD improves to at most this value survives the next reduction.
    pub protection_lbd: u32,
    pub sorting_strategy: LearnedConstraintSortingStrategy,
}

impl Default for LearningOptions {
    fn default() -> Self {
        Self {
            max_activity: 1e20,
            activity_decay_factor: 0.99,
            lbd_threshold: 5,
            protection_lbd: 30,
            sorting_strategy: LearnedConstraintSortingStrategy::Activity,
        }
    }
}

/// The order in which learnt constraints are considered for removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LearnedConstraintSortingStrategy {
    /// Lowest activity first, ties broken by highest LBD.
    #[default]
    Activity,
    /// Highest LBD first, ties broken by lowest activity.
    Lbd,
}

impl Display for LearnedConstraintSortingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LearnedConstraintSortingStrategy::Activity => write!(f, "activity"),
            LearnedConstraintSortingStrategy::Lbd => write!(f, "lbd"),
        }
    }
}
