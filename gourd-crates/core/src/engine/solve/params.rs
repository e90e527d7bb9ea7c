use std::fmt::Display;

use crate::basic_types::sequence_generators::SequenceGeneratorType;

/// The sequence which decides after how many conflicts the search restarts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum RestartPolicy {
    /// Every [`RestartParams::base_interval`] conflicts.
    Fixed,
    /// After `base * factor^i` conflicts.
    Geometric,
    /// After `base * luby(i)` conflicts.
    #[default]
    Luby,
    /// Glue-based restarts: restart once the recently learnt clauses have a much worse LBD than
    /// the learnt clauses overall, unless more variables than usual are assigned.
    Dynamic,
}

impl Display for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestartPolicy::Fixed => write!(f, "fixed"),
            RestartPolicy::Geometric => write!(f, "geometric"),
            RestartPolicy::Luby => write!(f, "luby"),
            RestartPolicy::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl RestartPolicy {
    /// The sequence of conflict intervals between two restarts.
    pub(crate) fn sequence_type(self) -> SequenceGeneratorType {
        match self {
            RestartPolicy::Fixed | RestartPolicy::Dynamic => SequenceGeneratorType::Constant,
            RestartPolicy::Geometric => SequenceGeneratorType::Geometric,
            RestartPolicy::Luby => SequenceGeneratorType::Luby,
        }
    }
}

/// What happens to the restart sequence once a model was found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SeqRepeat {
    /// The sequence continues where it left off.
    #[default]
    Continue,
    /// The sequence starts from its first element again.
    Repeat,
    /// No further restarts are made.
    Disable,
}

impl Display for SeqRepeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeqRepeat::Continue => write!(f, "continue"),
            SeqRepeat::Repeat => write!(f, "repeat"),
            SeqRepeat::Disable => write!(f, "disable"),
        }
    }
}

/// The options of the restart schedule.
#[derive(Clone, Copy, Debug)]
pub struct RestartParams {
    pub policy: RestartPolicy,
    /// The first element of the restart sequence, in conflicts.
    pub base_interval: u64,
    /// Only used by [`RestartPolicy::Geometric`].
    pub geometric_factor: f64,
    /// The number of conflicts before the first dynamic restart is considered.
    pub min_conflicts_before_first_restart: u64,
    /// A dynamic restart happens once the short-term LBD average exceeds the long-term average
    /// times this coefficient.
    pub lbd_coef: f64,
    /// A dynamic restart is blocked if the number of assigned variables exceeds their recent
    /// average times this coefficient.
    pub num_assigned_coef: f64,
    /// The number of conflicts over which the recent number of assigned variables is averaged.
    pub num_assigned_window: u64,
    pub on_sat: SeqRepeat,
    /// Counter-implication bumps are made every `counter_restart` restarts; `0` disables them.
    pub counter_restart: u64,
    /// The number of activity increments of a counter-implication bump.
    pub counter_bump: f64,
    /// `(first, next)`: shuffle the constraints after `first` restarts, then after every `next`
    /// further restarts.
    pub shuffle: Option<(u64, u64)>,
}

impl Default for RestartParams {
    fn default() -> Self {
        RestartParams {
            policy: RestartPolicy::Luby,
            base_interval: 100,
            geometric_factor: 1.5,
            min_conflicts_before_first_restart: 10000,
            lbd_coef: 1.25,
            num_assigned_coef: 1.4,
            num_assigned_window: 5000,
            on_sat: SeqRepeat::Continue,
            counter_restart: 0,
            counter_bump: 10.0,
            shuffle: None,
        }
    }
}

/// The options of learnt database reduction and growth.
///
/// The learnt database starts out with a ceiling of `initial_db_fraction` times the number of
/// problem constraints, clamped to `[initial_db_min, initial_db_max]`. Exceeding the ceiling
/// triggers a reduction, as does the optional reduction interval.
#[derive(Clone, Copy, Debug)]
pub struct ReduceParams {
    /// The share of the removable learnt constraints which a reduction removes.
    pub fraction: f64,
    /// Learnt constraints with at most this LBD are never removed by a regular reduction.
    pub protect_lbd: u32,
    pub initial_db_fraction: f64,
    pub initial_db_min: u64,
    pub initial_db_max: u64,
    /// Reduce after conflict intervals of this sequence, regardless of the database size.
    pub reduce_interval: Option<(SequenceGeneratorType, u64, f64)>,
    /// Raise the ceiling after conflict intervals of this (geometric) sequence: `(base,
    /// factor)`.
    pub grow_interval: (u64, f64),
    /// The factor by which the ceiling grows.
    pub grow_factor: f64,
    /// The ceiling never grows beyond this size; once it would, growing stops.
    pub max_db_size: u64,
}

impl Default for ReduceParams {
    fn default() -> Self {
        ReduceParams {
            fraction: 0.75,
            protect_lbd: 2,
            initial_db_fraction: 1.0 / 3.0,
            initial_db_min: 10,
            initial_db_max: u32::MAX as u64,
            reduce_interval: None,
            grow_interval: (100, 1.5),
            grow_factor: 1.1,
            max_db_size: u32::MAX as u64,
        }
    }
}

/// All options of a [`BasicSolve`](super::BasicSolve).
#[derive(Clone, Copy, Debug, Default)]
pub struct SolveParams {
    pub restart: RestartParams,
    pub reduce: ReduceParams,
}

/// Global limits on a solve; once one of them is reached the solve stops with an unknown result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolveLimits {
    pub conflicts: Option<u64>,
    pub restarts: Option<u64>,
}

impl SolveLimits {
    pub fn conflicts(conflicts: u64) -> SolveLimits {
        SolveLimits {
            conflicts: Some(conflicts),
            restarts: None,
        }
    }

    pub fn restarts(restarts: u64) -> SolveLimits {
        SolveLimits {
            conflicts: None,
            restarts: Some(restarts),
        }
    }
}
