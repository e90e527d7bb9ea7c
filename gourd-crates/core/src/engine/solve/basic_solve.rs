use log::debug;
use log::info;

use super::DynamicRestart;
use super::ReduceParams;
use super::RestartParams;
use super::RestartPolicy;
use super::SeqRepeat;
use super::SolveLimits;
use super::SolveParams;
use crate::basic_types::sequence_generators::create_sequence_generator;
use crate::basic_types::sequence_generators::SequenceGenerator;
use crate::basic_types::sequence_generators::SequenceGeneratorType;
use crate::basic_types::Literal;
use crate::create_statistics_struct;
use crate::engine::SearchResult;
use crate::engine::Solver;
use crate::termination::TerminationCondition;

create_statistics_struct!(
    /// What the restart, reduce and grow loop did.
    SolveStatistics {
        num_models: u64,
        num_restarts: u64,
        num_blocked_restarts: u64,
        num_counter_bumps: u64,
        num_shuffles: u64,
        num_reductions: u64,
        num_removed_learnt_constraints: u64,
        num_db_growths: u64,
        learnt_db_ceiling: u64,
        time_spent_in_solver_ms: u128,
    }
);

/// The outcome of [`BasicSolve::satisfiable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// The solver holds a model.
    Satisfiable,
    /// There is no model under the assumptions.
    Unsatisfiable,
    /// The termination condition or the interrupt handle stopped the solve.
    Interrupted,
    /// One of the [`SolveLimits`] was reached.
    LimitReached,
}

#[derive(Debug)]
struct RestartSchedule {
    params: RestartParams,
    sequence: Box<dyn SequenceGenerator>,
    /// `None` if restarts are disabled or left to the dynamic policy.
    conflicts_until_restart: Option<u64>,
    dynamic: Option<DynamicRestart>,
    /// The restarts since the sequence was (re)started.
    count: u64,
    next_shuffle: Option<u64>,
}

impl RestartSchedule {
    fn new(params: RestartParams) -> RestartSchedule {
        let mut sequence = create_sequence_generator(
            params.policy.sequence_type(),
            params.base_interval as i64,
            params.geometric_factor,
        );
        let (conflicts_until_restart, dynamic) = match params.policy {
            RestartPolicy::Dynamic => (None, Some(DynamicRestart::new(&params))),
            _ => (Some(next_interval(sequence.as_mut())), None),
        };
        RestartSchedule {
            params,
            sequence,
            conflicts_until_restart,
            dynamic,
            count: 0,
            next_shuffle: params.shuffle.map(|(first, _)| first),
        }
    }

    fn is_due(&self) -> bool {
        self.conflicts_until_restart == Some(0)
            || self
                .dynamic
                .as_ref()
                .is_some_and(|dynamic| dynamic.should_restart())
    }

    fn advance(&mut self) {
        self.count += 1;
        if let Some(dynamic) = self.dynamic.as_mut() {
            dynamic.notify_restart();
        }
        if self.conflicts_until_restart.is_some() {
            self.conflicts_until_restart = Some(next_interval(self.sequence.as_mut()));
        }
    }

    /// Applies [`RestartParams::on_sat`].
    fn on_model(&mut self) {
        match self.params.on_sat {
            SeqRepeat::Continue => {
                if let Some(dynamic) = self.dynamic.as_mut() {
                    dynamic.reset();
                }
            }
            SeqRepeat::Repeat => {
                debug!("Restarting the restart sequence after a model");
                let shuffle = self.next_shuffle;
                *self = RestartSchedule::new(self.params);
                self.next_shuffle = shuffle;
            }
            SeqRepeat::Disable => {
                debug!("Disabling restarts after a model");
                self.conflicts_until_restart = None;
                self.dynamic = None;
            }
        }
    }
}

#[derive(Debug)]
struct DatabaseSchedule {
    params: ReduceParams,
    /// `None` until the first solve, which sets it from the number of problem constraints.
    ceiling: Option<f64>,
    reduce_sequence: Option<Box<dyn SequenceGenerator>>,
    conflicts_until_reduce: Option<u64>,
    /// `None` once the ceiling reached [`ReduceParams::max_db_size`].
    grow_sequence: Option<Box<dyn SequenceGenerator>>,
    conflicts_until_grow: Option<u64>,
}

impl DatabaseSchedule {
    fn new(params: ReduceParams) -> DatabaseSchedule {
        let mut reduce_sequence = params
            .reduce_interval
            .map(|(sequence_type, base, factor)| {
                create_sequence_generator(sequence_type, base as i64, factor)
            });
        let conflicts_until_reduce = reduce_sequence
            .as_mut()
            .map(|sequence| next_interval(sequence.as_mut()));

        let (base, factor) = params.grow_interval;
        let mut grow_sequence =
            create_sequence_generator(SequenceGeneratorType::Geometric, base as i64, factor);
        let conflicts_until_grow = Some(next_interval(grow_sequence.as_mut()));

        DatabaseSchedule {
            params,
            ceiling: None,
            reduce_sequence,
            conflicts_until_reduce,
            grow_sequence: Some(grow_sequence),
            conflicts_until_grow,
        }
    }

    fn initialise(&mut self, num_problem_constraints: usize) -> f64 {
        *self.ceiling.get_or_insert_with(|| {
            (num_problem_constraints as f64 * self.params.initial_db_fraction)
                .max(self.params.initial_db_min as f64)
                .min(self.params.initial_db_max as f64)
                .min(self.params.max_db_size as f64)
        })
    }

    /// The number of conflicts after which the database may exceed its ceiling.
    fn conflicts_until_full(&self, num_learnt: usize) -> u64 {
        let ceiling = self.ceiling.unwrap_or(f64::MAX);
        (ceiling - num_learnt as f64).max(1.0) as u64
    }
}

fn next_interval(sequence: &mut dyn SequenceGenerator) -> u64 {
    sequence.next().max(1) as u64
}

fn consume(counter: &mut Option<u64>, num_conflicts: u64) {
    if let Some(remaining) = counter.as_mut() {
        *remaining = remaining.saturating_sub(num_conflicts);
    }
}

/// The search loop around [`Solver::search`]: restarts, reduction of the learnt database and
/// growth of its ceiling.
///
/// Each iteration searches until the nearest of the restart, reduce, grow and global limits,
/// then acts on whichever of them triggered. The state of the schedules survives between calls,
/// so model enumeration continues the restart sequence unless [`RestartParams::on_sat`] says
/// otherwise.
#[derive(Debug)]
pub struct BasicSolve {
    limits: SolveLimits,
    restart: RestartSchedule,
    database: DatabaseSchedule,
    num_conflicts: u64,
    statistics: SolveStatistics,
}

impl Default for BasicSolve {
    fn default() -> Self {
        BasicSolve::new(SolveParams::default(), SolveLimits::default())
    }
}

impl BasicSolve {
    pub fn new(params: SolveParams, limits: SolveLimits) -> BasicSolve {
        BasicSolve {
            limits,
            restart: RestartSchedule::new(params.restart),
            database: DatabaseSchedule::new(params.reduce),
            num_conflicts: 0,
            statistics: SolveStatistics::default(),
        }
    }

    pub fn statistics(&self) -> SolveStatistics {
        let mut statistics = self.statistics;
        if let Some(dynamic) = self.restart.dynamic.as_ref() {
            statistics.num_blocked_restarts = dynamic.num_blocked_restarts;
        }
        statistics.learnt_db_ceiling = self.database.ceiling.unwrap_or(0.0) as u64;
        statistics
    }

    /// The restarts since the restart sequence was last (re)started.
    pub fn restart_count(&self) -> u64 {
        self.restart.count
    }

    /// The current ceiling of the learnt database, once the first solve fixed it.
    pub fn learnt_db_ceiling(&self) -> Option<f64> {
        self.database.ceiling
    }

    /// Searches for a model under `assumptions`.
    pub fn satisfiable(
        &mut self,
        solver: &mut Solver,
        assumptions: &[Literal],
        termination: &mut impl TerminationCondition,
    ) -> SolveStatus {
        let ceiling = self.database.initialise(solver.num_constraints());
        debug!("Solving with a learnt database ceiling of {ceiling:.0}");

        loop {
            let global_remaining = self
                .limits
                .conflicts
                .map(|limit| limit.saturating_sub(self.num_conflicts));
            if global_remaining == Some(0) {
                info!("Stopping after {} conflicts", self.num_conflicts);
                return SolveStatus::LimitReached;
            }

            let conflict_limit = [
                self.restart.conflicts_until_restart,
                self.database.conflicts_until_reduce,
                self.database.conflicts_until_grow,
                Some(
                    self.database
                        .conflicts_until_full(solver.num_learnt_constraints()),
                ),
                global_remaining,
            ]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(u64::MAX);

            let conflicts_before = solver.statistics.num_conflicts;
            let result = solver.search_with(
                conflict_limit,
                self.restart.dynamic.as_mut(),
                assumptions,
                termination,
            );
            let used = solver.statistics.num_conflicts - conflicts_before;
            self.num_conflicts += used;
            consume(&mut self.restart.conflicts_until_restart, used);
            consume(&mut self.database.conflicts_until_reduce, used);
            consume(&mut self.database.conflicts_until_grow, used);

            match result {
                SearchResult::Satisfiable => {
                    self.statistics.num_models += 1;
                    self.restart.on_model();
                    return SolveStatus::Satisfiable;
                }
                SearchResult::Unsatisfiable => return SolveStatus::Unsatisfiable,
                SearchResult::Interrupted => {
                    info!("The search was interrupted");
                    return SolveStatus::Interrupted;
                }
                SearchResult::Limit => {
                    if self.restart.is_due() && self.perform_restart(solver) {
                        return SolveStatus::LimitReached;
                    }
                    self.maybe_reduce(solver);
                    self.maybe_grow();
                }
            }
        }
    }

    /// Returns whether the restart limit was reached.
    fn perform_restart(&mut self, solver: &mut Solver) -> bool {
        let params = self.restart.params;
        self.statistics.num_restarts += 1;

        if params.counter_restart > 0 && (self.restart.count + 1) % params.counter_restart == 0 {
            self.statistics.num_counter_bumps += 1;
            solver.counter_bump(params.counter_bump);
        }
        solver.restart();
        self.restart.advance();

        if let Some(next_shuffle) = self.restart.next_shuffle {
            if self.statistics.num_restarts >= next_shuffle {
                debug!("Shuffling the constraints after {next_shuffle} restarts");
                self.statistics.num_shuffles += 1;
                solver.shuffle_constraints();
                self.restart.next_shuffle = params
                    .shuffle
                    .and_then(|(_, next)| (next > 0).then_some(next_shuffle + next));
            }
        }

        self.limits
            .restarts
            .is_some_and(|limit| self.statistics.num_restarts >= limit)
    }

    fn maybe_reduce(&mut self, solver: &mut Solver) {
        let ceiling = self.database.ceiling.unwrap_or(f64::MAX);
        let interval_passed = self.database.conflicts_until_reduce == Some(0);
        if !interval_passed && (solver.num_learnt_constraints() as f64) < ceiling {
            return;
        }

        let params = self.database.params;
        let mut num_removed = solver.reduce_learnt_constraints(params.fraction, params.protect_lbd);
        if solver.num_learnt_constraints() as f64 >= ceiling {
            num_removed += solver.reduce_learnt_constraints_half();
        }
        debug!(
            "Reduced the learnt database by {num_removed} to {}",
            solver.num_learnt_constraints()
        );
        self.statistics.num_reductions += 1;
        self.statistics.num_removed_learnt_constraints += num_removed as u64;

        if let Some(sequence) = self.database.reduce_sequence.as_mut() {
            self.database.conflicts_until_reduce = Some(next_interval(sequence.as_mut()));
        }
    }

    fn maybe_grow(&mut self) {
        if self.database.conflicts_until_grow != Some(0) {
            return;
        }
        let params = self.database.params;
        let Some(ceiling) = self.database.ceiling.as_mut() else {
            return;
        };

        *ceiling *= params.grow_factor;
        self.statistics.num_db_growths += 1;
        if *ceiling >= params.max_db_size as f64 {
            *ceiling = params.max_db_size as f64;
            self.database.grow_sequence = None;
            self.database.conflicts_until_grow = None;
            debug!("The learnt database reached its maximum size of {ceiling:.0}");
        } else if let Some(sequence) = self.database.grow_sequence.as_mut() {
            self.database.conflicts_until_grow = Some(next_interval(sequence.as_mut()));
            debug!("Grew the learnt database to {ceiling:.0}");
        }
    }
}
