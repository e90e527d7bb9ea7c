use std::cmp::Ordering;

use itertools::Itertools;
use log::debug;

use super::LearnedConstraintSortingStrategy;
use super::LearningOptions;
use crate::basic_types::Literal;
use crate::create_statistics_struct;
use crate::engine::constraints::ConstraintId;
use crate::engine::constraints::ConstraintScore;
use crate::engine::constraints::ConstraintStore;
use crate::engine::Assignments;
use crate::engine::WatchLists;
use crate::gourd_assert_simple;

create_statistics_struct!(
    /// What happened to the learnt constraints of a solver.
    LearnedConstraintStatistics {
        num_reductions: u64,
        num_removed: u64,
        num_rescales: u64,
        num_lbd_updates: u64,
    }
);

/// Keeps the scores of the learnt constraints in a [`ConstraintStore`] and decides which of them
/// to remove when the database is reduced.
///
/// Every learnt constraint starts with the current activity increment. Constraints which take
/// part in conflict analysis are bumped and have their LBD recomputed, and the increment grows
/// after every conflict so that recent activity weighs more. Constraints whose LBD dropped
/// below [`LearningOptions::protection_lbd`] survive the next reduction.
#[derive(Debug, Clone)]
pub struct LearnedConstraintManager {
    options: LearningOptions,
    activity_increment: f32,
    statistics: LearnedConstraintStatistics,
}

impl Default for LearnedConstraintManager {
    fn default() -> Self {
        LearnedConstraintManager::new(LearningOptions::default())
    }
}

impl LearnedConstraintManager {
    pub fn new(options: LearningOptions) -> LearnedConstraintManager {
        LearnedConstraintManager {
            options,
            activity_increment: 1.0,
            statistics: LearnedConstraintStatistics::default(),
        }
    }

    pub fn options(&self) -> &LearningOptions {
        &self.options
    }

    pub fn statistics(&self) -> LearnedConstraintStatistics {
        self.statistics
    }

    /// The score of a constraint which is learnt now.
    pub(crate) fn initial_score(
        &self,
        literals: &[Literal],
        assignments: &Assignments,
    ) -> ConstraintScore {
        ConstraintScore {
            activity: self.activity_increment,
            lbd: compute_lbd(literals, assignments),
        }
    }

    /// Called for every learnt constraint which took part in conflict analysis.
    pub(crate) fn on_conflict_participation(
        &mut self,
        constraint: ConstraintId,
        constraints: &mut ConstraintStore,
        assignments: &Assignments,
    ) {
        let stored = constraints.get(constraint);
        if stored.is_learnt() && stored.score.lbd > self.options.lbd_threshold {
            self.bump_activity(constraint, constraints);
            self.update_lbd(constraint, constraints, assignments);
        }
    }

    pub(crate) fn bump_activity(
        &mut self,
        constraint: ConstraintId,
        constraints: &mut ConstraintStore,
    ) {
        if constraints.get(constraint).score.activity + self.activity_increment
            > self.options.max_activity
        {
            self.rescale_activities(constraints);
        }
        constraints.get_mut(constraint).score.activity += self.activity_increment;
    }

    pub(crate) fn update_lbd(
        &mut self,
        constraint: ConstraintId,
        constraints: &mut ConstraintStore,
        assignments: &Assignments,
    ) {
        let stored = constraints.get_mut(constraint);
        let new_lbd = compute_lbd(&stored.kind.literals(), assignments);
        if new_lbd < stored.score.lbd {
            self.statistics.num_lbd_updates += 1;
            stored.score.lbd = new_lbd;
            if new_lbd <= self.options.protection_lbd {
                stored.info.set_protected(true);
            }
        }
    }

    fn rescale_activities(&mut self, constraints: &mut ConstraintStore) {
        self.statistics.num_rescales += 1;
        for id in constraints.learnt_ids() {
            constraints.get_mut(id).score.activity /= self.options.max_activity;
        }
        self.activity_increment /= self.options.max_activity;
    }

    pub(crate) fn decay_activities(&mut self) {
        self.activity_increment /= self.options.activity_decay_factor;
    }

    /// Removes `fraction` of the learnt constraints, worst first.
    ///
    /// Locked constraints and glue constraints (LBD at most `protect_lbd`) are never removed;
    /// protected constraints are skipped once and lose their protection. Fewer constraints are
    /// removed if not enough of them qualify. Returns the number of removed constraints.
    pub(crate) fn reduce(
        &mut self,
        fraction: f64,
        protect_lbd: u32,
        constraints: &mut ConstraintStore,
        watch_lists: &mut WatchLists,
        assignments: &Assignments,
    ) -> usize {
        gourd_assert_simple!((0.0..=1.0).contains(&fraction));
        let target = (constraints.num_learnt() as f64 * fraction) as usize;

        let mut candidates = vec![];
        for id in constraints.learnt_ids() {
            let stored = constraints.get_mut(id);
            if stored.info.protected() {
                stored.info.set_protected(false);
                continue;
            }
            if stored.score.lbd <= protect_lbd || stored.kind.is_locked(id, assignments) {
                continue;
            }
            candidates.push(id);
        }

        self.remove_worst(candidates, target, constraints, watch_lists)
    }

    /// Removes half of the unlocked learnt constraints, ignoring protection and glue.
    pub(crate) fn reduce_half(
        &mut self,
        constraints: &mut ConstraintStore,
        watch_lists: &mut WatchLists,
        assignments: &Assignments,
    ) -> usize {
        let candidates = constraints
            .learnt_ids()
            .into_iter()
            .filter(|&id| !constraints.get(id).kind.is_locked(id, assignments))
            .collect_vec();
        let target = candidates.len() / 2;
        self.remove_worst(candidates, target, constraints, watch_lists)
    }

    fn remove_worst(
        &mut self,
        mut candidates: Vec<ConstraintId>,
        target: usize,
        constraints: &mut ConstraintStore,
        watch_lists: &mut WatchLists,
    ) -> usize {
        let strategy = self.options.sorting_strategy;
        candidates.sort_by(|&first, &second| {
            worse_first(
                strategy,
                &constraints.get(first).score,
                &constraints.get(second).score,
            )
        });

        let num_removed = target.min(candidates.len());
        for &id in &candidates[..num_removed] {
            constraints.destroy(id, watch_lists);
        }

        self.statistics.num_reductions += 1;
        self.statistics.num_removed += num_removed as u64;
        debug!(
            "Removed {num_removed} learnt constraints, {} remain",
            constraints.num_learnt()
        );
        num_removed
    }
}

/// Orders scores such that the constraint which should be removed first comes first.
fn worse_first(
    strategy: LearnedConstraintSortingStrategy,
    first: &ConstraintScore,
    second: &ConstraintScore,
) -> Ordering {
    let by_activity = first.activity.total_cmp(&second.activity);
    let by_lbd = second.lbd.cmp(&first.lbd);
    match strategy {
        LearnedConstraintSortingStrategy::Activity => by_activity.then(by_lbd),
        LearnedConstraintSortingStrategy::Lbd => by_lbd.then(by_activity),
    }
}

/// The number of distinct non-root decision levels among the assigned `literals`.
pub(crate) fn compute_lbd(literals: &[Literal], assignments: &Assignments) -> u32 {
    literals
        .iter()
        .filter(|&&literal| assignments.is_assigned(literal))
        .map(|literal| assignments.level(literal.variable()))
        .filter(|&level| level > 0)
        .sorted_unstable()
        .dedup()
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::constraints::ClauseCreateFlags;
    use crate::engine::constraints::ClauseCreator;
    use crate::engine::constraints::ConstraintType;
    use crate::engine::Solver;

    fn learn_clauses(solver: &mut Solver, num_clauses: usize) -> Vec<(ConstraintId, [Literal; 4])> {
        (0..num_clauses)
            .map(|index| {
                let literals: [Literal; 4] = std::array::from_fn(|_| solver.new_literal());
                let result = ClauseCreator::create(
                    solver,
                    literals,
                    ClauseCreateFlags::empty(),
                    ConstraintType::Conflict,
                );
                let id = result.constraint.expect("long clauses are stored explicitly");
                solver.constraints.get_mut(id).score = ConstraintScore {
                    activity: (index + 1) as f32,
                    lbd: 8,
                };
                (id, literals)
            })
            .collect()
    }

    #[test]
    fn reduction_skips_locked_constraints_and_removes_the_least_active() {
        let mut solver = Solver::default();
        let learnt = learn_clauses(&mut solver, 10);

        for (_, literals) in &learnt[..3] {
            for &literal in &literals[1..] {
                solver.assignments.new_decision(!literal);
            }
            assert!(solver.propagate().is_ok());
            assert!(solver.assignments.is_true(literals[0]));
        }

        let removed = solver.reduce_learnt_constraints(0.5, 2);

        assert_eq!(5, removed);
        let remaining = solver.constraints.learnt_ids();
        for (position, (id, _)) in learnt.iter().enumerate() {
            let expected = position < 3 || position >= 8;
            assert_eq!(expected, remaining.contains(id), "clause {position}");
        }
    }

    #[test]
    fn protected_and_glue_constraints_survive_one_reduction() {
        let mut solver = Solver::default();
        let learnt = learn_clauses(&mut solver, 4);
        solver.constraints.get_mut(learnt[0].0).info.set_protected(true);
        solver.constraints.get_mut(learnt[1].0).score.lbd = 2;

        assert_eq!(2, solver.reduce_learnt_constraints(1.0, 2));
        assert!(solver.constraints.contains(learnt[0].0));
        assert!(solver.constraints.contains(learnt[1].0));
        assert!(!solver.constraints.get(learnt[0].0).info.protected());

        assert_eq!(1, solver.reduce_learnt_constraints(1.0, 2));
        assert!(!solver.constraints.contains(learnt[0].0));
    }

    #[test]
    fn lbd_ordering_removes_the_highest_lbd_first() {
        let first = ConstraintScore {
            activity: 1.0,
            lbd: 3,
        };
        let second = ConstraintScore {
            activity: 5.0,
            lbd: 9,
        };

        assert_eq!(
            Ordering::Less,
            worse_first(LearnedConstraintSortingStrategy::Activity, &first, &second)
        );
        assert_eq!(
            Ordering::Greater,
            worse_first(LearnedConstraintSortingStrategy::Lbd, &first, &second)
        );
    }

    #[test]
    fn bumping_past_the_maximum_rescales_every_activity() {
        let mut solver = Solver::default();
        let learnt = learn_clauses(&mut solver, 2);
        let mut manager = LearnedConstraintManager::new(LearningOptions {
            max_activity: 10.0,
            ..Default::default()
        });
        solver.constraints.get_mut(learnt[0].0).score.activity = 9.5;

        manager.bump_activity(learnt[0].0, &mut solver.constraints);

        assert_eq!(1, manager.statistics().num_rescales);
        assert!((solver.constraints.get(learnt[0].0).score.activity - 1.05).abs() < 1e-6);
        assert!((solver.constraints.get(learnt[1].0).score.activity - 0.2).abs() < 1e-6);
    }

    #[test]
    fn lbd_counts_distinct_non_root_levels() {
        let mut solver = Solver::default();
        let [a, b, c, d] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!a]).expect("feasible");
        solver.assignments.new_decision(b);
        let _ = solver.assignments.enqueue(c, crate::engine::Antecedent::None);
        solver.assignments.new_decision(d);

        assert_eq!(2, compute_lbd(&[a, b, c, d], &solver.assignments));
    }
}
