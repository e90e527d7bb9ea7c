use std::time::Instant;

use log::debug;
use log::info;

use super::BasicSolve;
use super::Enumerator;
use super::SolveLimits;
use super::SolveParams;
use super::SolveStatus;
use crate::basic_types::Literal;
use crate::engine::Solver;
use crate::results::SolveResult;
use crate::results::SolveSummary;
use crate::results::UnsatCore;
use crate::statistics::log_statistic;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::termination::InterruptHandle;
use crate::termination::TerminationCondition;

/// Solves a problem with a single solver, reporting its models to an [`Enumerator`].
///
/// The solve can be interrupted from another thread through
/// [`SequentialSolve::interrupt_handle`]; an interrupt which is raised while no solve runs stops
/// the next one right away.
#[derive(Debug)]
pub struct SequentialSolve {
    basic_solve: BasicSolve,
    interrupt: InterruptHandle,
}

impl Default for SequentialSolve {
    fn default() -> Self {
        SequentialSolve::new(SolveParams::default(), SolveLimits::default())
    }
}

impl SequentialSolve {
    pub fn new(params: SolveParams, limits: SolveLimits) -> SequentialSolve {
        SequentialSolve {
            basic_solve: BasicSolve::new(params, limits),
            interrupt: InterruptHandle::new(),
        }
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        self.interrupt.clone()
    }

    pub fn solve(
        &mut self,
        solver: &mut Solver,
        assumptions: &[Literal],
        enumerator: &mut dyn Enumerator,
        termination: &mut impl TerminationCondition,
    ) -> SolveSummary {
        let start = Instant::now();
        solver.set_interrupt_handle(self.interrupt.clone());
        // The assumptions are placed from the first decision level on; whatever a previous solve
        // left on the trail is dropped.
        solver.backtrack_to(0);

        let step = enumerator.excludes_models().then(|| solver.new_literal());
        let assumptions = step
            .into_iter()
            .chain(assumptions.iter().copied())
            .collect::<Vec<_>>();

        let mut last_model = None;
        let mut num_models = 0;
        let mut exhausted = false;
        let status = loop {
            let status = self
                .basic_solve
                .satisfiable(solver, &assumptions, termination);
            if status != SolveStatus::Satisfiable {
                exhausted = status == SolveStatus::Unsatisfiable;
                break status;
            }

            let model = solver.model();
            num_models += 1;
            info!("Found model {num_models}");
            let more = enumerator.on_model(&model);
            last_model = Some(model);
            if !more {
                break status;
            }
            if !enumerator.exclude_model(solver) {
                exhausted = true;
                break status;
            }
        };

        let result = match (last_model, status) {
            (Some(model), _) => SolveResult::Satisfiable(model),
            (None, SolveStatus::Unsatisfiable) => {
                SolveResult::Unsatisfiable(solver.take_core().map(|core| {
                    UnsatCore::new(
                        core.into_iter()
                            .filter(|&literal| Some(literal) != step)
                            .collect(),
                    )
                }))
            }
            (None, status) => SolveResult::Unknown {
                interrupted: status == SolveStatus::Interrupted,
                exhausted: status == SolveStatus::LimitReached,
            },
        };

        if let Some(step) = step {
            end_step(solver, step);
        }

        let mut statistics = self.basic_solve.statistics();
        statistics.time_spent_in_solver_ms = start.elapsed().as_millis();
        let summary = SolveSummary {
            result,
            num_models,
            exhausted,
            statistics,
            solver_statistics: solver.statistics(),
        };
        log_summary(&summary);
        summary
    }
}

/// Fixes the step literal to false at the root, which satisfies every constraint that depends
/// on the models of the step, and removes those constraints.
fn end_step(solver: &mut Solver, step: Literal) {
    solver.backtrack_to(0);
    if solver.add_clause([!step]).is_ok() {
        let _ = solver.simplify();
    }
    debug!("Closed the enumeration step {step}");
}

fn log_summary(summary: &SolveSummary) {
    let outcome = match &summary.result {
        SolveResult::Satisfiable(_) if summary.exhausted => "all models",
        SolveResult::Satisfiable(_) => "satisfiable",
        SolveResult::Unsatisfiable(_) => "unsatisfiable",
        SolveResult::Unknown { .. } => "unknown",
    };
    info!("Solve finished: {outcome} ({} models)", summary.num_models);
    log_statistic("result", outcome);
    summary.statistics.log(StatisticLogger::new("solve"));
    summary
        .solver_statistics
        .log(StatisticLogger::new("solver"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::solve::EnumerationMode;
    use crate::engine::solve::ModelEnumerator;
    use crate::termination::Indefinite;

    #[test]
    fn an_interrupt_raised_before_the_solve_stops_it() {
        let mut solver = Solver::default();
        let _ = solver.new_variables(5);
        let mut solve = SequentialSolve::default();
        solve.interrupt_handle().raise();

        let summary = solve.solve(
            &mut solver,
            &[],
            &mut ModelEnumerator::default(),
            &mut Indefinite,
        );

        assert_eq!(
            SolveResult::Unknown {
                interrupted: true,
                exhausted: false
            },
            summary.result
        );
        assert!(!solve.interrupt_handle().is_raised());
    }

    #[test]
    fn a_limited_enumeration_is_not_exhausted() {
        let mut solver = Solver::default();
        let _ = solver.new_variables(4);
        let mut enumerator = ModelEnumerator::new(EnumerationMode::All { limit: Some(3) });

        let summary = SequentialSolve::default().solve(
            &mut solver,
            &[],
            &mut enumerator,
            &mut Indefinite,
        );

        assert_eq!(3, summary.num_models);
        assert!(!summary.exhausted);
        assert!(summary.result.is_satisfiable());
    }

    #[test]
    fn blocking_clauses_do_not_outlive_their_solve() {
        let mut solver = Solver::default();
        let [a, _] = std::array::from_fn(|_| solver.new_literal());
        let mut solve = SequentialSolve::default();

        let mut restricted = ModelEnumerator::new(EnumerationMode::All { limit: None });
        let summary = solve.solve(&mut solver, &[a], &mut restricted, &mut Indefinite);
        assert_eq!(2, summary.num_models);
        assert!(summary.exhausted);

        let mut unrestricted = ModelEnumerator::new(EnumerationMode::All { limit: None });
        let summary = solve.solve(&mut solver, &[], &mut unrestricted, &mut Indefinite);
        assert_eq!(4, summary.num_models);
        assert_eq!(0, solver.num_constraints());
    }

    #[test]
    fn a_core_never_contains_the_enumeration_step() {
        let mut solver = Solver::default();
        let [a, b] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!a, !b]).expect("feasible");
        let mut enumerator = ModelEnumerator::new(EnumerationMode::All { limit: None });

        let summary =
            SequentialSolve::default().solve(&mut solver, &[a, b], &mut enumerator, &mut Indefinite);

        let SolveResult::Unsatisfiable(Some(core)) = summary.result else {
            panic!("expected a core, got {:?}", summary.result);
        };
        assert!(core.literals().iter().all(|&literal| literal == a || literal == b));
        assert!(!core.literals().is_empty());
    }
}
