#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::thread;
use std::time::Duration;

use gourd_core::engine::solve::EnumerationMode;
use gourd_core::engine::solve::ModelEnumerator;
use gourd_core::engine::solve::SequentialSolve;
use gourd_core::engine::solve::SolveLimits;
use gourd_core::engine::solve::SolveParams;
use gourd_core::results::SolveResult;
use gourd_core::termination::DecisionBudget;
use gourd_core::termination::Indefinite;
use gourd_core::termination::TimeBudget;
use gourd_core::Literal;
use gourd_core::Solver;
use gourd_core::Variable;
use helpers::enumerate_all;
use helpers::solve_once;
use helpers::Problem;

mod helpers;

#[test]
fn random_clause_sets_agree_with_brute_force() {
    for seed in 0..60 {
        let problem = Problem::random(seed, 8, 30, 0);
        let expected_satisfiable = problem.count_models() > 0;

        let Some(mut solver) = problem.to_solver() else {
            assert!(!expected_satisfiable, "seed {seed}");
            continue;
        };
        let summary = solve_once(&mut solver, &[]);

        match summary.result {
            SolveResult::Satisfiable(model) => {
                assert!(expected_satisfiable, "seed {seed}");
                assert!(problem.is_model(&model), "seed {seed}: {model}");
            }
            SolveResult::Unsatisfiable(core) => {
                assert!(!expected_satisfiable, "seed {seed}");
                assert!(core.is_none());
            }
            SolveResult::Unknown { .. } => panic!("seed {seed} was not decided"),
        }
    }
}

#[test]
fn enumeration_finds_every_model_exactly_once() {
    for seed in 0..30 {
        let problem = Problem::random(seed, 7, 12, 0);
        let expected = problem.count_models();
        let Some(mut solver) = problem.to_solver() else {
            assert_eq!(0, expected, "seed {seed}");
            continue;
        };

        let (summary, enumerator) = enumerate_all(&mut solver);

        assert_eq!(expected, summary.num_models, "seed {seed}");
        assert!(summary.exhausted, "seed {seed}");
        let models = enumerator.models();
        assert!(models.iter().all(|model| problem.is_model(model)));
        for (index, model) in models.iter().enumerate() {
            assert!(
                models[index + 1..].iter().all(|other| other != model),
                "seed {seed}: {model} was reported twice"
            );
        }
    }
}

#[test]
fn a_formula_without_constraints_has_every_assignment_as_model() {
    let mut solver = Solver::default();
    let _ = solver.new_variables(4);

    let (summary, _) = enumerate_all(&mut solver);

    assert_eq!(16, summary.num_models);
    assert!(summary.exhausted);
}

#[test]
fn a_limited_enumeration_stops_at_the_limit() {
    let mut solver = Solver::default();
    let _ = solver.new_variables(5);
    let mut enumerator = ModelEnumerator::new(EnumerationMode::All { limit: Some(7) });

    let summary =
        SequentialSolve::default().solve(&mut solver, &[], &mut enumerator, &mut Indefinite);

    assert_eq!(7, summary.num_models);
    assert_eq!(7, enumerator.num_models());
    assert!(!summary.exhausted);
}

#[test]
fn a_restricted_enumeration_leaves_the_problem_unchanged() {
    for seed in 0..20 {
        let problem = Problem::random(seed, 6, 8, 1);
        let expected = problem.count_models();
        let Some(mut solver) = problem.to_solver() else {
            continue;
        };
        let first = Literal::positive(Variable::new(1));
        let mut enumerator = ModelEnumerator::new(EnumerationMode::All { limit: None });
        let _ = SequentialSolve::default().solve(
            &mut solver,
            &[first],
            &mut enumerator,
            &mut Indefinite,
        );

        let (summary, _) = enumerate_all(&mut solver);

        assert_eq!(expected, summary.num_models, "seed {seed}");
    }
}

fn pigeonhole(solver: &mut Solver, pigeons: usize, holes: usize) {
    let in_hole = (0..pigeons)
        .map(|_| {
            (0..holes)
                .map(|_| solver.new_literal())
                .collect::<Vec<Literal>>()
        })
        .collect::<Vec<_>>();
    for pigeon in in_hole.iter() {
        solver.add_clause(pigeon.iter().copied()).expect("feasible");
    }
    for hole in 0..holes {
        for first in 0..pigeons {
            for second in first + 1..pigeons {
                solver
                    .add_clause([!in_hole[first][hole], !in_hole[second][hole]])
                    .expect("feasible");
            }
        }
    }
}

#[test]
fn pigeonhole_is_unsatisfiable() {
    let mut solver = Solver::default();
    pigeonhole(&mut solver, 6, 5);

    let summary = solve_once(&mut solver, &[]);

    assert_eq!(SolveResult::Unsatisfiable(None), summary.result);
    assert!(summary.solver_statistics.engine.num_conflicts > 0);
}

#[test]
fn a_decision_budget_leaves_the_result_unknown() {
    let mut solver = Solver::default();
    let _ = solver.new_variables(10);

    let summary = SequentialSolve::default().solve(
        &mut solver,
        &[],
        &mut ModelEnumerator::default(),
        &mut DecisionBudget::new(3),
    );

    assert_eq!(
        SolveResult::Unknown {
            interrupted: true,
            exhausted: false
        },
        summary.result
    );
}

#[test]
fn a_spent_time_budget_stops_before_the_first_decision() {
    let mut solver = Solver::default();
    pigeonhole(&mut solver, 6, 5);

    let summary = SequentialSolve::default().solve(
        &mut solver,
        &[],
        &mut ModelEnumerator::default(),
        &mut TimeBudget::new(Duration::ZERO),
    );

    assert_eq!(
        SolveResult::Unknown {
            interrupted: true,
            exhausted: false
        },
        summary.result
    );
    assert_eq!(0, summary.solver_statistics.engine.num_decisions);
}

#[test]
fn a_conflict_limit_leaves_the_result_unknown() {
    let mut solver = Solver::default();
    pigeonhole(&mut solver, 4, 3);

    let mut solve = SequentialSolve::new(SolveParams::default(), SolveLimits::conflicts(0));
    let summary = solve.solve(
        &mut solver,
        &[],
        &mut ModelEnumerator::default(),
        &mut Indefinite,
    );
    assert_eq!(
        SolveResult::Unknown {
            interrupted: false,
            exhausted: true
        },
        summary.result
    );
    assert_eq!(0, summary.solver_statistics.engine.num_conflicts);

    let mut solve = SequentialSolve::new(SolveParams::default(), SolveLimits::conflicts(5));
    let summary = solve.solve(
        &mut solver,
        &[],
        &mut ModelEnumerator::default(),
        &mut Indefinite,
    );
    // A short refutation may still fit into the budget.
    assert!(!summary.result.is_satisfiable());
    assert!(summary.solver_statistics.engine.num_conflicts <= 5);
}

#[test]
fn another_thread_can_interrupt_the_solve() {
    let mut solver = Solver::default();
    pigeonhole(&mut solver, 11, 10);
    let mut solve = SequentialSolve::default();
    let handle = solve.interrupt_handle();

    let interrupter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        handle.raise();
    });
    let summary = solve.solve(
        &mut solver,
        &[],
        &mut ModelEnumerator::default(),
        &mut Indefinite,
    );
    interrupter.join().expect("the interrupter does not panic");

    assert_eq!(
        SolveResult::Unknown {
            interrupted: true,
            exhausted: false
        },
        summary.result
    );
}
