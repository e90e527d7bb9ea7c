#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use gourd_core::results::SolveResult;
use gourd_core::Solver;
use helpers::solve_once;

mod helpers;

#[test]
fn the_core_only_holds_the_assumptions_involved_in_the_conflict() {
    let mut solver = Solver::default();
    let [a, b, c, d] = std::array::from_fn(|_| solver.new_literal());
    solver.add_clause([!a, !b]).expect("feasible");
    solver.add_clause([!b, c]).expect("feasible");

    let summary = solve_once(&mut solver, &[d, a, c, b]);

    let SolveResult::Unsatisfiable(Some(core)) = summary.result else {
        panic!("expected a core, got {:?}", summary.result);
    };
    assert_eq!(2, core.len());
    assert!(core.contains(a));
    assert!(core.contains(b));
    assert!(!core.contains(c));
    assert!(!core.contains(d));
}

#[test]
fn the_solver_stays_usable_after_a_failed_solve() {
    let mut solver = Solver::default();
    let [a, b] = std::array::from_fn(|_| solver.new_literal());
    solver.add_clause([!a, !b]).expect("feasible");

    assert!(solve_once(&mut solver, &[a, b]).result.is_unsatisfiable());

    let summary = solve_once(&mut solver, &[a]);
    let model = summary.result.model().expect("satisfiable without b");
    assert!(model.value(a));
    assert!(!model.value(b));

    let summary = solve_once(&mut solver, &[b]);
    let model = summary.result.model().expect("satisfiable without a");
    assert!(!model.value(a));
    assert!(model.value(b));
}

#[test]
fn a_root_unsatisfiable_problem_has_an_empty_core() {
    let mut solver = Solver::default();
    let [a, b] = std::array::from_fn(|_| solver.new_literal());
    solver.add_clause([a]).expect("feasible");
    assert!(solver.add_clause([!a]).is_err());

    let summary = solve_once(&mut solver, &[b]);

    let SolveResult::Unsatisfiable(Some(core)) = summary.result else {
        panic!("expected an empty core, got {:?}", summary.result);
    };
    assert!(core.is_empty());
}

#[test]
fn a_conflict_found_by_search_gives_a_core_over_the_assumptions() {
    let mut solver = Solver::default();
    let [a, b, x, y] = std::array::from_fn(|_| solver.new_literal());
    // Under a and b, x and y must differ and be equal at once.
    for clause in [
        [!a, x, y],
        [!a, !x, !y],
        [!b, x, !y],
        [!b, !x, y],
    ] {
        solver.add_clause(clause).expect("feasible");
    }

    let summary = solve_once(&mut solver, &[a, b]);

    let SolveResult::Unsatisfiable(Some(core)) = summary.result else {
        panic!("expected a core, got {:?}", summary.result);
    };
    assert!(!core.is_empty());
    assert!(core.literals().iter().all(|&literal| literal == a || literal == b));
    assert!(solve_once(&mut solver, &[a]).result.is_satisfiable());
}
