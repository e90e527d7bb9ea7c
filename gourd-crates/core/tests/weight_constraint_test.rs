#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use gourd_core::results::SolveResult;
use gourd_core::ConstraintOperationError;
use gourd_core::Literal;
use gourd_core::Solver;
use gourd_core::WeightedLiteral;
use helpers::enumerate_all;
use helpers::solve_once;
use helpers::Problem;

mod helpers;

fn weighted(literals: &[Literal], weights: &[i64]) -> Vec<WeightedLiteral> {
    literals
        .iter()
        .zip(weights)
        .map(|(&literal, &weight)| WeightedLiteral::new(literal, weight))
        .collect()
}

#[test]
fn a_tight_bound_forces_the_remaining_literals() {
    let mut solver = Solver::default();
    let [x, y, z] = std::array::from_fn(|_| solver.new_literal());
    solver
        .add_weight_constraint(Literal::TRUE, weighted(&[x, y, z], &[2, 2, 1]), 3)
        .expect("feasible");

    let summary = solve_once(&mut solver, &[!x]);

    let model = summary.result.model().expect("satisfiable");
    assert!(model.value(y));
    assert!(model.value(z));
}

#[test]
fn a_second_false_literal_forces_the_rest() {
    let mut solver = Solver::default();
    let [x, y, z, u] = std::array::from_fn(|_| solver.new_literal());
    solver
        .add_weight_constraint(Literal::TRUE, weighted(&[x, y, z, u], &[2, 2, 2, 2]), 3)
        .expect("feasible");

    let summary = solve_once(&mut solver, &[!x, !y]);
    let model = summary.result.model().expect("satisfiable");
    assert!(model.value(z));
    assert!(model.value(u));

    let summary = solve_once(&mut solver, &[!x, !y, !z]);
    let SolveResult::Unsatisfiable(Some(core)) = summary.result else {
        panic!("expected a core, got {:?}", summary.result);
    };
    assert_eq!(3, core.len());
    assert!(core.contains(!x) && core.contains(!y) && core.contains(!z));
}

#[test]
fn the_head_is_equivalent_to_the_body() {
    let mut solver = Solver::default();
    let [head, a, b, c] = std::array::from_fn(|_| solver.new_literal());
    solver
        .add_cardinality_constraint(head, [a, b, c], 2)
        .expect("feasible");

    let (summary, enumerator) = enumerate_all(&mut solver);

    // Every assignment of the body decides the head.
    assert_eq!(8, summary.num_models);
    for model in enumerator.models() {
        let count = [a, b, c].iter().filter(|&&literal| model.value(literal)).count();
        assert_eq!(count >= 2, model.value(head), "{model}");
    }
}

#[test]
fn an_unreachable_bound_is_infeasible() {
    let mut solver = Solver::default();
    let [a, b] = std::array::from_fn(|_| solver.new_literal());

    assert_eq!(
        Err(ConstraintOperationError::InfeasibleWeightConstraint),
        solver.add_weight_constraint(Literal::TRUE, weighted(&[a, b], &[1, 1]), 3)
    );
    assert!(solver.is_infeasible());
}

#[test]
fn negative_weights_are_normalised() {
    let mut solver = Solver::default();
    let [a, b] = std::array::from_fn(|_| solver.new_literal());
    // 2a - b >= 2 holds only for a and not b.
    solver
        .add_weight_constraint(Literal::TRUE, weighted(&[a, b], &[2, -1]), 2)
        .expect("feasible");

    let (summary, enumerator) = enumerate_all(&mut solver);

    assert_eq!(1, summary.num_models);
    let model = &enumerator.models()[0];
    assert!(model.value(a));
    assert!(!model.value(b));
}

#[test]
fn random_weight_constraints_agree_with_brute_force() {
    for seed in 0..40 {
        let problem = Problem::random(seed, 7, 6, 3);
        let expected = problem.count_models();
        let Some(mut solver) = problem.to_solver() else {
            assert_eq!(0, expected, "seed {seed}");
            continue;
        };

        let (summary, enumerator) = enumerate_all(&mut solver);

        assert_eq!(expected, summary.num_models, "seed {seed}: {problem:?}");
        assert!(enumerator
            .models()
            .iter()
            .all(|model| problem.is_model(model)));
    }
}
