#![allow(
    dead_code,
    reason = "not every test file uses every helper; each one is compiled as its own crate"
)]

use gourd_core::engine::solve::EnumerationMode;
use gourd_core::engine::solve::ModelEnumerator;
use gourd_core::engine::solve::SequentialSolve;
use gourd_core::results::Model;
use gourd_core::results::SolveSummary;
use gourd_core::termination::Indefinite;
use gourd_core::Literal;
use gourd_core::Solver;
use gourd_core::Variable;
use gourd_core::WeightedLiteral;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

/// A small problem which is both given to a [`Solver`] and evaluated by brute force.
#[derive(Clone, Debug, Default)]
pub struct Problem {
    pub num_variables: usize,
    pub clauses: Vec<Vec<Literal>>,
    /// `(head, literals, bound)` meaning `head ↔ Σ wᵢ·xᵢ ≥ bound`.
    pub weight_constraints: Vec<(Literal, Vec<WeightedLiteral>, i64)>,
}

impl Problem {
    pub fn random(seed: u64, num_variables: usize, num_clauses: usize, num_weights: usize) -> Problem {
        let mut random = SmallRng::seed_from_u64(seed);
        let literal = |random: &mut SmallRng| {
            let variable = Variable::new(random.gen_range(1..=num_variables as u32));
            Literal::new(variable, random.gen_bool(0.5))
        };

        let clauses = (0..num_clauses)
            .map(|_| {
                let len = random.gen_range(1..=3);
                (0..len).map(|_| literal(&mut random)).collect()
            })
            .collect();
        let weight_constraints = (0..num_weights)
            .map(|_| {
                let len = random.gen_range(2..=4);
                let literals = (0..len)
                    .map(|_| WeightedLiteral::new(literal(&mut random), random.gen_range(1..=3)))
                    .collect::<Vec<_>>();
                // The head stays out of its own body.
                let head = match literal(&mut random) {
                    head if random.gen_bool(0.5)
                        && literals
                            .iter()
                            .all(|weighted| weighted.literal.variable() != head.variable()) =>
                    {
                        head
                    }
                    _ => Literal::TRUE,
                };
                let bound = random.gen_range(1..=5);
                (head, literals, bound)
            })
            .collect();

        Problem {
            num_variables,
            clauses,
            weight_constraints,
        }
    }

    /// Creates a solver holding the problem, or `None` if it is already infeasible at the root.
    pub fn to_solver(&self) -> Option<Solver> {
        let mut solver = Solver::default();
        let _ = solver.new_variables(self.num_variables);
        for clause in self.clauses.iter() {
            if solver.add_clause(clause.iter().copied()).is_err() {
                return None;
            }
        }
        for (head, literals, bound) in self.weight_constraints.iter() {
            if solver
                .add_weight_constraint(*head, literals.iter().copied(), *bound)
                .is_err()
            {
                return None;
            }
        }
        Some(solver)
    }

    pub fn is_satisfied_by(&self, value: impl Fn(Literal) -> bool) -> bool {
        let clauses_hold = self
            .clauses
            .iter()
            .all(|clause| clause.iter().any(|&literal| value(literal)));
        let weights_hold = self
            .weight_constraints
            .iter()
            .all(|(head, literals, bound)| {
                let sum: i64 = literals
                    .iter()
                    .filter(|weighted| value(weighted.literal))
                    .map(|weighted| weighted.weight)
                    .sum();
                value(*head) == (sum >= *bound)
            });
        clauses_hold && weights_hold
    }

    /// Counts the total assignments which satisfy the problem.
    pub fn count_models(&self) -> u64 {
        (0..1_u64 << self.num_variables)
            .filter(|bits| {
                self.is_satisfied_by(|literal| {
                    if literal.variable().is_sentinel() {
                        return literal.is_positive();
                    }
                    let is_true = (bits >> (literal.variable().index() - 1)) & 1 == 1;
                    is_true == literal.is_positive()
                })
            })
            .count() as u64
    }

    pub fn is_model(&self, model: &Model) -> bool {
        self.is_satisfied_by(|literal| model.value(literal))
    }
}

/// Routes the solver's log output through the test harness; `RUST_LOG` picks the level.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn enumerate_all(solver: &mut Solver) -> (SolveSummary, ModelEnumerator) {
    init_logging();
    let mut enumerator = ModelEnumerator::new(EnumerationMode::All { limit: None });
    let summary =
        SequentialSolve::default().solve(solver, &[], &mut enumerator, &mut Indefinite);
    (summary, enumerator)
}

pub fn solve_once(solver: &mut Solver, assumptions: &[Literal]) -> SolveSummary {
    init_logging();
    SequentialSolve::default().solve(
        solver,
        assumptions,
        &mut ModelEnumerator::default(),
        &mut Indefinite,
    )
}
