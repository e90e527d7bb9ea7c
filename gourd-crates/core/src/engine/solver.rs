use std::mem;

use log::debug;
use log::info;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::conflict_analysis::ConflictAnalyser;
use super::conflict_analysis::ConflictAnalysisContext;
use super::constraints::ClauseCreateFlag;
use super::constraints::ClauseCreator;
use super::constraints::ClauseStatus;
use super::constraints::ConstraintId;
use super::constraints::ConstraintInfo;
use super::constraints::ConstraintKind;
use super::constraints::ConstraintScore;
use super::constraints::ConstraintStore;
use super::constraints::ConstraintType;
use super::constraints::LoopFormula;
use super::constraints::PropagationContext;
use super::constraints::SharedLiterals;
use super::constraints::StoredConstraint;
use super::constraints::WeightConstraint;
use super::learning::compute_lbd;
use super::learning::LearnedConstraintManager;
use super::learning::LearningOptions;
use super::propagation::propagate_units;
use super::propagation::MessageHandler;
use super::propagation::PostPropagator;
use super::propagation::PropagatorList;
use super::solve::DynamicRestart;
use super::Antecedent;
use super::Assignments;
use super::EngineStatistics;
use super::SolverStatistics;
use super::WatchLists;
use crate::basic_types::moving_averages::MovingAverage;
use crate::basic_types::Conflict;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::basic_types::Variable;
use crate::basic_types::WeightedLiteral;
use crate::branching::Brancher;
use crate::branching::SelectionContext;
use crate::branching::VsidsBrancher;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;
use crate::results::Model;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;
use crate::termination::InterruptHandle;
use crate::termination::TerminationCondition;

/// Options of a [`Solver`] which are fixed once it is created.
#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    /// The seed of the random generator used for random decisions and shuffling.
    pub random_seed: u64,
    pub learning: LearningOptions,
    /// Learnt clauses with more literals than this are contracted; `0` disables contraction.
    pub contraction_limit: usize,
    /// The number of literals a contracted clause keeps active.
    pub contraction_keep: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            random_seed: 42,
            learning: LearningOptions::default(),
            contraction_limit: 250,
            contraction_keep: 4,
        }
    }
}

/// The outcome of a single call to [`Solver::search`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// The assignment is a model; it stays on the trail until the next backtrack.
    Satisfiable,
    /// No model exists under the assumptions; see [`Solver::take_core`].
    Unsatisfiable,
    /// The conflict limit was reached or a restart was requested.
    Limit,
    /// The termination condition or the interrupt handle stopped the search.
    Interrupted,
}

/// A literal assigned on a higher level than the one its antecedent became unit on. Backtracking
/// to a level in between assigns it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingImplication {
    pub(crate) literal: Literal,
    pub(crate) level: usize,
    pub(crate) antecedent: Antecedent,
}

/// A CDCL solver over clauses, weight constraints and loop formulas.
///
/// Variable 0 is the sentinel, which is true at the root; [`Literal::TRUE`] and
/// [`Literal::FALSE`] can be used as constants in every constraint. Constraints are added at the
/// root, the solver backtracks there if needed. The search itself is driven by [`Solver::search`],
/// usually through [`BasicSolve`](crate::engine::solve::BasicSolve).
#[derive(Debug)]
pub struct Solver {
    pub(crate) assignments: Assignments,
    pub(crate) watch_lists: WatchLists,
    pub(crate) constraints: ConstraintStore,
    pub(crate) post_propagators: PropagatorList,
    pub(crate) brancher: Box<dyn Brancher>,
    pub(crate) learned_constraints: LearnedConstraintManager,
    pub(crate) options: SolverOptions,
    pub(crate) statistics: EngineStatistics,
    /// A conflict found while adding a constraint, handed to the next propagation.
    pub(crate) pending_conflict: Option<Conflict>,
    /// Literals assigned above the level that implies them.
    pub(crate) pending_implications: Vec<PendingImplication>,
    conflict_analyser: ConflictAnalyser,
    random: SmallRng,
    infeasible: bool,
    core: Option<Vec<Literal>>,
    interrupt: InterruptHandle,
}

impl Default for Solver {
    fn default() -> Self {
        Solver::with_options(SolverOptions::default())
    }
}

impl Solver {
    pub fn with_options(options: SolverOptions) -> Solver {
        Solver::with_brancher(options, Box::new(VsidsBrancher::default()))
    }

    pub fn with_brancher(options: SolverOptions, brancher: Box<dyn Brancher>) -> Solver {
        let interrupt = InterruptHandle::new();
        let mut post_propagators = PropagatorList::default();
        post_propagators.add(Box::new(MessageHandler::new(interrupt.clone())));

        let mut watch_lists = WatchLists::default();
        watch_lists.grow();

        let mut solver = Solver {
            assignments: Assignments::default(),
            watch_lists,
            constraints: ConstraintStore::default(),
            post_propagators,
            brancher,
            learned_constraints: LearnedConstraintManager::new(options.learning),
            options,
            statistics: EngineStatistics::default(),
            pending_conflict: None,
            pending_implications: vec![],
            conflict_analyser: ConflictAnalyser::default(),
            random: SmallRng::seed_from_u64(options.random_seed),
            infeasible: false,
            core: None,
            interrupt,
        };
        solver.brancher.on_new_variable(Variable::SENTINEL);
        solver
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn new_variable(&mut self) -> Variable {
        let variable = self.assignments.grow();
        self.watch_lists.grow();
        self.brancher.on_new_variable(variable);
        variable
    }

    pub fn new_variables(&mut self, num_variables: usize) -> Vec<Variable> {
        (0..num_variables).map(|_| self.new_variable()).collect()
    }

    /// The positive literal of a new variable.
    pub fn new_literal(&mut self) -> Literal {
        Literal::positive(self.new_variable())
    }

    /// The number of variables, not counting the sentinel.
    pub fn num_variables(&self) -> usize {
        self.assignments.num_variables() - 1
    }

    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    /// Whether the solver has found the problem to be unsatisfiable without any assumption.
    pub fn is_infeasible(&self) -> bool {
        self.infeasible
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_learnt_constraints(&self) -> usize {
        self.constraints.num_learnt()
    }

    fn check_variables<'a>(
        &self,
        literals: impl IntoIterator<Item = &'a Literal>,
    ) -> Result<(), ConstraintOperationError> {
        match literals
            .into_iter()
            .find(|literal| !self.assignments.is_known(literal.variable()))
        {
            Some(literal) => Err(ConstraintOperationError::UnknownVariable(literal.variable())),
            None => Ok(()),
        }
    }

    fn check_feasible(&self) -> Result<(), ConstraintOperationError> {
        if self.infeasible {
            Err(ConstraintOperationError::InfeasibleState)
        } else {
            Ok(())
        }
    }

    fn declare_infeasible(&mut self) {
        debug!("The problem is infeasible at the root");
        self.pending_conflict = None;
        self.infeasible = true;
    }

    /// Adds the clause over `literals` to the problem.
    ///
    /// Duplicate literals and literals which are false at the root are removed, a clause which
    /// is satisfied at the root is dropped and a unit clause is propagated right away.
    pub fn add_clause(
        &mut self,
        literals: impl IntoIterator<Item = Literal>,
    ) -> Result<(), ConstraintOperationError> {
        self.check_feasible()?;
        let literals = literals.into_iter().collect::<Vec<_>>();
        self.check_variables(&literals)?;
        self.backtrack_to(0);

        let mut creator = ClauseCreator::default();
        let _ = creator.start(ConstraintType::Static);
        for &literal in literals.iter() {
            let _ = creator.add(literal);
        }
        let _ = creator.prepare(self, true);
        let result = creator.end(
            self,
            ClauseCreateFlag::NoPrepare | ClauseCreateFlag::NotRootSat,
        );

        if !result.ok {
            self.declare_infeasible();
            return Err(ConstraintOperationError::InfeasibleClause);
        }
        if result.status == ClauseStatus::Unit && self.propagate_units().is_err() {
            self.declare_infeasible();
            return Err(ConstraintOperationError::InfeasibleClause);
        }
        Ok(())
    }

    /// Adds `head ↔ Σ wⱼ·xⱼ ≥ bound`. Use [`Literal::TRUE`] as the head for a plain
    /// constraint.
    ///
    /// The head must not occur in the body. Neither that nor weights which overflow once
    /// normalised make the solver infeasible; the constraint is rejected and nothing changes.
    pub fn add_weight_constraint(
        &mut self,
        head: Literal,
        literals: impl IntoIterator<Item = WeightedLiteral>,
        bound: i64,
    ) -> Result<(), ConstraintOperationError> {
        self.check_feasible()?;
        let literals = literals.into_iter().collect::<Vec<_>>();
        self.check_variables(
            std::iter::once(&head).chain(literals.iter().map(|literal| &literal.literal)),
        )?;
        if !head.variable().is_sentinel()
            && literals
                .iter()
                .any(|literal| literal.literal.variable() == head.variable())
        {
            return Err(ConstraintOperationError::HeadInBody(head.variable()));
        }
        self.backtrack_to(0);

        let result = WeightConstraint::create(self, head, literals, bound);
        if result == Err(ConstraintOperationError::InfeasibleWeightConstraint) {
            self.declare_infeasible();
        }
        result
    }

    /// Adds `head ↔ |{xⱼ true}| ≥ bound`.
    pub fn add_cardinality_constraint(
        &mut self,
        head: Literal,
        literals: impl IntoIterator<Item = Literal>,
        bound: i64,
    ) -> Result<(), ConstraintOperationError> {
        self.add_weight_constraint(
            head,
            literals
                .into_iter()
                .map(|literal| WeightedLiteral::new(literal, 1)),
            bound,
        )
    }

    /// Adds the loop formula `a → (b₁ ∨ … ∨ bₖ)` for every atom `a` in `atoms`, as a learnt
    /// constraint.
    pub fn add_loop_formula(
        &mut self,
        atoms: Vec<Literal>,
        bodies: Vec<Literal>,
    ) -> Result<(), ConstraintOperationError> {
        self.check_feasible()?;
        self.check_variables(atoms.iter().chain(bodies.iter()))?;
        self.backtrack_to(0);

        if LoopFormula::create(self, atoms, bodies).is_err() {
            self.declare_infeasible();
            return Err(ConstraintOperationError::InfeasibleLoopFormula);
        }
        Ok(())
    }

    /// Adds a clause whose literals are shared with other solvers, e.g. one learnt by another
    /// search thread. This may happen on any decision level; if the clause is falsified by the
    /// current assignment, the conflict is analysed by the next search.
    pub fn add_shared_clause(
        &mut self,
        literals: SharedLiterals,
    ) -> Result<(), ConstraintOperationError> {
        self.check_feasible()?;
        self.check_variables(literals.literals())?;

        let constraint_type = literals.constraint_type();
        let result = ClauseCreator::integrate(
            self,
            literals,
            ClauseCreateFlag::NotRootSat.into(),
            constraint_type,
        );
        if !result.ok && self.assignments.decision_level() == 0 {
            self.declare_infeasible();
            return Err(ConstraintOperationError::InfeasibleClause);
        }
        Ok(())
    }

    pub fn add_post_propagator(&mut self, propagator: Box<dyn PostPropagator>) {
        debug!("Adding post-propagator {}", propagator.name());
        self.post_propagators.add(propagator);
    }

    pub fn post_propagators(&self) -> &PropagatorList {
        &self.post_propagators
    }

    pub fn post_propagators_mut(&mut self) -> &mut PropagatorList {
        &mut self.post_propagators
    }

    /// The handle which interrupts the search of this solver. A raised handle which is not
    /// observed by a running search interrupts the next one.
    pub fn interrupt_handle(&self) -> &InterruptHandle {
        &self.interrupt
    }

    /// Replaces the interrupt handle, e.g. to share one handle between several solvers.
    pub fn set_interrupt_handle(&mut self, handle: InterruptHandle) {
        if let Some(message_handler) = self.post_propagators.find_mut::<MessageHandler>() {
            message_handler.set_handle(handle.clone());
        }
        self.interrupt = handle;
    }

    /// Adds a constraint to the store and attaches its watches.
    pub(crate) fn store_constraint(
        &mut self,
        info: ConstraintInfo,
        kind: ConstraintKind,
    ) -> ConstraintId {
        let score = if info.constraint_type().is_learnt() {
            self.learned_constraints
                .initial_score(&kind.literals(), &self.assignments)
        } else {
            ConstraintScore::default()
        };
        let id = self.constraints.add(StoredConstraint { info, score, kind });
        self.constraints.get(id).kind.attach(id, &mut self.watch_lists);
        id
    }

    /// Propagates what the stored constraint implies under the current assignment.
    pub(crate) fn initialise_constraint(&mut self, id: ConstraintId) -> PropagationStatus {
        let mut context = PropagationContext {
            assignments: &mut self.assignments,
            watch_lists: &mut self.watch_lists,
        };
        self.constraints.get_mut(id).kind.initialise(id, &mut context)
    }

    pub(crate) fn take_pending_conflict(&mut self) -> Conflict {
        self.pending_conflict
            .take()
            .unwrap_or(Conflict::Nogood(vec![]))
    }

    /// Unit propagation only, starting with a pending conflict if there is one.
    pub(crate) fn propagate_units(&mut self) -> PropagationStatus {
        if let Some(conflict) = self.pending_conflict.take() {
            return Err(conflict);
        }
        let (num_propagated, status) = propagate_units(
            &mut self.assignments,
            &mut self.watch_lists,
            &mut self.constraints,
        );
        self.statistics.num_propagations += num_propagated;
        status
    }

    /// Runs unit propagation and the post-propagators to a joint fixpoint.
    pub fn propagate(&mut self) -> PropagationStatus {
        let mut post_propagators = mem::take(&mut self.post_propagators);
        let status = post_propagators.propagate(self);
        self.restore_post_propagators(post_propagators);
        status
    }

    fn restore_post_propagators(&mut self, post_propagators: PropagatorList) {
        let added = mem::replace(&mut self.post_propagators, post_propagators);
        self.post_propagators.append(added);
    }

    /// Removes every decision level above `level`.
    ///
    /// Constraints with an undo hook on a removed level are notified, and a pending conflict is
    /// dropped since it no longer holds.
    pub fn backtrack_to(&mut self, level: usize) {
        if level >= self.assignments.decision_level() {
            return;
        }

        let hooks = self.assignments.take_undo_hooks(level);
        for literal in self.assignments.synchronise(level) {
            self.brancher.on_unassign_literal(literal);
        }
        for id in hooks {
            if self.constraints.contains(id) {
                self.constraints
                    .get_mut(id)
                    .kind
                    .undo_level(id, &mut self.assignments);
            }
        }
        self.post_propagators.undo_level(&self.assignments);
        self.pending_conflict = None;

        self.reassign_pending_implications(level);
    }

    /// Records that `literal`, assigned on the current level, is already implied on `level`.
    pub(crate) fn add_pending_implication(
        &mut self,
        literal: Literal,
        level: usize,
        antecedent: Antecedent,
    ) {
        gourd_assert_simple!(level < self.assignments.decision_level());
        self.pending_implications.push(PendingImplication {
            literal,
            level,
            antecedent,
        });
    }

    /// Assigns the pending implications which the backtrack to `level` undid but whose
    /// implying level survived. Those implied below `level` stay pending.
    fn reassign_pending_implications(&mut self, level: usize) {
        if self.pending_implications.is_empty() {
            return;
        }
        for implication in mem::take(&mut self.pending_implications) {
            if implication.level > level {
                continue;
            }
            let antecedent = if level == 0 {
                Antecedent::None
            } else {
                implication.antecedent
            };
            if !self.assignments.enqueue(implication.literal, antecedent) {
                self.pending_conflict = Some(Conflict::Nogood(vec![!implication.literal]));
            }
            if implication.level < level {
                self.pending_implications.push(implication);
            }
        }
    }

    /// Backtracks to the root and tells the brancher about it.
    pub fn restart(&mut self) {
        self.backtrack_to(0);
        self.brancher.on_restart();
    }

    /// The literals which were true when `literal` was assigned and which implied it.
    pub(crate) fn reason(&self, literal: Literal) -> Vec<Literal> {
        let mut reason = vec![];
        self.assignments
            .antecedent(literal.variable())
            .reason(literal, &self.constraints, &self.assignments, &mut reason);
        reason
    }

    pub fn value(&self, literal: Literal) -> Option<bool> {
        self.assignments.value(literal)
    }

    /// The current assignment of every variable; unassigned variables are reported as false.
    pub fn model(&self) -> Model {
        Model::from_assignments(&self.assignments)
    }

    /// The failed assumptions of the last unsatisfiable search, if it had assumptions.
    pub fn take_core(&mut self) -> Option<Vec<Literal>> {
        self.core.take()
    }

    /// Searches until a model is found, unsatisfiability is proven under `assumptions`, or
    /// `conflict_limit` conflicts have been analysed.
    ///
    /// The `i`-th assumption is placed on decision level `i + 1`; an assumption which is
    /// already true gets an empty level.
    pub fn search(
        &mut self,
        conflict_limit: u64,
        assumptions: &[Literal],
        termination: &mut impl TerminationCondition,
    ) -> SearchResult {
        self.search_with(conflict_limit, None, assumptions, termination)
    }

    pub(crate) fn search_with(
        &mut self,
        conflict_limit: u64,
        mut restart: Option<&mut DynamicRestart>,
        assumptions: &[Literal],
        termination: &mut impl TerminationCondition,
    ) -> SearchResult {
        gourd_assert_moderate!(assumptions
            .iter()
            .all(|literal| self.assignments.is_known(literal.variable())));
        self.core = None;
        if self.infeasible {
            self.core = (!assumptions.is_empty()).then(Vec::new);
            return SearchResult::Unsatisfiable;
        }

        let mut num_conflicts = 0;
        loop {
            match self.propagate() {
                Err(Conflict::Interrupted) => return SearchResult::Interrupted,
                Err(Conflict::Nogood(nogood)) => {
                    num_conflicts += 1;
                    if !self.resolve_conflict(nogood, restart.as_deref_mut()) {
                        self.core = (!assumptions.is_empty()).then(Vec::new);
                        return SearchResult::Unsatisfiable;
                    }
                    let restart_requested = restart
                        .as_deref_mut()
                        .is_some_and(|restart| restart.should_restart());
                    if num_conflicts >= conflict_limit || restart_requested {
                        return SearchResult::Limit;
                    }
                }
                Ok(()) => {
                    match self.place_assumptions(assumptions) {
                        AssumptionPlacement::Decided => continue,
                        AssumptionPlacement::Failed(core) => {
                            self.core = Some(core);
                            return SearchResult::Unsatisfiable;
                        }
                        AssumptionPlacement::Done => {}
                    }

                    if termination.should_stop() {
                        return SearchResult::Interrupted;
                    }

                    let decision = {
                        let mut context = SelectionContext::new(&self.assignments, &mut self.random);
                        self.brancher.next_decision(&mut context)
                    };
                    match decision {
                        Some(literal) => {
                            gourd_assert_simple!(self.assignments.is_unassigned(literal));
                            self.statistics.num_decisions += 1;
                            termination.decision_has_been_made();
                            self.assignments.new_decision(literal);
                        }
                        None => {
                            let mut post_propagators = mem::take(&mut self.post_propagators);
                            let is_model = post_propagators.is_model(self);
                            self.restore_post_propagators(post_propagators);
                            if is_model {
                                self.brancher.on_solution(&self.assignments);
                                return SearchResult::Satisfiable;
                            }
                        }
                    }
                }
            }
        }
    }

    fn place_assumptions(&mut self, assumptions: &[Literal]) -> AssumptionPlacement {
        while self.assignments.decision_level() < assumptions.len() {
            let assumption = assumptions[self.assignments.decision_level()];
            match self.assignments.value(assumption) {
                Some(true) => self.assignments.increase_decision_level(),
                Some(false) => {
                    let core = self.conflict_analyser.analyse_final(
                        assumption,
                        &self.constraints,
                        &self.assignments,
                    );
                    debug!("Assumption {assumption} failed with a core of {}", core.len());
                    return AssumptionPlacement::Failed(core);
                }
                None => {
                    self.assignments.new_decision(assumption);
                    return AssumptionPlacement::Decided;
                }
            }
        }
        AssumptionPlacement::Done
    }

    /// Learns from the conflict and backjumps; returns `false` if the conflict holds at the root.
    fn resolve_conflict(
        &mut self,
        nogood: Vec<Literal>,
        restart: Option<&mut DynamicRestart>,
    ) -> bool {
        self.statistics.num_conflicts += 1;

        let conflict_level = nogood
            .iter()
            .map(|literal| self.assignments.level(literal.variable()))
            .max()
            .unwrap_or(0);
        if conflict_level == 0 {
            self.declare_infeasible();
            return false;
        }
        if conflict_level < self.assignments.decision_level() {
            self.backtrack_to(conflict_level);
        }

        let num_removed_before = self.conflict_analyser.minimiser().num_literals_removed;
        let mut context = ConflictAnalysisContext {
            assignments: &self.assignments,
            constraints: &mut self.constraints,
            brancher: self.brancher.as_mut(),
            learned_constraints: &mut self.learned_constraints,
        };
        let result = self.conflict_analyser.analyse(nogood, &mut context);
        self.statistics.num_minimised_literals +=
            self.conflict_analyser.minimiser().num_literals_removed - num_removed_before;

        let lbd = compute_lbd(&result.learned_literals, &self.assignments);
        if let Some(restart) = restart {
            restart.notify_conflict(lbd, self.assignments.num_assigned());
        }
        self.brancher.on_conflict();
        self.learned_constraints.decay_activities();

        self.statistics
            .average_learned_clause_length
            .add_term(result.learned_literals.len() as u64);
        self.statistics
            .average_backjump_distance
            .add_term((self.assignments.decision_level() - result.backjump_level) as u64);

        self.backtrack_to(result.backjump_level);
        self.learn(result.learned_literals, lbd);
        true
    }

    /// Adds a learnt clause whose first literal is asserted on the current level.
    fn learn(&mut self, literals: Vec<Literal>, lbd: u32) {
        self.statistics.num_learned_constraints += 1;
        if literals.len() == 1 {
            self.statistics.num_unit_constraints_learned += 1;
        }

        let result = ClauseCreator::create(
            self,
            literals,
            ClauseCreateFlag::NoPrepare.into(),
            ConstraintType::Conflict,
        );
        gourd_assert_simple!(result.ok && result.status == ClauseStatus::Unit);
        if let Some(id) = result.constraint {
            self.constraints.get_mut(id).score.lbd = lbd;
        }
    }

    /// Removes `fraction` of the learnt constraints which are neither locked nor glue
    /// constraints (LBD at most `protect_lbd`).
    pub fn reduce_learnt_constraints(&mut self, fraction: f64, protect_lbd: u32) -> usize {
        self.learned_constraints.reduce(
            fraction,
            protect_lbd,
            &mut self.constraints,
            &mut self.watch_lists,
            &self.assignments,
        )
    }

    /// Removes half of the unlocked learnt constraints regardless of their LBD.
    pub fn reduce_learnt_constraints_half(&mut self) -> usize {
        self.learned_constraints.reduce_half(
            &mut self.constraints,
            &mut self.watch_lists,
            &self.assignments,
        )
    }

    /// Removes the constraints which are satisfied at the root and the root-false literals of
    /// the remaining clauses. Returns `false` if the problem turned out to be infeasible.
    pub fn simplify(&mut self) -> bool {
        if self.infeasible {
            return false;
        }
        self.backtrack_to(0);
        if self.propagate_units().is_err() {
            self.declare_infeasible();
            return false;
        }

        self.assignments.clear_root_antecedents();
        self.watch_lists
            .remove_satisfied_implicit(|literal| self.assignments.is_true(literal));
        let mut num_removed = 0;
        for id in self.constraints.ids() {
            if self.constraints.get_mut(id).kind.simplify(&self.assignments) {
                self.constraints.destroy(id, &mut self.watch_lists);
                num_removed += 1;
            }
        }
        debug!("Simplification removed {num_removed} constraints");
        true
    }

    /// Shuffles the watch lists, which changes the order in which constraints are visited.
    pub fn shuffle_constraints(&mut self) {
        self.watch_lists.shuffle(&mut self.random);
    }

    /// Bumps the complements of the literals which were implied on the first decision level.
    pub fn counter_bump(&mut self, amount: f64) {
        if self.assignments.decision_level() == 0 {
            return;
        }
        for &literal in self.assignments.literals_on_level(1) {
            if !self.assignments.is_decision(literal.variable()) {
                self.brancher.bump(!literal, amount);
            }
        }
    }

    /// A solver over the same problem for another search thread.
    ///
    /// The copy gets the root assignment, the short clauses, every static constraint which can
    /// be copied and the learnt clauses which are shared; post-propagators are copied if they
    /// support it.
    pub fn clone_problem(&self) -> Solver {
        let mut clone = Solver::with_brancher(self.options, self.brancher.clone_for());
        for _ in 1..self.assignments.num_variables() {
            let _ = clone.new_variable();
        }
        clone.watch_lists = self.watch_lists.clone_implicit();
        clone.infeasible = self.infeasible;

        for &literal in self.assignments.literals_on_level(0) {
            let _ = clone.assignments.enqueue(literal, Antecedent::None);
        }
        for implication in self.pending_implications.iter() {
            if implication.level == 0 {
                let _ = clone
                    .assignments
                    .enqueue(implication.literal, Antecedent::None);
            }
        }

        let mut copied = vec![];
        for (_, stored) in self.constraints.iter() {
            let is_shared_clause = stored
                .kind
                .as_clause()
                .is_some_and(|clause| clause.shared_literals().is_some());
            if stored.is_learnt() && !is_shared_clause {
                continue;
            }
            if let Some(kind) = stored.kind.clone_for() {
                let id = clone.store_constraint(stored.info, kind);
                clone.constraints.get_mut(id).score = stored.score;
                copied.push(id);
            }
        }
        for id in copied {
            if clone.initialise_constraint(id).is_err() {
                clone.declare_infeasible();
            }
        }

        clone.post_propagators.append(self.post_propagators.clone_for());
        clone
    }

    pub fn statistics(&self) -> SolverStatistics {
        SolverStatistics {
            engine: self.statistics,
            learned_constraints: self.learned_constraints.statistics(),
        }
    }

    pub fn log_statistics(&self) {
        info!(
            "Solver with {} variables and {} constraints ({} learnt)",
            self.num_variables(),
            self.constraints.len(),
            self.constraints.num_learnt()
        );
        self.statistics().log(StatisticLogger::default());
    }
}

enum AssumptionPlacement {
    /// An assumption was decided and has to be propagated.
    Decided,
    /// Every assumption holds.
    Done,
    /// An assumption is false; these assumptions are to blame.
    Failed(Vec<Literal>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::constraints::ClauseCreateFlags;
    use crate::termination::DecisionBudget;
    use crate::termination::Indefinite;

    fn solve(solver: &mut Solver, assumptions: &[Literal]) -> SearchResult {
        solver.search(u64::MAX, assumptions, &mut Indefinite)
    }

    #[test]
    fn a_satisfiable_formula_yields_a_model() {
        let mut solver = Solver::default();
        let [a, b, c] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([a, b]).expect("feasible");
        solver.add_clause([!a, c]).expect("feasible");
        solver.add_clause([!b, !c]).expect("feasible");
        solver.add_clause([!a, !c, b]).expect("feasible");

        assert_eq!(SearchResult::Satisfiable, solve(&mut solver, &[]));
        let model = solver.model();
        assert!(model.value(a) || model.value(b));
        assert!(!model.value(a) || model.value(c));
        assert!(!model.value(b) || !model.value(c));
        assert!(!model.value(a) || !model.value(c) || model.value(b));
    }

    #[test]
    fn the_pigeonhole_principle_is_refuted() {
        let mut solver = Solver::default();
        let pigeons: Vec<Vec<Literal>> = (0..4)
            .map(|_| (0..3).map(|_| solver.new_literal()).collect())
            .collect();
        for pigeon in pigeons.iter() {
            solver.add_clause(pigeon.clone()).expect("feasible");
        }
        for hole in 0..3 {
            for first in 0..4 {
                for second in first + 1..4 {
                    solver
                        .add_clause([!pigeons[first][hole], !pigeons[second][hole]])
                        .expect("feasible");
                }
            }
        }

        assert_eq!(SearchResult::Unsatisfiable, solve(&mut solver, &[]));
        assert!(solver.is_infeasible());
        assert_eq!(None, solver.take_core());
        assert!(solver.statistics().engine.num_conflicts > 0);
    }

    #[test]
    fn failed_assumptions_produce_a_core() {
        let mut solver = Solver::default();
        let [a, b, c, d] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!a, !b, !c]).expect("feasible");

        assert_eq!(SearchResult::Unsatisfiable, solve(&mut solver, &[a, d, b, c]));
        let mut core = solver.take_core().expect("assumptions were given");
        core.sort();
        let mut expected = vec![a, b, c];
        expected.sort();
        assert_eq!(expected, core);
        assert!(!solver.is_infeasible());

        solver.backtrack_to(0);
        assert_eq!(SearchResult::Satisfiable, solve(&mut solver, &[a, b]));
        assert!(!solver.model().value(c));
    }

    #[test]
    fn an_assumption_false_at_the_root_is_its_own_core() {
        let mut solver = Solver::default();
        let [a, b] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!a]).expect("feasible");

        assert_eq!(SearchResult::Unsatisfiable, solve(&mut solver, &[b, a]));
        assert_eq!(Some(vec![a]), solver.take_core());
    }

    #[test]
    fn an_empty_clause_makes_the_solver_infeasible() {
        let mut solver = Solver::default();
        let a = solver.new_literal();
        solver.add_clause([a]).expect("feasible");

        assert_eq!(
            Err(ConstraintOperationError::InfeasibleClause),
            solver.add_clause([!a])
        );
        assert!(solver.is_infeasible());
        assert_eq!(
            Err(ConstraintOperationError::InfeasibleState),
            solver.add_clause([a])
        );
    }

    #[test]
    fn unknown_variables_are_rejected() {
        let mut solver = Solver::default();
        let a = solver.new_literal();
        let unknown = Literal::positive(Variable::new(5));

        assert_eq!(
            Err(ConstraintOperationError::UnknownVariable(unknown.variable())),
            solver.add_clause([a, unknown])
        );
    }

    #[test]
    fn the_decision_budget_interrupts_the_search() {
        let mut solver = Solver::default();
        let _ = solver.new_variables(10);

        let result = solver.search(u64::MAX, &[], &mut DecisionBudget::new(3));

        assert_eq!(SearchResult::Interrupted, result);
        assert_eq!(3, solver.statistics().engine.num_decisions);
    }

    #[test]
    fn backtracking_to_the_root_enqueues_pending_root_implications() {
        let mut solver = Solver::default();
        let [a, b, c] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!b]).expect("feasible");
        solver.assignments.new_decision(a);

        let result = ClauseCreator::create(
            &mut solver,
            [b, c],
            ClauseCreateFlags::empty(),
            ConstraintType::Conflict,
        );
        assert!(result.ok);
        assert!(solver.assignments.is_true(c));
        assert_eq!(
            vec![PendingImplication {
                literal: c,
                level: 0,
                antecedent: Antecedent::Literal(Literal::TRUE),
            }],
            solver.pending_implications
        );

        solver.backtrack_to(0);
        assert!(solver.assignments.is_true(c));
        assert_eq!(0, solver.assignments.level(c.variable()));
    }

    #[test]
    fn simplification_removes_root_satisfied_constraints() {
        let mut solver = Solver::default();
        let lits: Vec<Literal> = (0..5).map(|_| solver.new_literal()).collect();
        solver.add_clause(lits.clone()).expect("feasible");
        solver
            .add_clause([!lits[0], lits[1], lits[2], lits[3]])
            .expect("feasible");
        assert_eq!(2, solver.num_constraints());

        solver.add_clause([lits[4]]).expect("feasible");
        assert!(solver.simplify());

        assert_eq!(1, solver.num_constraints());
    }

    #[test]
    fn cloned_problems_share_the_root_and_the_constraints() {
        let mut solver = Solver::default();
        let [a, b, c, d] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([a]).expect("feasible");
        solver.add_clause([!a, b, c, d]).expect("feasible");
        solver
            .add_cardinality_constraint(Literal::TRUE, [b, c, d], 2)
            .expect("feasible");

        let mut clone = solver.clone_problem();

        assert_eq!(solver.num_variables(), clone.num_variables());
        assert_eq!(solver.num_constraints(), clone.num_constraints());
        assert!(clone.assignments.is_true(a));
        clone.assignments.new_decision(!b);
        assert!(clone.propagate().is_ok());
        assert!(clone.assignments.is_true(c));
        assert!(clone.assignments.is_true(d));
    }

    #[test]
    fn counter_bumps_favour_the_complements_of_implied_literals() {
        let mut solver = Solver::default();
        let [a, b, _] = std::array::from_fn(|_| solver.new_literal());
        solver.add_clause([!a, b]).expect("feasible");
        solver.assignments.new_decision(a);
        assert!(solver.propagate().is_ok());

        solver.counter_bump(100.0);
        solver.restart();

        let decision = {
            let mut context = SelectionContext::new(&solver.assignments, &mut solver.random);
            solver.brancher.next_decision(&mut context)
        };
        assert_eq!(Some(b.variable()), decision.map(|literal| literal.variable()));
    }
}
