use super::constraints::ConstraintId;
use super::Antecedent;
use crate::basic_types::Literal;
use crate::basic_types::Trail;
use crate::basic_types::Variable;
use crate::containers::KeyedVec;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct AssignmentInfo {
    /// The value of the positive literal of the variable, if it is assigned.
    value: Option<bool>,
    decision_level: u32,
    trail_position: u32,
    antecedent: Antecedent,
}

/// The partial assignment of the solver together with its trail.
///
/// Every literal on the trail is stored with the decision level on which it was assigned and its
/// [`Antecedent`]. Constraints which keep state that depends on the assignment can register an
/// undo hook on a decision level; the hook is handed back when that level is backtracked.
#[derive(Clone, Debug)]
pub struct Assignments {
    info: KeyedVec<Variable, AssignmentInfo>,
    trail: Trail<Literal>,
    /// `undo_hooks[level]` holds the constraints to notify when `level` is removed.
    undo_hooks: Vec<Vec<ConstraintId>>,
    /// The first trail position which has not been propagated yet.
    propagation_head: usize,
}

impl Default for Assignments {
    fn default() -> Self {
        let mut assignments = Assignments {
            info: KeyedVec::default(),
            trail: Trail::default(),
            undo_hooks: vec![vec![]],
            propagation_head: 0,
        };

        let sentinel = assignments.grow();
        gourd_assert_simple!(sentinel == Variable::SENTINEL);
        let _ = assignments.enqueue(Literal::TRUE, Antecedent::None);
        // Nothing watches the sentinel.
        assignments.propagation_head = 1;

        assignments
    }
}

impl Assignments {
    /// Registers a new unassigned variable.
    pub(crate) fn grow(&mut self) -> Variable {
        self.info.push(AssignmentInfo::default())
    }

    /// The number of variables, including [`Variable::SENTINEL`].
    pub fn num_variables(&self) -> usize {
        self.info.len()
    }

    pub fn is_known(&self, variable: Variable) -> bool {
        (variable.index() as usize) < self.info.len()
    }

    /// The truth value of `literal`, or `None` if it is unassigned.
    pub fn value(&self, literal: Literal) -> Option<bool> {
        self.info[literal.variable()]
            .value
            .map(|value| value == literal.is_positive())
    }

    pub fn is_true(&self, literal: Literal) -> bool {
        self.value(literal) == Some(true)
    }

    pub fn is_false(&self, literal: Literal) -> bool {
        self.value(literal) == Some(false)
    }

    pub fn is_unassigned(&self, literal: Literal) -> bool {
        self.info[literal.variable()].value.is_none()
    }

    pub fn is_assigned(&self, literal: Literal) -> bool {
        !self.is_unassigned(literal)
    }

    /// Whether `literal` is assigned (to either value) at the root.
    pub fn is_root_assigned(&self, literal: Literal) -> bool {
        self.is_assigned(literal) && self.level(literal.variable()) == 0
    }

    pub fn is_root_true(&self, literal: Literal) -> bool {
        self.is_true(literal) && self.level(literal.variable()) == 0
    }

    pub fn is_root_false(&self, literal: Literal) -> bool {
        self.is_false(literal) && self.level(literal.variable()) == 0
    }

    /// The decision level on which `variable` was assigned.
    pub fn level(&self, variable: Variable) -> usize {
        gourd_assert_moderate!(
            self.info[variable].value.is_some(),
            "Unassigned variables do not have assignment levels"
        );
        self.info[variable].decision_level as usize
    }

    pub fn trail_position(&self, variable: Variable) -> usize {
        gourd_assert_moderate!(self.info[variable].value.is_some());
        self.info[variable].trail_position as usize
    }

    pub fn antecedent(&self, variable: Variable) -> Antecedent {
        gourd_assert_moderate!(self.info[variable].value.is_some());
        self.info[variable].antecedent
    }

    /// Whether `variable` was assigned by a decision (or an assumption) rather than implied.
    pub fn is_decision(&self, variable: Variable) -> bool {
        let info = &self.info[variable];
        info.value.is_some() && info.decision_level > 0 && info.antecedent.is_none()
    }

    pub fn trail(&self) -> &[Literal] {
        &self.trail
    }

    pub fn decision_level(&self) -> usize {
        self.trail.get_decision_level()
    }

    pub fn num_assigned(&self) -> usize {
        self.trail.len()
    }

    /// The literals which were assigned on `decision_level`, the first being its decision.
    pub fn literals_on_level(&self, decision_level: usize) -> &[Literal] {
        self.trail.values_on_decision_level(decision_level)
    }

    pub fn level_start(&self, decision_level: usize) -> usize {
        self.trail.level_start(decision_level)
    }

    /// Assigns `literal` to true on the current decision level.
    ///
    /// Returns `false` if the literal is already false. Enqueueing a literal which is already
    /// true keeps its original level and antecedent.
    pub(crate) fn enqueue(&mut self, literal: Literal, antecedent: Antecedent) -> bool {
        match self.value(literal) {
            Some(value) => value,
            None => {
                self.info[literal.variable()] = AssignmentInfo {
                    value: Some(literal.is_positive()),
                    decision_level: self.decision_level() as u32,
                    trail_position: self.trail.len() as u32,
                    antecedent,
                };
                self.trail.push(literal);
                true
            }
        }
    }

    /// Opens a new decision level without assigning anything on it.
    pub(crate) fn increase_decision_level(&mut self) {
        self.trail.increase_decision_level();
        if self.undo_hooks.len() <= self.decision_level() {
            self.undo_hooks.resize_with(self.decision_level() + 1, Vec::new);
        }
    }

    /// Opens a new decision level with `literal` as its decision.
    pub(crate) fn new_decision(&mut self, literal: Literal) {
        gourd_assert_simple!(self.is_unassigned(literal));
        self.increase_decision_level();
        let _ = self.enqueue(literal, Antecedent::None);
    }

    /// Asks for `constraint` to be handed back once `decision_level` is backtracked.
    pub(crate) fn register_undo(&mut self, decision_level: usize, constraint: ConstraintId) {
        gourd_assert_moderate!(decision_level <= self.decision_level());
        if decision_level > 0 {
            self.undo_hooks[decision_level].push(constraint);
        }
    }

    /// Removes the undo hooks of every level above `new_decision_level`, deepest level first.
    pub(crate) fn take_undo_hooks(&mut self, new_decision_level: usize) -> Vec<ConstraintId> {
        let mut hooks = vec![];
        for level in (new_decision_level + 1..=self.decision_level()).rev() {
            hooks.append(&mut self.undo_hooks[level]);
        }
        hooks
    }

    /// Unassigns every literal above `new_decision_level`; the literals are yielded from the
    /// most recently assigned to the oldest.
    pub(crate) fn synchronise(
        &mut self,
        new_decision_level: usize,
    ) -> impl Iterator<Item = Literal> + '_ {
        gourd_assert_simple!(new_decision_level < self.decision_level());
        self.propagation_head = self
            .propagation_head
            .min(self.trail.level_start(new_decision_level + 1));

        self.trail.synchronise(new_decision_level).inspect(|literal| {
            self.info[literal.variable()] = AssignmentInfo::default();
        })
    }

    /// Forgets the antecedents of the literals assigned at the root; they are never needed as
    /// reasons and may refer to constraints which are about to be removed.
    pub(crate) fn clear_root_antecedents(&mut self) {
        let root_variables = self
            .literals_on_level(0)
            .iter()
            .map(|literal| literal.variable())
            .collect::<Vec<_>>();
        for variable in root_variables {
            self.info[variable].antecedent = Antecedent::None;
        }
    }

    /// Returns the next literal to propagate, advancing the propagation head.
    pub(crate) fn next_to_propagate(&mut self) -> Option<Literal> {
        let literal = self.trail.get(self.propagation_head).copied();
        if literal.is_some() {
            self.propagation_head += 1;
        }
        literal
    }

    pub(crate) fn is_propagation_complete(&self) -> bool {
        self.propagation_head == self.trail.len()
    }

    /// Marks every assigned literal as propagated.
    pub(crate) fn skip_propagation(&mut self) {
        self.propagation_head = self.trail.len();
    }

    pub(crate) fn propagation_head(&self) -> usize {
        self.propagation_head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignments_with(num_variables: usize) -> (Assignments, Vec<Variable>) {
        let mut assignments = Assignments::default();
        let variables = (0..num_variables).map(|_| assignments.grow()).collect();
        (assignments, variables)
    }

    #[test]
    fn the_sentinel_is_true_at_the_root() {
        let assignments = Assignments::default();
        assert!(assignments.is_root_true(Literal::TRUE));
        assert!(assignments.is_root_false(Literal::FALSE));
        assert!(assignments.is_propagation_complete());
    }

    #[test]
    fn enqueueing_a_true_literal_keeps_the_original_antecedent() {
        let (mut assignments, variables) = assignments_with(2);
        let a = Literal::positive(variables[0]);
        let b = Literal::positive(variables[1]);

        assert!(assignments.enqueue(a, Antecedent::Literal(b)));
        assert!(assignments.enqueue(a, Antecedent::None));
        assert!(!assignments.enqueue(!a, Antecedent::None));

        assert_eq!(Antecedent::Literal(b), assignments.antecedent(a.variable()));
        assert_eq!(2, assignments.num_assigned());
    }

    #[test]
    fn synchronise_unassigns_in_reverse_order_and_returns_the_hooks() {
        let (mut assignments, variables) = assignments_with(3);
        let literals = variables
            .iter()
            .map(|&variable| Literal::positive(variable))
            .collect::<Vec<_>>();

        assignments.new_decision(literals[0]);
        assignments.register_undo(1, ConstraintId::from_index(4));
        assignments.new_decision(literals[1]);
        let _ = assignments.enqueue(!literals[2], Antecedent::Literal(literals[1]));
        assignments.register_undo(2, ConstraintId::from_index(7));

        while assignments.next_to_propagate().is_some() {}

        let hooks = assignments.take_undo_hooks(0);
        let removed = assignments.synchronise(0).collect::<Vec<_>>();

        assert_eq!(
            vec![ConstraintId::from_index(7), ConstraintId::from_index(4)],
            hooks
        );
        assert_eq!(vec![!literals[2], literals[1], literals[0]], removed);
        assert!(literals.iter().all(|&literal| assignments.is_unassigned(literal)));
        assert_eq!(0, assignments.decision_level());
        assert!(assignments.is_propagation_complete());
    }

    #[test]
    fn decisions_have_no_antecedent() {
        let (mut assignments, variables) = assignments_with(2);
        let a = Literal::negative(variables[0]);
        assignments.new_decision(a);
        let _ = assignments.enqueue(Literal::positive(variables[1]), Antecedent::Literal(a));

        assert!(assignments.is_decision(variables[0]));
        assert!(!assignments.is_decision(variables[1]));
        assert_eq!(&[a, Literal::positive(variables[1])], assignments.literals_on_level(1));
    }
}
