use super::ConflictAnalysisContext;
use crate::basic_types::Literal;
use crate::containers::HashMap;
use crate::containers::HashSet;
use crate::gourd_assert_moderate;

/// Recursion depth after which a literal is given up on and treated as [`Label::Poison`].
const MAX_DEPTH: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Label {
    /// The literal is part of the learned clause but its label is not known yet.
    Seen,
    /// The literal cannot be derived from the learned clause.
    Poison,
    /// The literal is implied by literals which stay in the learned clause.
    Removable,
    /// The literal stays in the learned clause.
    Keep,
}

/// Removes the literals of a learned clause which are implied by its other literals.
///
/// The labelling follows "Minimizing learned clauses" (Sörensson and Biere, SAT'09) in the
/// formulation of "Improved conflict-clause minimization leads to improved propositional proof
/// traces" (Van Gelder, SAT'09). Labels are computed for the *true* complements of the clause
/// literals.
#[derive(Clone, Debug, Default)]
pub(crate) struct LearnedClauseMinimiser {
    labels: HashMap<Literal, Label>,
    allowed_decision_levels: HashSet<usize>,
    pub(crate) num_literals_seen: u64,
    pub(crate) num_literals_removed: u64,
}

impl LearnedClauseMinimiser {
    /// Minimises `learned_literals`, whose first literal is the asserting literal. Afterwards
    /// the literal at index 1 has the highest decision level among the others.
    pub(crate) fn remove_dominated_literals(
        &mut self,
        learned_literals: &mut Vec<Literal>,
        context: &mut ConflictAnalysisContext<'_>,
    ) {
        self.num_literals_seen += learned_literals.len() as u64;
        let num_literals_before = learned_literals.len();
        self.initialise(learned_literals, context);

        let assignments = context.assignments;
        let level = |literal: Literal| assignments.level(literal.variable());
        let mut end_position = 1;
        for index in 1..learned_literals.len() {
            let learned_literal = learned_literals[index];
            let label = self.compute_label(!learned_literal, 0, context);
            if matches!(label, Label::Poison | Label::Keep) {
                learned_literals[end_position] = learned_literal;
                end_position += 1;
                if level(learned_literals[1]) < level(learned_literal) {
                    learned_literals.swap(1, end_position - 1);
                }
            }
        }
        learned_literals.truncate(end_position);

        self.labels.clear();
        self.allowed_decision_levels.clear();
        self.num_literals_removed += (num_literals_before - learned_literals.len()) as u64;
    }

    fn initialise(&mut self, learned_literals: &[Literal], context: &ConflictAnalysisContext<'_>) {
        let assignments = context.assignments;
        let _ = self.labels.insert(!learned_literals[0], Label::Keep);
        for &learned_literal in &learned_literals[1..] {
            let literal = !learned_literal;
            let label = if assignments.is_decision(literal.variable()) {
                Label::Keep
            } else {
                Label::Seen
            };
            let _ = self.labels.insert(literal, label);
            let _ = self
                .allowed_decision_levels
                .insert(assignments.level(literal.variable()));
        }
    }

    /// Labels the true `literal`.
    fn compute_label(
        &mut self,
        literal: Literal,
        depth: usize,
        context: &ConflictAnalysisContext<'_>,
    ) -> Label {
        let assignments = context.assignments;
        gourd_assert_moderate!(assignments.is_true(literal));

        let current = self.labels.get(&literal).copied();
        if let Some(label) = current.filter(|&label| label != Label::Seen) {
            return label;
        }
        let is_seen = current == Some(Label::Seen);

        let variable = literal.variable();
        if depth >= MAX_DEPTH
            || assignments.is_decision(variable)
            || !self
                .allowed_decision_levels
                .contains(&assignments.level(variable))
        {
            return self.assign(literal, Label::Poison);
        }

        let is_removable = assignments.antecedent(variable).minimize(
            literal,
            &*context.constraints,
            assignments,
            |reason_literal| {
                assignments.level(reason_literal.variable()) == 0
                    || self.compute_label(reason_literal, depth + 1, context) != Label::Poison
            },
        );

        let label = match (is_removable, is_seen) {
            (true, _) => Label::Removable,
            (false, true) => Label::Keep,
            (false, false) => Label::Poison,
        };
        self.assign(literal, label)
    }

    fn assign(&mut self, literal: Literal, label: Label) -> Label {
        gourd_assert_moderate!(
            self.labels
                .get(&literal)
                .map_or(true, |&current| current == Label::Seen),
            "{literal} is labelled twice"
        );
        let _ = self.labels.insert(literal, label);
        label
    }
}
