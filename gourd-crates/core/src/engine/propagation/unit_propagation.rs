use crate::basic_types::Conflict;
use crate::basic_types::Literal;
use crate::basic_types::PropagationStatus;
use crate::engine::constraints::ClausePropagation;
use crate::engine::constraints::ConstraintStore;
use crate::engine::constraints::PropagationContext;
use crate::engine::constraints::WatchStatus;
use crate::engine::watch_lists::WatchList;
use crate::engine::Antecedent;
use crate::engine::Assignments;
use crate::engine::WatchLists;

/// Propagates every enqueued literal through the watch lists until the queue is empty or a
/// conflict is found.
///
/// Returns the number of literals which were propagated together with the outcome.
pub(crate) fn propagate_units(
    assignments: &mut Assignments,
    watch_lists: &mut WatchLists,
    constraints: &mut ConstraintStore,
) -> (u64, PropagationStatus) {
    let mut num_propagated = 0;
    while let Some(literal) = assignments.next_to_propagate() {
        num_propagated += 1;
        let mut list = watch_lists.take(literal);
        let status = propagate_literal(literal, &mut list, assignments, watch_lists, constraints);
        watch_lists.restore(literal, list);
        if status.is_err() {
            return (num_propagated, status);
        }
    }
    (num_propagated, Ok(()))
}

fn propagate_literal(
    literal: Literal,
    list: &mut WatchList,
    assignments: &mut Assignments,
    watch_lists: &mut WatchLists,
    constraints: &mut ConstraintStore,
) -> PropagationStatus {
    for &implied in list.binary.iter() {
        if !assignments.enqueue(implied, Antecedent::Literal(literal)) {
            return Err(Conflict::Nogood(vec![literal, !implied]));
        }
    }

    for &(first, second) in list.ternary.iter() {
        if assignments.is_true(first) || assignments.is_true(second) {
            continue;
        }
        if assignments.is_false(first)
            && !assignments.enqueue(second, Antecedent::Literals(literal, !first))
        {
            return Err(Conflict::Nogood(vec![literal, !first, !second]));
        }
        if assignments.is_false(second) {
            let _ = assignments.enqueue(first, Antecedent::Literals(literal, !second));
        }
    }

    propagate_clauses(literal, list, assignments, watch_lists, constraints)?;
    propagate_generic(literal, list, assignments, watch_lists, constraints)
}

/// Visits the clauses which watch `!literal`, compacting the watches which stay.
fn propagate_clauses(
    literal: Literal,
    list: &mut WatchList,
    assignments: &mut Assignments,
    watch_lists: &mut WatchLists,
    constraints: &mut ConstraintStore,
) -> PropagationStatus {
    let false_literal = !literal;
    let watches = &mut list.clauses;
    let mut status = Ok(());
    let mut kept = 0;
    let mut index = 0;

    while index < watches.len() {
        let mut watch = watches[index];
        index += 1;

        if !assignments.is_true(watch.blocker) {
            let Some(clause) = constraints.get_mut(watch.constraint).kind.as_clause_mut() else {
                panic!("clause watch on {} which is not a clause", watch.constraint)
            };
            match clause.propagate(false_literal, assignments) {
                ClausePropagation::Satisfied { blocker } => watch.blocker = blocker,
                ClausePropagation::Moved { new_watch } => {
                    let [other, _] = clause.watched();
                    watch_lists.watch_clause(new_watch, other, watch.constraint);
                    continue;
                }
                ClausePropagation::Unit(implied) => {
                    let _ = assignments.enqueue(implied, Antecedent::Constraint(watch.constraint));
                }
                ClausePropagation::Conflict => {
                    status = Err(Conflict::from_falsified_clause(clause.literals()));
                }
            }
        }

        watches[kept] = watch;
        kept += 1;
        if status.is_err() {
            break;
        }
    }

    while index < watches.len() {
        watches[kept] = watches[index];
        kept += 1;
        index += 1;
    }
    watches.truncate(kept);
    status
}

fn propagate_generic(
    literal: Literal,
    list: &mut WatchList,
    assignments: &mut Assignments,
    watch_lists: &mut WatchLists,
    constraints: &mut ConstraintStore,
) -> PropagationStatus {
    let mut context = PropagationContext {
        assignments,
        watch_lists,
    };
    let mut status = Ok(());
    list.generic.retain(|watch| {
        if status.is_err() {
            return true;
        }
        let outcome = constraints.get_mut(watch.constraint).kind.propagate_generic(
            watch.constraint,
            literal,
            watch.data,
            &mut context,
        );
        match outcome {
            Ok(WatchStatus::Keep) => true,
            Ok(WatchStatus::Remove) => false,
            Err(conflict) => {
                status = Err(conflict);
                true
            }
        }
    });
    status
}
