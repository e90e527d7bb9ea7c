use std::mem;

use super::constraints::ConstraintId;
use crate::basic_types::shuffle;
use crate::basic_types::Literal;
use crate::basic_types::Random;
use crate::containers::KeyedVec;

/// A watch on a clause with at least four literals (or a shared clause).
///
/// The blocker is a literal of the clause other than the watched one; if it is true the clause
/// is satisfied and does not need to be inspected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ClauseWatch {
    pub(crate) blocker: Literal,
    pub(crate) constraint: ConstraintId,
}

/// A watch on a weight constraint or a loop formula; `data` tells the constraint which of its
/// literals triggered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GenericWatch {
    pub(crate) constraint: ConstraintId,
    pub(crate) data: u32,
}

/// Everything which has to be inspected when a literal becomes true.
#[derive(Clone, Debug, Default)]
pub(crate) struct WatchList {
    /// Binary clauses `(¬p ∨ q)` stored as `q` in the list of `p`.
    pub(crate) binary: Vec<Literal>,
    /// Ternary clauses `(¬p ∨ q ∨ r)` stored as `(q, r)` in the list of `p`.
    pub(crate) ternary: Vec<(Literal, Literal)>,
    pub(crate) clauses: Vec<ClauseWatch>,
    pub(crate) generic: Vec<GenericWatch>,
}

impl WatchList {
    pub(crate) fn is_empty(&self) -> bool {
        self.binary.is_empty()
            && self.ternary.is_empty()
            && self.clauses.is_empty()
            && self.generic.is_empty()
    }

    /// Moves the watches of `other` (added while this list was taken) into this list.
    fn merge(&mut self, mut other: WatchList) {
        self.binary.append(&mut other.binary);
        self.ternary.append(&mut other.ternary);
        self.clauses.append(&mut other.clauses);
        self.generic.append(&mut other.generic);
    }
}

/// The watch lists of every literal, indexed by the literal whose truth triggers the watch.
#[derive(Clone, Debug, Default)]
pub(crate) struct WatchLists {
    lists: KeyedVec<Literal, WatchList>,
}

impl WatchLists {
    /// Adds the (empty) lists of both literals of a new variable.
    pub(crate) fn grow(&mut self) {
        let _ = self.lists.push(WatchList::default());
        let _ = self.lists.push(WatchList::default());
    }

    pub(crate) fn get(&self, literal: Literal) -> &WatchList {
        &self.lists[literal]
    }

    pub(crate) fn get_mut(&mut self, literal: Literal) -> &mut WatchList {
        &mut self.lists[literal]
    }

    /// Takes the list of `literal` out so that it can be traversed while other lists change.
    pub(crate) fn take(&mut self, literal: Literal) -> WatchList {
        mem::take(&mut self.lists[literal])
    }

    /// Puts a taken list back, keeping any watch which was added in the meantime.
    pub(crate) fn restore(&mut self, literal: Literal, list: WatchList) {
        let added = mem::replace(&mut self.lists[literal], list);
        if !added.is_empty() {
            self.lists[literal].merge(added);
        }
    }

    /// Stores the clause `(a ∨ b)`.
    pub(crate) fn add_binary(&mut self, a: Literal, b: Literal) {
        self.lists[!a].binary.push(b);
        self.lists[!b].binary.push(a);
    }

    /// Stores the clause `(a ∨ b ∨ c)`.
    pub(crate) fn add_ternary(&mut self, a: Literal, b: Literal, c: Literal) {
        self.lists[!a].ternary.push((b, c));
        self.lists[!b].ternary.push((a, c));
        self.lists[!c].ternary.push((a, b));
    }

    /// Watches `watched` of a clause: the clause is inspected once `watched` becomes false.
    pub(crate) fn watch_clause(
        &mut self,
        watched: Literal,
        blocker: Literal,
        constraint: ConstraintId,
    ) {
        self.lists[!watched].clauses.push(ClauseWatch {
            blocker,
            constraint,
        });
    }

    /// Inspects `constraint` once `trigger` becomes true.
    pub(crate) fn watch_generic(&mut self, trigger: Literal, constraint: ConstraintId, data: u32) {
        self.lists[trigger]
            .generic
            .push(GenericWatch { constraint, data });
    }

    pub(crate) fn unwatch_clause(&mut self, watched: Literal, constraint: ConstraintId) {
        self.lists[!watched]
            .clauses
            .retain(|watch| watch.constraint != constraint);
    }

    pub(crate) fn unwatch_generic(&mut self, trigger: Literal, constraint: ConstraintId) {
        self.lists[trigger]
            .generic
            .retain(|watch| watch.constraint != constraint);
    }

    /// Shuffles the clause watches of every list, changing the order in which clauses are
    /// visited during propagation.
    pub(crate) fn shuffle(&mut self, random: &mut dyn Random) {
        for list in self.lists.iter_mut() {
            shuffle(random, &mut list.clauses);
            shuffle(random, &mut list.binary);
        }
    }

    /// A copy which only contains the binary and ternary clauses.
    pub(crate) fn clone_implicit(&self) -> WatchLists {
        let mut lists = KeyedVec::default();
        for list in self.lists.iter() {
            let _ = lists.push(WatchList {
                binary: list.binary.clone(),
                ternary: list.ternary.clone(),
                clauses: vec![],
                generic: vec![],
            });
        }
        WatchLists { lists }
    }

    /// Drops every binary and ternary clause with a literal for which `is_true` holds.
    pub(crate) fn remove_satisfied_implicit(&mut self, is_true: impl Fn(Literal) -> bool) {
        let literals = self.lists.keys().collect::<Vec<_>>();
        for literal in literals {
            let list = &mut self.lists[literal];
            if is_true(!literal) {
                list.binary.clear();
                list.ternary.clear();
                continue;
            }
            list.binary.retain(|&other| !is_true(other));
            list.ternary
                .retain(|&(first, second)| !is_true(first) && !is_true(second));
        }
    }

    /// The number of binary and ternary clauses.
    pub(crate) fn num_implicit_clauses(&self) -> (usize, usize) {
        let (binary, ternary) = self.lists.iter().fold((0, 0), |(binary, ternary), list| {
            (binary + list.binary.len(), ternary + list.ternary.len())
        });
        (binary / 2, ternary / 3)
    }
}
