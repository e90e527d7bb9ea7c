use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::gourd_assert_simple;

/// A sequence of elements partitioned into decision levels; elements can only be removed by
/// backtracking to an earlier decision level.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_decision_level: usize,
    /// At index `i` is the position where decision level `i + 1` starts.
    level_starts: Vec<usize>,
    trail: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_decision_level: 0,
            level_starts: Vec::new(),
            trail: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn increase_decision_level(&mut self) {
        self.current_decision_level += 1;
        self.level_starts.push(self.trail.len());
    }

    /// The position of the first element on `decision_level`.
    pub(crate) fn level_start(&self, decision_level: usize) -> usize {
        gourd_assert_simple!(decision_level <= self.current_decision_level);
        if decision_level == 0 {
            0
        } else {
            self.level_starts[decision_level - 1]
        }
    }

    pub(crate) fn values_on_decision_level(&self, decision_level: usize) -> &[T] {
        let start = self.level_start(decision_level);
        let end = if decision_level == self.current_decision_level {
            self.trail.len()
        } else {
            self.level_starts[decision_level]
        };

        &self.trail[start..end]
    }

    pub(crate) fn get_decision_level(&self) -> usize {
        self.current_decision_level
    }

    /// Removes every element above `new_decision_level`, yielding the removed elements from the
    /// most recently pushed to the oldest.
    pub(crate) fn synchronise(&mut self, new_decision_level: usize) -> Rev<Drain<'_, T>> {
        gourd_assert_simple!(new_decision_level < self.current_decision_level);

        let new_trail_len = self.level_starts[new_decision_level];

        self.current_decision_level = new_decision_level;
        self.level_starts.truncate(new_decision_level);
        self.trail.drain(new_trail_len..).rev()
    }

    pub(crate) fn push(&mut self, elem: T) {
        self.trail.push(elem)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.trail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail_with_levels() -> Trail<u32> {
        // level 0: 1, level 1: 2, level 2: (empty), level 3: 3 4
        let mut trail = Trail::default();
        trail.push(1);
        trail.increase_decision_level();
        trail.push(2);
        trail.increase_decision_level();
        trail.increase_decision_level();
        trail.push(3);
        trail.push(4);
        trail
    }

    #[test]
    fn empty_levels_are_kept_apart() {
        let trail = trail_with_levels();

        assert_eq!(3, trail.get_decision_level());
        assert_eq!(&[2], trail.values_on_decision_level(1));
        assert!(trail.values_on_decision_level(2).is_empty());
        assert_eq!(&[3, 4], trail.values_on_decision_level(3));
        assert_eq!(2, trail.level_start(3));
    }

    #[test]
    fn synchronise_yields_removed_elements_newest_first() {
        let mut trail = trail_with_levels();

        let removed = trail.synchronise(1).collect::<Vec<_>>();

        assert_eq!(vec![4, 3], removed);
        assert_eq!(&[1, 2], trail.deref());
        assert_eq!(1, trail.get_decision_level());
    }

    #[test]
    fn synchronise_to_the_root_keeps_root_elements() {
        let mut trail = trail_with_levels();

        let _ = trail.synchronise(0);

        assert_eq!(&[1], trail.deref());
        assert_eq!(&[1], trail.values_on_decision_level(0));
    }
}
