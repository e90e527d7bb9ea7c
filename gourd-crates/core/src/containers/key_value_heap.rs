//! A max-heap over keys `0..n` whose values can be increased in place, and whose keys can be
//! temporarily taken out and put back without losing their value. This is the activity order
//! used by the decision heuristic.
use std::ops::AddAssign;
use std::ops::DivAssign;

use super::KeyedVec;
use super::StorageKey;
use crate::gourd_assert_moderate;

/// A [max-heap](https://en.wikipedia.org/wiki/Binary_heap) indexed by `Key`s.
///
/// Every key which was ever added keeps a slot in [`KeyValueHeap::values`]; the first
/// [`KeyValueHeap::end_position`] slots form the heap, the rest are the removed keys.
#[derive(Debug, Clone)]
pub struct KeyValueHeap<Key, Value> {
    /// The values laid out as a binary heap.
    values: Vec<Value>,
    /// `position_of_key[key]` is the slot of `key` in [`KeyValueHeap::values`].
    position_of_key: KeyedVec<Key, usize>,
    /// `key_at_position[i]` is the key whose value is stored in slot `i`.
    key_at_position: Vec<Key>,
    /// The number of keys which are currently present in the heap.
    end_position: usize,
}

impl<Key, Value> Default for KeyValueHeap<Key, Value> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            position_of_key: KeyedVec::new(),
            key_at_position: Vec::new(),
            end_position: 0,
        }
    }
}

impl<Key, Value> KeyValueHeap<Key, Value>
where
    Key: StorageKey + Copy,
    Value: AddAssign<Value> + DivAssign<Value> + PartialOrd + Default + Copy,
{
    /// Returns the key with the largest value without removing it.
    pub fn peek_max(&self) -> Option<(Key, Value)> {
        if self.end_position == 0 {
            None
        } else {
            Some((self.key_at_position[0], self.values[0]))
        }
    }

    /// Removes the key with the largest value from the heap and returns it. Its value is kept so
    /// that it can be [`KeyValueHeap::restore_key`]d later.
    pub fn pop_max(&mut self) -> Option<Key> {
        let (best_key, _) = self.peek_max()?;
        self.delete_key(best_key);
        Some(best_key)
    }

    pub fn get_value(&self, key: Key) -> Value {
        self.values[self.position_of_key[key]]
    }

    /// Adds `increment` to the value of `key`, whether or not it is currently present.
    pub fn increment(&mut self, key: Key, increment: Value) {
        let position = self.position_of_key[key];
        self.values[position] += increment;
        if self.is_key_present(key) {
            self.sift_up(position);
        }
    }

    /// Puts a previously deleted key back into the heap with its old value.
    pub fn restore_key(&mut self, key: Key) {
        if self.is_key_present(key) {
            return;
        }
        let position = self.position_of_key[key];
        gourd_assert_moderate!(position >= self.end_position);
        self.swap_positions(position, self.end_position);
        self.end_position += 1;
        self.sift_up(self.end_position - 1);
    }

    /// Takes `key` out of the heap (if present) while remembering its value.
    pub fn delete_key(&mut self, key: Key) {
        if !self.is_key_present(key) {
            return;
        }
        let position = self.position_of_key[key];
        self.end_position -= 1;
        self.swap_positions(position, self.end_position);
        if position < self.end_position {
            self.sift_down(position);
            self.sift_up(position);
        }
    }

    pub fn is_key_present(&self, key: Key) -> bool {
        key.index() < self.position_of_key.len() && self.position_of_key[key] < self.end_position
    }

    pub fn num_nonremoved_elements(&self) -> usize {
        self.end_position
    }

    /// Adds a new key with the given value; keys have to be added in the order of their index.
    pub fn grow(&mut self, key: Key, value: Value) {
        gourd_assert_moderate!(key.index() == self.values.len());
        let slot = self.values.len();
        self.values.push(value);
        let _ = self.position_of_key.push(slot);
        self.key_at_position.push(key);

        self.swap_positions(self.end_position, slot);
        self.end_position += 1;
        self.sift_up(self.end_position - 1);
    }

    /// Divides every stored value (including those of removed keys) by `divisor`.
    pub fn divide_values(&mut self, divisor: Value) {
        for value in self.values.iter_mut() {
            *value /= divisor;
        }
    }

    fn swap_positions(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let key_a = self.key_at_position[a];
        let key_b = self.key_at_position[b];

        self.values.swap(a, b);
        self.key_at_position.swap(a, b);
        self.position_of_key[key_a] = b;
        self.position_of_key[key_b] = a;
    }

    fn sift_up(&mut self, mut position: usize) {
        while position > 0 {
            let parent = (position - 1) / 2;
            if self.values[parent] < self.values[position] {
                self.swap_positions(parent, position);
                position = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut position: usize) {
        loop {
            let left = 2 * position + 1;
            let right = left + 1;
            if left >= self.end_position {
                break;
            }

            let largest_child = if right < self.end_position && self.values[right] > self.values[left]
            {
                right
            } else {
                left
            };

            if self.values[largest_child] > self.values[position] {
                self.swap_positions(largest_child, position);
                position = largest_child;
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::KeyValueHeap;

    fn drain(heap: &mut KeyValueHeap<usize, f64>) -> Vec<usize> {
        let mut keys = vec![];
        while let Some(key) = heap.pop_max() {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn keys_are_popped_by_decreasing_value() {
        let mut heap: KeyValueHeap<usize, f64> = KeyValueHeap::default();
        for (key, value) in [3.0, 10.0, 5.0, 1.0, 7.0].into_iter().enumerate() {
            heap.grow(key, value);
        }

        assert_eq!(vec![1, 4, 2, 0, 3], drain(&mut heap));
        assert_eq!(None, heap.pop_max());
    }

    #[test]
    fn restored_keys_keep_their_bumped_value() {
        let mut heap: KeyValueHeap<usize, f64> = KeyValueHeap::default();
        heap.grow(0, 1.0);
        heap.grow(1, 2.0);
        heap.grow(2, 3.0);

        heap.delete_key(0);
        heap.increment(0, 5.0);
        assert_eq!(Some(2), heap.peek_max().map(|(key, _)| key));

        heap.restore_key(0);
        assert_eq!(Some((0, 6.0)), heap.peek_max());
    }

    #[test]
    fn dividing_values_preserves_order() {
        let mut heap: KeyValueHeap<usize, f64> = KeyValueHeap::default();
        heap.grow(0, 100.0);
        heap.grow(1, 300.0);
        heap.grow(2, 200.0);

        heap.divide_values(100.0);

        assert_eq!(3.0, heap.get_value(1));
        assert_eq!(vec![1, 2, 0], drain(&mut heap));
    }
}
