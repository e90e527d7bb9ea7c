use super::SequenceGenerator;

/// The Luby sequence `1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8, ...` scaled by `base_value`.
///
/// The next element is computed in constant time with Knuth's "reluctant doubling" formula.
#[derive(Debug, Copy, Clone)]
pub(crate) struct LubySequence {
    u: i64,
    v: i64,
    base_value: i64,
}

impl LubySequence {
    pub(crate) fn new(base_value: i64) -> LubySequence {
        LubySequence {
            u: 1,
            v: 1,
            base_value,
        }
    }
}

impl SequenceGenerator for LubySequence {
    fn next(&mut self) -> i64 {
        let next_value = self.v;
        if (self.u & (-self.u)) == self.v {
            self.u += 1;
            self.v = 1;
        } else {
            self.v *= 2;
        }
        next_value * self.base_value
    }
}

#[cfg(test)]
mod tests {
    use super::LubySequence;
    use crate::basic_types::sequence_generators::SequenceGenerator;

    fn luby(i: usize) -> usize {
        let k = (i + 1).ilog2();
        if (i + 1).is_power_of_two() {
            1 << (k - 1)
        } else {
            luby(i + 1 - (1 << k))
        }
    }

    #[test]
    fn prefix_matches_the_known_sequence() {
        let mut sequence = LubySequence::new(1);
        let elements = (0..15).map(|_| sequence.next()).collect::<Vec<_>>();
        assert_eq!(vec![1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8], elements);
    }

    #[test]
    fn scaled_sequence_matches_the_recursive_definition() {
        let mut sequence = LubySequence::new(32);
        for i in 1..10_000 {
            assert_eq!((luby(i) * 32) as i64, sequence.next());
        }
    }
}
