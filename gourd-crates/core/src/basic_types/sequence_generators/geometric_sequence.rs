use super::SequenceGenerator;

/// Given a start `a` and a factor `m`, the sequence is `f(0) = a` and `f(i) = f(i-1) * m`, where
/// every intermediate value is rounded down. Overflows are not taken into account.
#[derive(Debug, Copy, Clone)]
pub(crate) struct GeometricSequence {
    current_value: i64,
    multiplication_factor: f64,
}

impl GeometricSequence {
    pub(crate) fn new(starting_value: i64, multiplication_factor: f64) -> GeometricSequence {
        GeometricSequence {
            current_value: starting_value,
            multiplication_factor,
        }
    }
}

impl SequenceGenerator for GeometricSequence {
    fn next(&mut self) -> i64 {
        let next_value = self.current_value;
        self.current_value = (self.current_value as f64 * self.multiplication_factor) as i64;
        next_value
    }
}

#[cfg(test)]
mod tests {
    use super::GeometricSequence;
    use crate::basic_types::sequence_generators::SequenceGenerator;

    #[test]
    fn doubling_yields_powers_of_two() {
        let mut sequence = GeometricSequence::new(1, 2.0);
        for i in 0..62 {
            assert_eq!(1_i64 << i, sequence.next());
        }
    }

    #[test]
    fn intermediate_values_are_rounded_down() {
        let mut sequence = GeometricSequence::new(100, 1.5);
        let elements = (0..6).map(|_| sequence.next()).collect::<Vec<_>>();
        assert_eq!(vec![100, 150, 225, 337, 505, 757], elements);
    }
}
