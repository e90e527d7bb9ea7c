use super::SequenceGenerator;

// A sequence that generates the same value
#[derive(Debug, Copy, Clone)]
pub(crate) struct ConstantSequence {
    constant_value: i64,
}

impl ConstantSequence {
    pub(crate) fn new(constant_value: i64) -> ConstantSequence {
        ConstantSequence { constant_value }
    }
}

impl SequenceGenerator for ConstantSequence {
    fn next(&mut self) -> i64 {
        self.constant_value
    }
}

#[cfg(test)]
mod tests {
    use super::ConstantSequence;
    use crate::basic_types::sequence_generators::SequenceGenerator;

    #[test]
    fn every_element_is_the_constant() {
        let mut sequence = ConstantSequence::new(64);
        assert!((0..100).all(|_| sequence.next() == 64));
    }
}
