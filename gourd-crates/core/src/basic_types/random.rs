use std::fmt::Debug;
use std::ops::Range;

use rand::Rng;
use rand::SeedableRng;

use crate::gourd_assert_moderate;

/// Abstraction for randomness, so that the source of randomness can be swapped out.
///
/// The solver only draws random numbers through this trait (random decisions, shuffling of watch
/// lists), which makes it possible to write deterministic tests with a scripted implementation.
pub trait Random: Debug {
    /// Generates a bool which is true with probability `probability`; it should hold that
    /// `probability ∈ [0, 1]`.
    fn generate_bool(&mut self, probability: f64) -> bool;

    /// Generates a usize in `[range.start, range.end)` with equal probability.
    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize;

    /// Generate a random float in the range 0..1.
    fn generate_f64(&mut self) -> f64;
}

impl<T> Random for T
where
    T: SeedableRng + Rng + Debug,
{
    fn generate_bool(&mut self, probability: f64) -> bool {
        gourd_assert_moderate!(
            (0.0..=1.0).contains(&probability),
            "It should hold that 0.0 <= {probability} <= 1.0"
        );

        self.gen_bool(probability)
    }

    fn generate_usize_in_range(&mut self, range: Range<usize>) -> usize {
        self.gen_range(range)
    }

    fn generate_f64(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

/// Shuffles `elements` in place (Fisher-Yates) using the provided [`Random`].
pub(crate) fn shuffle<T>(random: &mut dyn Random, elements: &mut [T]) {
    for i in (1..elements.len()).rev() {
        let j = random.generate_usize_in_range(0..i + 1);
        elements.swap(i, j);
    }
}
