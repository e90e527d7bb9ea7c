use std::collections::VecDeque;
use std::fmt::Debug;

use num::cast::AsPrimitive;
use num::traits::NumAssign;

use super::MovingAverage;
use crate::gourd_assert_simple;

/// The average over the last `window_size` terms.
#[derive(Clone, Debug)]
pub(crate) struct WindowedMovingAverage<Term> {
    window_size: u64,
    windowed_sum: Term,
    values_in_window: VecDeque<Term>,
}

impl<Term: Default> WindowedMovingAverage<Term> {
    pub(crate) fn new(window_size: u64) -> WindowedMovingAverage<Term> {
        gourd_assert_simple!(window_size > 0);
        WindowedMovingAverage {
            window_size,
            windowed_sum: Term::default(),
            values_in_window: VecDeque::with_capacity(window_size as usize),
        }
    }

    /// Whether the window contains `window_size` terms.
    pub(crate) fn is_full(&self) -> bool {
        self.values_in_window.len() as u64 >= self.window_size
    }

    /// Forgets all terms while keeping the window size.
    pub(crate) fn clear(&mut self) {
        self.values_in_window.clear();
        self.windowed_sum = Term::default();
    }
}

impl<Term> MovingAverage<Term> for WindowedMovingAverage<Term>
where
    Term: Debug + NumAssign + AsPrimitive<f64> + Default,
{
    fn add_term(&mut self, new_term: Term) {
        if self.values_in_window.len() as u64 == self.window_size {
            if let Some(oldest) = self.values_in_window.pop_front() {
                self.windowed_sum -= oldest;
            }
        }

        self.windowed_sum += new_term;
        self.values_in_window.push_back(new_term);
    }

    fn value(&self) -> f64 {
        if !self.values_in_window.is_empty() {
            self.windowed_sum.as_() / (self.values_in_window.len() as f64)
        } else {
            0.0
        }
    }

    fn adapt(&mut self, interval_length: u64) {
        gourd_assert_simple!(interval_length > 0);

        while self.values_in_window.len() as u64 > interval_length {
            if let Some(oldest) = self.values_in_window.pop_front() {
                self.windowed_sum -= oldest;
            }
        }
        self.window_size = interval_length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_terms_count() {
        let mut average = WindowedMovingAverage::new(2);
        average.add_term(10_u64);
        assert_eq!(10.0, average.value());
        assert!(!average.is_full());
        average.add_term(30);
        assert_eq!(20.0, average.value());
        assert!(average.is_full());
        average.add_term(90);
        assert_eq!(60.0, average.value());
    }

    #[test]
    fn shrinking_the_window_drops_the_oldest_terms() {
        let mut average = WindowedMovingAverage::new(4);
        for term in [1_u64, 2, 3, 4] {
            average.add_term(term);
        }

        average.adapt(2);

        assert_eq!(3.5, average.value());
        assert!(average.is_full());
    }
}
