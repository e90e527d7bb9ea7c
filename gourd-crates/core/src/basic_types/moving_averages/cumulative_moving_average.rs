use std::fmt::Debug;
use std::fmt::Display;

use num::cast::AsPrimitive;
use num::traits::NumAssign;

use super::MovingAverage;

/// The average over every term which was ever added.
#[derive(Default, Debug, Copy, Clone)]
pub struct CumulativeMovingAverage<Term> {
    sum: Term,
    num_terms: u64,
}

impl<Term> CumulativeMovingAverage<Term> {
    pub fn num_terms(&self) -> u64 {
        self.num_terms
    }
}

impl<Term> Display for CumulativeMovingAverage<Term>
where
    Term: Debug + NumAssign + AsPrimitive<f64>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl<Term> MovingAverage<Term> for CumulativeMovingAverage<Term>
where
    Term: Debug + NumAssign + AsPrimitive<f64>,
{
    fn add_term(&mut self, new_term: Term) {
        self.sum += new_term;
        self.num_terms += 1
    }

    fn value(&self) -> f64 {
        if self.num_terms > 0 {
            self.sum.as_() / (self.num_terms as f64)
        } else {
            0.0
        }
    }

    fn adapt(&mut self, _interval_length: u64) {}
}

#[cfg(test)]
mod tests {
    use super::CumulativeMovingAverage;
    use crate::basic_types::moving_averages::MovingAverage;

    #[test]
    fn empty_average_is_zero() {
        let average = CumulativeMovingAverage::<u64>::default();
        assert_eq!(0.0, average.value());
    }

    #[test]
    fn average_considers_every_term() {
        let mut average = CumulativeMovingAverage::<u64>::default();
        average.add_term(10);
        assert_eq!(10.0, average.value());
        average.add_term(20);
        assert_eq!(15.0, average.value());
        average.add_term(30);
        assert_eq!(20.0, average.value());
        assert_eq!(3, average.num_terms());
    }
}
