use std::fmt::Debug;

pub(crate) trait MovingAverage<Term>: Debug {
    fn add_term(&mut self, new_term: Term);

    /// Returns the moving average value; in case there are no terms, the convention is to return 0
    fn value(&self) -> f64;

    /// Adapts the number of terms the average considers; only meaningful for averages over the k
    /// previous terms.
    fn adapt(&mut self, interval_length: u64);
}
