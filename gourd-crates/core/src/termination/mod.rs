//! A [`TerminationCondition`] is polled by the solver before every decision. It tells the solver
//! to give up even though no definitive conclusion has been reached, in which case the search
//! reports an unknown result. The most common examples are [`TimeBudget`] and [`OsSignal`].

mod combinator;
mod decision_budget;
mod indefinite;
mod interrupt_handle;
mod os_signal;
mod time_budget;

pub use combinator::Combinator;
pub use decision_budget::DecisionBudget;
pub use indefinite::Indefinite;
pub use interrupt_handle::InterruptHandle;
pub use os_signal::OsSignal;
pub use time_budget::TimeBudget;

/// Determines when the solver should stop searching.
pub trait TerminationCondition {
    /// Returns `true` when the solver should stop, `false` otherwise.
    fn should_stop(&mut self) -> bool;

    fn decision_has_been_made(&mut self) {}
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        match self {
            Some(t) => t.should_stop(),
            None => false,
        }
    }

    fn decision_has_been_made(&mut self) {
        if let Some(t) = self {
            t.decision_has_been_made()
        }
    }
}

impl<T: TerminationCondition + ?Sized> TerminationCondition for &mut T {
    fn should_stop(&mut self) -> bool {
        (**self).should_stop()
    }

    fn decision_has_been_made(&mut self) {
        (**self).decision_has_been_made()
    }
}
