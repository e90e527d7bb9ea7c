use std::time::Duration;
use std::time::Instant;

use super::TerminationCondition;

/// Stops the search once a wall-clock budget is spent.
///
/// A budget made with [`TimeBudget::new`] starts counting at the first poll, so it can be built
/// well before the solve it limits. [`TimeBudget::starting_now`] starts counting immediately.
#[derive(Clone, Copy, Debug)]
pub struct TimeBudget {
    budget: Duration,
    deadline: Option<Instant>,
}

impl TimeBudget {
    pub fn new(budget: Duration) -> TimeBudget {
        TimeBudget {
            budget,
            deadline: None,
        }
    }

    pub fn starting_now(budget: Duration) -> TimeBudget {
        TimeBudget {
            budget,
            deadline: Instant::now().checked_add(budget),
        }
    }

    /// The time left; the full budget if the clock has not started yet.
    pub fn remaining(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline.saturating_duration_since(Instant::now()),
            None => self.budget,
        }
    }
}

impl TerminationCondition for TimeBudget {
    fn should_stop(&mut self) -> bool {
        // A budget too large to be represented never runs out.
        let budget = self.budget;
        let deadline = *self.deadline.get_or_insert_with(|| {
            Instant::now()
                .checked_add(budget)
                .unwrap_or_else(far_future)
        });
        Instant::now() >= deadline
    }
}

fn far_future() -> Instant {
    let now = Instant::now();
    now.checked_add(Duration::from_secs(u64::from(u32::MAX)))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_clock_starts_at_the_first_poll() {
        let mut budget = TimeBudget::new(Duration::from_secs(3600));
        assert_eq!(Duration::from_secs(3600), budget.remaining());

        assert!(!budget.should_stop());
        assert!(budget.deadline.is_some());
        assert!(budget.remaining() <= Duration::from_secs(3600));
    }

    #[test]
    fn an_empty_budget_stops_right_away() {
        assert!(TimeBudget::new(Duration::ZERO).should_stop());
        assert!(TimeBudget::starting_now(Duration::ZERO).should_stop());
        assert_eq!(
            Duration::ZERO,
            TimeBudget::starting_now(Duration::ZERO).remaining()
        );
    }

    #[test]
    fn an_unrepresentable_budget_never_stops() {
        let mut budget = TimeBudget::new(Duration::MAX);

        assert!(!budget.should_stop());
    }
}
