use super::RestartParams;
use crate::basic_types::moving_averages::CumulativeMovingAverage;
use crate::basic_types::moving_averages::MovingAverage;
use crate::basic_types::moving_averages::WindowedMovingAverage;

/// Glue-based restarts in the style of [Glucose](https://github.com/audemard/glucose).
///
/// A restart is due once at least `base_interval` conflicts passed since the last one and the
/// average LBD over that window exceeds the overall average times
/// [`RestartParams::lbd_coef`]. A conflict on a trail which is much longer than usual postpones
/// the restart by another window.
#[derive(Debug, Clone)]
pub(crate) struct DynamicRestart {
    interval: u64,
    min_conflicts_before_first_restart: u64,
    num_conflicts_since_restart: u64,
    lbd_coef: f64,
    num_assigned_coef: f64,
    lbd_short_term: WindowedMovingAverage<u64>,
    lbd_long_term: CumulativeMovingAverage<u64>,
    num_assigned: WindowedMovingAverage<u64>,
    pub(crate) num_restarts: u64,
    pub(crate) num_blocked_restarts: u64,
}

impl DynamicRestart {
    pub(crate) fn new(params: &RestartParams) -> DynamicRestart {
        let interval = params.base_interval.max(1);
        DynamicRestart {
            interval,
            min_conflicts_before_first_restart: params.min_conflicts_before_first_restart,
            num_conflicts_since_restart: 0,
            lbd_coef: params.lbd_coef,
            num_assigned_coef: params.num_assigned_coef,
            lbd_short_term: WindowedMovingAverage::new(interval),
            lbd_long_term: CumulativeMovingAverage::default(),
            num_assigned: WindowedMovingAverage::new(params.num_assigned_window.max(1)),
            num_restarts: 0,
            num_blocked_restarts: 0,
        }
    }

    pub(crate) fn should_restart(&self) -> bool {
        if self.before_first_restart() || !self.window_passed() {
            return false;
        }
        self.lbd_short_term.value() > self.lbd_long_term.value() * self.lbd_coef
    }

    pub(crate) fn notify_conflict(&mut self, lbd: u32, num_assigned: usize) {
        self.num_assigned.add_term(num_assigned as u64);
        self.lbd_short_term.add_term(lbd as u64);
        self.lbd_long_term.add_term(lbd as u64);
        self.num_conflicts_since_restart += 1;

        let close_to_model =
            num_assigned as f64 > self.num_assigned.value() * self.num_assigned_coef;
        if !self.before_first_restart() && self.window_passed() && close_to_model {
            self.num_blocked_restarts += 1;
            self.num_conflicts_since_restart = 0;
        }
    }

    pub(crate) fn notify_restart(&mut self) {
        self.num_restarts += 1;
        self.num_conflicts_since_restart = 0;
    }

    /// Forgets the recent LBDs, e.g. after a model was found.
    pub(crate) fn reset(&mut self) {
        self.num_conflicts_since_restart = 0;
        self.lbd_short_term.clear();
    }

    fn before_first_restart(&self) -> bool {
        self.num_restarts == 0
            && self.num_conflicts_since_restart < self.min_conflicts_before_first_restart
    }

    fn window_passed(&self) -> bool {
        self.num_conflicts_since_restart >= self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RestartParams {
        RestartParams {
            base_interval: 3,
            min_conflicts_before_first_restart: 0,
            lbd_coef: 1.25,
            num_assigned_coef: 1.4,
            num_assigned_window: 10,
            ..RestartParams::default()
        }
    }

    #[test]
    fn a_rising_lbd_triggers_a_restart_once_the_window_passed() {
        let mut restart = DynamicRestart::new(&params());
        for _ in 0..6 {
            restart.notify_conflict(2, 10);
        }
        assert!(!restart.should_restart());

        restart.notify_restart();
        restart.notify_conflict(10, 10);
        restart.notify_conflict(10, 10);
        assert!(!restart.should_restart());
        restart.notify_conflict(10, 10);
        assert!(restart.should_restart());
    }

    #[test]
    fn a_long_trail_blocks_the_restart() {
        let mut restart = DynamicRestart::new(&params());
        for _ in 0..3 {
            restart.notify_conflict(2, 10);
        }
        restart.notify_restart();
        restart.notify_conflict(10, 10);
        restart.notify_conflict(10, 10);
        restart.notify_conflict(10, 100);

        assert_eq!(1, restart.num_blocked_restarts);
        assert!(!restart.should_restart());
    }

    #[test]
    fn nothing_happens_before_the_first_restart_is_allowed() {
        let mut restart = DynamicRestart::new(&RestartParams {
            min_conflicts_before_first_restart: 100,
            ..params()
        });
        for lbd in 1..50 {
            restart.notify_conflict(lbd, 10);
        }

        assert!(!restart.should_restart());
        assert_eq!(0, restart.num_blocked_restarts);
    }
}
