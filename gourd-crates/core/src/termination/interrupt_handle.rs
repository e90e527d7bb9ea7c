use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::TerminationCondition;

/// A cloneable flag which asks a running search to stop.
///
/// The handle is polled by the solver during propagation (see
/// [`MessageHandler`](crate::engine::propagation::MessageHandler)) and before every decision.
/// Raising it while no search is running keeps it raised, so the next search stops right away;
/// the search which observed it clears it again.
#[derive(Clone, Debug, Default)]
pub struct InterruptHandle {
    interrupted: Arc<AtomicBool>,
}

impl InterruptHandle {
    pub fn new() -> InterruptHandle {
        InterruptHandle::default()
    }

    pub fn raise(&self) {
        self.interrupted.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Lowers the flag and returns whether it was raised.
    pub fn clear(&self) -> bool {
        self.interrupted.swap(false, Ordering::SeqCst)
    }
}

impl TerminationCondition for InterruptHandle {
    fn should_stop(&mut self) -> bool {
        self.is_raised()
    }
}

#[cfg(test)]
mod tests {
    use super::InterruptHandle;

    #[test]
    fn clones_observe_the_same_flag() {
        let handle = InterruptHandle::new();
        let other = handle.clone();

        other.raise();
        assert!(handle.is_raised());

        assert!(handle.clear());
        assert!(!other.is_raised());
        assert!(!handle.clear());
    }
}
