use log::info;

use super::PostPropagationContext;
use super::PostPropagator;
use super::PRIORITY_RESERVED_MESSAGE;
use crate::basic_types::Conflict;
use crate::basic_types::PropagationStatus;
use crate::termination::InterruptHandle;

/// Turns a raised [`InterruptHandle`] into [`Conflict::Interrupted`] so that a running
/// propagation stops at the next fixpoint round.
///
/// Every [`Solver`](crate::engine::Solver) carries exactly one message handler, in front of
/// every other post-propagator.
#[derive(Debug)]
pub struct MessageHandler {
    handle: InterruptHandle,
}

impl MessageHandler {
    pub fn new(handle: InterruptHandle) -> MessageHandler {
        MessageHandler { handle }
    }

    pub fn handle(&self) -> &InterruptHandle {
        &self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: InterruptHandle) {
        self.handle = handle;
    }
}

impl PostPropagator for MessageHandler {
    fn name(&self) -> &str {
        "MessageHandler"
    }

    fn priority(&self) -> u32 {
        PRIORITY_RESERVED_MESSAGE
    }

    fn propagate(&mut self, _context: &mut PostPropagationContext<'_>) -> PropagationStatus {
        if self.handle.clear() {
            info!("Interrupt received during propagation");
            return Err(Conflict::Interrupted);
        }
        Ok(())
    }
}
