use std::sync::Arc;

use padmux_gamepad::{SlotIndex, SlotSource};
use padmux_vpad::{Feedback, FeedbackHandler};

use crate::owner::OwnerCell;

/// Forwards rumble addressed to the virtual controller to whichever physical
/// slot owns it. Only reads the owner cell, so it never contends with the
/// polling loop.
pub struct FeedbackRouter {
    owner: Arc<OwnerCell>,
    source: Arc<dyn SlotSource>,
}

impl FeedbackRouter {
    pub fn new(owner: Arc<OwnerCell>, source: Arc<dyn SlotSource>) -> Self {
        Self { owner, source }
    }

    /// Vibrate the owner. Returns the slot that received the command.
    pub fn route(&self, feedback: Feedback) -> Option<SlotIndex> {
        let slot = self.owner.slot()?;
        let (left, right) = feedback.motor_speeds();
        match self.source.set_vibration(slot, left, right) {
            Ok(()) => Some(slot),
            Err(e) => {
                log::debug!("rumble for slot {slot} dropped: {e}");
                None
            }
        }
    }

    pub fn into_handler(self) -> FeedbackHandler {
        Box::new(move |feedback| {
            self.route(feedback);
        })
    }
}
