use padmux_gamepad::{ControllerSnapshot, Deadzones, GamepadState, SlotIndex};
use padmux_vpad::{FeedbackHandler, VirtualTarget};

use crate::error::{Error, Result};

/// The live virtual controller together with what was last pushed to it.
///
/// Pushes only happen when the normalized owner state differs from the last
/// successful push, so driver traffic follows input changes rather than the
/// poll rate.
pub struct VirtualPadBinding {
    target: Option<Box<dyn VirtualTarget>>,
    deadzones: Deadzones,
    last_pushed: Option<GamepadState>,
}

impl VirtualPadBinding {
    pub fn new(target: Box<dyn VirtualTarget>, deadzones: Deadzones) -> Self {
        Self {
            target: Some(target),
            deadzones,
            last_pushed: None,
        }
    }

    /// Mirror `snapshot` onto the device. Returns whether a push happened.
    ///
    /// A torn-down binding ignores updates.
    pub fn update(&mut self, snapshot: &ControllerSnapshot) -> Result<bool> {
        let Some(target) = self.target.as_mut() else {
            return Ok(false);
        };
        let state = self.deadzones.normalize(&snapshot.pad);
        if self.last_pushed == Some(state) {
            return Ok(false);
        }
        target.submit(&state)?;
        self.last_pushed = Some(state);
        Ok(true)
    }

    /// Release every button and center every axis on the device.
    pub fn send_neutral(&mut self) -> Result<()> {
        let target = self.target.as_mut().ok_or(Error::NotRunning)?;
        target.submit(&GamepadState::NEUTRAL)?;
        self.last_pushed = Some(GamepadState::NEUTRAL);
        Ok(())
    }

    pub fn register_feedback(&mut self, handler: FeedbackHandler) -> Result<()> {
        let target = self.target.as_mut().ok_or(Error::NotRunning)?;
        target.register_feedback(handler)?;
        Ok(())
    }

    /// Slot the device itself occupies on the host, if the bus reports it.
    pub fn user_index(&mut self) -> Option<SlotIndex> {
        self.target.as_mut()?.user_index()
    }

    pub fn last_pushed(&self) -> Option<GamepadState> {
        self.last_pushed
    }

    pub fn is_live(&self) -> bool {
        self.target.is_some()
    }

    /// Unregister feedback, then unplug the device.
    pub fn teardown(&mut self) {
        if let Some(mut target) = self.target.take() {
            target.unregister_feedback();
            drop(target);
            log::info!("virtual controller unplugged");
        }
    }
}
